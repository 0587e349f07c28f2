/* src/server/adapter/axum/src/tests.rs */

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::json;
use tokio_stream::StreamExt;
use tower::ServiceExt;
use vitrine_server::{EntryPatch, MemorySource, SiteConfig, SiteServer};

use super::*;
use crate::handler::PreviewHub;

fn entry(id: &str, content_type: &str, fields: serde_json::Value) -> serde_json::Value {
  json!({ "sys": { "id": id, "type": "Entry", "contentType": { "sys": { "id": content_type } } }, "fields": fields })
}

fn localized(mut value: serde_json::Value, locale: &str) -> serde_json::Value {
  value["sys"]["locale"] = json!(locale);
  value
}

fn fixtures() -> MemorySource {
  let callout = entry("c1", "callout", json!({ "title": "Hello" }));
  let image = entry("img1", "imageWrapper", json!({ "url": "https://img.test/a.jpg" }));
  let frame = entry("f1", "frame", json!({ "layout": "duplex", "things": [callout, image] }));
  let unknown = entry("s1", "unknownType", json!({}));
  let doc = json!({
    "locales": [{ "code": "en-US", "default": true }, { "code": "de" }],
    "entries": [
      localized(
        entry("home-en", "landingPage", json!({ "slug": "home", "title": "Home", "frames": [frame], "sections": [unknown] })),
        "en-US",
      ),
      localized(entry("home-de", "landingPage", json!({ "slug": "home", "title": "Startseite" })), "de"),
      entry("about", "landingPage", json!({ "slug": "about", "title": "About" })),
      entry("post", "blogPost", json!({ "slug": "hello", "title": "Hello post", "body": "Post body" })),
    ]
  });
  MemorySource::from_json(&doc.to_string()).unwrap()
}

fn config() -> SiteConfig {
  toml::from_str("[site]\nbase_url = \"https://site.test/\"").unwrap()
}

fn app() -> Router {
  SiteServer::new(config()).content_source(fixtures()).into_axum_router().unwrap()
}

async fn get(app: &Router, uri: &str, headers: &[(&str, &str)]) -> axum::response::Response {
  let mut req = Request::builder().uri(uri);
  for (name, value) in headers {
    req = req.header(*name, *value);
  }
  app.clone().oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
  let bytes = resp.into_body().collect().await.unwrap().to_bytes();
  String::from_utf8(bytes.to_vec()).unwrap()
}

fn location(resp: &axum::response::Response) -> &str {
  resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn unprefixed_default_is_served_in_place() {
  let app = app();
  let resp = get(&app, "/", &[("accept-language", "en-US,en;q=0.8")]).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains("<html lang=\"en-US\">"));
  assert!(html.contains("<title>Home | Vitrine</title>"));
  assert!(html.contains("Hello"));
  assert!(html.contains("Missing component</strong> for content type: <strong>unknownType"));
  // Duplex placement: the callout lands left, the image right
  assert!(html.find("data-entry-id=\"c1\"").unwrap() < html.find("data-entry-id=\"img1\"").unwrap());
}

#[tokio::test]
async fn negotiated_locale_redirects_with_query() {
  let app = app();
  let resp = get(&app, "/about?ref=nav", &[("accept-language", "de-DE,de;q=0.9")]).await;
  assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
  assert_eq!(location(&resp), "/de/about?ref=nav");
}

#[tokio::test]
async fn cookie_beats_accept_language() {
  let app = app();
  let resp =
    get(&app, "/about", &[("cookie", "vitrine-locale=de"), ("accept-language", "en-US")]).await;
  assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
  assert_eq!(location(&resp), "/de/about");
}

#[tokio::test]
async fn default_prefix_is_stripped_and_pinned() {
  let app = app();
  let resp = get(&app, "/en-US/about?x=1", &[("accept-language", "de")]).await;
  assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
  assert_eq!(location(&resp), "/about?x=1");
  let cookie = resp.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
  assert!(cookie.starts_with("vitrine-locale=en-US"));

  // The follow-up request carries the cookie and is served without another redirect
  let resp = get(&app, "/about?x=1", &[("cookie", "vitrine-locale=en-US"), ("accept-language", "de")]).await;
  assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn prefixed_locale_passes_through() {
  let app = app();
  let resp = get(&app, "/de", &[("accept-language", "en-US")]).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains("<html lang=\"de\">"));
  assert!(html.contains("Startseite"));
  assert!(html.contains("href=\"/en-US\" hreflang=\"en-US\""));
}

#[tokio::test]
async fn unknown_pages_are_not_found() {
  let app = app();
  for uri in ["/missing", "/a/b/c", "/de/blog/nope"] {
    let resp = get(&app, uri, &[]).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
    assert!(body_text(resp).await.contains("Page not found"));
  }
}

#[tokio::test]
async fn blog_post_renders_article() {
  let app = app();
  let resp = get(&app, "/blog/hello", &[]).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let html = body_text(resp).await;
  assert!(html.contains("<h1>Hello post</h1>"));
  assert!(html.contains("Post body"));
  assert!(html.contains("href=\"/blog\""));
}

#[tokio::test]
async fn sitemap_lists_every_locale() {
  let app = app();
  let resp = get(&app, "/sitemap.xml", &[("accept-language", "de")]).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let xml = body_text(resp).await;
  assert!(xml.contains("<loc>https://site.test/</loc>"));
  assert!(xml.contains("<loc>https://site.test/about</loc>"));
  assert!(xml.contains("<loc>https://site.test/de/about</loc>"));
  assert!(xml.contains("<loc>https://site.test/blog/hello</loc>"));
  assert!(xml.contains("<loc>https://site.test/de/blog/hello</loc>"));
}

#[tokio::test]
async fn malformed_patch_is_rejected() {
  let app = app();
  let req = Request::post("/_vitrine/preview/patch").body(Body::from("{not json")).unwrap();
  let resp = app.oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
  assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

async fn post_patch(app: &Router, patch: serde_json::Value) -> axum::response::Response {
  let req = Request::post("/_vitrine/preview/patch")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from(patch.to_string()))
    .unwrap();
  app.clone().oneshot(req).await.unwrap()
}

/// Next SSE event carrying data, skipping keep-alive comments.
async fn next_event(body: &mut Body) -> String {
  let read = async {
    loop {
      let frame = body.frame().await.unwrap().unwrap();
      if let Ok(data) = frame.into_data() {
        let text = String::from_utf8(data.to_vec()).unwrap();
        if text.contains("data:") {
          return text;
        }
      }
    }
  };
  tokio::time::timeout(Duration::from_secs(5), read).await.unwrap()
}

#[tokio::test]
async fn live_patch_streams_then_yields_to_fresh_fetch() {
  let app = app();
  let first = body_text(get(&app, "/?preview=1", &[]).await).await;
  assert!(first.contains("\"preview\":true"));
  assert!(first.contains("EventSource"));

  let mut events =
    get(&app, "/_vitrine/preview/events?entry=home-en&locale=en-US", &[]).await.into_body();
  let resp = post_patch(&app, json!({ "entryId": "c1", "fields": { "title": "Patched" } })).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let event = next_event(&mut events).await;
  assert!(event.contains("block"));
  assert!(event.contains("Patched"));
  assert!(event.contains("\"entryId\":\"c1\""));

  let published = body_text(get(&app, "/", &[]).await).await;
  assert!(!published.contains("Patched"));
  assert!(!published.contains("EventSource"));

  // The refetched tree supersedes the patch that arrived before it
  let refreshed = body_text(get(&app, "/?preview=1", &[]).await).await;
  assert!(!refreshed.contains("Patched"));
  assert!(refreshed.contains("Hello"));
}

#[tokio::test]
async fn discard_drops_pending_patches() {
  let app = app();
  post_patch(&app, json!({ "entryId": "c1", "fields": { "title": "Patched" } })).await;
  post_patch(&app, json!({ "entryId": "img1", "fields": { "url": "https://img.test/b.jpg" } })).await;

  let discard = || Request::delete("/_vitrine/preview/patch").body(Body::empty()).unwrap();
  let resp = app.clone().oneshot(discard()).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
  let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
  assert_eq!(body["discarded"], 2);

  let resp = app.clone().oneshot(discard()).await.unwrap();
  let body: serde_json::Value = serde_json::from_str(&body_text(resp).await).unwrap();
  assert_eq!(body["discarded"], 0);
}

fn personalized_app() -> Router {
  let variant = entry("v1", "callout", json!({ "title": "Variant" }));
  let experience = entry(
    "exp1",
    "nt_experience",
    json!({ "nt_type": "nt_personalization", "nt_variants": [variant] }),
  );
  let callout = entry("c1", "callout", json!({ "title": "Hello", "nt_experiences": [experience] }));
  let frame = entry("f1", "frame", json!({ "layout": "single", "things": [callout] }));
  let doc = json!({
    "locales": [{ "code": "en-US", "default": true }],
    "entries": [entry("home", "landingPage", json!({ "slug": "home", "title": "Home", "frames": [frame] }))]
  });
  let source = MemorySource::from_json(&doc.to_string()).unwrap();
  SiteServer::new(config()).content_source(source).into_axum_router().unwrap()
}

#[tokio::test]
async fn live_updates_keep_the_pinned_variant() {
  let app = personalized_app();
  let page = body_text(get(&app, "/?preview=1&pin=exp1:1", &[]).await).await;
  assert!(page.contains("Variant"));

  let mut pinned =
    get(&app, "/_vitrine/preview/events?entry=home&pin=exp1:1", &[]).await.into_body();
  let mut baseline = get(&app, "/_vitrine/preview/events?entry=home", &[]).await.into_body();
  post_patch(&app, json!({ "entryId": "c1", "fields": { "title": "Patched" } })).await;

  let event = next_event(&mut pinned).await;
  assert!(event.contains("Variant"));
  assert!(!event.contains("Patched"));
  let event = next_event(&mut baseline).await;
  assert!(event.contains("Patched"));
}

#[tokio::test]
async fn doubled_slash_after_default_prefix_stays_on_host() {
  let app = app();
  let resp = get(&app, "/en-US//evil.example/phish", &[]).await;
  assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
  assert_eq!(location(&resp), "/evil.example/phish");
}

#[tokio::test]
async fn missing_registry_fails_open_then_reports() {
  let source = MemorySource::from_json("[]").unwrap();
  let app = SiteServer::new(SiteConfig::default()).content_source(source).into_axum_router().unwrap();
  let resp = get(&app, "/about", &[("accept-language", "de")]).await;
  // No redirect from the routing layer; the page itself cannot resolve a locale
  assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn hub_fans_out_patches() {
  let hub = PreviewHub::new();
  let mut updates = hub.subscribe();
  hub.apply(EntryPatch::new("c1").with_field("title", "A"));
  hub.apply(EntryPatch::new("c1").with_field("title", "B"));

  assert_eq!(updates.next().await.unwrap().fields["title"], "A");
  assert_eq!(updates.next().await.unwrap().fields["title"], "B");
  assert_eq!(hub.patches().get("c1").unwrap().fields["title"], "B");
  assert_eq!(hub.patches().len(), 1);
}
