/* src/server/adapter/axum/src/middleware.rs */

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE};
use axum::http::{HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use vitrine_server::routing::{PathState, classify};
use vitrine_server::{NegotiationInput, RouteOutcome, decide, decide_without_registry, negotiate_request};

use crate::handler::AppState;

/// Run the locale routing machine for every request before it reaches a handler.
pub(crate) async fn route_locale(
  State(state): State<Arc<AppState>>,
  mut req: Request,
  next: Next,
) -> Response {
  let parts = &state.parts;
  let path = req.uri().path().to_string();
  if parts.bypass.is_bypassed(&path) {
    return next.run(req).await;
  }

  // Locale to pin in the cookie when a default-prefixed path is stripped
  let (outcome, pin) = match parts.registry().await {
    Ok(registry) => {
      let headers = req.headers();
      let input = NegotiationInput {
        cookie_header: headers.get(COOKIE).and_then(|v| v.to_str().ok()),
        cookie_name: &parts.config.i18n.cookie,
        accept_language: headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()),
      };
      let outcome = decide(&path, &registry, &parts.bypass, || negotiate_request(&input, &registry));
      let strips_default = matches!(
        classify(&path, &registry),
        PathState::HasLocalePrefix { locale, .. } if registry.is_default(locale)
      );
      (outcome, strips_default.then(|| registry.default_locale().to_string()))
    }
    Err(err) => (decide_without_registry(&err), None),
  };
  tracing::debug!(path = %path, outcome = ?outcome, "locale routing");

  match outcome.with_query(req.uri().query()) {
    RouteOutcome::PassThrough => next.run(req).await,
    RouteOutcome::Rewrite(target) => {
      match target.parse::<Uri>() {
        Ok(uri) => *req.uri_mut() = uri,
        Err(e) => tracing::warn!(target = %target, error = %e, "invalid rewrite target, passing through"),
      }
      next.run(req).await
    }
    RouteOutcome::Redirect(target) => {
      let mut resp = Redirect::temporary(&target).into_response();
      if let Some(locale) = pin {
        let cookie = format!("{}={locale}; Path=/; SameSite=Lax", parts.config.i18n.cookie);
        match HeaderValue::from_str(&cookie) {
          Ok(value) => {
            resp.headers_mut().insert(SET_COOKIE, value);
          }
          Err(e) => tracing::warn!(error = %e, "locale cookie is not a valid header value"),
        }
      }
      resp
    }
  }
}
