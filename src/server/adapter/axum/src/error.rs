/* src/server/adapter/axum/src/error.rs */

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use vitrine_engine::{Document, render_document, render_not_found};
use vitrine_server::VitrineError;

/// Newtype wrapper to implement `IntoResponse` for `VitrineError`.
/// API routes answer with a JSON body, page routes with an HTML document.
pub(crate) enum AxumError {
  Api(VitrineError),
  Page { err: VitrineError, locale: Option<String> },
}

impl AxumError {
  pub(crate) fn api(err: VitrineError) -> Self {
    Self::Api(err)
  }

  pub(crate) fn page(err: VitrineError) -> Self {
    Self::Page { err, locale: None }
  }

  pub(crate) fn page_in(locale: &str) -> impl FnOnce(VitrineError) -> Self + '_ {
    move |err| Self::Page { err, locale: Some(locale.to_string()) }
  }
}

fn status_of(err: &VitrineError) -> StatusCode {
  StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for AxumError {
  fn into_response(self) -> Response {
    match self {
      Self::Api(err) => {
        let status = status_of(&err);
        let body = serde_json::json!({
          "ok": false,
          "error": { "code": err.code(), "message": err.message() }
        });
        (status, axum::Json(body)).into_response()
      }
      Self::Page { err, locale } => {
        let status = status_of(&err);
        let (title, body) = if err.is_not_found() {
          tracing::debug!(error = %err, "page not found");
          ("Page not found", render_not_found("/"))
        } else {
          tracing::error!(error = %err, "page failed");
          (
            "Something went wrong",
            "<main class=\"mx-auto max-w-3xl py-24 text-center\"><h1>Something went wrong</h1></main>"
              .to_string(),
          )
        };
        let doc = Document {
          locale: locale.unwrap_or_else(|| "en".to_string()),
          title: title.to_string(),
          site_name: String::new(),
          body,
          locale_links: Vec::new(),
          data: None,
        };
        (status, Html(render_document(&doc))).into_response()
      }
    }
  }
}

impl From<VitrineError> for AxumError {
  fn from(err: VitrineError) -> Self {
    Self::Api(err)
  }
}
