/* src/server/core/rust/src/errors.rs */

use std::fmt;

#[derive(Debug, Clone)]
pub struct VitrineError {
  code: String,
  message: String,
  status: u16,
}

fn default_status(code: &str) -> u16 {
  match code {
    "VALIDATION_ERROR" => 400,
    "NOT_FOUND" => 404,
    "UPSTREAM_ERROR" => 502,
    "REGISTRY_UNAVAILABLE" => 503,
    _ => 500,
  }
}

impl VitrineError {
  pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
    Self { code: code.into(), message: message.into(), status }
  }

  pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
    let code = code.into();
    let status = default_status(&code);
    Self { code, message: message.into(), status }
  }

  pub fn validation(msg: impl Into<String>) -> Self {
    Self::with_code("VALIDATION_ERROR", msg)
  }

  pub fn not_found(msg: impl Into<String>) -> Self {
    Self::with_code("NOT_FOUND", msg)
  }

  pub fn internal(msg: impl Into<String>) -> Self {
    Self::with_code("INTERNAL_ERROR", msg)
  }

  /// The CMS (or another remote collaborator) failed or answered with garbage.
  pub fn upstream(msg: impl Into<String>) -> Self {
    Self::with_code("UPSTREAM_ERROR", msg)
  }

  pub fn config(msg: impl Into<String>) -> Self {
    Self::with_code("CONFIG_ERROR", msg)
  }

  pub fn registry_unavailable(msg: impl Into<String>) -> Self {
    Self::with_code("REGISTRY_UNAVAILABLE", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> u16 {
    self.status
  }

  pub fn is_not_found(&self) -> bool {
    self.code == "NOT_FOUND"
  }
}

impl fmt::Display for VitrineError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.code, self.message)
  }
}

impl std::error::Error for VitrineError {}
