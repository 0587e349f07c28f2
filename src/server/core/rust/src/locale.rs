/* src/server/core/rust/src/locale.rs */

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::errors::VitrineError;

/// The set of configured locales with exactly one default.
/// Construction enforces: non-empty, default is a member, no duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleRegistry {
  locales: Vec<String>,
  default: String,
}

impl LocaleRegistry {
  pub fn new(locales: Vec<String>, default: impl Into<String>) -> Result<Self, VitrineError> {
    let default = default.into();
    let mut deduped: Vec<String> = Vec::with_capacity(locales.len());
    for code in locales {
      let code = code.trim().to_string();
      if code.is_empty() {
        return Err(VitrineError::validation("locale code must not be empty"));
      }
      if !deduped.contains(&code) {
        deduped.push(code);
      }
    }
    if deduped.is_empty() {
      return Err(VitrineError::validation("locale registry must not be empty"));
    }
    if !deduped.contains(&default) {
      return Err(VitrineError::validation(format!(
        "default locale \"{default}\" is not in the registry {deduped:?}"
      )));
    }
    Ok(Self { locales: deduped, default })
  }

  /// Build from a CMS listing where each locale carries a `default` flag.
  /// The flagged locale wins; without one the first listed locale is the default.
  pub fn from_flagged<I>(listing: I) -> Result<Self, VitrineError>
  where
    I: IntoIterator<Item = (String, bool)>,
  {
    let mut locales = Vec::new();
    let mut default = None;
    for (code, is_default) in listing {
      if is_default && default.is_none() {
        default = Some(code.clone());
      }
      locales.push(code);
    }
    let default = match default.or_else(|| locales.first().cloned()) {
      Some(d) => d,
      None => return Err(VitrineError::validation("locale registry must not be empty")),
    };
    Self::new(locales, default)
  }

  pub fn locales(&self) -> &[String] {
    &self.locales
  }

  pub fn default_locale(&self) -> &str {
    &self.default
  }

  pub fn contains(&self, code: &str) -> bool {
    self.locales.iter().any(|l| l == code)
  }

  pub fn is_default(&self, code: &str) -> bool {
    self.default == code
  }
}

/// Replace (or insert) the locale segment of `path` with `target`.
/// Drives the locale switcher: `/de/about` -> `/fr/about`, `/about` -> `/fr/about`.
pub fn switch_locale_path(path: &str, target: &str, registry: &LocaleRegistry) -> String {
  let trimmed = path.trim_start_matches('/');
  let (first, rest) = match trimmed.split_once('/') {
    Some((first, rest)) => (first, Some(rest)),
    None => (trimmed, None),
  };

  let remainder = if registry.contains(first) {
    rest.map(|r| format!("/{r}")).unwrap_or_default()
  } else if trimmed.is_empty() {
    String::new()
  } else {
    format!("/{trimmed}")
  };
  format!("/{target}{remainder}")
}

/// Time-bounded cache around a registry source.
/// A failed refresh keeps serving the previous registry when one exists.
pub struct RegistryCache {
  ttl: Duration,
  slot: RwLock<Option<(Instant, Arc<LocaleRegistry>)>>,
}

impl RegistryCache {
  pub fn new(ttl: Duration) -> Self {
    Self { ttl, slot: RwLock::new(None) }
  }

  /// Pre-seeded cache that never expires; used for statically configured registries.
  pub fn fixed(registry: LocaleRegistry) -> Self {
    Self { ttl: Duration::MAX, slot: RwLock::new(Some((Instant::now(), Arc::new(registry)))) }
  }

  pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<LocaleRegistry>, VitrineError>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<LocaleRegistry, VitrineError>>,
  {
    {
      let slot = self.slot.read().await;
      if let Some((at, ref reg)) = *slot {
        if at.elapsed() < self.ttl {
          return Ok(reg.clone());
        }
      }
    }

    let mut slot = self.slot.write().await;
    // Another request may have refreshed while we waited for the write lock
    if let Some((at, ref reg)) = *slot {
      if at.elapsed() < self.ttl {
        return Ok(reg.clone());
      }
    }

    match fetch().await {
      Ok(fresh) => {
        let fresh = Arc::new(fresh);
        *slot = Some((Instant::now(), fresh.clone()));
        Ok(fresh)
      }
      Err(err) => match *slot {
        Some((_, ref stale)) => {
          tracing::warn!(error = %err, "locale registry refresh failed, serving stale registry");
          Ok(stale.clone())
        }
        None => Err(err),
      },
    }
  }
}
