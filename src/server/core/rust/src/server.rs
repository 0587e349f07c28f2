/* src/server/core/rust/src/server.rs */

use std::sync::Arc;
use std::time::Duration;

use crate::config::SiteConfig;
use crate::errors::VitrineError;
use crate::locale::{LocaleRegistry, RegistryCache};
use crate::personalize::{Baseline, Personalizer};
use crate::routing::BypassMatcher;
use crate::source::ContentSource;

/// Framework-agnostic parts extracted from `SiteServer`.
/// Adapter crates consume this to build framework-specific routers.
pub struct SiteParts {
  pub config: SiteConfig,
  pub source: Arc<dyn ContentSource>,
  pub registry: Arc<RegistryCache>,
  pub bypass: BypassMatcher,
  pub personalizer: Arc<dyn Personalizer>,
}

impl SiteParts {
  /// Current locale registry: cached, refreshed from the content source once the TTL lapses.
  pub async fn registry(&self) -> Result<Arc<LocaleRegistry>, VitrineError> {
    self.registry.get_or_refresh(|| self.source.fetch_locales()).await
  }
}

pub struct SiteServer {
  config: SiteConfig,
  source: Option<Arc<dyn ContentSource>>,
  registry: Option<LocaleRegistry>,
  personalizer: Option<Arc<dyn Personalizer>>,
}

impl SiteServer {
  pub fn new(config: SiteConfig) -> Self {
    Self { config, source: None, registry: None, personalizer: None }
  }

  pub fn source(mut self, source: Arc<dyn ContentSource>) -> Self {
    self.source = Some(source);
    self
  }

  pub fn content_source(self, source: impl ContentSource + 'static) -> Self {
    self.source(Arc::new(source))
  }

  /// Use a fixed registry instead of asking the content source.
  pub fn registry(mut self, registry: LocaleRegistry) -> Self {
    self.registry = Some(registry);
    self
  }

  pub fn personalizer(mut self, personalizer: impl Personalizer + 'static) -> Self {
    self.personalizer = Some(Arc::new(personalizer));
    self
  }

  /// Consume the builder, returning framework-agnostic parts for an adapter.
  /// Registry precedence: explicit `registry(..)`, then `[i18n] locales`, then the content source.
  pub fn into_parts(self) -> Result<SiteParts, VitrineError> {
    self.config.validate()?;
    let source =
      self.source.ok_or_else(|| VitrineError::config("no content source configured"))?;

    let i18n = &self.config.i18n;
    let static_registry = match self.registry {
      Some(registry) => Some(registry),
      None if !i18n.locales.is_empty() => {
        let default = i18n.default.clone().unwrap_or_else(|| i18n.locales[0].clone());
        Some(LocaleRegistry::new(i18n.locales.clone(), default)?)
      }
      None => None,
    };
    let registry = match static_registry {
      Some(registry) => RegistryCache::fixed(registry),
      None => RegistryCache::new(Duration::from_secs(i18n.registry_ttl_secs)),
    };

    let bypass = BypassMatcher::new(&i18n.bypass)?;
    let personalizer = self.personalizer.unwrap_or_else(|| Arc::new(Baseline));

    Ok(SiteParts {
      config: self.config,
      source,
      registry: Arc::new(registry),
      bypass,
      personalizer,
    })
  }
}
