/* src/cli/core/src/config.rs */

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use vitrine_server::SiteConfig;
use vitrine_server::config::ContentfulSection;

pub const CONFIG_FILE: &str = "vitrine.toml";

/// Walk upward from `start` until a `vitrine.toml` is found.
pub fn find_vitrine_config(start: &Path) -> Result<PathBuf> {
  let mut dir =
    start.canonicalize().with_context(|| format!("failed to canonicalize {}", start.display()))?;
  loop {
    let candidate = dir.join(CONFIG_FILE);
    if candidate.is_file() {
      return Ok(candidate);
    }
    if !dir.pop() {
      bail!("{CONFIG_FILE} not found (searched upward from {})", start.display());
    }
  }
}

/// Parse a config file. Environment overrides are applied separately.
pub fn load_vitrine_config(path: &Path) -> Result<SiteConfig> {
  let content =
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
  let mut config: SiteConfig =
    toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;

  // Fixture paths are relative to the config file
  if let (Some(fixtures), Some(base)) = (config.fixtures.as_mut(), path.parent()) {
    let resolved = base.join(&fixtures.path);
    fixtures.path = resolved.to_string_lossy().into_owned();
  }
  Ok(config)
}

/// Fold `CTF_*` variables over the file values. `lookup` is `std::env::var` outside tests.
pub fn apply_env_overrides<F>(config: &mut SiteConfig, lookup: F)
where
  F: Fn(&str) -> Option<String>,
{
  let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
  let space = get("CTF_SPACE_ID");
  let delivery = get("CTF_DELIVERY_TOKEN");
  let preview = get("CTF_PREVIEW_TOKEN");
  let environment = get("CTF_ENVIRONMENT");
  if config.contentful.is_none() && space.is_none() && delivery.is_none() {
    return;
  }

  let ctf = config.contentful.get_or_insert_with(ContentfulSection::default);
  if let Some(space) = space {
    ctf.space_id = space;
  }
  if let Some(token) = delivery {
    ctf.delivery_token = token;
  }
  if let Some(token) = preview {
    ctf.preview_token = Some(token);
  }
  if let Some(env) = environment {
    ctf.environment = env;
  }
}

/// Resolve config path (explicit or auto-detected), parse it, apply env overrides, validate.
pub fn resolve_config(explicit: Option<PathBuf>) -> Result<(PathBuf, SiteConfig)> {
  let path = match explicit {
    Some(p) => p,
    None => {
      let cwd = std::env::current_dir().context("failed to get cwd")?;
      find_vitrine_config(&cwd)?
    }
  };
  let mut config = load_vitrine_config(&path)?;
  apply_env_overrides(&mut config, |name| std::env::var(name).ok());
  config.validate().with_context(|| format!("invalid configuration in {}", path.display()))?;
  Ok((path, config))
}
