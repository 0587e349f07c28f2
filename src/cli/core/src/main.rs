/* src/cli/core/src/main.rs */

mod config;
mod run;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use config::resolve_config;

#[derive(Parser)]
#[command(name = "vitrine", about = "Vitrine CLI", version)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the site over HTTP
  Serve {
    /// Path to vitrine.toml (auto-detected if omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override `[server] port`
    #[arg(short, long)]
    port: Option<u16>,
    /// Serve entries from a fixtures JSON file instead of the CMS
    #[arg(long)]
    fixtures: Option<PathBuf>,
  },
  /// List the locale registry
  Locales {
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
  /// List every slug of a content type
  Slugs {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Content type id
    #[arg(default_value = "landingPage")]
    content_type: String,
  },
  /// Dry-run the locale routing decision for a path
  Route {
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Request path, e.g. /about or /de/about
    path: String,
    /// Accept-Language header value
    #[arg(short = 'l', long)]
    accept_language: Option<String>,
    /// Cookie header value
    #[arg(long)]
    cookie: Option<String>,
  },
}

fn setup_tracing() {
  use tracing_subscriber::EnvFilter;

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vitrine=info"));
  tracing_subscriber::fmt().with_env_filter(filter).with_target(true).init();
}

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  setup_tracing();

  match cli.command {
    Command::Serve { config, port, fixtures } => {
      let (path, mut site) = resolve_config(config)?;
      if let Some(port) = port {
        site.server.port = port;
      }
      if let Some(fixtures) = fixtures {
        site.fixtures =
          Some(vitrine_server::config::FixturesSection { path: fixtures.to_string_lossy().into_owned() });
      }
      ui::banner("serve");
      ui::arrow(&format!("config {}", path.display()));
      run::serve(site).await?;
    }
    Command::Locales { config } => {
      let (_, site) = resolve_config(config)?;
      run::locales(site).await?;
    }
    Command::Slugs { config, content_type } => {
      let (_, site) = resolve_config(config)?;
      run::slugs(&site, &content_type).await?;
    }
    Command::Route { config, path, accept_language, cookie } => {
      let (_, site) = resolve_config(config)?;
      run::route(site, &path, accept_language.as_deref(), cookie.as_deref()).await?;
    }
  }
  Ok(())
}
