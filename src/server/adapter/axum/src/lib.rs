/* src/server/adapter/axum/src/lib.rs */

mod error;
mod handler;
mod middleware;

use vitrine_server::{SiteParts, SiteServer, VitrineError};

/// Re-export vitrine-server core for convenience
pub use vitrine_server;

/// Extension trait that converts a `SiteServer` (or its parts) into an Axum router.
pub trait IntoAxumRouter: Sized + Send {
  fn into_axum_router(self) -> Result<axum::Router, VitrineError>;

  fn serve(
    self,
    addr: &str,
  ) -> impl std::future::Future<Output = Result<(), Box<dyn std::error::Error>>> + Send {
    async move {
      let router = self.into_axum_router()?;
      let listener = tokio::net::TcpListener::bind(addr).await?;
      let local_addr = listener.local_addr()?;
      tracing::info!(addr = %local_addr, "vitrine listening on http://localhost:{}", local_addr.port());
      axum::serve(listener, router).await?;
      Ok(())
    }
  }
}

impl IntoAxumRouter for SiteServer {
  fn into_axum_router(self) -> Result<axum::Router, VitrineError> {
    self.into_parts()?.into_axum_router()
  }
}

impl IntoAxumRouter for SiteParts {
  fn into_axum_router(self) -> Result<axum::Router, VitrineError> {
    Ok(handler::build_router(self))
  }
}

#[cfg(test)]
mod tests;
