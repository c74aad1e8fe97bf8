//! A small static file server for previewing a built site.
use std::{net::SocketAddr, path::Path};

use axum::Router;
use color_eyre::eyre::{Context, Result, bail};
use log::info;
use tower_http::services::{ServeDir, ServeFile};

/// Serve `dir` on `127.0.0.1:port` until the process is stopped.
///
/// Unknown paths get `404.html` with a 404 status.
///
/// # Errors
///
/// Returns an error if `dir` is missing or the port cannot be bound.
pub fn serve(dir: &Path, port: u16) -> Result<()> {
  if !dir.is_dir() {
    bail!(
      "Nothing to serve: {} does not exist. Run `folio build` first.",
      dir.display()
    );
  }

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .wrap_err("Failed to start async runtime")?;
  runtime.block_on(run(dir, port))
}

async fn run(dir: &Path, port: u16) -> Result<()> {
  let service = ServeDir::new(dir)
    .append_index_html_on_directories(true)
    .not_found_service(ServeFile::new(dir.join("404.html")));
  let app = Router::new().fallback_service(service);

  let addr = SocketAddr::from(([127, 0, 0, 1], port));
  let listener = tokio::net::TcpListener::bind(addr)
    .await
    .wrap_err_with(|| format!("Failed to bind {addr}"))?;

  info!("Serving {} at http://{addr}/", dir.display());
  axum::serve(listener, app).await.wrap_err("Server error")
}
