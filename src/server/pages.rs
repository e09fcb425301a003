use std::{io::ErrorKind, path::Path};

use hyper::{Body, Response};
use tracing::{debug, error};

use super::response;

/// Page name without the extension is accepted as well. Anything that could escape the pages
/// directory is rejected.
fn page_file_name(name: &str) -> Option<String> {
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\']) {
        return None;
    }
    if name.ends_with(".html") {
        Some(name.to_string())
    } else {
        Some(format!("{name}.html"))
    }
}

/// Serves an HTML page from `pages_dir`.
pub async fn render_page(pages_dir: &Path, name: &str) -> Response<Body> {
    let Some(file_name) = page_file_name(name) else {
        debug!("Rejected page name {name:?}");
        return response::not_found();
    };

    let path = pages_dir.join(file_name);
    match tokio::fs::read(&path).await {
        Ok(content) => response::html(content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Page {path:?} not found");
            response::not_found()
        }
        Err(e) => {
            error!("Failed to read page {path:?} {e:?}");
            response::internal_error()
        }
    }
}
