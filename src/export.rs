use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::content_store::ContentStore;
use crate::error::ContentError;
use crate::pages::{render_list_page, render_post_page, Layout};

async fn write_page(path: PathBuf, html: String) -> Result<(), ContentError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ContentError::io(parent, e))?;
    }
    fs::write(&path, html)
        .await
        .map_err(|e| ContentError::io(&path, e))
}

/// Writes the listing page and one page per enumerated post under `out_dir`.
/// Returns the slugs that were written.
pub async fn export_site(
    store: &ContentStore,
    layout: &Layout,
    out_dir: &Path,
) -> Result<Vec<String>, ContentError> {
    let posts = store.read_posts_info().await?;
    let blogs_dir = out_dir.join("blogs");
    write_page(blogs_dir.join("index.html"), render_list_page(layout, &posts)).await?;

    let mut written = Vec::new();
    for slug in store.static_paths().await?.slugs {
        match store.resolve_post(&slug).await {
            Ok(post) => {
                let page = render_post_page(layout, &post);
                write_page(blogs_dir.join(&slug).join("index.html"), page).await?;
                written.push(slug);
            }
            Err(e) => warn!("Not exporting '{}': {}", slug, e),
        }
    }

    info!("Exported {} posts to {}", written.len(), out_dir.display());
    Ok(written)
}
