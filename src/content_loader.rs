use std::collections::HashMap;
use std::io::ErrorKind;

use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::content_store::ContentStore;
use crate::error::ContentError;
use crate::models::{PostSummary, RenderedPost};
use crate::pages::{Layout, DEFAULT_LAYOUT};
use crate::state::AppState;

pub struct LoadedContent {
    pub layout: Layout,
    pub posts: Vec<PostSummary>,
    pub rendered: HashMap<String, RenderedPost>,
}

pub async fn load_layout(config: &Config) -> Result<Layout, ContentError> {
    let path = config.layout_path();
    let template = match fs::read_to_string(&path).await {
        Ok(template) => template,
        Err(e) if e.kind() == ErrorKind::NotFound => DEFAULT_LAYOUT.to_string(),
        Err(e) => return Err(ContentError::io(path, e)),
    };
    Ok(Layout::new(template, config.is_development))
}

/// Renders every enumerated post. Posts that fail to resolve are left for
/// the request-time fallback, which will answer them with a 404.
pub async fn prerender(store: &ContentStore) -> Result<HashMap<String, RenderedPost>, ContentError> {
    let paths = store.static_paths().await?;
    debug!("Pre-rendering {} posts, fallback {:?}", paths.slugs.len(), paths.fallback);
    let mut rendered = HashMap::with_capacity(paths.slugs.len());

    for slug in paths.slugs {
        match store.resolve_post(&slug).await {
            Ok(post) => {
                rendered.insert(slug, post);
            }
            Err(e) => warn!("Skipping pre-render of '{}': {}", slug, e),
        }
    }
    Ok(rendered)
}

pub async fn load_content(config: &Config, store: &ContentStore) -> Result<LoadedContent, ContentError> {
    let layout = load_layout(config).await?;
    let posts = store.read_posts_info().await?;
    let rendered = prerender(store).await?;
    info!("Loaded {} posts, pre-rendered {}", posts.len(), rendered.len());

    Ok(LoadedContent {
        layout,
        posts,
        rendered,
    })
}

pub async fn install_content(app_state: &AppState, content: LoadedContent) {
    *app_state.layout.write().await = content.layout;
    *app_state.posts.write().await = content.posts;
    app_state.replace_rendered(content.rendered).await;
}

/// Rebuilds everything from disk. On failure the previous content stays in place.
pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.config, &app_state.store).await {
        Ok(content) => {
            install_content(app_state, content).await;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use tempfile::TempDir;

    use super::*;

    fn config_for(dir: &Path) -> Config {
        Config {
            content_dir: dir.to_path_buf(),
            posts_dir: dir.join("posts"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn loads_index_and_prerenders_posts() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("posts")).unwrap();
        std::fs::write(
            dir.path().join("posts/hello-world.md"),
            "---\nslug: hello-world\ntitle: Hello World\n---\n# Hi\n",
        )
        .unwrap();
        let config = config_for(dir.path());
        let store = ContentStore::new(&config.posts_dir);

        let content = load_content(&config, &store).await.unwrap();
        assert_eq!(content.posts.len(), 1);
        assert_eq!(content.rendered["hello-world"].title, "Hello World");
        assert!(content.layout.render("t", "c").contains("<title>t</title>"));
    }

    #[tokio::test]
    async fn custom_layout_is_used() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("layout.html"), "<main>{{ content }}</main>").unwrap();

        let layout = load_layout(&config_for(dir.path())).await.unwrap();
        assert_eq!(layout.render("ignored", "x"), "<main>x</main>");
    }

    #[tokio::test]
    async fn failed_reload_keeps_previous_content() {
        let dir = TempDir::new().unwrap();
        let posts = dir.path().join("posts");
        std::fs::create_dir(&posts).unwrap();
        std::fs::write(posts.join("a.md"), "---\nslug: a\ntitle: A\n---\nbody").unwrap();

        let state = AppState::new(config_for(dir.path()));
        reload_content(&state).await;
        assert_eq!(state.posts.read().await.len(), 1);

        std::fs::write(posts.join("b.md"), "---\nslug: a\ntitle: Duplicate\n---\nbody").unwrap();
        reload_content(&state).await;
        assert_eq!(state.posts.read().await.len(), 1);
        assert_eq!(state.rendered.read().await["a"].title, "A");
    }
}
