use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, RwLock};

use crate::config::Config;
use crate::content_store::ContentStore;
use crate::models::{PostSummary, RenderedPost};
use crate::pages::Layout;

pub type RefreshBroadcaster = broadcast::Sender<()>;

pub struct AppState {
    pub config: Config,
    pub store: ContentStore,
    pub layout: RwLock<Layout>,
    pub posts: RwLock<Vec<PostSummary>>,
    // pre-rendered at startup, filled in on demand for slugs added later
    pub rendered: RwLock<HashMap<String, RenderedPost>>,
    // bumped every time `rendered` is replaced wholesale
    generation: AtomicU64,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = ContentStore::new(&config.posts_dir);
        let layout = Layout::new(crate::pages::DEFAULT_LAYOUT, config.is_development);
        AppState {
            config,
            store,
            layout: RwLock::new(layout),
            posts: RwLock::new(Vec::new()),
            rendered: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub async fn replace_rendered(&self, rendered: HashMap<String, RenderedPost>) {
        let mut guard = self.rendered.write().await;
        *guard = rendered;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Keeps a post rendered on demand, unless the content was reloaded since
    /// `generation` was read or another request already stored it.
    pub async fn remember_rendered(&self, generation: u64, slug: String, post: RenderedPost) -> bool {
        let mut rendered = self.rendered.write().await;
        if self.generation() != generation {
            return false;
        }
        rendered.entry(slug).or_insert(post);
        true
    }
}

#[derive(Clone)]
pub struct RouterState {
    pub app_state: Arc<AppState>,
    pub broadcaster: RefreshBroadcaster,
}

impl axum::extract::FromRef<RouterState> for Arc<AppState> {
    fn from_ref(state: &RouterState) -> Self {
        state.app_state.clone()
    }
}

impl axum::extract::FromRef<RouterState> for RefreshBroadcaster {
    fn from_ref(state: &RouterState) -> Self {
        state.broadcaster.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SerializedBody;

    fn post(title: &str) -> RenderedPost {
        RenderedPost {
            title: title.into(),
            content: SerializedBody {
                compiled_source: String::new(),
                frontmatter: serde_json::json!({}),
            },
        }
    }

    #[tokio::test]
    async fn on_demand_render_is_dropped_after_reload() {
        let state = AppState::new(Config::default());
        let before = state.generation();

        state.replace_rendered(HashMap::new()).await;

        assert!(!state.remember_rendered(before, "old".into(), post("Old")).await);
        assert!(state.rendered.read().await.is_empty());
    }

    #[tokio::test]
    async fn on_demand_render_does_not_overwrite() {
        let state = AppState::new(Config::default());
        let generation = state.generation();

        assert!(state.remember_rendered(generation, "a".into(), post("First")).await);
        assert!(state.remember_rendered(generation, "a".into(), post("Second")).await);
        assert_eq!(state.rendered.read().await["a"].title, "First");
    }
}
