use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Router,
};
use tower_http::services::ServeDir;
use tracing::{debug, info, warn};

use crate::hot_reload::ws_handler;
use crate::pages::{render_list_page, render_not_found_page, render_post_page};
use crate::state::{AppState, RouterState};

pub fn build_router(router_state: RouterState) -> Router {
    let static_dir = get_service(ServeDir::new(router_state.app_state.config.static_dir()));

    Router::new()
        .route("/", get(|| async { Redirect::permanent("/blogs") }))
        .route("/blogs", get(list_posts))
        .route("/blogs/{slug}", get(show_post))
        .nest_service("/static", static_dir)
        .route("/ws", get(ws_handler))
        .with_state(router_state)
}

async fn list_posts(State(state): State<Arc<AppState>>) -> Html<String> {
    let layout = state.layout.read().await;
    let posts = state.posts.read().await;
    Html(render_list_page(&layout, &posts))
}

async fn show_post(Path(slug): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    if let Some(post) = state.rendered.read().await.get(&slug) {
        let layout = state.layout.read().await;
        return Html(render_post_page(&layout, post)).into_response();
    }

    // Blocking fallback: resolve a post that was not pre-rendered.
    let generation = state.generation();
    match state.store.resolve_post(&slug).await {
        Ok(post) => {
            info!("Rendered '{}' on demand", slug);
            let page = render_post_page(&*state.layout.read().await, &post);
            if !state.remember_rendered(generation, slug.clone(), post).await {
                debug!("Content reloaded while rendering '{}', not keeping it", slug);
            }
            Html(page).into_response()
        }
        Err(e) => {
            if e.is_not_found() {
                debug!("{}", e);
            } else {
                warn!("Serving 404 for '{}': {}", slug, e);
            }
            let page = render_not_found_page(&*state.layout.read().await, &slug);
            (StatusCode::NOT_FOUND, Html(page)).into_response()
        }
    }
}
