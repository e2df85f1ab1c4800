use std::sync::Arc;

use axum::Router;

use crate::http_server::state::AppState;

pub mod actors;
pub mod cinema_halls;
pub mod genres;
pub mod movie_sessions;
pub mod movies;
pub mod orders;

/// Every REST resource, relative to the API base path.
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(genres::routes())
        .merge(actors::routes())
        .merge(cinema_halls::routes())
        .merge(movies::routes())
        .merge(movie_sessions::routes())
        .merge(orders::routes())
}
