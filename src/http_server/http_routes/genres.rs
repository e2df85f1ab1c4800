use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};

use crate::{
    error::CinemaResult,
    http_server::{
        extract::{ApiJson, ApiPath},
        serializers::Genre,
        state::AppState,
    },
    services::genre::{GenreInput, GenrePatch, GenreService},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/genres", get(list).post(create)).route(
        "/genres/{id}",
        get(retrieve).put(update).patch(partial_update).delete(destroy),
    )
}

async fn list(State(app_state): State<Arc<AppState>>) -> CinemaResult<Json<Vec<Genre>>> {
    let genres = GenreService::new(app_state.db.clone()).list().await?;
    Ok(Json(genres.into_iter().map(Genre::from).collect()))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<GenreInput>,
) -> CinemaResult<(StatusCode, Json<Genre>)> {
    let genre = GenreService::new(app_state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(genre.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<Json<Genre>> {
    let genre = GenreService::new(app_state.db.clone()).get(id).await?;
    Ok(Json(genre.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<GenreInput>,
) -> CinemaResult<Json<Genre>> {
    let genre = GenreService::new(app_state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(genre.into()))
}

async fn partial_update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<GenrePatch>,
) -> CinemaResult<Json<Genre>> {
    let genre = GenreService::new(app_state.db.clone())
        .partial_update(id, patch)
        .await?;
    Ok(Json(genre.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    GenreService::new(app_state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
