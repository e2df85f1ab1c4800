use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crate::{
    error::CinemaResult,
    http_server::{
        extract::{ApiJson, ApiPath, ApiQuery},
        serializers::{MovieSession, MovieSessionDetailResponse, MovieSessionList},
        state::AppState,
    },
    services::movie_session::{
        MovieSessionFilter, MovieSessionInput, MovieSessionPatch, MovieSessionService,
    },
};

#[derive(Debug, Default, Deserialize)]
struct MovieSessionParams {
    movie: Option<String>,
    /// YYYY-MM-DD
    date: Option<String>,
}

impl MovieSessionParams {
    fn filter(&self) -> CinemaResult<MovieSessionFilter> {
        MovieSessionFilter::from_params(self.movie.as_deref(), self.date.as_deref())
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movie_sessions", get(list).post(create))
        .route(
            "/movie_sessions/{id}",
            get(retrieve).put(update).patch(partial_update).delete(destroy),
        )
}

async fn list(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<MovieSessionParams>,
) -> CinemaResult<Json<Vec<MovieSessionList>>> {
    let sessions = MovieSessionService::new(app_state.db.clone())
        .list(&params.filter()?)
        .await?;
    Ok(Json(
        sessions.into_iter().map(MovieSessionList::from).collect(),
    ))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<MovieSessionInput>,
) -> CinemaResult<(StatusCode, Json<MovieSession>)> {
    let session = MovieSessionService::new(app_state.db.clone())
        .create(input)
        .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<MovieSessionParams>,
) -> CinemaResult<Json<MovieSessionDetailResponse>> {
    let detail = MovieSessionService::new(app_state.db.clone())
        .get_matching(id, &params.filter()?)
        .await?;
    Ok(Json(detail.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<MovieSessionInput>,
) -> CinemaResult<Json<MovieSession>> {
    let session = MovieSessionService::new(app_state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(session.into()))
}

async fn partial_update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<MovieSessionPatch>,
) -> CinemaResult<Json<MovieSession>> {
    let session = MovieSessionService::new(app_state.db.clone())
        .partial_update(id, patch)
        .await?;
    Ok(Json(session.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    MovieSessionService::new(app_state.db.clone())
        .delete(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
