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
        serializers::{Movie, MovieDetail, MovieList},
        state::AppState,
    },
    services::movie::{MovieFilter, MovieInput, MoviePatch, MovieService},
};

#[derive(Debug, Default, Deserialize)]
struct MovieParams {
    title: Option<String>,
    /// Comma separated genre ids
    genres: Option<String>,
    /// Comma separated actor ids
    actors: Option<String>,
}

impl MovieParams {
    fn filter(&self) -> CinemaResult<MovieFilter> {
        MovieFilter::from_params(
            self.title.as_deref(),
            self.genres.as_deref(),
            self.actors.as_deref(),
        )
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/movies", get(list).post(create)).route(
        "/movies/{id}",
        get(retrieve).put(update).patch(partial_update).delete(destroy),
    )
}

async fn list(
    State(app_state): State<Arc<AppState>>,
    ApiQuery(params): ApiQuery<MovieParams>,
) -> CinemaResult<Json<Vec<MovieList>>> {
    let movies = MovieService::new(app_state.db.clone())
        .list(&params.filter()?)
        .await?;
    Ok(Json(movies.into_iter().map(MovieList::from).collect()))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<MovieInput>,
) -> CinemaResult<(StatusCode, Json<Movie>)> {
    let movie = MovieService::new(app_state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(movie.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<MovieParams>,
) -> CinemaResult<Json<MovieDetail>> {
    let movie = MovieService::new(app_state.db.clone())
        .get_matching(id, &params.filter()?)
        .await?;
    Ok(Json(movie.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<MovieInput>,
) -> CinemaResult<Json<Movie>> {
    let movie = MovieService::new(app_state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(movie.into()))
}

async fn partial_update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<MoviePatch>,
) -> CinemaResult<Json<Movie>> {
    let movie = MovieService::new(app_state.db.clone())
        .partial_update(id, patch)
        .await?;
    Ok(Json(movie.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    MovieService::new(app_state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
