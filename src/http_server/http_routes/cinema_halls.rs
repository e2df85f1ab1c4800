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
        serializers::CinemaHall,
        state::AppState,
    },
    services::cinema_hall::{CinemaHallInput, CinemaHallPatch, CinemaHallService},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/cinema_halls", get(list).post(create)).route(
        "/cinema_halls/{id}",
        get(retrieve).put(update).patch(partial_update).delete(destroy),
    )
}

async fn list(State(app_state): State<Arc<AppState>>) -> CinemaResult<Json<Vec<CinemaHall>>> {
    let halls = CinemaHallService::new(app_state.db.clone()).list().await?;
    Ok(Json(halls.into_iter().map(CinemaHall::from).collect()))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<CinemaHallInput>,
) -> CinemaResult<(StatusCode, Json<CinemaHall>)> {
    let hall = CinemaHallService::new(app_state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(hall.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<Json<CinemaHall>> {
    let hall = CinemaHallService::new(app_state.db.clone()).get(id).await?;
    Ok(Json(hall.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<CinemaHallInput>,
) -> CinemaResult<Json<CinemaHall>> {
    let hall = CinemaHallService::new(app_state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(hall.into()))
}

async fn partial_update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<CinemaHallPatch>,
) -> CinemaResult<Json<CinemaHall>> {
    let hall = CinemaHallService::new(app_state.db.clone())
        .partial_update(id, patch)
        .await?;
    Ok(Json(hall.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    CinemaHallService::new(app_state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
