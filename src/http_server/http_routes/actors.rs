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
        serializers::Actor,
        state::AppState,
    },
    services::actor::{ActorInput, ActorPatch, ActorService},
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/actors", get(list).post(create)).route(
        "/actors/{id}",
        get(retrieve).put(update).patch(partial_update).delete(destroy),
    )
}

async fn list(State(app_state): State<Arc<AppState>>) -> CinemaResult<Json<Vec<Actor>>> {
    let actors = ActorService::new(app_state.db.clone()).list().await?;
    Ok(Json(actors.into_iter().map(Actor::from).collect()))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    ApiJson(input): ApiJson<ActorInput>,
) -> CinemaResult<(StatusCode, Json<Actor>)> {
    let actor = ActorService::new(app_state.db.clone()).create(input).await?;
    Ok((StatusCode::CREATED, Json(actor.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<Json<Actor>> {
    let actor = ActorService::new(app_state.db.clone()).get(id).await?;
    Ok(Json(actor.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<ActorInput>,
) -> CinemaResult<Json<Actor>> {
    let actor = ActorService::new(app_state.db.clone())
        .update(id, input)
        .await?;
    Ok(Json(actor.into()))
}

async fn partial_update(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ActorPatch>,
) -> CinemaResult<Json<Actor>> {
    let actor = ActorService::new(app_state.db.clone())
        .partial_update(id, patch)
        .await?;
    Ok(Json(actor.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    ActorService::new(app_state.db.clone()).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
