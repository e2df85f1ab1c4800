use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{OriginalUri, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;

use crate::{
    error::{CinemaError, CinemaResult},
    http_server::{
        auth::CurrentUser,
        extract::{ApiJson, ApiPath, ApiQuery},
        serializers::{Order, OrderDetailResponse, OrderList, Page},
        state::AppState,
    },
    services::{
        order::{OrderInput, OrderService},
        pagination::PageRequest,
    },
};

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    page: Option<String>,
    page_size: Option<String>,
}

impl PageParams {
    /// A page that is not a number is treated as a missing page; an unusable
    /// page size falls back to the default.
    fn page_request(&self, app_state: &AppState) -> CinemaResult<PageRequest> {
        let page = match self.page.as_deref() {
            None | Some("") => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|page| *page > 0)
                    .ok_or(CinemaError::InvalidPage)?,
            ),
        };
        let page_size = self
            .page_size
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|size| *size > 0);

        Ok(PageRequest::new(
            page,
            page_size,
            app_state.order_page_size,
            app_state.max_page_size,
        ))
    }
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/orders", get(list).post(create))
        .route("/orders/{id}", get(retrieve).put(update).delete(destroy))
}

async fn list(
    State(app_state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<PageParams>,
) -> CinemaResult<Json<Page<OrderList>>> {
    let request = params.page_request(&app_state)?;
    let result = OrderService::new(app_state.db.clone())
        .list(user.id, &request)
        .await?;
    Ok(Json(Page::new(result, uri.path())))
}

async fn create(
    State(app_state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<OrderInput>,
) -> CinemaResult<(StatusCode, Json<Order>)> {
    let order = OrderService::new(app_state.db.clone())
        .create(user.id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

async fn retrieve(
    State(app_state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<Json<OrderDetailResponse>> {
    let detail = OrderService::new(app_state.db.clone())
        .get(user.id, id)
        .await?;
    Ok(Json(detail.into()))
}

async fn update(
    State(app_state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(input): ApiJson<OrderInput>,
) -> CinemaResult<Json<Order>> {
    let order = OrderService::new(app_state.db.clone())
        .update(user.id, id, input)
        .await?;
    Ok(Json(order.into()))
}

async fn destroy(
    State(app_state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    ApiPath(id): ApiPath<i64>,
) -> CinemaResult<StatusCode> {
    OrderService::new(app_state.db.clone())
        .delete(user.id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
