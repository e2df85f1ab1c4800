use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};

use crate::{
    entities::user, error::CinemaError, http_server::state::AppState,
    services::user::UserService,
};

/// The user owning the request's `Authorization: Bearer <token>` header.
pub struct CurrentUser(pub user::Model);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = CinemaError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        CinemaError::NotAuthenticated
                    } else {
                        CinemaError::InvalidToken
                    }
                })?;

        let user = UserService::new(state.db.clone())
            .authenticate(bearer.token())
            .await?;
        tracing::debug!("Authenticated request for user {}", user.id);

        Ok(CurrentUser(user))
    }
}
