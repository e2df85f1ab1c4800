use std::sync::Arc;

use base64::Engine;
use rand::RngCore;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};

use crate::database::Database;
use crate::entities::user;
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::validation::check_text;

pub const MAX_USERNAME_LENGTH: usize = 150;

/// Hex encoded SHA-256 digest of an API token.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// 256 random bits, base64url encoded (43 characters).
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Register a user and return it together with its freshly generated token.
    /// Only the hash of the token is persisted, so this is the only chance to see it.
    pub async fn create(&self, username: &str) -> CinemaResult<(user::Model, String)> {
        let username = username.trim();

        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "username", username, Some(MAX_USERNAME_LENGTH));
        errors.into_result()?;

        let existing = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db.conn)
            .await?;
        if existing.is_some() {
            return Err(CinemaError::validation(
                "username",
                "A user with that username already exists.",
            ));
        }

        let token = generate_token();
        let user = user::ActiveModel {
            username: Set(username.to_string()),
            token_hash: Set(hash_token(&token)),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!("User created (ID: {}, username: {})", user.id, user.username);
        Ok((user, token))
    }

    /// Resolve the owner of a bearer token.
    pub async fn authenticate(&self, token: &str) -> CinemaResult<user::Model> {
        user::Entity::find()
            .filter(user::Column::TokenHash.eq(hash_token(token)))
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::InvalidToken)
    }
}
