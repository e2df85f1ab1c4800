use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::genre;
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::validation::{MAX_NAME_LENGTH, check_text};

const NAME_TAKEN: &str = "genre with this name already exists.";

#[derive(Debug, Clone, Deserialize)]
pub struct GenreInput {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenrePatch {
    pub name: Option<String>,
}

impl GenrePatch {
    fn merge(self, current: genre::Model) -> GenreInput {
        GenreInput {
            name: self.name.unwrap_or(current.name),
        }
    }
}

pub struct GenreService {
    db: Arc<Database>,
}

impl GenreService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CinemaResult<Vec<genre::Model>> {
        Ok(genre::Entity::find()
            .order_by_asc(genre::Column::Id)
            .all(&self.db.conn)
            .await?)
    }

    pub async fn get(&self, id: i64) -> CinemaResult<genre::Model> {
        genre::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)
    }

    pub async fn create(&self, input: GenreInput) -> CinemaResult<genre::Model> {
        validate(&self.db.conn, &input, None).await?;

        let model = insert_genre(&self.db.conn, input.name.trim()).await?;

        tracing::info!("Genre created: '{}' (ID: {})", model.name, model.id);
        Ok(model)
    }

    pub async fn update(&self, id: i64, input: GenreInput) -> CinemaResult<genre::Model> {
        let current = self.get(id).await?;
        validate(&self.db.conn, &input, Some(id)).await?;

        let mut active: genre::ActiveModel = current.into();
        active.name = Set(input.name.trim().to_string());
        let model = active.update(&self.db.conn).await.map_err(name_conflict)?;

        tracing::info!("Genre updated: '{}' (ID: {})", model.name, model.id);
        Ok(model)
    }

    pub async fn partial_update(&self, id: i64, patch: GenrePatch) -> CinemaResult<genre::Model> {
        let current = self.get(id).await?;
        self.update(id, patch.merge(current)).await
    }

    pub async fn delete(&self, id: i64) -> CinemaResult<()> {
        let genre = self.get(id).await?;
        genre.delete(&self.db.conn).await?;
        tracing::info!("Genre deleted (ID: {})", id);
        Ok(())
    }
}

async fn insert_genre<C>(conn: &C, name: &str) -> CinemaResult<genre::Model>
where
    C: ConnectionTrait,
{
    genre::ActiveModel {
        name: Set(name.to_string()),
        ..Default::default()
    }
    .insert(conn)
    .await
    .map_err(name_conflict)
}

/// A concurrent insert of the same name can slip past `validate`; the unique
/// key on `genres.name` reports it as the same validation error.
fn name_conflict(err: DbErr) -> CinemaError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            CinemaError::validation("name", NAME_TAKEN)
        }
        _ => CinemaError::Database(err),
    }
}

async fn validate<C>(conn: &C, input: &GenreInput, current_id: Option<i64>) -> CinemaResult<()>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();
    check_text(&mut errors, "name", &input.name, Some(MAX_NAME_LENGTH));

    if errors.is_empty() {
        let mut query = genre::Entity::find().filter(genre::Column::Name.eq(input.name.trim()));
        if let Some(id) = current_id {
            query = query.filter(genre::Column::Id.ne(id));
        }
        if query.one(conn).await?.is_some() {
            errors.add("name", NAME_TAKEN);
        }
    }

    errors.into_result()
}
