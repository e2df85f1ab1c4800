use std::sync::Arc;

use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::cinema_hall;
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::validation::{MAX_NAME_LENGTH, check_positive, check_text};

#[derive(Debug, Clone, Deserialize)]
pub struct CinemaHallInput {
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
}

impl CinemaHallInput {
    fn validate(&self) -> CinemaResult<()> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "name", &self.name, Some(MAX_NAME_LENGTH));
        check_positive(&mut errors, "rows", self.rows);
        check_positive(&mut errors, "seats_in_row", self.seats_in_row);
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CinemaHallPatch {
    pub name: Option<String>,
    pub rows: Option<i32>,
    pub seats_in_row: Option<i32>,
}

impl CinemaHallPatch {
    fn merge(self, current: cinema_hall::Model) -> CinemaHallInput {
        CinemaHallInput {
            name: self.name.unwrap_or(current.name),
            rows: self.rows.unwrap_or(current.rows),
            seats_in_row: self.seats_in_row.unwrap_or(current.seats_in_row),
        }
    }
}

pub struct CinemaHallService {
    db: Arc<Database>,
}

impl CinemaHallService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CinemaResult<Vec<cinema_hall::Model>> {
        Ok(cinema_hall::Entity::find()
            .order_by_asc(cinema_hall::Column::Id)
            .all(&self.db.conn)
            .await?)
    }

    pub async fn get(&self, id: i64) -> CinemaResult<cinema_hall::Model> {
        cinema_hall::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)
    }

    pub async fn create(&self, input: CinemaHallInput) -> CinemaResult<cinema_hall::Model> {
        input.validate()?;

        let model = cinema_hall::ActiveModel {
            name: Set(input.name.trim().to_string()),
            rows: Set(input.rows),
            seats_in_row: Set(input.seats_in_row),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!(
            "Cinema hall created: '{}' (ID: {}, capacity: {})",
            model.name,
            model.id,
            model.capacity()
        );
        Ok(model)
    }

    pub async fn update(&self, id: i64, input: CinemaHallInput) -> CinemaResult<cinema_hall::Model> {
        let current = self.get(id).await?;
        input.validate()?;

        let mut active: cinema_hall::ActiveModel = current.into();
        active.name = Set(input.name.trim().to_string());
        active.rows = Set(input.rows);
        active.seats_in_row = Set(input.seats_in_row);
        let model = active.update(&self.db.conn).await?;

        tracing::info!("Cinema hall updated: '{}' (ID: {})", model.name, model.id);
        Ok(model)
    }

    pub async fn partial_update(
        &self,
        id: i64,
        patch: CinemaHallPatch,
    ) -> CinemaResult<cinema_hall::Model> {
        let current = self.get(id).await?;
        self.update(id, patch.merge(current)).await
    }

    pub async fn delete(&self, id: i64) -> CinemaResult<()> {
        let hall = self.get(id).await?;
        hall.delete(&self.db.conn).await?;
        tracing::info!("Cinema hall deleted (ID: {})", id);
        Ok(())
    }
}
