use std::sync::Arc;

use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder, Set};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::actor;
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::validation::{MAX_NAME_LENGTH, check_text};

#[derive(Debug, Clone, Deserialize)]
pub struct ActorInput {
    pub first_name: String,
    pub last_name: String,
}

impl ActorInput {
    fn validate(&self) -> CinemaResult<()> {
        let mut errors = ValidationErrors::new();
        check_text(&mut errors, "first_name", &self.first_name, Some(MAX_NAME_LENGTH));
        check_text(&mut errors, "last_name", &self.last_name, Some(MAX_NAME_LENGTH));
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActorPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ActorPatch {
    fn merge(self, current: actor::Model) -> ActorInput {
        ActorInput {
            first_name: self.first_name.unwrap_or(current.first_name),
            last_name: self.last_name.unwrap_or(current.last_name),
        }
    }
}

pub struct ActorService {
    db: Arc<Database>,
}

impl ActorService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> CinemaResult<Vec<actor::Model>> {
        Ok(actor::Entity::find()
            .order_by_asc(actor::Column::Id)
            .all(&self.db.conn)
            .await?)
    }

    pub async fn get(&self, id: i64) -> CinemaResult<actor::Model> {
        actor::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)
    }

    pub async fn create(&self, input: ActorInput) -> CinemaResult<actor::Model> {
        input.validate()?;

        let model = actor::ActiveModel {
            first_name: Set(input.first_name.trim().to_string()),
            last_name: Set(input.last_name.trim().to_string()),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!("Actor created: '{}' (ID: {})", model.full_name(), model.id);
        Ok(model)
    }

    pub async fn update(&self, id: i64, input: ActorInput) -> CinemaResult<actor::Model> {
        let current = self.get(id).await?;
        input.validate()?;

        let mut active: actor::ActiveModel = current.into();
        active.first_name = Set(input.first_name.trim().to_string());
        active.last_name = Set(input.last_name.trim().to_string());
        let model = active.update(&self.db.conn).await?;

        tracing::info!("Actor updated: '{}' (ID: {})", model.full_name(), model.id);
        Ok(model)
    }

    pub async fn partial_update(&self, id: i64, patch: ActorPatch) -> CinemaResult<actor::Model> {
        let current = self.get(id).await?;
        self.update(id, patch.merge(current)).await
    }

    pub async fn delete(&self, id: i64) -> CinemaResult<()> {
        let actor = self.get(id).await?;
        actor.delete(&self.db.conn).await?;
        tracing::info!("Actor deleted (ID: {})", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_db;

    fn input(first_name: &str, last_name: &str) -> ActorInput {
        ActorInput {
            first_name: first_name.into(),
            last_name: last_name.into(),
        }
    }

    #[tokio::test]
    async fn test_create_actor() {
        let service = ActorService::new(test_db().await);

        let actor = service.create(input("Keanu", "Reeves")).await.unwrap();
        assert_eq!(actor.full_name(), "Keanu Reeves");
        assert_eq!(service.get(actor.id).await.unwrap(), actor);
    }

    #[tokio::test]
    async fn test_blank_names_are_rejected() {
        let service = ActorService::new(test_db().await);

        match service.create(input("", " ")).await {
            Err(CinemaError::Validation(errors)) => {
                assert!(errors.get("first_name").is_some());
                assert!(errors.get("last_name").is_some());
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_partial_update_and_delete() {
        let service = ActorService::new(test_db().await);
        let actor = service.create(input("Keanu", "Reeves")).await.unwrap();

        let patched = service
            .partial_update(
                actor.id,
                ActorPatch {
                    last_name: Some("Charles Reeves".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(patched.first_name, "Keanu");
        assert_eq!(patched.last_name, "Charles Reeves");

        service.delete(actor.id).await.unwrap();
        assert!(matches!(service.get(actor.id).await, Err(CinemaError::NotFound)));
    }
}
