use chrono::NaiveDateTime;
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "movie_sessions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie_id: i64,
    pub cinema_hall_id: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(
        belongs_to = "super::cinema_hall::Entity",
        from = "Column::CinemaHallId",
        to = "super::cinema_hall::Column::Id",
        on_delete = "Cascade"
    )]
    CinemaHall,
    #[sea_orm(has_many = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::cinema_hall::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CinemaHall.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
