use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(User::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(User::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(User::TokenHash).string().not_null().unique_key())
                    .col(ColumnDef::new(User::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieSession::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MovieSession::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MovieSession::ShowTime).date_time().not_null())
                    .col(ColumnDef::new(MovieSession::MovieId).integer().not_null())
                    .col(
                        ColumnDef::new(MovieSession::CinemaHallId)
                            .integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_sessions_movie_id")
                            .from(MovieSession::Table, MovieSession::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_sessions_cinema_hall_id")
                            .from(MovieSession::Table, MovieSession::CinemaHallId)
                            .to(CinemaHall::Table, CinemaHall::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Order::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Order::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Order::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Order::UserId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_orders_user_id")
                            .from(Order::Table, Order::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Ticket::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Ticket::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Ticket::Row).integer().not_null())
                    .col(ColumnDef::new(Ticket::Seat).integer().not_null())
                    .col(ColumnDef::new(Ticket::MovieSessionId).integer().not_null())
                    .col(ColumnDef::new(Ticket::OrderId).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_movie_session_id")
                            .from(Ticket::Table, Ticket::MovieSessionId)
                            .to(MovieSession::Table, MovieSession::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_tickets_order_id")
                            .from(Ticket::Table, Ticket::OrderId)
                            .to(Order::Table, Order::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One ticket per seat per session
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_movie_session_row_seat")
                    .table(Ticket::Table)
                    .col(Ticket::MovieSessionId)
                    .col(Ticket::Row)
                    .col(Ticket::Seat)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tickets_order_id")
                    .table(Ticket::Table)
                    .col(Ticket::OrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_sessions_show_time")
                    .table(MovieSession::Table)
                    .col(MovieSession::ShowTime)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_orders_user_id")
                    .table(Order::Table)
                    .col(Order::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ticket::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Order::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovieSession::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    #[sea_orm(iden = "movies")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CinemaHall {
    #[sea_orm(iden = "cinema_halls")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    TokenHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MovieSession {
    #[sea_orm(iden = "movie_sessions")]
    Table,
    Id,
    ShowTime,
    MovieId,
    CinemaHallId,
}

#[derive(DeriveIden)]
enum Order {
    #[sea_orm(iden = "orders")]
    Table,
    Id,
    CreatedAt,
    UserId,
}

#[derive(DeriveIden)]
enum Ticket {
    #[sea_orm(iden = "tickets")]
    Table,
    Id,
    Row,
    Seat,
    MovieSessionId,
    OrderId,
}
