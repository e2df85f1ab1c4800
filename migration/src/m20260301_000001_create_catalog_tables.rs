use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Genre::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Genre::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Actor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Actor::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Actor::FirstName).string().not_null())
                    .col(ColumnDef::new(Actor::LastName).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CinemaHall::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CinemaHall::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(CinemaHall::Name).string().not_null())
                    .col(ColumnDef::new(CinemaHall::Rows).integer().not_null())
                    .col(ColumnDef::new(CinemaHall::SeatsInRow).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Movie::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Movie::Title).string().not_null())
                    .col(ColumnDef::new(Movie::Description).text().not_null())
                    .col(ColumnDef::new(Movie::Duration).integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MovieGenre::MovieId).integer().not_null())
                    .col(ColumnDef::new(MovieGenre::GenreId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(MovieGenre::MovieId)
                            .col(MovieGenre::GenreId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_movie_id")
                            .from(MovieGenre::Table, MovieGenre::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_genres_genre_id")
                            .from(MovieGenre::Table, MovieGenre::GenreId)
                            .to(Genre::Table, Genre::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieActor::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MovieActor::MovieId).integer().not_null())
                    .col(ColumnDef::new(MovieActor::ActorId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(MovieActor::MovieId)
                            .col(MovieActor::ActorId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actors_movie_id")
                            .from(MovieActor::Table, MovieActor::MovieId)
                            .to(Movie::Table, Movie::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_movie_actors_actor_id")
                            .from(MovieActor::Table, MovieActor::ActorId)
                            .to(Actor::Table, Actor::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_genres_genre_id")
                    .table(MovieGenre::Table)
                    .col(MovieGenre::GenreId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_movie_actors_actor_id")
                    .table(MovieActor::Table)
                    .col(MovieActor::ActorId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MovieActor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MovieGenre::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Movie::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CinemaHall::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Actor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Genre::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Genre {
    #[sea_orm(iden = "genres")]
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Actor {
    #[sea_orm(iden = "actors")]
    Table,
    Id,
    FirstName,
    LastName,
}

#[derive(DeriveIden)]
enum CinemaHall {
    #[sea_orm(iden = "cinema_halls")]
    Table,
    Id,
    Name,
    Rows,
    SeatsInRow,
}

#[derive(DeriveIden)]
enum Movie {
    #[sea_orm(iden = "movies")]
    Table,
    Id,
    Title,
    Description,
    Duration,
}

#[derive(DeriveIden)]
enum MovieGenre {
    #[sea_orm(iden = "movie_genres")]
    Table,
    MovieId,
    GenreId,
}

#[derive(DeriveIden)]
enum MovieActor {
    #[sea_orm(iden = "movie_actors")]
    Table,
    MovieId,
    ActorId,
}
