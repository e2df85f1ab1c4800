use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, LoaderTrait,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use sea_orm::sea_query::{Expr, ExprTrait, LikeExpr};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::{actor, genre, movie, movie_actor, movie_genre};
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::validation::{
    MAX_NAME_LENGTH, check_ids_exist, check_positive, check_text, parse_id_list, unique_ids,
};

/// A movie together with its genres and actors, both ordered by id.
#[derive(Debug, Clone, PartialEq)]
pub struct MovieWithRelations {
    pub movie: movie::Model,
    pub genres: Vec<genre::Model>,
    pub actors: Vec<actor::Model>,
}

/// Query parameters accepted by the movie list.
///
/// Filters combine with AND; the ids inside `genres` or `actors` combine with OR.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl MovieFilter {
    /// Build a filter from raw query parameters. Empty parameters are ignored.
    pub fn from_params(
        title: Option<&str>,
        genres: Option<&str>,
        actors: Option<&str>,
    ) -> CinemaResult<Self> {
        fn non_empty(value: Option<&str>) -> Option<&str> {
            value.filter(|v| !v.is_empty())
        }

        Ok(Self {
            title: non_empty(title).map(str::to_string),
            genres: non_empty(genres).map(parse_id_list).transpose()?,
            actors: non_empty(actors).map(parse_id_list).transpose()?,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieInput {
    pub title: String,
    pub description: String,
    pub duration: i32,
    #[serde(default)]
    pub genres: Vec<i64>,
    #[serde(default)]
    pub actors: Vec<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub duration: Option<i32>,
    pub genres: Option<Vec<i64>>,
    pub actors: Option<Vec<i64>>,
}

impl MoviePatch {
    fn merge(self, current: MovieWithRelations) -> MovieInput {
        MovieInput {
            title: self.title.unwrap_or(current.movie.title),
            description: self.description.unwrap_or(current.movie.description),
            duration: self.duration.unwrap_or(current.movie.duration),
            genres: self
                .genres
                .unwrap_or_else(|| current.genres.iter().map(|g| g.id).collect()),
            actors: self
                .actors
                .unwrap_or_else(|| current.actors.iter().map(|a| a.id).collect()),
        }
    }
}

pub struct MovieService {
    db: Arc<Database>,
}

impl MovieService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: &MovieFilter) -> CinemaResult<Vec<MovieWithRelations>> {
        let mut query = movie::Entity::find();

        if let Some(title) = &filter.title {
            tracing::debug!("Filtering movies by title containing '{}'", title);
            let pattern = format!("%{}%", escape_like(title));
            query = query.filter(
                Expr::col((movie::Entity, movie::Column::Title))
                    .like(LikeExpr::new(pattern).escape('\\')),
            );
        }

        if let Some(genres) = &filter.genres {
            tracing::debug!("Filtering movies by genres {:?}", genres);
            query = query
                .join(JoinType::InnerJoin, movie::Relation::MovieGenre.def())
                .filter(movie_genre::Column::GenreId.is_in(genres.iter().copied()));
        }

        if let Some(actors) = &filter.actors {
            tracing::debug!("Filtering movies by actors {:?}", actors);
            query = query
                .join(JoinType::InnerJoin, movie::Relation::MovieActor.def())
                .filter(movie_actor::Column::ActorId.is_in(actors.iter().copied()));
        }

        // A movie matching several of the requested genres/actors joins to several rows
        let movies = query
            .distinct()
            .order_by_asc(movie::Column::Id)
            .all(&self.db.conn)
            .await?;

        hydrate_movies(&self.db.conn, movies).await
    }

    pub async fn get(&self, id: i64) -> CinemaResult<MovieWithRelations> {
        get_movie(&self.db.conn, id).await
    }

    /// Retrieve a movie, treating it as missing when it does not pass `filter`.
    pub async fn get_matching(
        &self,
        id: i64,
        filter: &MovieFilter,
    ) -> CinemaResult<MovieWithRelations> {
        if *filter == MovieFilter::default() {
            return self.get(id).await;
        }

        self.list(filter)
            .await?
            .into_iter()
            .find(|m| m.movie.id == id)
            .ok_or(CinemaError::NotFound)
    }

    pub async fn create(&self, input: MovieInput) -> CinemaResult<MovieWithRelations> {
        validate(&self.db.conn, &input).await?;

        let txn = self.db.conn.begin().await?;

        let model = movie::ActiveModel {
            title: Set(input.title.trim().to_string()),
            description: Set(input.description),
            duration: Set(input.duration),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        replace_relations(&txn, model.id, &input.genres, &input.actors).await?;

        txn.commit().await?;

        tracing::info!("Movie created: '{}' (ID: {})", model.title, model.id);
        self.get(model.id).await
    }

    pub async fn update(&self, id: i64, input: MovieInput) -> CinemaResult<MovieWithRelations> {
        let current = get_movie(&self.db.conn, id).await?;
        validate(&self.db.conn, &input).await?;

        let txn = self.db.conn.begin().await?;

        let mut active: movie::ActiveModel = current.movie.into();
        active.title = Set(input.title.trim().to_string());
        active.description = Set(input.description);
        active.duration = Set(input.duration);
        let model = active.update(&txn).await?;
        replace_relations(&txn, model.id, &input.genres, &input.actors).await?;

        txn.commit().await?;

        tracing::info!("Movie updated: '{}' (ID: {})", model.title, model.id);
        self.get(model.id).await
    }

    pub async fn partial_update(&self, id: i64, patch: MoviePatch) -> CinemaResult<MovieWithRelations> {
        let current = self.get(id).await?;
        self.update(id, patch.merge(current)).await
    }

    pub async fn delete(&self, id: i64) -> CinemaResult<()> {
        let movie = movie::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)?;
        movie.delete(&self.db.conn).await?;
        tracing::info!("Movie deleted (ID: {})", id);
        Ok(())
    }
}

/// Escape LIKE metacharacters so user input only ever matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

pub(crate) async fn get_movie<C>(conn: &C, id: i64) -> CinemaResult<MovieWithRelations>
where
    C: ConnectionTrait,
{
    let movie = movie::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(CinemaError::NotFound)?;

    hydrate_movies(conn, vec![movie])
        .await?
        .pop()
        .ok_or(CinemaError::NotFound)
}

/// Eagerly load genres and actors for a batch of movies: two queries per relation,
/// independent of the number of movies.
pub(crate) async fn hydrate_movies<C>(
    conn: &C,
    movies: Vec<movie::Model>,
) -> CinemaResult<Vec<MovieWithRelations>>
where
    C: ConnectionTrait,
{
    let genres = movies
        .load_many_to_many(genre::Entity, movie_genre::Entity, conn)
        .await?;
    let actors = movies
        .load_many_to_many(actor::Entity, movie_actor::Entity, conn)
        .await?;

    Ok(movies
        .into_iter()
        .zip(genres)
        .zip(actors)
        .map(|((movie, mut genres), mut actors)| {
            genres.sort_by_key(|g| g.id);
            actors.sort_by_key(|a| a.id);
            MovieWithRelations {
                movie,
                genres,
                actors,
            }
        })
        .collect())
}

async fn validate<C>(conn: &C, input: &MovieInput) -> CinemaResult<()>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();
    check_text(&mut errors, "title", &input.title, Some(MAX_NAME_LENGTH));
    check_text(&mut errors, "description", &input.description, None);
    check_positive(&mut errors, "duration", input.duration);
    check_ids_exist::<genre::Entity, _>(
        conn,
        &mut errors,
        "genres",
        genre::Column::Id,
        &unique_ids(&input.genres),
    )
    .await?;
    check_ids_exist::<actor::Entity, _>(
        conn,
        &mut errors,
        "actors",
        actor::Column::Id,
        &unique_ids(&input.actors),
    )
    .await?;
    errors.into_result()
}

async fn replace_relations<C>(
    conn: &C,
    movie_id: i64,
    genres: &[i64],
    actors: &[i64],
) -> CinemaResult<()>
where
    C: ConnectionTrait,
{
    movie_genre::Entity::delete_many()
        .filter(movie_genre::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;
    movie_actor::Entity::delete_many()
        .filter(movie_actor::Column::MovieId.eq(movie_id))
        .exec(conn)
        .await?;

    let genres = unique_ids(genres);
    if !genres.is_empty() {
        movie_genre::Entity::insert_many(genres.into_iter().map(|genre_id| {
            movie_genre::ActiveModel {
                movie_id: Set(movie_id),
                genre_id: Set(genre_id),
            }
        }))
        .exec(conn)
        .await?;
    }

    let actors = unique_ids(actors);
    if !actors.is_empty() {
        movie_actor::Entity::insert_many(actors.into_iter().map(|actor_id| {
            movie_actor::ActiveModel {
                movie_id: Set(movie_id),
                actor_id: Set(actor_id),
            }
        }))
        .exec(conn)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::actor::{ActorInput, ActorService};
    use crate::services::genre::{GenreInput, GenreService};
    use crate::test_utils::test_db;

    struct Fixture {
        service: MovieService,
        genres: Vec<i64>,
        actors: Vec<i64>,
    }

    async fn fixture() -> Fixture {
        let db = test_db().await;
        let genre_service = GenreService::new(db.clone());
        let actor_service = ActorService::new(db.clone());

        let mut genres = Vec::new();
        for name in ["Drama", "Action", "Comedy"] {
            let genre = genre_service
                .create(GenreInput { name: name.into() })
                .await
                .unwrap();
            genres.push(genre.id);
        }

        let mut actors = Vec::new();
        for (first_name, last_name) in [("Keanu", "Reeves"), ("Tom", "Hanks")] {
            let actor = actor_service
                .create(ActorInput {
                    first_name: first_name.into(),
                    last_name: last_name.into(),
                })
                .await
                .unwrap();
            actors.push(actor.id);
        }

        Fixture {
            service: MovieService::new(db),
            genres,
            actors,
        }
    }

    fn movie_input(title: &str, genres: Vec<i64>, actors: Vec<i64>) -> MovieInput {
        MovieInput {
            title: title.into(),
            description: format!("About {title}"),
            duration: 120,
            genres,
            actors,
        }
    }

    #[test]
    fn test_filter_from_params() {
        let filter = MovieFilter::from_params(Some("war"), Some("1,2"), None).unwrap();
        assert_eq!(filter.title.as_deref(), Some("war"));
        assert_eq!(filter.genres, Some(vec![1, 2]));
        assert_eq!(filter.actors, None);

        let filter = MovieFilter::from_params(Some(""), Some(""), Some("")).unwrap();
        assert_eq!(filter, MovieFilter::default());

        assert!(matches!(
            MovieFilter::from_params(None, Some("x"), None),
            Err(CinemaError::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_create_movie_with_relations() {
        let f = fixture().await;

        let created = f
            .service
            .create(movie_input(
                "The Matrix",
                vec![f.genres[1], f.genres[0], f.genres[1]],
                vec![f.actors[0]],
            ))
            .await
            .unwrap();

        assert_eq!(created.movie.title, "The Matrix");
        let genre_ids: Vec<_> = created.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![f.genres[0], f.genres[1]]);
        assert_eq!(created.actors.len(), 1);
        assert_eq!(created.actors[0].full_name(), "Keanu Reeves");
    }

    #[tokio::test]
    async fn test_create_with_unknown_genre_is_rejected() {
        let f = fixture().await;

        let result = f
            .service
            .create(movie_input("Ghost", vec![f.genres[0], 999], vec![]))
            .await;

        match result {
            Err(CinemaError::Validation(errors)) => assert_eq!(
                errors.get("genres"),
                Some(&["Invalid pk \"999\" - object does not exist.".to_string()][..])
            ),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(f.service.list(&MovieFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_filter_by_genres_and_title_without_duplicates() {
        let f = fixture().await;
        let (drama, action, comedy) = (f.genres[0], f.genres[1], f.genres[2]);

        let war_games = f
            .service
            .create(movie_input("War Games", vec![drama, action], vec![]))
            .await
            .unwrap();
        let star_wars = f
            .service
            .create(movie_input("Star WARS", vec![action], vec![]))
            .await
            .unwrap();
        f.service
            .create(movie_input("War Comedy", vec![comedy], vec![]))
            .await
            .unwrap();
        f.service
            .create(movie_input("Heat", vec![drama], vec![]))
            .await
            .unwrap();

        let filter = MovieFilter::from_params(
            Some("war"),
            Some(&format!("{drama},{action}")),
            None,
        )
        .unwrap();
        let movies = f.service.list(&filter).await.unwrap();

        let ids: Vec<_> = movies.iter().map(|m| m.movie.id).collect();
        assert_eq!(ids, vec![war_games.movie.id, star_wars.movie.id]);
    }

    #[tokio::test]
    async fn test_filter_by_genres_and_actors_is_conjunctive() {
        let f = fixture().await;
        let (drama, action) = (f.genres[0], f.genres[1]);
        let (keanu, tom) = (f.actors[0], f.actors[1]);

        let matrix = f
            .service
            .create(movie_input("The Matrix", vec![action], vec![keanu]))
            .await
            .unwrap();
        f.service
            .create(movie_input("Forrest Gump", vec![drama], vec![tom]))
            .await
            .unwrap();
        f.service
            .create(movie_input("Cast Away", vec![action, drama], vec![tom]))
            .await
            .unwrap();

        let filter = MovieFilter {
            genres: Some(vec![drama, action]),
            actors: Some(vec![keanu]),
            ..Default::default()
        };
        let movies = f.service.list(&filter).await.unwrap();

        assert_eq!(movies.len(), 1);
        assert_eq!(movies[0].movie.id, matrix.movie.id);
    }

    #[tokio::test]
    async fn test_update_replaces_relations() {
        let f = fixture().await;
        let movie = f
            .service
            .create(movie_input("Speed", vec![f.genres[0]], vec![f.actors[0]]))
            .await
            .unwrap();

        let updated = f
            .service
            .partial_update(
                movie.movie.id,
                MoviePatch {
                    genres: Some(vec![f.genres[1], f.genres[2]]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.movie.title, "Speed");
        let genre_ids: Vec<_> = updated.genres.iter().map(|g| g.id).collect();
        assert_eq!(genre_ids, vec![f.genres[1], f.genres[2]]);
        assert_eq!(updated.actors, movie.actors);
    }

    #[tokio::test]
    async fn test_delete_movie() {
        let f = fixture().await;
        let movie = f
            .service
            .create(movie_input("Speed", vec![f.genres[0]], vec![]))
            .await
            .unwrap();

        f.service.delete(movie.movie.id).await.unwrap();
        assert!(matches!(
            f.service.get(movie.movie.id).await,
            Err(CinemaError::NotFound)
        ));
    }

    async fn ids_matching(service: &MovieService, title: &str) -> Vec<i64> {
        let filter = MovieFilter {
            title: Some(title.to_string()),
            ..Default::default()
        };
        service
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.movie.id)
            .collect()
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50% off"), "50\\% off");
        assert_eq!(escape_like("A_ien"), "A\\_ien");
        assert_eq!(escape_like(r"back\slash"), r"back\\slash");
    }

    #[tokio::test]
    async fn test_title_filter_matches_wildcards_literally() {
        let f = fixture().await;
        f.service
            .create(movie_input("Alien", vec![], vec![]))
            .await
            .unwrap();
        let discount = f
            .service
            .create(movie_input("100% Wolf", vec![], vec![]))
            .await
            .unwrap();

        assert!(ids_matching(&f.service, "A_ien").await.is_empty());
        assert_eq!(ids_matching(&f.service, "%").await, vec![discount.movie.id]);
        assert_eq!(ids_matching(&f.service, "0% w").await, vec![discount.movie.id]);
        assert_eq!(ids_matching(&f.service, "ALI").await.len(), 1);
    }
}
