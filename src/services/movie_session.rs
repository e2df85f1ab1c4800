use std::sync::Arc;

use chrono::{Days, NaiveDate, NaiveDateTime};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, FromQueryResult, JoinType,
    ModelTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::{cinema_hall, movie, movie_session, ticket};
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::movie::{MovieWithRelations, get_movie};
use crate::services::validation::invalid_pk_message;

/// Query parameters accepted by the session list. Both filters are exact matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieSessionFilter {
    pub movie: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl MovieSessionFilter {
    /// Build a filter from raw query parameters. Empty parameters are ignored.
    pub fn from_params(movie: Option<&str>, date: Option<&str>) -> CinemaResult<Self> {
        let movie = movie
            .filter(|v| !v.is_empty())
            .map(|raw| {
                raw.trim().parse::<i64>().map_err(|_| {
                    CinemaError::BadRequest(format!("Invalid movie id `{raw}`: expected an integer"))
                })
            })
            .transpose()?;

        let date = date
            .filter(|v| !v.is_empty())
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
                    CinemaError::BadRequest(format!("Invalid date `{raw}`: expected YYYY-MM-DD"))
                })
            })
            .transpose()?;

        Ok(Self { movie, date })
    }

    fn apply(&self, mut query: Select<movie_session::Entity>) -> Select<movie_session::Entity> {
        if let Some(movie_id) = self.movie {
            query = query.filter(movie_session::Column::MovieId.eq(movie_id));
        }

        if let Some(date) = self.date {
            let start = date.and_hms_opt(0, 0, 0).unwrap_or_default();
            let end = date
                .checked_add_days(Days::new(1))
                .and_then(|d| d.and_hms_opt(0, 0, 0));
            query = query.filter(movie_session::Column::ShowTime.gte(start));
            if let Some(end) = end {
                query = query.filter(movie_session::Column::ShowTime.lt(end));
            }
        }

        query
    }
}

/// One row of the session list with the availability computed by the database.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
struct SessionAvailabilityRow {
    id: i64,
    show_time: NaiveDateTime,
    movie_title: String,
    cinema_hall_name: String,
    rows: i32,
    seats_in_row: i32,
    tickets_sold: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieSessionSummary {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie_title: String,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i64,
    /// Hall capacity minus tickets sold. Not clamped: an overbooked session goes negative.
    pub tickets_available: i64,
}

impl From<SessionAvailabilityRow> for MovieSessionSummary {
    fn from(row: SessionAvailabilityRow) -> Self {
        let capacity = i64::from(row.rows) * i64::from(row.seats_in_row);
        Self {
            id: row.id,
            show_time: row.show_time,
            movie_title: row.movie_title,
            cinema_hall_name: row.cinema_hall_name,
            cinema_hall_capacity: capacity,
            tickets_available: capacity - row.tickets_sold,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovieSessionDetail {
    pub session: movie_session::Model,
    pub movie: MovieWithRelations,
    pub cinema_hall: cinema_hall::Model,
    /// `(row, seat)` pairs already sold, ordered by row then seat
    pub taken_places: Vec<(i32, i32)>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieSessionInput {
    pub show_time: NaiveDateTime,
    pub movie: i64,
    pub cinema_hall: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieSessionPatch {
    pub show_time: Option<NaiveDateTime>,
    pub movie: Option<i64>,
    pub cinema_hall: Option<i64>,
}

impl MovieSessionPatch {
    fn merge(self, current: movie_session::Model) -> MovieSessionInput {
        MovieSessionInput {
            show_time: self.show_time.unwrap_or(current.show_time),
            movie: self.movie.unwrap_or(current.movie_id),
            cinema_hall: self.cinema_hall.unwrap_or(current.cinema_hall_id),
        }
    }
}

pub struct MovieSessionService {
    db: Arc<Database>,
}

impl MovieSessionService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Sessions ordered by show time, each with its remaining seat count.
    pub async fn list(&self, filter: &MovieSessionFilter) -> CinemaResult<Vec<MovieSessionSummary>> {
        tracing::debug!("Listing movie sessions with {:?}", filter);
        let rows = summaries_query(filter)
            .into_model::<SessionAvailabilityRow>()
            .all(&self.db.conn)
            .await?;

        Ok(rows.into_iter().map(MovieSessionSummary::from).collect())
    }

    pub async fn get(&self, id: i64) -> CinemaResult<MovieSessionDetail> {
        let (session, hall) = movie_session::Entity::find_by_id(id)
            .find_also_related(cinema_hall::Entity)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)?;
        let cinema_hall = hall.ok_or(CinemaError::NotFound)?;

        let movie = get_movie(&self.db.conn, session.movie_id).await?;

        let taken_places = ticket::Entity::find()
            .select_only()
            .column(ticket::Column::Row)
            .column(ticket::Column::Seat)
            .filter(ticket::Column::MovieSessionId.eq(session.id))
            .order_by_asc(ticket::Column::Row)
            .order_by_asc(ticket::Column::Seat)
            .into_tuple::<(i32, i32)>()
            .all(&self.db.conn)
            .await?;

        Ok(MovieSessionDetail {
            session,
            movie,
            cinema_hall,
            taken_places,
        })
    }

    /// Retrieve a session, treating it as missing when it does not pass `filter`.
    pub async fn get_matching(
        &self,
        id: i64,
        filter: &MovieSessionFilter,
    ) -> CinemaResult<MovieSessionDetail> {
        if *filter != MovieSessionFilter::default()
            && !self.list(filter).await?.iter().any(|s| s.id == id)
        {
            return Err(CinemaError::NotFound);
        }

        self.get(id).await
    }

    pub async fn find(&self, id: i64) -> CinemaResult<movie_session::Model> {
        movie_session::Entity::find_by_id(id)
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)
    }

    pub async fn create(&self, input: MovieSessionInput) -> CinemaResult<movie_session::Model> {
        validate(&self.db.conn, &input).await?;

        let model = movie_session::ActiveModel {
            show_time: Set(input.show_time),
            movie_id: Set(input.movie),
            cinema_hall_id: Set(input.cinema_hall),
            ..Default::default()
        }
        .insert(&self.db.conn)
        .await?;

        tracing::info!(
            "Movie session created (ID: {}, movie: {}, hall: {}, at {})",
            model.id,
            model.movie_id,
            model.cinema_hall_id,
            model.show_time
        );
        Ok(model)
    }

    pub async fn update(
        &self,
        id: i64,
        input: MovieSessionInput,
    ) -> CinemaResult<movie_session::Model> {
        let current = self.find(id).await?;
        validate(&self.db.conn, &input).await?;

        let mut active: movie_session::ActiveModel = current.into();
        active.show_time = Set(input.show_time);
        active.movie_id = Set(input.movie);
        active.cinema_hall_id = Set(input.cinema_hall);
        let model = active.update(&self.db.conn).await?;

        tracing::info!("Movie session updated (ID: {})", model.id);
        Ok(model)
    }

    pub async fn partial_update(
        &self,
        id: i64,
        patch: MovieSessionPatch,
    ) -> CinemaResult<movie_session::Model> {
        let current = self.find(id).await?;
        self.update(id, patch.merge(current)).await
    }

    pub async fn delete(&self, id: i64) -> CinemaResult<()> {
        let session = self.find(id).await?;
        session.delete(&self.db.conn).await?;
        tracing::info!("Movie session deleted (ID: {})", id);
        Ok(())
    }
}

/// Sessions joined with movie and hall, counting tickets per session.
fn summaries_query(filter: &MovieSessionFilter) -> Select<movie_session::Entity> {
    let query = movie_session::Entity::find()
        .select_only()
        .column(movie_session::Column::Id)
        .column(movie_session::Column::ShowTime)
        .column_as(movie::Column::Title, "movie_title")
        .column_as(cinema_hall::Column::Name, "cinema_hall_name")
        .column_as(cinema_hall::Column::Rows, "rows")
        .column_as(cinema_hall::Column::SeatsInRow, "seats_in_row")
        .column_as(ticket::Column::Id.count(), "tickets_sold")
        .join(JoinType::InnerJoin, movie_session::Relation::Movie.def())
        .join(JoinType::InnerJoin, movie_session::Relation::CinemaHall.def())
        .join(JoinType::LeftJoin, movie_session::Relation::Ticket.def())
        .group_by(movie_session::Column::Id)
        .group_by(movie_session::Column::ShowTime)
        .group_by(movie::Column::Title)
        .group_by(cinema_hall::Column::Name)
        .group_by(cinema_hall::Column::Rows)
        .group_by(cinema_hall::Column::SeatsInRow)
        .order_by_asc(movie_session::Column::ShowTime)
        .order_by_asc(movie_session::Column::Id);

    filter.apply(query)
}

/// Summaries for the given session ids, in show time order.
pub(crate) async fn summaries_by_id<C>(
    conn: &C,
    ids: &[i64],
) -> CinemaResult<Vec<MovieSessionSummary>>
where
    C: ConnectionTrait,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = summaries_query(&MovieSessionFilter::default())
        .filter(movie_session::Column::Id.is_in(ids.iter().copied()))
        .into_model::<SessionAvailabilityRow>()
        .all(conn)
        .await?;

    Ok(rows.into_iter().map(MovieSessionSummary::from).collect())
}

async fn validate<C>(conn: &C, input: &MovieSessionInput) -> CinemaResult<()>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();

    if movie::Entity::find_by_id(input.movie).one(conn).await?.is_none() {
        errors.add("movie", invalid_pk_message(input.movie));
    }
    if cinema_hall::Entity::find_by_id(input.cinema_hall)
        .one(conn)
        .await?
        .is_none()
    {
        errors.add("cinema_hall", invalid_pk_message(input.cinema_hall));
    }

    errors.into_result()
}
