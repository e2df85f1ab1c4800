//! JSON shapes returned by the REST API.
//!
//! Each resource has a compact shape for lists, a nested one for retrieval and
//! a flat one (related records as ids) for create and update responses.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Serialize;

use crate::entities::{actor, cinema_hall, genre, movie_session, ticket};
use crate::services::movie::MovieWithRelations;
use crate::services::movie_session::{MovieSessionDetail, MovieSessionSummary};
use crate::services::order::{OrderDetail, OrderListItem, OrderWithTickets, TicketDetail};
use crate::services::pagination::PaginatedResult;

#[derive(Debug, Serialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

impl From<genre::Model> for Genre {
    fn from(model: genre::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Actor {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
}

impl From<actor::Model> for Actor {
    fn from(model: actor::Model) -> Self {
        let full_name = model.full_name();
        Self {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            full_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CinemaHall {
    pub id: i64,
    pub name: String,
    pub rows: i32,
    pub seats_in_row: i32,
    pub capacity: i64,
}

impl From<cinema_hall::Model> for CinemaHall {
    fn from(model: cinema_hall::Model) -> Self {
        let capacity = model.capacity();
        Self {
            id: model.id,
            name: model.name,
            rows: model.rows,
            seats_in_row: model.seats_in_row,
            capacity,
        }
    }
}

/// Movie with related records as ids.
#[derive(Debug, Serialize)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<i64>,
    pub actors: Vec<i64>,
}

impl From<MovieWithRelations> for Movie {
    fn from(value: MovieWithRelations) -> Self {
        Self {
            id: value.movie.id,
            title: value.movie.title,
            description: value.movie.description,
            duration: value.movie.duration,
            genres: value.genres.iter().map(|g| g.id).collect(),
            actors: value.actors.iter().map(|a| a.id).collect(),
        }
    }
}

/// Movie with genre names and actor full names.
#[derive(Debug, Serialize)]
pub struct MovieList {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<String>,
    pub actors: Vec<String>,
}

impl From<MovieWithRelations> for MovieList {
    fn from(value: MovieWithRelations) -> Self {
        Self {
            id: value.movie.id,
            title: value.movie.title,
            description: value.movie.description,
            duration: value.movie.duration,
            genres: value.genres.into_iter().map(|g| g.name).collect(),
            actors: value.actors.iter().map(actor::Model::full_name).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub duration: i32,
    pub genres: Vec<Genre>,
    pub actors: Vec<Actor>,
}

impl From<MovieWithRelations> for MovieDetail {
    fn from(value: MovieWithRelations) -> Self {
        Self {
            id: value.movie.id,
            title: value.movie.title,
            description: value.movie.description,
            duration: value.movie.duration,
            genres: value.genres.into_iter().map(Genre::from).collect(),
            actors: value.actors.into_iter().map(Actor::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieSession {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie: i64,
    pub cinema_hall: i64,
}

impl From<movie_session::Model> for MovieSession {
    fn from(model: movie_session::Model) -> Self {
        Self {
            id: model.id,
            show_time: model.show_time,
            movie: model.movie_id,
            cinema_hall: model.cinema_hall_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MovieSessionList {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie_title: String,
    pub cinema_hall_name: String,
    pub cinema_hall_capacity: i64,
    pub tickets_available: i64,
}

impl From<MovieSessionSummary> for MovieSessionList {
    fn from(summary: MovieSessionSummary) -> Self {
        Self {
            id: summary.id,
            show_time: summary.show_time,
            movie_title: summary.movie_title,
            cinema_hall_name: summary.cinema_hall_name,
            cinema_hall_capacity: summary.cinema_hall_capacity,
            tickets_available: summary.tickets_available,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TakenPlace {
    pub row: i32,
    pub seat: i32,
}

#[derive(Debug, Serialize)]
pub struct MovieSessionDetailResponse {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie: MovieList,
    pub cinema_hall: CinemaHall,
    pub taken_places: Vec<TakenPlace>,
}

impl From<MovieSessionDetail> for MovieSessionDetailResponse {
    fn from(detail: MovieSessionDetail) -> Self {
        Self {
            id: detail.session.id,
            show_time: detail.session.show_time,
            movie: detail.movie.into(),
            cinema_hall: detail.cinema_hall.into(),
            taken_places: detail
                .taken_places
                .into_iter()
                .map(|(row, seat)| TakenPlace { row, seat })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Ticket {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session: i64,
}

impl From<ticket::Model> for Ticket {
    fn from(model: ticket::Model) -> Self {
        Self {
            id: model.id,
            row: model.row,
            seat: model.seat,
            movie_session: model.movie_session_id,
        }
    }
}

/// Order with flat tickets, returned by create and update.
#[derive(Debug, Serialize)]
pub struct Order {
    pub id: i64,
    pub tickets: Vec<Ticket>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderWithTickets> for Order {
    fn from(value: OrderWithTickets) -> Self {
        Self {
            id: value.order.id,
            tickets: value.tickets.into_iter().map(Ticket::from).collect(),
            created_at: value.order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketList {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session: MovieSessionList,
}

#[derive(Debug, Serialize)]
pub struct OrderList {
    pub id: i64,
    pub tickets: Vec<TicketList>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderListItem> for OrderList {
    fn from(item: OrderListItem) -> Self {
        Self {
            id: item.order.id,
            tickets: item
                .tickets
                .into_iter()
                .map(|(ticket, summary)| TicketList {
                    id: ticket.id,
                    row: ticket.row,
                    seat: ticket.seat,
                    movie_session: summary.into(),
                })
                .collect(),
            created_at: item.order.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TicketSession {
    pub id: i64,
    pub show_time: NaiveDateTime,
    pub movie_title: String,
    pub cinema_hall_name: String,
}

#[derive(Debug, Serialize)]
pub struct TicketDetailResponse {
    pub id: i64,
    pub row: i32,
    pub seat: i32,
    pub movie_session: TicketSession,
}

impl From<TicketDetail> for TicketDetailResponse {
    fn from(detail: TicketDetail) -> Self {
        Self {
            id: detail.ticket.id,
            row: detail.ticket.row,
            seat: detail.ticket.seat,
            movie_session: TicketSession {
                id: detail.session.id,
                show_time: detail.session.show_time,
                movie_title: detail.movie_title,
                cinema_hall_name: detail.cinema_hall_name,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OrderDetailResponse {
    pub id: i64,
    pub tickets: Vec<TicketDetailResponse>,
    pub created_at: DateTime<Utc>,
}

impl From<OrderDetail> for OrderDetailResponse {
    fn from(detail: OrderDetail) -> Self {
        Self {
            id: detail.order.id,
            tickets: detail
                .tickets
                .into_iter()
                .map(TicketDetailResponse::from)
                .collect(),
            created_at: detail.order.created_at,
        }
    }
}

/// Page-number pagination envelope. `next` and `previous` are relative URLs.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new<S>(result: PaginatedResult<S>, path: &str) -> Self
    where
        S: Into<T>,
    {
        let link = |page: u64| format!("{path}?page={page}&page_size={}", result.page_size);
        let next = result.has_next().then(|| link(result.page + 1));
        let previous = result.has_previous().then(|| link(result.page - 1));

        Self {
            count: result.total_count,
            next,
            previous,
            results: result.items.into_iter().map(Into::into).collect(),
        }
    }
}
