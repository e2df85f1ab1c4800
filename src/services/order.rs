use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, LoaderTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::Deserialize;

use crate::database::Database;
use crate::entities::{cinema_hall, movie, movie_session, order, ticket};
use crate::error::{CinemaError, CinemaResult, ValidationErrors};
use crate::services::movie_session::{MovieSessionSummary, summaries_by_id};
use crate::services::pagination::{PageRequest, PaginatedResult, apply_pagination};
use crate::services::validation::invalid_pk_message;

const SEAT_TAKEN: &str = "This seat is already taken.";

#[derive(Debug, Clone, Deserialize)]
pub struct TicketInput {
    pub row: i32,
    pub seat: i32,
    pub movie_session: i64,
}

/// Write shape of an order. The owner is never part of the payload.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderInput {
    pub tickets: Vec<TicketInput>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderWithTickets {
    pub order: order::Model,
    pub tickets: Vec<ticket::Model>,
}

/// An order as shown in the list: every ticket with its session's availability summary.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderListItem {
    pub order: order::Model,
    pub tickets: Vec<(ticket::Model, MovieSessionSummary)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketDetail {
    pub ticket: ticket::Model,
    pub session: movie_session::Model,
    pub movie_title: String,
    pub cinema_hall_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderDetail {
    pub order: order::Model,
    pub tickets: Vec<TicketDetail>,
}

/// Orders are always scoped to their owner: every method takes the requesting user's id
/// and another user's order is indistinguishable from a missing one.
pub struct OrderService {
    db: Arc<Database>,
}

impl OrderService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn list(
        &self,
        user_id: i64,
        request: &PageRequest,
    ) -> CinemaResult<PaginatedResult<OrderListItem>> {
        let query = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .order_by_desc(order::Column::Id);

        let total_count = query.clone().count(&self.db.conn).await?;
        if request.is_past_end(total_count) {
            return Err(CinemaError::InvalidPage);
        }

        let orders = apply_pagination(query, request)
            .all(&self.db.conn)
            .await?;

        let tickets = orders
            .load_many(
                ticket::Entity::find()
                    .order_by_asc(ticket::Column::Id),
                &self.db.conn,
            )
            .await?;

        let session_ids: Vec<i64> = tickets
            .iter()
            .flatten()
            .map(|t| t.movie_session_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let summaries: HashMap<i64, MovieSessionSummary> =
            summaries_by_id(&self.db.conn, &session_ids)
                .await?
                .into_iter()
                .map(|s| (s.id, s))
                .collect();

        let items = orders
            .into_iter()
            .zip(tickets)
            .map(|(order, tickets)| {
                let tickets = tickets
                    .into_iter()
                    .filter_map(|t| {
                        let summary = summaries.get(&t.movie_session_id)?.clone();
                        Some((t, summary))
                    })
                    .collect();
                OrderListItem { order, tickets }
            })
            .collect();

        Ok(PaginatedResult {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
        })
    }

    pub async fn get(&self, user_id: i64, id: i64) -> CinemaResult<OrderDetail> {
        let order = self.find_owned(user_id, id).await?;

        let tickets = order
            .find_related(ticket::Entity)
            .order_by_asc(ticket::Column::Id)
            .all(&self.db.conn)
            .await?;

        let sessions: Vec<movie_session::Model> = tickets
            .load_one(movie_session::Entity, &self.db.conn)
            .await?
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| {
                CinemaError::Database(DbErr::RecordNotFound(format!(
                    "Order {id} references a missing movie session"
                )))
            })?;
        let movies = sessions.load_one(movie::Entity, &self.db.conn).await?;
        let halls = sessions
            .load_one(cinema_hall::Entity, &self.db.conn)
            .await?;

        let tickets = tickets
            .into_iter()
            .zip(sessions)
            .zip(movies.into_iter().zip(halls))
            .map(|((ticket, session), (movie, hall))| TicketDetail {
                ticket,
                session,
                movie_title: movie.map(|m| m.title).unwrap_or_default(),
                cinema_hall_name: hall.map(|h| h.name).unwrap_or_default(),
            })
            .collect();

        Ok(OrderDetail { order, tickets })
    }

    /// Create an order owned by `user_id` together with all of its tickets, atomically.
    pub async fn create(&self, user_id: i64, input: OrderInput) -> CinemaResult<OrderWithTickets> {
        let txn = self.db.conn.begin().await?;

        validate_tickets(&txn, &input.tickets, None).await?;

        let order = order::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        let tickets = insert_tickets(&txn, order.id, &input.tickets).await?;

        txn.commit().await?;

        tracing::info!(
            "Order created (ID: {}, user: {}, tickets: {})",
            order.id,
            user_id,
            tickets.len()
        );
        Ok(OrderWithTickets { order, tickets })
    }

    /// Replace the tickets of an existing order.
    pub async fn update(
        &self,
        user_id: i64,
        id: i64,
        input: OrderInput,
    ) -> CinemaResult<OrderWithTickets> {
        let order = self.find_owned(user_id, id).await?;

        let txn = self.db.conn.begin().await?;

        validate_tickets(&txn, &input.tickets, Some(order.id)).await?;

        ticket::Entity::delete_many()
            .filter(ticket::Column::OrderId.eq(order.id))
            .exec(&txn)
            .await?;
        let tickets = insert_tickets(&txn, order.id, &input.tickets).await?;

        txn.commit().await?;

        tracing::info!("Order updated (ID: {}, tickets: {})", order.id, tickets.len());
        Ok(OrderWithTickets { order, tickets })
    }

    pub async fn delete(&self, user_id: i64, id: i64) -> CinemaResult<()> {
        let order = self.find_owned(user_id, id).await?;
        order.delete(&self.db.conn).await?;
        tracing::info!("Order deleted (ID: {})", id);
        Ok(())
    }

    async fn find_owned(&self, user_id: i64, id: i64) -> CinemaResult<order::Model> {
        order::Entity::find_by_id(id)
            .filter(order::Column::UserId.eq(user_id))
            .one(&self.db.conn)
            .await?
            .ok_or(CinemaError::NotFound)
    }
}

/// Check every requested ticket against its hall's dimensions, against the other
/// tickets of the payload and against seats already sold. Tickets of `replacing`
/// do not count as sold.
async fn validate_tickets<C>(
    conn: &C,
    tickets: &[TicketInput],
    replacing: Option<i64>,
) -> CinemaResult<()>
where
    C: ConnectionTrait,
{
    let mut errors = ValidationErrors::new();

    if tickets.is_empty() {
        errors.add("tickets", "This list may not be empty.");
        return errors.into_result();
    }

    let session_ids: Vec<i64> = tickets
        .iter()
        .map(|t| t.movie_session)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let halls: HashMap<i64, cinema_hall::Model> = movie_session::Entity::find()
        .filter(movie_session::Column::Id.is_in(session_ids.iter().copied()))
        .find_also_related(cinema_hall::Entity)
        .all(conn)
        .await?
        .into_iter()
        .filter_map(|(session, hall)| Some((session.id, hall?)))
        .collect();

    let mut sold_query =
        ticket::Entity::find().filter(ticket::Column::MovieSessionId.is_in(session_ids));
    if let Some(order_id) = replacing {
        sold_query = sold_query.filter(ticket::Column::OrderId.ne(order_id));
    }
    let sold: HashSet<(i64, i32, i32)> = sold_query
        .all(conn)
        .await?
        .into_iter()
        .map(|t| (t.movie_session_id, t.row, t.seat))
        .collect();

    let mut requested = HashSet::new();
    for (index, ticket) in tickets.iter().enumerate() {
        let field = |name: &str| format!("tickets[{index}].{name}");

        let Some(hall) = halls.get(&ticket.movie_session) else {
            errors.add(&field("movie_session"), invalid_pk_message(ticket.movie_session));
            continue;
        };

        let mut in_bounds = true;
        if !(1..=hall.rows).contains(&ticket.row) {
            in_bounds = false;
            errors.add(
                &field("row"),
                format!(
                    "row number must be in available range: (1, rows): (1, {})",
                    hall.rows
                ),
            );
        }
        if !(1..=hall.seats_in_row).contains(&ticket.seat) {
            in_bounds = false;
            errors.add(
                &field("seat"),
                format!(
                    "seat number must be in available range: (1, seats_in_row): (1, {})",
                    hall.seats_in_row
                ),
            );
        }
        if !in_bounds {
            continue;
        }

        let key = (ticket.movie_session, ticket.row, ticket.seat);
        if sold.contains(&key) {
            errors.add(&field("seat"), SEAT_TAKEN);
        } else if !requested.insert(key) {
            errors.add(&field("seat"), "This seat appears more than once in the order.");
        }
    }

    errors.into_result()
}

async fn insert_tickets<C>(
    conn: &C,
    order_id: i64,
    tickets: &[TicketInput],
) -> CinemaResult<Vec<ticket::Model>>
where
    C: ConnectionTrait,
{
    let mut inserted = Vec::with_capacity(tickets.len());
    for ticket in tickets {
        let model = ticket::ActiveModel {
            row: Set(ticket.row),
            seat: Set(ticket.seat),
            movie_session_id: Set(ticket.movie_session),
            order_id: Set(order_id),
            ..Default::default()
        }
        .insert(conn)
        .await
        .map_err(seat_conflict)?;
        inserted.push(model);
    }
    Ok(inserted)
}

/// A concurrent booking can still win the race for a seat between validation and
/// insert; the unique index turns that into the same validation error.
fn seat_conflict(err: DbErr) -> CinemaError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => CinemaError::validation("tickets", SEAT_TAKEN),
        _ => CinemaError::Database(err),
    }
}
