use std::sync::Arc;

use sea_orm::{ActiveModelTrait, ConnectOptions, Set};

use crate::database::Database;
use crate::entities::{order, ticket, user};

/// A fresh, fully migrated in-memory database.
///
/// The pool holds a single connection: every connection to `sqlite::memory:`
/// would otherwise see its own empty database.
pub async fn test_db() -> Arc<Database> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .unwrap_or_else(|e| panic!("Failed to create test database: {e:?}"));

    Arc::new(db)
}

/// Insert a user directly; the token is irrelevant for service level tests.
pub async fn test_user(db: &Database, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        token_hash: Set(format!("hash-of-{username}")),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap()
}

/// Insert an order and its tickets without any validation.
pub async fn insert_order_with_tickets(
    db: &Database,
    user_id: i64,
    movie_session_id: i64,
    seats: &[(i32, i32)],
) -> order::Model {
    let order = order::ActiveModel {
        user_id: Set(user_id),
        ..Default::default()
    }
    .insert(&db.conn)
    .await
    .unwrap();

    for &(row, seat) in seats {
        ticket::ActiveModel {
            row: Set(row),
            seat: Set(seat),
            movie_session_id: Set(movie_session_id),
            order_id: Set(order.id),
            ..Default::default()
        }
        .insert(&db.conn)
        .await
        .unwrap();
    }

    order
}
