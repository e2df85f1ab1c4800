use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

use crate::{
    http_server::{app::build_router, state::AppState},
    services::user::UserService,
    test_utils::test_db,
};

struct TestApp {
    router: Router,
    alice: String,
    bob: String,
}

async fn test_app() -> TestApp {
    let db = test_db().await;
    let users = UserService::new(db.clone());
    let (_, alice) = users.create("alice").await.unwrap();
    let (_, bob) = users.create("bob").await.unwrap();

    let state = Arc::new(AppState {
        db,
        order_page_size: 2,
        max_page_size: 100,
    });

    TestApp {
        router: build_router(state, CorsLayer::permissive()),
        alice,
        bob,
    }
}

impl TestApp {
    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, None, Some(body)).await
    }

    /// Create a value through the API and return its id.
    async fn create(&self, uri: &str, body: Value) -> i64 {
        let (status, body) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["id"].as_i64().unwrap()
    }

    /// A movie with one genre and one actor shown once in a 5x10 hall.
    async fn seed_session(&self) -> i64 {
        let genre = self
            .create("/api/cinema/genres", json!({ "name": "Sci-Fi" }))
            .await;
        let actor = self
            .create(
                "/api/cinema/actors",
                json!({ "first_name": "Sigourney", "last_name": "Weaver" }),
            )
            .await;
        let hall = self
            .create(
                "/api/cinema/cinema_halls",
                json!({ "name": "Blue", "rows": 5, "seats_in_row": 10 }),
            )
            .await;
        let movie = self
            .create(
                "/api/cinema/movies",
                json!({
                    "title": "Alien",
                    "description": "In space no one can hear you scream.",
                    "duration": 117,
                    "genres": [genre],
                    "actors": [actor],
                }),
            )
            .await;
        self.create(
            "/api/cinema/movie_sessions",
            json!({ "show_time": "2026-10-16T20:00:00", "movie": movie, "cinema_hall": hall }),
        )
        .await
    }

    async fn order(&self, token: &str, session: i64, seats: &[(i32, i32)]) -> (StatusCode, Value) {
        let tickets: Vec<Value> = seats
            .iter()
            .map(|(row, seat)| json!({ "row": row, "seat": seat, "movie_session": session }))
            .collect();
        self.send(
            Method::POST,
            "/api/cinema/orders",
            Some(token),
            Some(json!({ "tickets": tickets })),
        )
        .await
    }
}

#[tokio::test]
async fn test_health() {
    let app = test_app().await;
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("ok".into()));
}

#[tokio::test]
async fn test_genre_crud() {
    let app = test_app().await;

    let id = app
        .create("/api/cinema/genres", json!({ "name": "Drama" }))
        .await;

    let (status, body) = app.get("/api/cinema/genres").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "id": id, "name": "Drama" }]));

    let (status, body) = app
        .send(
            Method::PATCH,
            &format!("/api/cinema/genres/{id}"),
            None,
            Some(json!({ "name": "Comedy" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Comedy");

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cinema/genres/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.get(&format!("/api/cinema/genres/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));
}

#[tokio::test]
async fn test_validation_errors_are_keyed_by_field() {
    let app = test_app().await;

    let (status, body) = app.post("/api/cinema/genres", json!({ "name": "  " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "name": ["This field may not be blank."] }));

    let (status, body) = app.post("/api/cinema/cinema_halls", json!({ "name": "Red", "rows": 0 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "seats_in_row": ["This field is required."] }));

    let (status, body) = app
        .post(
            "/api/cinema/cinema_halls",
            json!({ "name": "Red", "rows": 0, "seats_in_row": 10 }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "rows": ["Ensure this value is greater than or equal to 1."] })
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = test_app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/cinema/genres")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_movie_shapes_differ_per_action() {
    let app = test_app().await;
    app.seed_session().await;

    let (_, list) = app.get("/api/cinema/movies").await;
    assert_eq!(list[0]["genres"], json!(["Sci-Fi"]));
    assert_eq!(list[0]["actors"], json!(["Sigourney Weaver"]));

    let id = list[0]["id"].as_i64().unwrap();
    let (_, detail) = app.get(&format!("/api/cinema/movies/{id}")).await;
    assert_eq!(detail["genres"][0]["name"], "Sci-Fi");
    assert_eq!(detail["actors"][0]["full_name"], "Sigourney Weaver");

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/cinema/movies/{id}"),
            None,
            Some(json!({
                "title": "Aliens",
                "description": "This time it's war.",
                "duration": 137,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["genres"], json!([]));
    assert_eq!(updated["title"], "Aliens");
}

#[tokio::test]
async fn test_movie_filters() {
    let app = test_app().await;
    app.seed_session().await;

    let (status, body) = app.get("/api/cinema/movies?title=ALI&genres=1,2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = app.get("/api/cinema/movies?title=war").await;
    assert_eq!(body, json!([]));

    let (status, _) = app.get("/api/cinema/movies?genres=drama").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_movie_session_availability() {
    let app = test_app().await;
    let session = app.seed_session().await;

    let (status, _) = app.order(&app.alice, session, &[(1, 1), (1, 2), (2, 5)]).await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, list) = app.get("/api/cinema/movie_sessions?date=2026-10-16").await;
    assert_eq!(
        list,
        json!([{
            "id": session,
            "show_time": "2026-10-16T20:00:00",
            "movie_title": "Alien",
            "cinema_hall_name": "Blue",
            "cinema_hall_capacity": 50,
            "tickets_available": 47,
        }])
    );

    let (_, other_day) = app.get("/api/cinema/movie_sessions?date=2026-10-17").await;
    assert_eq!(other_day, json!([]));

    let (_, detail) = app.get(&format!("/api/cinema/movie_sessions/{session}")).await;
    assert_eq!(detail["movie"]["title"], "Alien");
    assert_eq!(detail["cinema_hall"]["capacity"], 50);
    assert_eq!(
        detail["taken_places"],
        json!([{ "row": 1, "seat": 1 }, { "row": 1, "seat": 2 }, { "row": 2, "seat": 5 }])
    );
}

#[tokio::test]
async fn test_orders_require_authentication() {
    let app = test_app().await;

    let (status, body) = app.get("/api/cinema/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body,
        json!({ "detail": "Authentication credentials were not provided." })
    );

    let (status, body) = app
        .send(Method::GET, "/api/cinema/orders", Some("bogus"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "detail": "Invalid token." }));
}

#[tokio::test]
async fn test_order_owner_is_the_requester() {
    let app = test_app().await;
    let session = app.seed_session().await;

    let (status, created) = app
        .send(
            Method::POST,
            "/api/cinema/orders",
            Some(&app.alice),
            Some(json!({
                "user": 999,
                "tickets": [{ "row": 3, "seat": 3, "movie_session": session }],
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["tickets"][0]["movie_session"], session);
    let id = created["id"].as_i64().unwrap();

    let (status, _) = app
        .send(Method::GET, &format!("/api/cinema/orders/{id}"), Some(&app.bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, bob_orders) = app
        .send(Method::GET, "/api/cinema/orders", Some(&app.bob), None)
        .await;
    assert_eq!(bob_orders["count"], 0);

    let (status, detail) = app
        .send(Method::GET, &format!("/api/cinema/orders/{id}"), Some(&app.alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        detail["tickets"][0]["movie_session"],
        json!({
            "id": session,
            "show_time": "2026-10-16T20:00:00",
            "movie_title": "Alien",
            "cinema_hall_name": "Blue",
        })
    );
}

#[tokio::test]
async fn test_taken_seat_is_a_validation_error() {
    let app = test_app().await;
    let session = app.seed_session().await;

    app.order(&app.alice, session, &[(1, 1)]).await;
    let (status, body) = app.order(&app.bob, session, &[(1, 1)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "tickets[0].seat": ["This seat is already taken."] }));

    let (status, body) = app.order(&app.bob, session, &[(9, 1)]).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["tickets[0].row"],
        json!(["row number must be in available range: (1, rows): (1, 5)"])
    );
}

#[tokio::test]
async fn test_order_list_is_paginated() {
    let app = test_app().await;
    let session = app.seed_session().await;
    for seat in 1..=3 {
        app.order(&app.alice, session, &[(1, seat)]).await;
    }

    let (status, first) = app
        .send(Method::GET, "/api/cinema/orders", Some(&app.alice), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["count"], 3);
    assert_eq!(first["results"].as_array().unwrap().len(), 2);
    assert_eq!(first["next"], "/api/cinema/orders?page=2&page_size=2");
    assert_eq!(first["previous"], Value::Null);
    assert_eq!(
        first["results"][0]["tickets"][0]["movie_session"]["tickets_available"],
        47
    );

    let (_, second) = app
        .send(Method::GET, "/api/cinema/orders?page=2", Some(&app.alice), None)
        .await;
    assert_eq!(second["results"].as_array().unwrap().len(), 1);
    assert_eq!(second["next"], Value::Null);

    let (status, body) = app
        .send(Method::GET, "/api/cinema/orders?page=7", Some(&app.alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Invalid page." }));
}

#[tokio::test]
async fn test_order_update_and_delete() {
    let app = test_app().await;
    let session = app.seed_session().await;
    let (_, created) = app.order(&app.alice, session, &[(1, 1)]).await;
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/cinema/orders/{id}"),
            Some(&app.alice),
            Some(json!({ "tickets": [{ "row": 2, "seat": 2, "movie_session": session }] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tickets"][0]["row"], 2);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cinema/orders/{id}"), Some(&app.bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/cinema/orders/{id}"), Some(&app.alice), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_huge_page_is_not_found() {
    let app = test_app().await;
    let session = app.seed_session().await;
    app.order(&app.alice, session, &[(1, 1)]).await;

    let (status, body) = app
        .send(
            Method::GET,
            "/api/cinema/orders?page=18446744073709551615&page_size=100",
            Some(&app.alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Invalid page." }));
}

#[tokio::test]
async fn test_title_wildcards_match_literally() {
    let app = test_app().await;
    app.seed_session().await;

    let (_, percent) = app.get("/api/cinema/movies?title=%25").await;
    assert_eq!(percent, json!([]));

    let (_, underscore) = app.get("/api/cinema/movies?title=A_ien").await;
    assert_eq!(underscore, json!([]));
}

#[tokio::test]
async fn test_non_numeric_id_is_not_found() {
    let app = test_app().await;

    let (status, body) = app.get("/api/cinema/movies/abc").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Not found." }));
}
