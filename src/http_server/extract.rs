use axum::extract::{FromRequest, FromRequestParts};

use crate::error::CinemaError;

/// `axum::Json` with rejections rendered as field errors.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(CinemaError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` with rejections rendered as a 400 detail.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(CinemaError))]
pub struct ApiQuery<T>(pub T);

/// `axum::extract::Path` where an id that does not parse is simply not found.
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(CinemaError))]
pub struct ApiPath<T>(pub T);
