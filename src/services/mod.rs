pub mod actor;
pub mod cinema_hall;
pub mod genre;
pub mod movie;
pub mod movie_session;
pub mod order;
pub mod pagination;
pub mod user;
pub mod validation;
