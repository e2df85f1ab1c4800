pub mod app;
pub mod auth;
pub mod error;
pub mod extract;
pub mod http_routes;
pub mod serializers;
pub mod state;

#[cfg(test)]
mod tests;
