//! HTTP adapter: the thin interface handed to the presentation layer.

mod dto;
mod handlers;
mod routes;

pub use handlers::MentorHandlers;
pub use routes::session_routes;
