pub mod client;
pub mod handlers;
pub mod parse;
pub mod prompt;
pub mod service;
pub mod types;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
