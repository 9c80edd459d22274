pub mod aggregate;
pub mod handlers;
pub mod store;
pub mod types;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    handlers::router()
}
