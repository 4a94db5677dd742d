pub mod dto;
pub mod eligibility;
pub mod generator;
pub mod handlers;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod fakes;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    Router::new().merge(handlers::credential_routes())
}
