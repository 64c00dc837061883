use axum::{Router, routing::post};

use crate::modules::seed::controller::seed;
use crate::state::AppState;

pub fn init_seed_router() -> Router<AppState> {
    Router::new().route("/", post(seed))
}
