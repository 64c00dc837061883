use axum::{Router, routing::post};

use crate::modules::auth::controller::{login, register, register_admin};
use crate::state::AppState;

pub fn init_auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/register-admin", post(register_admin))
        .route("/login", post(login))
}
