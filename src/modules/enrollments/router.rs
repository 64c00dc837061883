use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::modules::enrollments::controller::{
    enroll, filter_enrollments, get_enrollments, unenroll,
};
use crate::state::AppState;

pub fn init_enrollments_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_enrollments))
        .route("/enroll", post(enroll))
        .route("/filter", get(filter_enrollments))
        .route("/{id}", delete(unenroll))
}
