use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::users::controller::{
    create_student, delete_student, filter_students, get_student, get_students, update_student,
};
use crate::state::AppState;

pub fn init_students_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_student).get(get_students))
        .route("/filter", get(filter_students))
        .route(
            "/{id}",
            get(get_student).put(update_student).delete(delete_student),
        )
}
