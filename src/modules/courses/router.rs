use axum::{
    Router,
    routing::{get, post},
};

use crate::modules::courses::controller::{
    assign_teacher, create_course, delete_course, filter_courses, get_course, get_courses,
    paginated_courses, update_course,
};
use crate::state::AppState;

pub fn init_courses_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_course).get(get_courses))
        .route("/paginated", get(paginated_courses))
        .route("/filter", get(filter_courses))
        .route(
            "/{id}",
            get(get_course).put(update_course).delete(delete_course),
        )
        .route("/{id}/assign-teacher", post(assign_teacher))
}
