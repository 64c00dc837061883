use axum::{Router, routing::post};

use crate::modules::email::controller::{send_bulk, send_html, send_text, send_to_all};
use crate::state::AppState;

pub fn init_email_router() -> Router<AppState> {
    Router::new()
        .route("/text", post(send_text))
        .route("/html", post(send_html))
        .route("/bulk", post(send_bulk))
        .route("/send-to-all", post(send_to_all))
}
