use crate::{modules::otp, types::Context};
use axum::routing::{post, Router};
use std::sync::Arc;

/// Phone login under the auth namespace; `/otp/verify` logs in.
pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/otp/send", post(otp::routes::send_handler))
        .route("/otp/verify", post(otp::routes::login_handler))
}
