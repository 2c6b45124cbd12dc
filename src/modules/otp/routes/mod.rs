mod login;
mod send;
mod verify;

pub use login::handler as login_handler;
pub use send::handler as send_handler;

use crate::types::Context;
use axum::routing::{post, Router};
use std::sync::Arc;

pub fn get_router() -> Router<Arc<Context>> {
    Router::new()
        .route("/send", post(send::handler))
        .route("/verify", post(verify::handler))
        .route("/login", post(login::handler))
}
