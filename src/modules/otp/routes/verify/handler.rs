use super::{
    service::service,
    types::{request, response},
};
use crate::types::Context;
use axum::{
    extract::{rejection::JsonRejection, Json, State},
    response::IntoResponse,
};
use std::sync::Arc;

pub async fn handler(
    State(ctx): State<Arc<Context>>,
    payload: Result<Json<request::Payload>, JsonRejection>,
) -> impl IntoResponse {
    match payload {
        Ok(Json(payload)) => service(ctx, payload).await,
        Err(rejection) => Err(response::Error::UnreadablePayload(rejection)),
    }
}
