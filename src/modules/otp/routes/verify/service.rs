use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;
use validator::Validate;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload
        .validate()
        .map_err(response::Error::FailedToValidate)?;

    match ctx.otp.manager.verify(&payload.phone, &payload.code).await {
        true => Ok(response::Success::Verified),
        false => Err(response::Error::InvalidOrExpiredOtp),
    }
}
