use super::types::{request, response};
use crate::types::Context;
use std::sync::Arc;
use validator::Validate;

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload.validate().map_err(|errors| {
        tracing::warn!("Failed to validate payload: {errors}");
        response::Error::FailedToValidate(errors)
    })?;

    let manager = ctx.otp.manager.clone();

    let code = manager.create(&payload.phone).await.map_err(|err| {
        tracing::error!("Failed to create otp: {}", err);
        response::Error::FailedToSendOtp
    })?;

    if !manager.send_sms(&payload.phone, &code).await {
        return Err(response::Error::FailedToSendOtp);
    }

    Ok(response::Success::OtpSent)
}
