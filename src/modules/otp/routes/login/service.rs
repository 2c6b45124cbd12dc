use super::types::{request, response};
use crate::{
    modules::{
        auth::service,
        user::{self, repository::User},
    },
    types::Context,
    utils::phone,
};
use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use validator::Validate;

async fn register(
    tx: &mut Transaction<'_, Postgres>,
    phone_number: &str,
) -> Result<User, response::Error> {
    for username in user::repository::username_candidates(phone_number) {
        let taken = user::repository::find_by_username(&mut **tx, username.clone())
            .await
            .map_err(|_| response::Error::FailedToFetchUser)?
            .is_some();

        if taken {
            tracing::debug!("Username {} is taken", username);
            continue;
        }

        let user = user::repository::create(
            &mut **tx,
            user::repository::CreateUserPayload {
                username,
                phone_number: phone_number.to_string(),
            },
        )
        .await
        .map_err(|_| response::Error::FailedToCreateUser)?;

        tracing::info!("Registered user {} for {}", user.id, phone_number);
        return Ok(user);
    }

    tracing::error!("No free username left for {}", phone_number);
    Err(response::Error::UsernameUnavailable)
}

pub async fn service(ctx: Arc<Context>, payload: request::Payload) -> response::Response {
    payload
        .validate()
        .map_err(response::Error::FailedToValidate)?;

    let phone_number = phone::normalize(&payload.phone);

    if !ctx.otp.manager.verify(&phone_number, &payload.code).await {
        return Err(response::Error::InvalidOrExpiredOtp);
    }

    let mut tx = ctx.db_conn.pool.begin().await.map_err(|err| {
        tracing::error!("Failed to start database transaction: {}", err);
        response::Error::UnexpectedError
    })?;

    let user = match user::repository::find_by_phone_number(&mut *tx, phone_number.clone())
        .await
        .map_err(|_| response::Error::FailedToFetchUser)?
    {
        Some(user) => user,
        None => register(&mut tx, &phone_number).await?,
    };

    let session = service::auth::create_session(&mut *tx, user.id.clone())
        .await
        .map_err(|_| response::Error::FailedToCreateSession)?;
    tracing::info!(
        "Issued session {} for user {} (access until {}, refresh until {})",
        session.id,
        session.user_id,
        session.access_token_expires_at,
        session.refresh_token_expires_at
    );

    tx.commit()
        .await
        .map(|_| response::Success::Authenticated { session, user })
        .map_err(|err| {
            tracing::error!("Failed to commit transaction: {}", err);
            response::Error::UnexpectedError
        })
}
