pub mod request {
    use crate::utils::validation;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Payload {
        #[serde(default, deserialize_with = "validation::null_as_empty")]
        #[validate(length(min = 1, message = "Phone and OTP code are required"))]
        pub phone: String,
        #[serde(default, deserialize_with = "validation::null_as_empty")]
        #[validate(length(min = 1, message = "Phone and OTP code are required"))]
        pub code: String,
    }
}

pub mod response {
    use crate::{
        modules::{auth::repository::session::Session, user::repository::User},
        utils::validation,
    };
    use axum::{
        extract::{rejection::JsonRejection, Json},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        Authenticated { session: Session, user: User },
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::Authenticated { session, user } => (
                    StatusCode::OK,
                    Json(json!({
                        "access_token": session.access_token,
                        "refresh_token": session.refresh_token,
                        "user": {
                            "id": user.id,
                            "username": user.username,
                            "email": user.email,
                            "phone_number": user.phone_number,
                        },
                    })),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        UnreadablePayload(JsonRejection),
        FailedToValidate(ValidationErrors),
        InvalidOrExpiredOtp,
        FailedToFetchUser,
        FailedToCreateUser,
        UsernameUnavailable,
        FailedToCreateSession,
        UnexpectedError,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::UnreadablePayload(rejection) => validation::rejection_response(
                    rejection,
                    "Phone and OTP code are required",
                )
                .into_response(),
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::InvalidOrExpiredOtp => (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error" : "Invalid or expired OTP"})),
                )
                    .into_response(),
                Self::FailedToFetchUser
                | Self::FailedToCreateUser
                | Self::UsernameUnavailable
                | Self::FailedToCreateSession
                | Self::UnexpectedError => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Authentication failed" })),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
