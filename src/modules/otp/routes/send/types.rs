pub mod request {
    use crate::utils::validation::{self, validate_phone_number};
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    pub struct Payload {
        #[serde(default, deserialize_with = "validation::null_as_empty")]
        #[validate(
            length(min = 1, message = "Phone number is required"),
            custom(function = "validate_phone_number")
        )]
        pub phone: String,
    }
}

pub mod response {
    use crate::utils::validation;
    use axum::{
        extract::{rejection::JsonRejection, Json},
        http::StatusCode,
        response::IntoResponse,
    };
    use serde_json::json;
    use validator::ValidationErrors;

    pub enum Success {
        OtpSent,
    }

    impl IntoResponse for Success {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::OtpSent => (
                    StatusCode::OK,
                    Json(json!({"message": "OTP sent successfully to your phone number"})),
                )
                    .into_response(),
            }
        }
    }

    pub enum Error {
        UnreadablePayload(JsonRejection),
        FailedToValidate(ValidationErrors),
        FailedToSendOtp,
    }

    impl IntoResponse for Error {
        fn into_response(self) -> axum::response::Response {
            match self {
                Self::UnreadablePayload(rejection) => {
                    validation::rejection_response(rejection, "Phone number is required").into_response()
                }
                Self::FailedToValidate(errors) => validation::into_response(errors).into_response(),
                Self::FailedToSendOtp => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Failed to send OTP"})),
                )
                    .into_response(),
            }
        }
    }

    pub type Response = Result<Success, Error>;
}
