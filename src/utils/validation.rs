use axum::{extract::rejection::JsonRejection, http::StatusCode, Json};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::borrow::Cow;
use validator::{ValidationError, ValidationErrors};

use super::phone;

pub fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    match phone::is_valid(phone_number) {
        true => Ok(()),
        false => Err(ValidationError::new("INVALID_PHONE_NUMBER")
            .with_message(Cow::from("Invalid phone number format"))),
    }
}

/// First human readable message. Fields are visited by name, rules in declaration order.
pub fn first_message(errors: &ValidationErrors) -> Option<String> {
    let mut fields = errors.field_errors().into_iter().collect::<Vec<_>>();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    fields.into_iter().find_map(|(_, errs)| {
        errs.iter()
            .find_map(|err| err.message.as_ref().map(|message| message.to_string()))
    })
}

pub fn into_response(errors: ValidationErrors) -> (StatusCode, Json<serde_json::Value>) {
    let message = first_message(&errors).unwrap_or_else(|| "Failed to validate payload".to_string());
    (
        StatusCode::BAD_REQUEST,
        Json(json!({"error": message, "errors": errors})),
    )
}

/// Reads `null` the same way as an absent field.
pub fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 400 for bodies that never made it to validation: bad JSON, wrong types, wrong content type.
pub fn rejection_response(
    rejection: JsonRejection,
    message: &str,
) -> (StatusCode, Json<serde_json::Value>) {
    tracing::warn!("Rejected request body: {}", rejection.body_text());
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use validator::Validate;

    #[derive(Deserialize, Validate)]
    struct Payload {
        #[validate(
            length(min = 1, message = "Phone number is required"),
            custom(function = "validate_phone_number")
        )]
        phone: String,
    }

    #[test]
    fn empty_phone_reports_required_first() {
        let errors = Payload {
            phone: String::new(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            first_message(&errors).as_deref(),
            Some("Phone number is required")
        );
    }

    #[test]
    fn short_phone_reports_format() {
        let errors = Payload {
            phone: "12-34".to_string(),
        }
        .validate()
        .unwrap_err();

        assert_eq!(
            first_message(&errors).as_deref(),
            Some("Invalid phone number format")
        );
    }

    #[derive(Deserialize)]
    struct Nullable {
        #[serde(default, deserialize_with = "null_as_empty")]
        phone: String,
    }

    #[test]
    fn null_reads_as_missing() {
        let payload = serde_json::from_str::<Nullable>(r#"{"phone":null}"#).unwrap();
        assert_eq!(payload.phone, "");

        let payload = serde_json::from_str::<Nullable>("{}").unwrap();
        assert_eq!(payload.phone, "");

        assert!(serde_json::from_str::<Nullable>(r#"{"phone":9876543210}"#).is_err());
    }

    #[test]
    fn international_format_passes() {
        assert!(Payload {
            phone: "+91 98765-43210".to_string(),
        }
        .validate()
        .is_ok());
    }
}
