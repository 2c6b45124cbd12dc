use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to reach sms gateway: {0}")]
    NotSent(String),
    #[error("sms gateway responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("unreadable sms gateway response: {0}")]
    InvalidResponse(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq)]
pub struct SmsReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    async fn send(&self, recipient: &str, content: &str) -> Result<SmsReceipt>;
}

#[derive(Serialize)]
struct BrevoSmsRequest<'a> {
    sender: &'a str,
    recipient: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    type_: &'a str,
}

#[derive(Deserialize, Debug)]
struct BrevoSmsResponse {
    #[serde(rename = "messageId")]
    message_id: Option<Value>,
    id: Option<Value>,
}

fn identifier(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(id) if !id.is_empty() => Some(id),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

fn parse_response(status: StatusCode, body: &str) -> Result<SmsReceipt> {
    if !status.is_success() {
        return Err(Error::Rejected {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let res = serde_json::from_str::<BrevoSmsResponse>(body)
        .map_err(|err| Error::InvalidResponse(err.to_string()))?;

    Ok(SmsReceipt {
        message_id: identifier(res.message_id).or_else(|| identifier(res.id)),
    })
}

/// Brevo transactional SMS.
pub struct BrevoSmsGateway {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    sender_name: String,
}

impl BrevoSmsGateway {
    pub fn new(endpoint: String, api_key: String, sender_name: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
            api_key,
            sender_name,
        }
    }
}

#[async_trait]
impl SmsGateway for BrevoSmsGateway {
    async fn send(&self, recipient: &str, content: &str) -> Result<SmsReceipt> {
        let res = self
            .client
            .post(self.endpoint.as_str())
            .header("accept", "application/json")
            .header("api-key", self.api_key.as_str())
            .json(&BrevoSmsRequest {
                sender: &self.sender_name,
                recipient,
                content,
                type_: "transactional",
            })
            .send()
            .await
            .map_err(|err| {
                tracing::error!("Failed to send sms: {}", err);
                Error::NotSent(err.to_string())
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|err| {
            tracing::error!("Failed to get sms response body: {}", err);
            Error::InvalidResponse(err.to_string())
        })?;

        parse_response(status, &body).map_err(|err| {
            tracing::error!("Brevo sms api error: {}", err);
            err
        })
    }
}
