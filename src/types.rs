pub use crate::utils::database;
use crate::modules::{notification::service::sms::BrevoSmsGateway, otp};
use async_trait::async_trait;
use std::env;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_SMS_SENDER_NAME: &str = "YugaFarms";
pub const DEFAULT_SMS_ENDPOINT: &str = "https://api.brevo.com/v3/transactionalSMS/send";
const DEFAULT_OTP_SWEEP_INTERVAL_SECS: u64 = 60 * 60;

#[derive(Clone, Debug, PartialEq)]
pub enum AppEnvironment {
    Production,
    Development,
}

impl AppEnvironment {
    pub fn from(raw_environment: String) -> Self {
        match raw_environment.as_ref() {
            "production" => Self::Production,
            _ => Self::Development,
        }
    }
}

#[derive(Clone)]
pub struct AppContext {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct OtpContext {
    pub manager: Arc<otp::service::OtpManager>,
    pub sweep_interval: Duration,
}

#[derive(Clone)]
pub struct Context {
    pub app: AppContext,
    pub db_conn: database::DatabaseConnection,
    pub otp: OtpContext,
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub environment: AppEnvironment,
    pub port: u32,
    pub url: String,
}

#[derive(Clone)]
pub struct SmsConfig {
    pub api_key: String,
    pub sender_name: String,
    pub endpoint: String,
}

#[derive(Clone)]
pub struct OtpConfig {
    pub sweep_interval: Duration,
}

#[derive(Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub app: AppConfig,
    pub sms: SmsConfig,
    pub otp: OtpConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn optional(key: &'static str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse<T: std::str::FromStr>(key: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse::<T>().map_err(|_| ConfigError::Invalid(key, raw))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = required("DATABASE_URL")?;
        let host = optional("HOST", "0.0.0.0");
        let environment = optional("APP_ENV", "development");
        let port = parse::<u32>("PORT", optional("PORT", "1337"))?;
        let url = env::var("URL").unwrap_or_else(|_| format!("http://{}:{}", host, port));
        let sms_api_key = required("BREVO_API_KEY")?;
        let sms_sender_name = optional("BREVO_SMS_SENDER_NAME", DEFAULT_SMS_SENDER_NAME);
        let sms_endpoint = optional("BREVO_SMS_ENDPOINT", DEFAULT_SMS_ENDPOINT);
        let otp_sweep_interval_secs = parse::<u64>(
            "OTP_SWEEP_INTERVAL_SECS",
            optional(
                "OTP_SWEEP_INTERVAL_SECS",
                &DEFAULT_OTP_SWEEP_INTERVAL_SECS.to_string(),
            ),
        )?;

        if otp_sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "OTP_SWEEP_INTERVAL_SECS",
                otp_sweep_interval_secs.to_string(),
            ));
        }

        Ok(Self {
            database: DatabaseConfig { url: database_url },
            app: AppConfig {
                host,
                environment: AppEnvironment::from(environment),
                port,
                url,
            },
            sms: SmsConfig {
                api_key: sms_api_key,
                sender_name: sms_sender_name,
                endpoint: sms_endpoint,
            },
            otp: OtpConfig {
                sweep_interval: Duration::from_secs(otp_sweep_interval_secs),
            },
        })
    }
}

pub type JobFn =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> + Send + Sync>;

pub struct SchedulableJob {
    pub name: &'static str,
    pub interval: Duration,
    pub job: JobFn,
}

impl SchedulableJob {
    pub fn new<F, Fut>(name: &'static str, interval: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        Self {
            name,
            interval,
            job: Arc::new(
                move || -> Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> {
                    Box::pin(job())
                },
            ),
        }
    }
}

#[async_trait]
pub trait ToContext {
    async fn to_context(self) -> anyhow::Result<Context>;
}

#[async_trait]
impl ToContext for Config {
    async fn to_context(self) -> anyhow::Result<Context> {
        let db_conn = database::connect(self.database.url.as_str()).await?;
        database::migrate(&db_conn).await?;

        let store = Arc::new(otp::repository::PgOtpStore::new(db_conn.pool.clone()));
        let gateway = Arc::new(BrevoSmsGateway::new(
            self.sms.endpoint,
            self.sms.api_key,
            self.sms.sender_name.clone(),
        ));
        let manager = otp::service::OtpManager::new(store, gateway)
            .with_sender_name(self.sms.sender_name);

        Ok(Context {
            app: AppContext {
                host: self.app.host,
                environment: self.app.environment,
                port: self.app.port,
                url: self.app.url,
            },
            db_conn,
            otp: OtpContext {
                manager: Arc::new(manager),
                sweep_interval: self.otp.sweep_interval,
            },
        })
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use sqlx::{postgres::PgPoolOptions, PgPool};

    /// Context around `manager` whose database pool never connects unless used.
    pub fn context(manager: otp::service::OtpManager) -> Arc<Context> {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://postgres@localhost/yugafarms_test")
            .unwrap();

        context_with_pool(manager, pool)
    }

    pub fn context_with_pool(manager: otp::service::OtpManager, pool: PgPool) -> Arc<Context> {
        Arc::new(Context {
            app: AppContext {
                host: "127.0.0.1".to_string(),
                environment: AppEnvironment::Development,
                port: 1337,
                url: "http://127.0.0.1:1337".to_string(),
            },
            db_conn: database::DatabaseConnection { pool },
            otp: OtpContext {
                manager: Arc::new(manager),
                sweep_interval: Duration::from_secs(3600),
            },
        })
    }

    /// Migrated pool for `TEST_DATABASE_URL`, or `None` when it is unset.
    pub async fn database() -> Option<PgPool> {
        let Ok(url) = env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping database test");
            return None;
        };

        let db_conn = database::connect(&url).await.unwrap();
        database::migrate(&db_conn).await.unwrap();
        Some(db_conn.pool)
    }
}
