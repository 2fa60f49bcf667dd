//! Configuration module
//!
//! All settings are read from the environment at process start and are
//! read-only afterwards. Relay credentials and template ids are never
//! compiled in; a missing required variable fails startup.

use std::env;
use std::time::Duration;

use chrono_tz::Tz;

// Common constants
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_RELAY_API_BASE: &str = "https://api.emailjs.com";
const RELAY_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_BUSINESS_TIMEZONE: &str = "America/New_York";
const HTTP_RATE_LIMIT_PER_MINUTE: u32 = 30;
const SUBMISSION_TTL_SECONDS: u64 = 3600;
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Settings for the external transactional-email relay.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub api_base: String,
    pub service_id: String,
    pub public_key: String,
    /// Server-side access token; the relay accepts sends without it when the
    /// account allows API-key-only access.
    pub private_key: Option<String>,
    pub contact_auto_reply_template: String,
    pub contact_notification_template: String,
    pub pilot_auto_reply_template: String,
    pub pilot_notification_template: String,
    pub timeout_seconds: u64,
}

impl RelayConfig {
    /// Bounded deadline applied to every relay send.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub relay: RelayConfig,
    /// Recipient of the business notification email.
    pub sales_inbox: String,
    /// Fallback contact surfaced in delivery-failure messages.
    pub support_email: String,
    /// Zone used to render the human-readable dispatch timestamp.
    pub business_timezone: Tz,
    pub http_rate_limit_per_minute: u32,
    pub submission_ttl_seconds: u64,
    pub max_body_bytes: usize,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn submission_ttl(&self) -> Duration {
        Duration::from_secs(self.submission_ttl_seconds)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let business_timezone: Tz = env::var("BUSINESS_TIMEZONE")
            .unwrap_or_else(|_| DEFAULT_BUSINESS_TIMEZONE.to_string())
            .parse()
            .map_err(|_| {
                anyhow::anyhow!("BUSINESS_TIMEZONE must be a valid IANA timezone name")
            })?;

        let relay = RelayConfig {
            api_base: env::var("RELAY_API_BASE")
                .unwrap_or_else(|_| DEFAULT_RELAY_API_BASE.to_string()),
            service_id: env::var("RELAY_SERVICE_ID")
                .map_err(|_| anyhow::anyhow!("RELAY_SERVICE_ID must be set"))?,
            public_key: env::var("RELAY_PUBLIC_KEY")
                .map_err(|_| anyhow::anyhow!("RELAY_PUBLIC_KEY must be set"))?,
            private_key: env::var("RELAY_PRIVATE_KEY").ok().filter(|s| !s.is_empty()),
            contact_auto_reply_template: env::var("RELAY_CONTACT_AUTOREPLY_TEMPLATE")
                .map_err(|_| anyhow::anyhow!("RELAY_CONTACT_AUTOREPLY_TEMPLATE must be set"))?,
            contact_notification_template: env::var("RELAY_CONTACT_NOTIFICATION_TEMPLATE")
                .map_err(|_| {
                    anyhow::anyhow!("RELAY_CONTACT_NOTIFICATION_TEMPLATE must be set")
                })?,
            pilot_auto_reply_template: env::var("RELAY_PILOT_AUTOREPLY_TEMPLATE")
                .map_err(|_| anyhow::anyhow!("RELAY_PILOT_AUTOREPLY_TEMPLATE must be set"))?,
            pilot_notification_template: env::var("RELAY_PILOT_NOTIFICATION_TEMPLATE")
                .map_err(|_| anyhow::anyhow!("RELAY_PILOT_NOTIFICATION_TEMPLATE must be set"))?,
            timeout_seconds: env::var("RELAY_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| RELAY_TIMEOUT_SECONDS.to_string())
                .parse()
                .unwrap_or(RELAY_TIMEOUT_SECONDS),
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            relay,
            sales_inbox: env::var("SALES_INBOX")
                .map_err(|_| anyhow::anyhow!("SALES_INBOX must be set"))?,
            support_email: env::var("SUPPORT_EMAIL")
                .unwrap_or_else(|_| "support@lumiq.ai".to_string()),
            business_timezone,
            http_rate_limit_per_minute: env::var("HTTP_RATE_LIMIT_PER_MINUTE")
                .unwrap_or_else(|_| HTTP_RATE_LIMIT_PER_MINUTE.to_string())
                .parse()
                .unwrap_or(HTTP_RATE_LIMIT_PER_MINUTE),
            submission_ttl_seconds: env::var("SUBMISSION_TTL_SECONDS")
                .unwrap_or_else(|_| SUBMISSION_TTL_SECONDS.to_string())
                .parse()
                .unwrap_or(SUBMISSION_TTL_SECONDS),
            max_body_bytes: env::var("MAX_BODY_BYTES")
                .unwrap_or_else(|_| MAX_BODY_BYTES.to_string())
                .parse()
                .unwrap_or(MAX_BODY_BYTES),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.relay.timeout_seconds == 0 {
            return Err(anyhow::anyhow!(
                "RELAY_TIMEOUT_SECONDS must be greater than zero"
            ));
        }

        if !self.sales_inbox.contains('@') {
            return Err(anyhow::anyhow!("SALES_INBOX must be an email address"));
        }

        if !self.support_email.contains('@') {
            return Err(anyhow::anyhow!("SUPPORT_EMAIL must be an email address"));
        }

        let required = [
            ("RELAY_SERVICE_ID", &self.relay.service_id),
            ("RELAY_PUBLIC_KEY", &self.relay.public_key),
            (
                "RELAY_CONTACT_AUTOREPLY_TEMPLATE",
                &self.relay.contact_auto_reply_template,
            ),
            (
                "RELAY_CONTACT_NOTIFICATION_TEMPLATE",
                &self.relay.contact_notification_template,
            ),
            (
                "RELAY_PILOT_AUTOREPLY_TEMPLATE",
                &self.relay.pilot_auto_reply_template,
            ),
            (
                "RELAY_PILOT_NOTIFICATION_TEMPLATE",
                &self.relay.pilot_notification_template,
            ),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("{} must not be empty", name));
            }
        }

        if self.http_rate_limit_per_minute == 0 {
            return Err(anyhow::anyhow!(
                "HTTP_RATE_LIMIT_PER_MINUTE must be greater than zero"
            ));
        }

        Ok(())
    }
}
