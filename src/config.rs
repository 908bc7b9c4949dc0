use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use url::Url;

/// Process-wide configuration, loaded once from defaults and `TRADEBOOK_*` env vars.
pub static CONFIG: LazyLock<Config> =
    LazyLock::new(|| Config::load().expect("FATAL: failed to load tradebook configuration"));

/// Fallback digest recipient when none is configured.
pub const DEFAULT_DIGEST_RECIPIENT: &str = "admin@nilathundi.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub mail: MailConfig,
    pub digest: DigestConfig,
    pub company: CompanyConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Shared key required on every `/api` route except the cron endpoint.
    /// Unset means the office API refuses every request.
    pub office_key: Option<String>,
    /// Request body limit for mail routes carrying attachments.
    pub body_limit_mb: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailConfig {
    pub api_url: Url,
    pub api_key: Option<String>,
    pub sender: String,
    pub reply_to: String,
    pub requests_per_second: u32,
    pub retry_times: usize,
    /// Whole-request timeout for one provider call.
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub cron_secret: Option<String>,
    /// Comma separated recipient list.
    pub recipients: String,
    pub sender: String,
    /// Fixed business timezone offset used to decide what "today" is.
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanyConfig {
    pub name: String,
    pub default_unit_price: f64,
    /// Conversion used to estimate weight for orders priced in USD.
    pub usd_per_kg: f64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://tradebook.sqlite".to_string(),
            loglevel: "info".to_string(),
            office_key: None,
            body_limit_mb: 25,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_url: Url::parse("https://api.resend.com/emails").expect("static url is valid"),
            api_key: None,
            sender: "Nila Thundi <admin@nilathundi.com>".to_string(),
            reply_to: "abdulla.yarmin@gmail.com".to_string(),
            requests_per_second: 2,
            retry_times: 3,
            timeout_ms: 30_000,
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            cron_secret: None,
            recipients: DEFAULT_DIGEST_RECIPIENT.to_string(),
            sender: "Nila Thundi System <admin@nilathundi.com>".to_string(),
            utc_offset_hours: 5,
        }
    }
}

impl Default for CompanyConfig {
    fn default() -> Self {
        Self {
            name: "Nila Thundi Investment".to_string(),
            default_unit_price: 169.62,
            usd_per_kg: 11.0,
        }
    }
}

impl Config {
    /// Defaults first, then `TRADEBOOK_SECTION__FIELD` environment overrides.
    pub fn load() -> Result<Self, figment::Error> {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Env::prefixed("TRADEBOOK_").split("__"))
            .extract()
    }
}

impl DigestConfig {
    pub fn recipient_list(&self) -> Vec<String> {
        let list: Vec<String> = self
            .recipients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        if list.is_empty() {
            vec![DEFAULT_DIGEST_RECIPIENT.to_string()]
        } else {
            list
        }
    }
}
