//! Thin client for the transactional mail provider (Resend-compatible JSON API).

use backon::{ExponentialBuilder, Retryable};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::MailConfig;
use crate::error::{MailProviderError, TradebookError};

/// File attached to an outgoing message; `content` is plain base64.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}

impl Attachment {
    /// Accepts either bare base64 or a `data:<mime>;base64,<payload>` URL.
    /// The payload must decode, so garbage is rejected before it reaches the provider.
    pub fn from_base64(filename: impl Into<String>, raw: &str) -> Result<Self, TradebookError> {
        let payload = match raw.split_once("base64,") {
            Some((_, rest)) => rest,
            None => raw,
        };
        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(&payload)?;
        Ok(Self {
            filename: filename.into(),
            content: payload,
        })
    }

    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            filename: filename.into(),
            content: STANDARD.encode(bytes),
        }
    }
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct OutgoingMail {
    pub from: String,
    pub to: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
    pub subject: String,
    pub html: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Deserialize)]
struct SendReceipt {
    id: String,
}

fn default_retry_policy(times: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(3))
        .with_max_times(times)
        .with_jitter()
}

#[derive(Clone)]
pub struct MailClient {
    http: reqwest::Client,
    limiter: Arc<DefaultDirectRateLimiter>,
    retry_policy: ExponentialBuilder,
    api_url: Url,
    api_key: Option<Arc<str>>,
    sender: String,
    reply_to: String,
    /// Prefix of every idempotency key issued by this client.
    instance: Arc<str>,
    sends: Arc<AtomicU64>,
}

impl MailClient {
    pub fn new(cfg: &MailConfig) -> Result<Self, TradebookError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tradebook/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_millis(cfg.timeout_ms.max(1)))
            .build()?;
        let per_second = NonZeroU32::new(cfg.requests_per_second).unwrap_or(NonZeroU32::MIN);
        Ok(Self {
            http,
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(per_second))),
            retry_policy: default_retry_policy(cfg.retry_times),
            api_url: cfg.api_url.clone(),
            api_key: cfg.api_key.as_deref().filter(|k| !k.is_empty()).map(Arc::from),
            sender: cfg.sender.clone(),
            reply_to: cfg.reply_to.clone(),
            instance: Arc::from(format!(
                "tradebook-{}",
                chrono::Utc::now().timestamp_micros()
            )),
            sends: Arc::new(AtomicU64::new(0)),
        })
    }

    /// One key per logical message, reused by every retry of it.
    fn idempotency_key(&self) -> String {
        let seq = self.sends.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", self.instance)
    }

    /// Default identity for office mail: configured sender with reply-to set.
    pub fn office_mail(&self) -> OutgoingMail {
        OutgoingMail {
            from: self.sender.clone(),
            reply_to: Some(self.reply_to.clone()),
            ..OutgoingMail::default()
        }
    }

    /// Deliver `mail` and return the provider's message id.
    pub async fn send(&self, mail: &OutgoingMail) -> Result<String, TradebookError> {
        let api_key = self
            .api_key
            .clone()
            .ok_or(TradebookError::MissingConfig("mail.api_key"))?;
        if mail.to.is_empty() {
            return Err(TradebookError::validation("at least one recipient is required"));
        }

        let idempotency_key = self.idempotency_key();
        let receipt = (|| async {
            self.limiter.until_ready().await;
            self.post_once(&api_key, &idempotency_key, mail).await
        })
            .retry(self.retry_policy)
            .when(|e: &TradebookError| e.is_retryable())
            .notify(|err, dur: Duration| {
                warn!("mail send retrying after error {}, sleeping {:?}", err, dur);
            })
            .await?;

        info!(
            id = %receipt.id,
            to = mail.to.len(),
            attachments = mail.attachments.len(),
            subject = %mail.subject,
            "mail accepted by provider"
        );
        Ok(receipt.id)
    }

    async fn post_once(
        &self,
        api_key: &str,
        idempotency_key: &str,
        mail: &OutgoingMail,
    ) -> Result<SendReceipt, TradebookError> {
        let resp = self
            .http
            .post(self.api_url.clone())
            .bearer_auth(api_key)
            .header("Idempotency-Key", idempotency_key)
            .json(mail)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<MailProviderError>(&text)
                .ok()
                .and_then(|e| e.message.or(e.name))
                .unwrap_or_else(|| format!("provider responded with {status}"));
            warn!(status = %status, message = %message, "mail provider rejected request");
            return Err(TradebookError::MailProvider { status, message });
        }
        let receipt: SendReceipt = resp.json().await?;
        debug!(id = %receipt.id, "provider receipt");
        Ok(receipt)
    }
}
