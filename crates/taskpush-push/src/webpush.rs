use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{
    header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE},
    StatusCode, Url,
};
use taskpush_core::{config::PushConfig, ReminderPayload};
use tracing::{debug, info};

use crate::dispatcher::Dispatcher;
use crate::ece;
use crate::error::{DispatchError, Result};
use crate::types::Subscription;
use crate::vapid::{decode_base64url, VapidSigner};

/// Max bytes of a push-service error body kept for logs.
const MAX_ERROR_BODY: usize = 256;

/// Delivers encrypted notifications straight to browser push services.
pub struct WebPushDispatcher {
    client: reqwest::Client,
    signer: VapidSigner,
    ttl_secs: u32,
}

impl WebPushDispatcher {
    pub fn new(signer: VapidSigner, ttl_secs: u32, request_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(request_timeout).build()?;
        Ok(Self {
            client,
            signer,
            ttl_secs,
        })
    }

    /// `Ok(None)` when the VAPID key pair is not configured.
    pub fn from_config(config: &PushConfig) -> Result<Option<Self>> {
        let Some((public, private)) = config.vapid_keys() else {
            return Ok(None);
        };
        let signer = VapidSigner::from_base64(public, private, config.vapid_subject.clone())?;
        info!(subject = %config.vapid_subject, "web push dispatcher configured");
        Self::new(
            signer,
            config.ttl_secs,
            Duration::from_secs(config.request_timeout_secs),
        )
        .map(Some)
    }

    pub fn public_key(&self) -> &str {
        self.signer.public_key()
    }
}

#[async_trait]
impl Dispatcher for WebPushDispatcher {
    fn name(&self) -> &str {
        "web-push"
    }

    async fn deliver(&self, subscription: &Subscription, payload: &ReminderPayload) -> Result<()> {
        let endpoint = Url::parse(&subscription.endpoint)
            .map_err(|e| DispatchError::InvalidSubscription(format!("bad endpoint: {e}")))?;
        if !matches!(endpoint.scheme(), "https" | "http") {
            return Err(DispatchError::InvalidSubscription(format!(
                "unsupported endpoint scheme: {}",
                endpoint.scheme()
            )));
        }

        let ua_public = decode_base64url(&subscription.keys.p256dh)
            .map_err(|e| DispatchError::InvalidSubscription(format!("p256dh: {e}")))?;
        let auth_secret = decode_base64url(&subscription.keys.auth)
            .map_err(|e| DispatchError::InvalidSubscription(format!("auth: {e}")))?;

        let json = payload
            .to_json()
            .map_err(|e| DispatchError::Encryption(format!("payload serialization: {e}")))?;
        let body = ece::encrypt(json.as_bytes(), &ua_public, &auth_secret)?;
        let authorization = self.signer.authorization(&endpoint, Utc::now().timestamp())?;

        let resp = self
            .client
            .post(endpoint)
            .header("TTL", self.ttl_secs.to_string())
            .header("Urgency", "normal")
            .header(CONTENT_ENCODING, "aes128gcm")
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(AUTHORIZATION, authorization)
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if status.is_success() {
            debug!(endpoint = %subscription.endpoint, status = status.as_u16(), "push accepted");
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            return Err(DispatchError::Gone {
                status: status.as_u16(),
            });
        }

        let mut text = resp.text().await.unwrap_or_default();
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body: text,
        })
    }
}
