use async_trait::async_trait;
use serde::Deserialize;

use crate::{
    config::SmsConfig,
    error::{AppError, Result},
    integrations::SmsGateway,
};

/// Client for the bulk SMS gateway's query-string REST API.
pub struct BulkSmsGateway {
    http: reqwest::Client,
    api_key: String,
    sender_id: String,
    base_url: String,
}

/// Gateway reply. 202 means accepted; anything else is a refusal with a
/// numeric error code.
#[derive(Debug, Deserialize)]
struct GatewayResponse {
    response_code: i64,
    #[serde(default)]
    error_message: Option<String>,
}

const RESPONSE_ACCEPTED: i64 = 202;

impl BulkSmsGateway {
    /// Returns None when SMS is disabled. Enabled-but-incomplete config
    /// is rejected earlier, at settings validation.
    pub fn new(config: SmsConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let (api_key, sender_id) = match (config.api_key, config.sender_id) {
            (Some(key), Some(sender)) => (key, sender),
            _ => return None,
        };

        Some(Self {
            http: reqwest::Client::new(),
            api_key,
            sender_id,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl SmsGateway for BulkSmsGateway {
    fn name(&self) -> &str {
        "BulkSMS"
    }

    fn is_enabled(&self) -> bool {
        true
    }

    async fn health_check(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(AppError::ServiceUnavailable("SMS API key not configured".to_string()));
        }
        Ok(())
    }

    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("type", "text"),
                ("number", phone),
                ("senderid", self.sender_id.as_str()),
                ("message", message),
            ])
            .send()
            .await
            .map_err(|e| AppError::External(format!("SMS gateway request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::External(format!("SMS gateway returned HTTP {}", status)));
        }

        let body: GatewayResponse = response
            .json()
            .await
            .map_err(|e| AppError::External(format!("SMS gateway response unreadable: {}", e)))?;

        if body.response_code != RESPONSE_ACCEPTED {
            return Err(AppError::External(format!(
                "SMS gateway rejected message: code {} ({})",
                body.response_code,
                body.error_message.unwrap_or_default()
            )));
        }

        tracing::debug!("SMS dispatched to {}", phone);
        Ok(())
    }
}

/// Stand-in gateway for local development and tests. Logs instead of
/// sending.
pub struct NoopSmsGateway;

#[async_trait]
impl SmsGateway for NoopSmsGateway {
    fn name(&self) -> &str {
        "Noop"
    }

    fn is_enabled(&self) -> bool {
        false
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }

    async fn send(&self, phone: &str, message: &str) -> Result<()> {
        tracing::info!("SMS (noop) to {}: {}", phone, message);
        Ok(())
    }
}

/// Normalize a Bangladeshi mobile number to its local 11-digit form
/// (01XXXXXXXXX). Accepts +880..., 880..., and 01... inputs.
pub fn normalize_local_phone(phone: &str) -> Result<String> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    let local = if let Some(rest) = digits.strip_prefix("880") {
        format!("0{}", rest)
    } else {
        digits
    };

    if local.len() == 11 && local.starts_with("01") {
        Ok(local)
    } else {
        Err(AppError::Validation("Invalid phone number".to_string()))
    }
}

/// International form the gateway expects: 8801XXXXXXXXX.
pub fn to_international(local: &str) -> String {
    format!("88{}", local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_plus_prefixed_numbers() {
        assert_eq!(normalize_local_phone("+8801712345678").unwrap(), "01712345678");
        assert_eq!(normalize_local_phone("8801712345678").unwrap(), "01712345678");
        assert_eq!(normalize_local_phone("01712345678").unwrap(), "01712345678");
    }

    #[test]
    fn rejects_malformed_numbers() {
        assert!(normalize_local_phone("12345").is_err());
        assert!(normalize_local_phone("02112345678").is_err());
        assert!(normalize_local_phone("").is_err());
    }

    #[test]
    fn international_form_is_88_prefixed() {
        assert_eq!(to_international("01712345678"), "8801712345678");
    }
}
