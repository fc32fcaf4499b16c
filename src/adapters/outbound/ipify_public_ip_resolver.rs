//! ipify Public IP Resolver
//!
//! Implements PublicIpResolver with a plain-text "what is my IP" endpoint.

use crate::domain::errors::ProviderError;
use crate::domain::ports::PublicIpResolver;
use async_trait::async_trait;

/// Default public endpoint.
pub const DEFAULT_PUBLIC_IP_URL: &str = "https://api.ipify.org";

/// Public IP resolver that reads the address from a text response body.
pub struct IpifyPublicIpResolver {
    client: reqwest::Client,
    url: String,
}

impl IpifyPublicIpResolver {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl PublicIpResolver for IpifyPublicIpResolver {
    async fn public_ip(&self) -> Result<String, ProviderError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "unexpected status {status}"
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let ip = text.trim();
        if ip.is_empty() {
            return Err(ProviderError::Malformed("empty response body".to_string()));
        }
        Ok(ip.to_string())
    }
}
