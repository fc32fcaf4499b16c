//! Public IP Resolver Port

use crate::domain::errors::ProviderError;
use async_trait::async_trait;

/// "What is my IP" service.
///
/// Reports the public address this process appears to have. Used when a
/// lookup request does not name an IP.
#[async_trait]
pub trait PublicIpResolver: Send + Sync {
    async fn public_ip(&self) -> Result<String, ProviderError>;
}
