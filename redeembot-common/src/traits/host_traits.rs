// File: redeembot-common/src/traits/host_traits.rs

use async_trait::async_trait;

use crate::error::Error;

/// Fires a command into the host environment as a privileged actor.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn dispatch(&self, command: &str) -> Result<(), Error>;
}
