// redeembot-core/src/services/command_executor.rs

use async_trait::async_trait;
use tracing::info;

use redeembot_common::traits::host_traits::CommandExecutor;
use redeembot_common::Error;

/// Executor used when no host is attached: every command is written to the log.
#[derive(Debug, Default, Clone)]
pub struct LoggingCommandExecutor;

#[async_trait]
impl CommandExecutor for LoggingCommandExecutor {
    async fn dispatch(&self, command: &str) -> Result<(), Error> {
        info!(target: "redeembot::dispatch", "{}", command);
        Ok(())
    }
}
