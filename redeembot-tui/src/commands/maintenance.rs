// File: redeembot-tui/src/commands/maintenance.rs

use redeembot_core::repositories::yaml::export::export_code_names;

use super::{CommandContext, CommandOutcome};

pub const EXPORT_FILE_NAME: &str = "export.yml";

pub async fn handle_export_command(ctx: &CommandContext) -> CommandOutcome {
    let path = ctx.data_dir.join(EXPORT_FILE_NAME);
    let registry = ctx.registry.lock().await;
    match export_code_names(&path, registry.get_all()).await {
        Ok(count) => CommandOutcome::success(format!("Exported {count} CDK names to {}.", path.display())),
        Err(e) => e.into(),
    }
}

pub async fn handle_reload_command(ctx: &CommandContext) -> CommandOutcome {
    let mut registry = ctx.registry.lock().await;
    match registry.reload().await {
        Ok(count) => CommandOutcome::success(format!(
            "Reloaded {count} CDKs from the {} store.",
            registry.store_kind()
        )),
        Err(e) => e.into(),
    }
}
