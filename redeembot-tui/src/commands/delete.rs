// File: redeembot-tui/src/commands/delete.rs

use super::{CommandContext, CommandOutcome};

pub async fn handle_delete_command(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() != 2 {
        return CommandOutcome::usage("delete <id|cdk> <group|name>");
    }
    let target = &args[1];
    let mut registry = ctx.registry.lock().await;

    match args[0].to_lowercase().as_str() {
        "id" => match registry.delete_by_group(target).await {
            Ok(true) => CommandOutcome::success(format!("Deleted group '{target}'.")),
            Ok(false) => CommandOutcome::user_error(format!("No group '{target}'.")),
            Err(e) => e.into(),
        },
        "cdk" => match registry.delete_by_name(target).await {
            Ok(true) => CommandOutcome::success(format!("Deleted CDK '{target}'.")),
            Ok(false) => CommandOutcome::user_error(format!("No CDK named '{target}'.")),
            Err(e) => e.into(),
        },
        _ => CommandOutcome::usage("delete <id|cdk> <group|name>"),
    }
}
