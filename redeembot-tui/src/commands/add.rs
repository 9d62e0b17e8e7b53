// File: redeembot-tui/src/commands/add.rs

use redeembot_core::services::GroupExtension;

use super::{parse_count, CommandContext, CommandOutcome};

pub async fn handle_add_command(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() != 2 {
        return CommandOutcome::usage("add <group> <count>");
    }
    let group_id = &args[0];
    let count = match parse_count(&args[1]) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };

    let mut registry = ctx.registry.lock().await;
    match registry.extend_group(group_id, count).await {
        Ok(GroupExtension::Cloned(names)) => {
            let mut output = format!("Added {} single-use CDKs to group '{}':\n", names.len(), group_id);
            for name in &names {
                output.push_str(&format!("  {name}\n"));
            }
            CommandOutcome::success(output.trim_end())
        }
        Ok(GroupExtension::Increased { name, remaining_uses }) => CommandOutcome::success(format!(
            "CDK '{name}' in group '{group_id}' now has {remaining_uses} uses."
        )),
        Err(e) => e.into(),
    }
}
