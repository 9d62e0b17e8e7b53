// File: redeembot-tui/src/commands/list.rs

use std::collections::BTreeMap;

use redeembot_common::models::Cdk;

use super::{CommandContext, CommandOutcome};

pub async fn handle_list_command(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() > 1 {
        return CommandOutcome::usage("list [group]");
    }
    let registry = ctx.registry.lock().await;

    if let Some(group_id) = args.first() {
        return match registry.find_group(group_id) {
            Some(group) => CommandOutcome::success(format_group(group_id, group).trim_end()),
            None => CommandOutcome::user_error(format!("No group '{group_id}'.")),
        };
    }

    let all = registry.get_all();
    if all.is_empty() {
        return CommandOutcome::success("No CDKs.");
    }
    let mut output = format!("{} CDKs in {} groups:\n", registry.len(), all.len());
    for (group_id, group) in all {
        output.push_str(&format_group(group_id, group));
    }
    CommandOutcome::success(output.trim_end())
}

fn format_group(group_id: &str, group: &BTreeMap<String, Cdk>) -> String {
    let mut output = format!("[{group_id}]\n");
    for cdk in group.values() {
        output.push_str(&format!(
            "  {:<16} {:>5} left  {:<10}  expires {}  commands: {}\n",
            cdk.name,
            cdk.remaining_uses,
            if cdk.single_use { "single-use" } else { "multi-use" },
            cdk.expiry_label(),
            cdk.command_template
        ));
    }
    output
}
