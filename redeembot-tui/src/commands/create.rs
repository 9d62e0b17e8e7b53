// File: redeembot-tui/src/commands/create.rs

use super::{parse_count, CommandContext, CommandOutcome};
use crate::tokenizer::split_template_and_expiry;

const USAGE_SINGLE: &str = "create single <group> <count> <commands> [yyyy-mm-dd HH:MM]";
const USAGE_MULTIPLE: &str =
    "create multiple <name|random> <group> <count> <commands> [yyyy-mm-dd HH:MM]";

pub async fn handle_create_command(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    let Some(kind) = args.first() else {
        return CommandOutcome::usage("create <single|multiple> ...");
    };

    match kind.to_lowercase().as_str() {
        "single" => create_single(&args[1..], ctx).await,
        "multiple" => create_multiple(&args[1..], ctx).await,
        _ => CommandOutcome::usage("create <single|multiple> ..."),
    }
}

async fn create_single(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() < 3 {
        return CommandOutcome::usage(USAGE_SINGLE);
    }
    let group_id = &args[0];
    let count = match parse_count(&args[1]) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    let (template, expires_at) = match split_template_and_expiry(&args[2..]) {
        Ok(parts) => parts,
        Err(e) => return e.into(),
    };

    let mut registry = ctx.registry.lock().await;
    match registry.create_single_batch(group_id, count, &template, expires_at).await {
        Ok(created) => {
            let mut output = format!("Created {} single-use CDKs in group '{}':\n", created.len(), group_id);
            for cdk in &created {
                output.push_str(&format!("  {}\n", cdk.name));
            }
            CommandOutcome::success(output.trim_end())
        }
        Err(e) => e.into(),
    }
}

async fn create_multiple(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() < 4 {
        return CommandOutcome::usage(USAGE_MULTIPLE);
    }
    let requested_name = &args[0];
    let group_id = &args[1];
    let count = match parse_count(&args[2]) {
        Ok(n) => n,
        Err(outcome) => return outcome,
    };
    let (template, expires_at) = match split_template_and_expiry(&args[3..]) {
        Ok(parts) => parts,
        Err(e) => return e.into(),
    };

    let mut registry = ctx.registry.lock().await;
    let name = if requested_name.eq_ignore_ascii_case("random") {
        match registry.generate_unique_name() {
            Ok(name) => name,
            Err(e) => return e.into(),
        }
    } else {
        requested_name.clone()
    };

    match registry.create(group_id, &name, count, false, &template, expires_at).await {
        Ok(cdk) => CommandOutcome::success(format!(
            "Created multi-use CDK '{}' in group '{}' with {} uses (expires: {}).",
            cdk.name,
            cdk.group_id,
            cdk.remaining_uses,
            cdk.expiry_label()
        )),
        Err(e) => e.into(),
    }
}
