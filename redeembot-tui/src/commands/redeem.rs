// File: redeembot-tui/src/commands/redeem.rs

use chrono::Utc;

use redeembot_core::services::RedemptionState;

use super::{CommandContext, CommandOutcome};

/// `use <name>`: the full redemption workflow for `actor`.
pub async fn handle_use_command(args: &[String], ctx: &CommandContext, actor: &str) -> CommandOutcome {
    if args.len() != 1 {
        return CommandOutcome::usage("use <name>");
    }
    match ctx.redemption.redeem(&args[0], actor, Utc::now()).await {
        Ok(redemption) => {
            let mut output = format!("{} redeemed CDK '{}'.", actor, redemption.code.name);
            match redemption.state {
                RedemptionState::Removed => output.push_str(" The code is now used up."),
                RedemptionState::Remaining(n) => output.push_str(&format!(" {n} uses remain.")),
            }
            if !redemption.failed_commands.is_empty() {
                output.push_str(&format!(
                    "\nWarning: {} of {} commands failed: {}",
                    redemption.failed_commands.len(),
                    redemption.commands.len(),
                    redemption.failed_commands.join(" | ")
                ));
            }
            CommandOutcome::success(output)
        }
        Err(e) => e.into(),
    }
}

/// `verify <name>`: read-only check for `actor`.
pub async fn handle_verify_command(args: &[String], ctx: &CommandContext, actor: &str) -> CommandOutcome {
    if args.len() != 1 {
        return CommandOutcome::usage("verify <name>");
    }
    match ctx.redemption.verify(&args[0], actor, Utc::now()).await {
        Ok(cdk) => CommandOutcome::success(format!(
            "CDK '{}' is valid for {}: {} uses left, {}, expires {}.",
            cdk.name,
            actor,
            cdk.remaining_uses,
            if cdk.single_use { "single-use" } else { "multi-use" },
            cdk.expiry_label()
        )),
        Err(e) => e.into(),
    }
}

/// `history [user]`: audit lines for `user`, defaulting to `actor`.
pub async fn handle_history_command(args: &[String], ctx: &CommandContext, actor: &str) -> CommandOutcome {
    if args.len() > 1 {
        return CommandOutcome::usage("history [user]");
    }
    let user = args.first().map(String::as_str).unwrap_or(actor);
    match ctx.redemption.history(user).await {
        Ok(lines) if lines.is_empty() => {
            CommandOutcome::success(format!("{user} has not redeemed any CDKs."))
        }
        Ok(lines) => {
            let mut output = format!("Redemptions by {user}:\n");
            for line in &lines {
                output.push_str(&format!("  {line}\n"));
            }
            CommandOutcome::success(output.trim_end())
        }
        Err(e) => e.into(),
    }
}
