// File: redeembot-tui/src/commands/mod.rs

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use redeembot_core::services::{CodeRegistry, MigrationService, RedemptionService};

use crate::tokenizer::tokenize;

mod add;
mod create;
mod delete;
mod list;
mod maintenance;
mod migrate;
mod redeem;
pub mod outcome;

pub use outcome::{CommandOutcome, CommandStatus};

/// Everything a console command may touch.
pub struct CommandContext {
    pub registry: Arc<Mutex<CodeRegistry>>,
    pub redemption: Arc<RedemptionService>,
    pub migration: Arc<MigrationService>,
    pub data_dir: PathBuf,
}

pub const HELP_TEXT: &str = "\
Commands:
  create single <group> <count> <commands> [yyyy-mm-dd HH:MM]
  create multiple <name|random> <group> <count> <commands> [yyyy-mm-dd HH:MM]
  add <group> <count>
  delete id <group>
  delete cdk <name>
  list [group]
  use <name>
  verify <name>
  history [user]
  migrate <file|sqlite|mysql> <file|sqlite|mysql> [confirm]
  export
  reload
  as <user> <command...>
  help
  quit

Quote <commands> that contain spaces; separate several commands with '|'.
%player% is replaced by the redeeming user.";

/// Runs one console line on behalf of `actor`.
pub async fn dispatch(line: &str, ctx: &CommandContext, actor: &str) -> CommandOutcome {
    let tokens = tokenize(line);
    let Some((cmd, args)) = tokens.split_first() else {
        return CommandOutcome::success("");
    };

    if !cmd.eq_ignore_ascii_case("as") {
        return dispatch_tokens(&tokens, ctx, actor).await;
    }
    if args.len() < 2 {
        return CommandOutcome::usage("as <user> <command...>");
    }
    dispatch_tokens(&args[1..], ctx, &args[0]).await
}

async fn dispatch_tokens(tokens: &[String], ctx: &CommandContext, actor: &str) -> CommandOutcome {
    let Some((cmd, args)) = tokens.split_first() else {
        return CommandOutcome::success("");
    };

    match cmd.to_lowercase().as_str() {
        "help" => CommandOutcome::success(HELP_TEXT),
        "create" => create::handle_create_command(args, ctx).await,
        "add" => add::handle_add_command(args, ctx).await,
        "delete" => delete::handle_delete_command(args, ctx).await,
        "list" => list::handle_list_command(args, ctx).await,
        "use" => redeem::handle_use_command(args, ctx, actor).await,
        "verify" => redeem::handle_verify_command(args, ctx, actor).await,
        "history" => redeem::handle_history_command(args, ctx, actor).await,
        "migrate" => migrate::handle_migrate_command(args, ctx).await,
        "export" => maintenance::handle_export_command(ctx).await,
        "reload" => maintenance::handle_reload_command(ctx).await,
        "as" => CommandOutcome::user_error("'as' cannot be nested"),
        other => CommandOutcome::user_error(format!(
            "Unknown command '{other}'. Type 'help' for a list of commands."
        )),
    }
}

/// Parses a positive count argument.
pub(crate) fn parse_count(raw: &str) -> Result<u32, CommandOutcome> {
    match raw.parse::<u32>() {
        Ok(0) | Err(_) => Err(CommandOutcome::user_error(format!(
            "'{raw}' is not a valid count; expected a positive whole number"
        ))),
        Ok(n) => Ok(n),
    }
}
