// File: redeembot-tui/src/commands/migrate.rs

use std::str::FromStr;

use redeembot_common::models::{MigrationOutcome, StorageKind};
use redeembot_core::services::migration_service::is_supported;

use super::{CommandContext, CommandOutcome};

const USAGE: &str = "migrate <file|sqlite|mysql> <file|sqlite|mysql> [confirm]";

pub async fn handle_migrate_command(args: &[String], ctx: &CommandContext) -> CommandOutcome {
    if args.len() < 2 || args.len() > 3 {
        return CommandOutcome::usage(USAGE);
    }
    let (source, target) = match (StorageKind::from_str(&args[0]), StorageKind::from_str(&args[1])) {
        (Ok(s), Ok(t)) => (s, t),
        (Err(e), _) | (_, Err(e)) => return CommandOutcome::user_error(e),
    };
    let confirmed = match args.get(2) {
        None => false,
        Some(word) if word.eq_ignore_ascii_case("confirm") => true,
        Some(_) => return CommandOutcome::usage(USAGE),
    };

    if !is_supported(source, target) {
        return unsupported(source, target);
    }
    if !confirmed {
        return CommandOutcome::success(format!(
            "This copies every CDK from {source} to {target} and replaces everything {target} holds.\n\
             Run 'migrate {source} {target} confirm' to proceed."
        ));
    }

    let mut registry = ctx.registry.lock().await;
    match ctx.migration.run(source, target, &mut registry).await {
        Ok(MigrationOutcome::Migrated(count)) => {
            CommandOutcome::success(format!("Migrated {count} CDKs from {source} to {target}."))
        }
        Ok(MigrationOutcome::Unsupported { source, target }) => unsupported(source, target),
        Err(e) => e.into(),
    }
}

fn unsupported(source: StorageKind, target: StorageKind) -> CommandOutcome {
    CommandOutcome::user_error(format!(
        "Migration from {source} to {target} is not supported; only file <-> sqlite/mysql is."
    ))
}
