// File: redeembot-tui/tests/command_tests.rs

mod test_utils;

use redeembot_common::models::cdk::parse_expiry;
use redeembot_tui::CommandStatus;

use test_utils::console;

#[tokio::test]
async fn test_create_single_and_list() {
    let c = console().await;
    let out = c.run(r#"create single starter 5 "give %player% bread 16""#).await;
    assert!(out.is_success(), "{}", out.message);
    assert!(out.message.starts_with("Created 5 single-use CDKs in group 'starter'"));

    let registry = c.ctx.registry.lock().await;
    let group = registry.find_group("starter").unwrap();
    assert_eq!(group.len(), 5);
    assert!(group.values().all(|cdk| cdk.single_use && cdk.remaining_uses == 1));
    assert!(group.values().all(|cdk| cdk.command_template == "give %player% bread 16"));
    drop(registry);

    let listed = c.run("list starter").await;
    assert!(listed.message.starts_with("[starter]"));
    assert_eq!(listed.message.lines().count(), 6);
    assert_eq!(c.run("list nothing").await.status, CommandStatus::UserError);
}

#[tokio::test]
async fn test_create_multiple_with_expiry() {
    let c = console().await;
    let out = c
        .run("create multiple PARTY event 3 say hello %player% 2099-12-31 23:59")
        .await;
    assert!(out.is_success(), "{}", out.message);

    let registry = c.ctx.registry.lock().await;
    let cdk = registry.find_by_name("PARTY").unwrap();
    assert_eq!(cdk.group_id, "event");
    assert_eq!(cdk.remaining_uses, 3);
    assert!(!cdk.single_use);
    assert_eq!(cdk.command_template, "say hello %player%");
    assert_eq!(cdk.expires_at, Some(parse_expiry("2099-12-31 23:59").unwrap()));
}

#[tokio::test]
async fn test_create_multiple_random_name() {
    let c = console().await;
    let out = c.run(r#"create multiple random event 2 "say hi""#).await;
    assert!(out.is_success(), "{}", out.message);
    let registry = c.ctx.registry.lock().await;
    let group = registry.find_group("event").unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group.keys().next().unwrap().len(), 8);
}

#[tokio::test]
async fn test_bad_input_is_a_user_error() {
    let c = console().await;
    for line in [
        "create single g zero say hi",
        "create single g 0 say hi",
        "create single g 2",
        "create triple g 2 say hi",
        "add g",
        "delete everything now",
        "use",
        "migrate file floppy",
        "frobnicate",
        "as alex",
    ] {
        let out = c.run(line).await;
        assert_eq!(out.status, CommandStatus::UserError, "'{line}' gave {}", out.message);
    }
    assert!(c.ctx.registry.lock().await.is_empty());
}

#[tokio::test]
async fn test_create_rejects_malformed_expiry() {
    let c = console().await;
    for line in [
        r#"create single g 1 "say hi" "2025-13-45 10:00""#,
        "create multiple PARTY event 3 say hello 2099-02-30 23:59",
        "create single g 2 say hi 2025-01-01 24:61",
    ] {
        let out = c.run(line).await;
        assert_eq!(out.status, CommandStatus::UserError, "'{line}' gave {}", out.message);
        assert!(out.message.contains("not a valid expiration"), "{}", out.message);
    }
    assert!(c.ctx.registry.lock().await.is_empty());
    assert!(!c.dir.path().join("cdk.yml").exists());
}

#[tokio::test]
async fn test_oversized_batch_is_a_user_error() {
    let c = console().await;
    let out = c.run(r#"create single g 4000000000 "say hi""#).await;
    assert_eq!(out.status, CommandStatus::UserError);
    assert!(out.message.contains("at most 1000"), "{}", out.message);
    assert!(c.ctx.registry.lock().await.is_empty());

    c.run(r#"create single g 1 "say hi""#).await;
    assert_eq!(c.run("add g 4000000000").await.status, CommandStatus::UserError);
    assert_eq!(c.ctx.registry.lock().await.len(), 1);
}

#[tokio::test]
async fn test_use_single_use_then_not_found() {
    let c = console().await;
    c.run(r#"create single g 1 "say %player%""#).await;
    let name = {
        let registry = c.ctx.registry.lock().await;
        registry.find_group("g").unwrap().keys().next().unwrap().clone()
    };

    let first = c.run_as("alex", &format!("use {name}")).await;
    assert!(first.is_success(), "{}", first.message);
    assert!(first.message.contains("used up"));

    let second = c.run_as("steve", &format!("use {name}")).await;
    assert_eq!(second.status, CommandStatus::UserError);
    assert!(second.message.contains("does not exist"));
}

#[tokio::test]
async fn test_as_prefix_selects_actor() {
    let c = console().await;
    c.run(r#"create multiple SHARED g 5 "say %player%""#).await;

    assert!(c.run("as alex use SHARED").await.is_success());
    let dup = c.run("as alex use SHARED").await;
    assert_eq!(dup.status, CommandStatus::UserError);
    assert!(dup.message.contains("already redeemed"));
    assert!(c.run("use SHARED").await.is_success());

    let history = c.run("history alex").await;
    assert!(history.message.contains("SHARED"));
    let own = c.run("as alex history").await;
    assert_eq!(own.message, history.message);
    assert!(c.run("history nobody").await.message.contains("has not redeemed"));
}

#[tokio::test]
async fn test_verify_reports_without_consuming() {
    let c = console().await;
    c.run(r#"create multiple LOOK g 2 "say hi""#).await;
    let out = c.run_as("alex", "verify LOOK").await;
    assert!(out.is_success());
    assert!(out.message.contains("2 uses left"));
    assert_eq!(c.ctx.registry.lock().await.find_by_name("LOOK").unwrap().remaining_uses, 2);
}

#[tokio::test]
async fn test_add_extends_groups() {
    let c = console().await;
    c.run(r#"create single batch 2 "say hi""#).await;
    let cloned = c.run("add batch 3").await;
    assert!(cloned.is_success(), "{}", cloned.message);
    assert_eq!(c.ctx.registry.lock().await.find_group("batch").unwrap().len(), 5);

    c.run(r#"create multiple MULTI event 2 "say hi""#).await;
    let bumped = c.run("add event 4").await;
    assert!(bumped.message.contains("now has 6 uses"));
    assert_eq!(c.run("add missing 1").await.status, CommandStatus::UserError);
}

#[tokio::test]
async fn test_delete_group() {
    let c = console().await;
    c.run(r#"create single doomed 3 "say hi""#).await;
    assert!(c.run("delete id doomed").await.is_success());
    assert_eq!(c.run("delete id doomed").await.status, CommandStatus::UserError);
    assert_eq!(c.run("list").await.message, "No CDKs.");
}

#[tokio::test]
async fn test_migrate_requires_confirmation() {
    let c = console().await;
    c.run(r#"create single g 2 "say hi""#).await;

    let preview = c.run("migrate file sqlite").await;
    assert!(preview.is_success());
    assert!(preview.message.contains("confirm"));
    assert!(!c.dir.path().join("data.db").exists());

    let done = c.run("migrate file sqlite confirm").await;
    assert!(done.is_success(), "{}", done.message);
    assert_eq!(done.message, "Migrated 2 CDKs from file to sqlite.");
    assert!(c.dir.path().join("data.db").exists());

    let refused = c.run("migrate sqlite mysql confirm").await;
    assert_eq!(refused.status, CommandStatus::UserError);
    assert!(refused.message.contains("not supported"));
}

#[tokio::test]
async fn test_export_and_reload() {
    let c = console().await;
    c.run(r#"create single g 2 "say hi""#).await;
    let out = c.run("export").await;
    assert!(out.is_success());
    assert!(c.dir.path().join("export.yml").exists());

    let reloaded = c.run("reload").await;
    assert_eq!(reloaded.message, "Reloaded 2 CDKs from the file store.");
}

#[tokio::test]
async fn test_help_lists_commands() {
    let c = console().await;
    let help = c.run("help").await;
    for word in ["create single", "create multiple", "migrate", "verify", "as <user>"] {
        assert!(help.message.contains(word), "help is missing {word}");
    }
}

#[tokio::test]
async fn test_console_loop_runs_lines_until_quit() {
    let c = console().await;
    let ctx = std::sync::Arc::new(c.ctx);
    let tui = redeembot_tui::TuiModule::new(ctx.clone(), "alex");
    let flag = tui.shutdown_flag();

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    for line in [r#"create multiple LOOP g 2 "say hi""#, "", "use LOOP", "quit", "use LOOP"] {
        tx.send(line.to_string()).unwrap();
    }
    tui.run(rx).await;

    assert!(flag.load(std::sync::atomic::Ordering::SeqCst));
    let registry = ctx.registry.lock().await;
    let cdk = registry.find_by_name("LOOP").unwrap();
    assert_eq!(cdk.remaining_uses, 1);
    assert!(cdk.has_redeemed("alex"));
}
