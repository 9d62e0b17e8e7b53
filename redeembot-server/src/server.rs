use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{error, info};

use redeembot_core::tasks::expiry_sweep::spawn_expiry_sweep_task;
use redeembot_tui::TuiModule;

use crate::context::ServerContext;
use crate::Args;

pub async fn run_server(args: Args) -> anyhow::Result<()> {
    // 1) Config, store, registry, services
    let ctx = ServerContext::new(&args).await?;

    // 2) Periodic expiry sweep
    let sweep_interval = ctx.config.sweep_interval();
    info!("Expiry sweep every {}s", sweep_interval.as_secs());
    let sweep_handle = spawn_expiry_sweep_task(ctx.registry.clone(), sweep_interval);

    // 3) Console, unless headless
    let console = if args.headless {
        None
    } else {
        let tui = TuiModule::new(Arc::new(ctx.command_context()), args.actor.clone());
        let flag = tui.shutdown_flag();
        Some((flag, tui.spawn()))
    };

    // 4) Wait for Ctrl-C or for the console to quit
    match console {
        Some((flag, mut handle)) => {
            tokio::select! {
                res = tokio::signal::ctrl_c() => {
                    if let Err(e) = res {
                        error!("Failed to listen for Ctrl-C: {:?}", e);
                    }
                    info!("Ctrl-C detected; shutting down...");
                    flag.store(true, Ordering::SeqCst);
                    handle.abort();
                }
                _ = &mut handle => {
                    info!("Console closed; shutting down...");
                }
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {:?}", e);
            }
            info!("Ctrl-C detected; shutting down...");
        }
    }

    // Cleanup
    sweep_handle.abort();
    ctx.shutdown().await;
    info!("Shutdown complete.");
    Ok(())
}
