// File: redeembot-tui/src/tui_module.rs

use std::io::{BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::commands::{dispatch, CommandContext, CommandStatus};

/// Interactive console reading commands from stdin.
pub struct TuiModule {
    ctx: Arc<CommandContext>,
    actor: String,
    shutdown_flag: Arc<AtomicBool>,
}

impl TuiModule {
    pub fn new(ctx: Arc<CommandContext>, actor: impl Into<String>) -> Self {
        Self {
            ctx,
            actor: actor.into(),
            shutdown_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle the caller can use to stop the console after its current line.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown_flag.clone()
    }

    /// Reads stdin on a plain thread and runs commands on a tokio task.
    /// The task ends on `quit`, EOF or shutdown.
    pub fn spawn(self) -> JoinHandle<()> {
        let (tx, rx) = mpsc::unbounded_channel::<String>();
        let shutdown_flag = self.shutdown_flag.clone();

        thread::spawn(move || {
            let stdin = std::io::stdin();
            for line in stdin.lock().lines() {
                if shutdown_flag.load(Ordering::SeqCst) {
                    break;
                }
                match line {
                    Ok(line) => {
                        if tx.send(line).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Error reading from stdin: {}", e);
                        break;
                    }
                }
            }
            debug!("stdin reader finished");
        });

        tokio::spawn(async move { self.run(rx).await })
    }

    /// Processes lines from `lines` until `quit`, the channel closes, or shutdown is flagged.
    pub async fn run(&self, mut lines: mpsc::UnboundedReceiver<String>) {
        println!("CDK console ready, acting as '{}'. Type 'help' for commands.", self.actor);

        loop {
            print!("cdk> ");
            let _ = std::io::stdout().flush();

            let Some(line) = lines.recv().await else {
                debug!("stdin closed, leaving console");
                break;
            };

            if self.shutdown_flag.load(Ordering::SeqCst) {
                println!("Console shutting down...");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
                info!("Console quit requested");
                break;
            }

            let outcome = dispatch(trimmed, &self.ctx, &self.actor).await;
            match outcome.status {
                CommandStatus::Success | CommandStatus::UserError => println!("{}", outcome.message),
                CommandStatus::SystemError => eprintln!("{}", outcome.message),
            }
        }
        self.shutdown_flag.store(true, Ordering::SeqCst);
    }
}
