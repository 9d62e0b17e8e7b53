// redeembot-core/src/tasks/mod.rs

pub mod expiry_sweep;
