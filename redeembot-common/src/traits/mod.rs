// File: redeembot-common/src/traits/mod.rs
pub mod repository_traits;
pub mod host_traits;
