// redeembot-core/src/repositories/sqlite/mod.rs

pub mod codes;

pub use self::codes::SqliteCodeStore;
