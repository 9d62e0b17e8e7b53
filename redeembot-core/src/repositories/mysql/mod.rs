// redeembot-core/src/repositories/mysql/mod.rs

pub mod codes;

pub use self::codes::MySqlCodeStore;
