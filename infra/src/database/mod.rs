//! Database module - MySQL implementations using SQLx
//!
//! Connection pool management and the durable verification code store.

pub mod connection;
pub mod mysql;

#[cfg(test)]
mod tests;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::MySqlVerificationCodeRepository;
