//! Redis-backed state: redeemed reset tokens and rate-limit counters.

pub mod keys;
mod rate_counter;
mod reset_ledger;

pub use rate_counter::RateCounter;
pub use reset_ledger::RedisResetLedger;
