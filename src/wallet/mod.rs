//! Account management for transaction producers

pub mod wallet;

pub use wallet::Wallet;
