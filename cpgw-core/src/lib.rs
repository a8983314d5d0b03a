#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![forbid(unsafe_code)]

pub mod billing;
pub mod config;
pub mod error;
pub mod ledger;
pub mod orchestrator;
pub mod settings;
pub mod transaction;
pub mod webhook;
