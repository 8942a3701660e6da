//! # sitewatch
//!
//! Unattended reply bot. Searches for mentions of each listed site, replies
//! to at most one new mention per site, and keeps a durable ledger so no
//! item is ever answered twice, across restarts included.

pub mod candidates;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod model;
pub mod source;
pub mod telemetry;
pub mod twitter;
