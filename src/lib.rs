//! # claimcheck
//!
//! An evidence-driven fact-checking agent for health-product claims.
//!
//! This library provides:
//! - An HTTP API accepting free-text questions about health-product claims
//! - An agentic loop alternating between drafting an answer, consulting
//!   research tools, and judging whether the draft is scientifically grounded
//! - Web, academic-paper, and citation search integrations
//!
//! ## Architecture
//!
//! The loop is a small state machine:
//! 1. Generate a candidate turn from the conversation so far
//! 2. If the turn requests tools, execute them and feed the results back
//! 3. Otherwise judge the candidate's groundedness; a grounded answer (or
//!    hitting the cycle cap) ends the loop, an ungrounded one retries with
//!    the rejected attempt still in view
//!
//! ## Example
//!
//! ```rust,ignore
//! use claimcheck::{agent::FactChecker, config::Config};
//!
//! let config = Config::from_env()?;
//! let checker = FactChecker::new(&config);
//! let report = checker.run("Is vitamin D effective against colds?").await?;
//! println!("{} (sources: {:?})", report.answer, report.sources);
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
