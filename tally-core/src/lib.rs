//! # Tally Core
//!
//! Core functionality for the tally unit test framework.
//!
//! This crate provides the building blocks tally is made of:
//! - Unit tests, their lifecycle and assertions
//! - Test runners composing tests into trees
//! - Synchronous lifecycle events
//! - The log pipeline and the console renderer
//! - Configuration management
//!
//! ## Architecture (block diagram)
//!
//! ```text
//! +---------------------+      +---------------------+      +---------------------+
//! | test definitions    | ---> | TestRunner          | ---> | CliRenderer         |
//! | #[tally::test]      |      | (sequential tree)   |      | (per-test lines)    |
//! +---------------------+      +---------------------+      +---------------------+
//!            |                     |   on_start/on_finish            |
//!            v                     v                                 v
//! +---------------------+      +---------------------+      +---------------------+
//! | UnitTest::assert    | ---> | AssertionResult     |      | Writer -> Term      |
//! | bool/future/test    |      | per result target   |      | (log pipeline)      |
//! +---------------------+      +---------------------+      +---------------------+
//! ```
//!
//! Most users should use the main `tally` crate rather than importing `tally-core` directly.

pub mod assertion;
pub mod config;
pub mod error;
pub mod event;
pub mod log;
pub mod reporter;
pub mod runner;
pub mod state;

// Re-export procedural macros
pub use tally_derive::test;

// Re-export error handling crates
pub use eyre;

// Re-export key functionality
pub use assertion::{Assertion, AssertionResult};
pub use config::{get_config, Color, Config};
pub use error::{Error, Result};
pub use event::{Event, Handler};
pub use log::{Channel, Format, Log, MemorySink, Message, PipeTarget, Sink, Writer};
pub use reporter::CliRenderer;
pub use runner::{Member, TestRunner};
pub use state::UnitTestState;
pub use unit_test::{Definition, TestFactory, UnitTest};
