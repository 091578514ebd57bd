//! # Tally - Async Unit Test Framework
//!
//! Tally composes async unit tests into trees of test runners, runs them one
//! after another with per-test timeouts, and renders the outcome to the
//! console.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tally::{eyre, Assertion, Definition, TestRunner, UnitTest};
//!
//! #[tally::test(describe = "loads the current user")]
//! async fn load_user(t: UnitTest) -> eyre::Result<()> {
//!     t.assert(true, "has a name").await?;
//!     t.assert(Assertion::future(async { 2 + 2 == 4 }), "computed").await?;
//!     Ok(())
//! }
//!
//! #[tally::test(timeout = 1000)]
//! async fn load_stats(t: UnitTest) -> eyre::Result<()> {
//!     t.assert(true, "batch downloads").await?;
//!     Ok(())
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> eyre::Result<()> {
//!     let suite = TestRunner::runs(
//!         Definition::new("API Test Suite"),
//!         [load_user(), load_stats()],
//!     );
//!     tally::App::new().run(suite.instantiate()).await
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Composable**: a `TestRunner` is itself a test, so suites nest freely
//! - **Timeouts**: every test races its timeout; runners sum their children's
//! - **Flexible Assertions**: assert booleans, futures, tests and test factories
//! - **Lifecycle Events**: subscribe to start, finish and reset of any test
//! - **Console Rendering**: indented, colored per-test lines with statistics

mod app;

// Re-export procedural macros
pub use tally_derive::test;

// Re-export error handling crates for user convenience
pub use eyre;
pub use pretty_assertions;

// Re-export main application struct
pub use app::App;

// Re-export core functionality
pub use tally_core::{
    assertion::{Assertion, AssertionResult},
    config::{get_config, Color, Config},
    event::{Event, Handler},
    log::{Channel, Format, Log, MemorySink, Message, PipeTarget, Sink, Writer},
    reporter::CliRenderer,
    runner::{Member, TestRunner},
    state::UnitTestState,
    unit_test::{Definition, TestFactory, UnitTest},
    Error, Result,
};
