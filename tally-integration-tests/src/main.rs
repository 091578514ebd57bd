//! Sample test tree exercising tally end to end.
//!
//! `cargo run -p tally-integration-tests -- test` renders the whole tree,
//! `-- ls` prints it. Build with `--features fail-test` to preview failures.
mod api;
mod lifecycle;
mod stats;
mod user;

use tally::{eyre, Definition, TestFactory, TestRunner};

/// The root of the sample tree.
pub fn suite() -> TestFactory {
    let members = [user::runner(), stats::runner(), lifecycle::runner()];
    #[cfg(feature = "fail-test")]
    let members = members.into_iter().chain([fail_test::runner()]);
    TestRunner::runs(Definition::new("API Test Suite"), members)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    let app = tally::App::new();
    app.run(suite().instantiate()).await?;
    Ok(())
}
