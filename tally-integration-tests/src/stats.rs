use tally::{eyre, Assertion, Definition, TestFactory, TestRunner, UnitTest};

use crate::api::Stats;

fn is_valid_stat_number(n: f64) -> bool {
    n.is_finite() && n >= 0.0
}

#[tally::test(name = "Load Stats", describe = "loads global download statistics")]
async fn load_stats(t: UnitTest) -> eyre::Result<()> {
    let stats = Stats::load().await?;
    t.assert(
        is_valid_stat_number(stats.batch_downloads),
        "batch downloads is a valid number",
    )
    .await?;
    t.assert(
        is_valid_stat_number(stats.photo_downloads),
        "photo downloads is a valid number",
    )
    .await?;
    Ok(())
}

#[tally::test(name = "Stats Are Consistent")]
async fn consistent(t: UnitTest) -> eyre::Result<()> {
    t.assert(
        Assertion::future(async {
            match (Stats::load().await, Stats::load().await) {
                (Ok(a), Ok(b)) => a.batch_downloads == b.batch_downloads,
                _ => false,
            }
        }),
        "two loads agree",
    )
    .await?;
    Ok(())
}

pub fn runner() -> TestFactory {
    TestRunner::runs(
        Definition::new("Stats Test Runner"),
        [load_stats(), consistent()],
    )
}
