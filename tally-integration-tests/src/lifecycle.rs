//! Checks of tally's own behavior, run as part of the tree.
use std::{cell::RefCell, rc::Rc, time::Duration};
use tally::{eyre, Definition, TestFactory, TestRunner, UnitTest, UnitTestState};

#[tally::test(name = "Nested Factory Reports Into Parent")]
async fn nested_factory(t: UnitTest) -> eyre::Result<()> {
    let inner = TestFactory::new(Definition::new("inner"), |inner| async move {
        inner.assert(true, "inner check").await?;
        Ok(())
    });
    let passed = t.assert(inner, "inner factory").await?;
    t.assert(passed, "inner factory passed").await?;
    Ok(())
}

#[tally::test(name = "Slow Instance Times Out")]
async fn slow_instance(t: UnitTest) -> eyre::Result<()> {
    let slow = UnitTest::new(
        Definition::new("slow").timeout(Duration::from_millis(20)),
        |_| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        },
    );
    let passed = t.assert(&slow, "slow test").await?;
    t.assert(!passed, "slow test did not pass").await?;
    t.assert(slow.state() == UnitTestState::Timeout, "slow test timed out")
        .await?;
    Ok(())
}

#[tally::test(name = "Events Fire In Order")]
async fn events(t: UnitTest) -> eyre::Result<()> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let probe = UnitTest::new(Definition::new("probe"), |p| async move {
        p.assert(true, "fine").await?;
        Ok(())
    });
    {
        let seen = seen.clone();
        probe
            .on_start()
            .subscribe(move |_| seen.borrow_mut().push("start"));
    }
    {
        let seen = seen.clone();
        probe
            .on_finish()
            .subscribe(move |_| seen.borrow_mut().push("finish"));
    }

    t.assert(&probe, "probe").await?;
    probe.reset();
    t.assert(&probe, "probe again").await?;

    t.assert(
        *seen.borrow() == ["start", "finish", "start", "finish"],
        "start and finish fire once per run",
    )
    .await?;
    Ok(())
}

pub fn runner() -> TestFactory {
    TestRunner::runs(
        Definition::new("Lifecycle Test Runner"),
        [nested_factory(), slow_instance(), events()],
    )
}
