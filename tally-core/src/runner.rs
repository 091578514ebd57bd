//! Composite tests.
//!
//! A [`TestRunner`] is a [`UnitTest`] whose body runs its children one after
//! another, turning each child's outcome into one assertion of its own.
use futures::future::{FutureExt, LocalBoxFuture};
use std::{cell::RefCell, fmt, future::Future, ops::Deref, rc::Rc, sync::Arc};
use tracing::*;

use crate::{
    event::Event,
    state::UnitTestState,
    unit_test::{Definition, TestFactory, TestKind},
    UnitTest,
};

type AfterAssert = Rc<dyn Fn(UnitTest) -> LocalBoxFuture<'static, ()>>;

/// Children and child lifecycle relays of a runner.
#[derive(Default)]
pub(crate) struct Composite {
    pub(crate) children: RefCell<Vec<UnitTest>>,
    on_child_start: Event<UnitTest>,
    on_child_finish: Event<UnitTest>,
    on_child_reset: Event<UnitTest>,
    after_assert: RefCell<Option<AfterAssert>>,
}

/// Something a runner declared with [`TestRunner::runs`] is made of.
#[derive(Debug, Clone)]
pub enum Member {
    /// Shared by every runner the factory builds.
    Instance(UnitTest),
    /// Instantiated anew for every runner the factory builds.
    Factory(TestFactory),
}

impl From<UnitTest> for Member {
    fn from(test: UnitTest) -> Self {
        Member::Instance(test)
    }
}

impl From<TestRunner> for Member {
    fn from(runner: TestRunner) -> Self {
        Member::Instance(runner.0)
    }
}

impl From<TestFactory> for Member {
    fn from(factory: TestFactory) -> Self {
        Member::Factory(factory)
    }
}

/// A unit test made of other unit tests.
#[derive(Clone, PartialEq, Eq)]
pub struct TestRunner(UnitTest);

impl Deref for TestRunner {
    type Target = UnitTest;

    fn deref(&self) -> &UnitTest {
        &self.0
    }
}

impl From<TestRunner> for UnitTest {
    fn from(runner: TestRunner) -> Self {
        runner.0
    }
}

impl fmt::Debug for TestRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRunner")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("state", &self.state())
            .field("tests", &self.tests().len())
            .finish()
    }
}

impl TestRunner {
    /// Creates an empty runner. The timeout in `definition` is not used: a
    /// runner's timeout is always derived from its children.
    pub fn new(definition: Definition) -> TestRunner {
        TestRunner(UnitTest::from_parts(
            Arc::new(definition),
            TestKind::Runner(Composite::default()),
        ))
    }

    pub(crate) fn from_test(test: UnitTest) -> TestRunner {
        debug_assert!(test.is_runner());
        TestRunner(test)
    }

    /// Declares a runner made of `members`.
    ///
    /// Every instance the factory builds gets fresh instances of the factory
    /// members, while instance members are shared between all of them.
    ///
    /// ```rust,ignore
    /// let suite = TestRunner::runs(Definition::new("API Test Suite"), [user_tests(), stats_tests()]);
    /// let runner = suite.instantiate();
    /// ```
    pub fn runs(
        definition: Definition,
        members: impl IntoIterator<Item = impl Into<Member>>,
    ) -> TestFactory {
        let members: Vec<Member> = members.into_iter().map(Into::into).collect();
        TestFactory::from_fn(definition, move |definition| {
            let runner = TestRunner(UnitTest::from_parts(
                definition,
                TestKind::Runner(Composite::default()),
            ));
            runner.add(members.iter().map(|member| match member {
                Member::Instance(test) => test.clone(),
                Member::Factory(factory) => factory.instantiate(),
            }));
            runner.into()
        })
    }

    fn composite(&self) -> &Composite {
        match &self.0.inner.kind {
            TestKind::Runner(composite) => composite,
            TestKind::Leaf(_) => unreachable!("TestRunner always wraps a runner"),
        }
    }

    /// Appends tests to the run list.
    ///
    /// Lifecycle relays are bound only the first time an instance is added.
    /// Adding an instance again puts it on the run list again, so it runs
    /// once per entry.
    pub fn add(&self, tests: impl IntoIterator<Item = impl Into<UnitTest>>) {
        let composite = self.composite();
        for test in tests {
            let test = test.into();
            let known = composite.children.borrow().contains(&test);
            if known {
                debug!(runner = self.name(), test = test.name(), "test added again");
            } else {
                debug!(runner = self.name(), test = test.name(), "test added");
                self.relay(test.on_start(), &test, |c| &c.on_child_start);
                self.relay(test.on_finish(), &test, |c| &c.on_child_finish);
                self.relay(test.on_reset(), &test, |c| &c.on_child_reset);
            }
            composite.children.borrow_mut().push(test);
        }
    }

    fn relay(
        &self,
        source: &Event<()>,
        child: &UnitTest,
        target: fn(&Composite) -> &Event<UnitTest>,
    ) {
        let runner = self.0.downgrade();
        let child = child.downgrade();
        source.subscribe(move |_| {
            if let (Some(runner), Some(child)) = (runner.upgrade(), child.upgrade()) {
                target(TestRunner(runner).composite()).trigger(&child);
            }
        });
    }

    /// Every direct child followed, for child runners, by that runner's own
    /// direct children.
    pub fn get_all_tests_and_child_tests(&self) -> Vec<UnitTest> {
        let mut tests = Vec::new();
        for test in self.tests() {
            let nested = test.tests();
            tests.push(test);
            tests.extend(nested);
        }
        tests
    }

    /// Fired with the child whenever a child starts.
    pub fn on_child_start(&self) -> &Event<UnitTest> {
        &self.composite().on_child_start
    }

    pub fn on_child_finish(&self) -> &Event<UnitTest> {
        &self.composite().on_child_finish
    }

    pub fn on_child_reset(&self) -> &Event<UnitTest> {
        &self.composite().on_child_reset
    }

    /// Installs a hook awaited after each child has been asserted.
    pub fn set_after_assert<F, Fut>(&self, hook: F)
    where
        F: Fn(UnitTest) -> Fut + 'static,
        Fut: Future<Output = ()> + 'static,
    {
        let hook: AfterAssert = Rc::new(move |test| hook(test).boxed_local());
        *self.composite().after_assert.borrow_mut() = Some(hook);
    }

    async fn after_assert(&self, test: &UnitTest) {
        let hook = self.composite().after_assert.borrow().clone();
        if let Some(hook) = hook {
            hook(test.clone()).await;
        }
    }
}

/// Body of every runner: children run strictly one after another, in list
/// order, each contributing exactly one assertion.
pub(crate) fn perform(runner: TestRunner) -> LocalBoxFuture<'static, eyre::Result<()>> {
    async move {
        let mut index = 0;
        loop {
            let Some(test) = runner.composite().children.borrow().get(index).cloned() else {
                break;
            };
            test.set_state(UnitTestState::Scheduled);
            runner
                .assert(&test, format!("Test '{}'", test.name()))
                .await?;
            runner.after_assert(&test).await;
            index += 1;
        }
        Ok(())
    }
    .boxed_local()
}
