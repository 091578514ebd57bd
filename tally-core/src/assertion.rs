//! Assertion inputs and recorded outcomes.
//!
//! [`UnitTest::assert`](crate::UnitTest::assert) accepts four shapes of input,
//! expressed here as [`Assertion`]:
//!
//! - a plain `bool`
//! - a future resolving to `bool`
//! - a [`UnitTest`] instance, run to completion
//! - a [`TestFactory`], instantiated and run in the context of the asserting test
//!
//! Every evaluation that happens while the asserting test is still running
//! leaves behind exactly one [`AssertionResult`].

use futures::future::{FutureExt, LocalBoxFuture};
use std::{fmt, future::Future};

use crate::{runner::TestRunner, unit_test::TestFactory, UnitTest};

/// Immutable record of one evaluated assertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssertionResult {
    unit_test_id: u64,
    successful: bool,
    description: String,
}

impl AssertionResult {
    pub fn new(unit_test_id: u64, successful: bool, description: impl Into<String>) -> Self {
        AssertionResult {
            unit_test_id,
            successful,
            description: description.into(),
        }
    }

    /// Id of the test that evaluated the assertion. For in-context runs this
    /// differs from the test the result is stored on.
    pub fn unit_test_id(&self) -> u64 {
        self.unit_test_id
    }

    pub fn successful(&self) -> bool {
        self.successful
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

/// What can be asserted.
pub enum Assertion {
    Bool(bool),
    Future(LocalBoxFuture<'static, bool>),
    Test(UnitTest),
    Factory(TestFactory),
}

impl Assertion {
    /// Asserts on the value a future resolves to.
    pub fn future(fut: impl Future<Output = bool> + 'static) -> Assertion {
        Assertion::Future(fut.boxed_local())
    }
}

impl fmt::Debug for Assertion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assertion::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Assertion::Future(_) => f.write_str("Future(..)"),
            Assertion::Test(t) => f.debug_tuple("Test").field(&t.name()).finish(),
            Assertion::Factory(factory) => f
                .debug_tuple("Factory")
                .field(&factory.definition().name())
                .finish(),
        }
    }
}

impl From<bool> for Assertion {
    fn from(value: bool) -> Self {
        Assertion::Bool(value)
    }
}

impl From<UnitTest> for Assertion {
    fn from(test: UnitTest) -> Self {
        Assertion::Test(test)
    }
}

impl From<&UnitTest> for Assertion {
    fn from(test: &UnitTest) -> Self {
        Assertion::Test(test.clone())
    }
}

impl From<TestRunner> for Assertion {
    fn from(runner: TestRunner) -> Self {
        Assertion::Test(runner.into())
    }
}

impl From<TestFactory> for Assertion {
    fn from(factory: TestFactory) -> Self {
        Assertion::Factory(factory)
    }
}

impl From<&TestFactory> for Assertion {
    fn from(factory: &TestFactory) -> Self {
        Assertion::Factory(factory.clone())
    }
}

impl From<LocalBoxFuture<'static, bool>> for Assertion {
    fn from(fut: LocalBoxFuture<'static, bool>) -> Self {
        Assertion::Future(fut)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Definition;

    #[test]
    fn assertion_result_keeps_its_fields() {
        let result = AssertionResult::new(3, false, "bad");
        assert_eq!(result.unit_test_id(), 3);
        assert!(!result.successful());
        assert_eq!(result.description(), "bad");
    }

    #[test]
    fn conversions_pick_the_matching_variant() {
        assert!(matches!(Assertion::from(true), Assertion::Bool(true)));
        assert!(matches!(
            Assertion::future(async { false }),
            Assertion::Future(_)
        ));

        let test = UnitTest::new(Definition::new("leaf"), |_| async { Ok(()) });
        assert!(matches!(Assertion::from(&test), Assertion::Test(_)));

        let factory = TestFactory::new(Definition::new("leaf"), |_| async { Ok(()) });
        assert!(matches!(Assertion::from(&factory), Assertion::Factory(_)));
        assert_eq!(format!("{:?}", Assertion::from(factory)), "Factory(\"leaf\")");
    }
}
