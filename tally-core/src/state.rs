/// Lifecycle of a unit test.
///
/// ```text
/// Idle -> Scheduled -> Running -> { Successful | Fail | Indeterminate | Timeout | Error }
///              ^                                  |
///              +------------- reset() ------------+
/// ```
///
/// Variants are ordered by lifecycle position, which is also the order used
/// when reporting per-state statistics.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
pub enum UnitTestState {
    #[default]
    Idle,
    Scheduled,
    Running,
    Successful,
    Fail,
    Indeterminate,
    Timeout,
    Error,
}

impl UnitTestState {
    /// Whether a run has settled in this state.
    pub fn is_terminal(self) -> bool {
        !matches!(
            self,
            UnitTestState::Idle | UnitTestState::Scheduled | UnitTestState::Running
        )
    }
}
