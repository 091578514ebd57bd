pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Occurs when `tally.toml` fails to load.
    #[error("failed to load tally.toml: {0}")]
    LoadError(String),
    /// Occurs when a configuration value can not be interpreted.
    #[error("invalid configuration value: {0}")]
    ValueError(String),
    /// Occurs when a log writer is piped into itself.
    #[error("can not pipe log messages to self")]
    SelfPipe,
    /// Occurs when `UnitTest::assert` receives a test it can not evaluate.
    #[error("invalid assertion test: {0}")]
    InvalidAssertion(String),
}
