/// Coarse category of a log message.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Channel {
    Debug,
    Notice,
    Query,
    Network,
    Warn,
    Error,
}
