//! # Log pipeline
//!
//! Timestamped, channel-tagged text records collected by [`Writer`]s, which
//! can forward everything they receive to other writers and to raw text
//! [`Sink`]s.
//!
//! ```text
//! +-------------------+  append_to_log  +-------------------+
//! | log_message(...)  | --------------> | Writer            |
//! | create_message()  |                 | messages[]        |
//! +-------------------+                 +-------------------+
//!                                         |             |
//!                          piped writers  v             v  piped sinks
//!                       +-------------------+   +-------------------+
//!                       | Writer            |   | Term / MemorySink |
//!                       | (same fan-out)    |   | "<message>\n"     |
//!                       +-------------------+   +-------------------+
//! ```
mod channel;
mod message;
mod writer;

pub use channel::Channel;
pub use message::{Format, Message};
pub use writer::{Log, MemorySink, PipeTarget, Sink, Writer};
