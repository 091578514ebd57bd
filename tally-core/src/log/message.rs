use chrono::{DateTime, Datelike, Local, Timelike};
use std::fmt;

use super::Channel;

/// How a message renders itself as a line of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `<date/time> (<channel>): <text>`
    #[default]
    Stamped,
    /// Only the text.
    Bare,
}

/// A log record. The creation time is captured on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    timestamp: DateTime<Local>,
    text: String,
    channel: Option<Channel>,
    format: Format,
}

impl Message {
    pub fn create_with_text(text: impl Into<String>) -> Message {
        Message {
            timestamp: Local::now(),
            text: text.into(),
            channel: None,
            format: Format::Stamped,
        }
    }

    /// A message that renders as its text alone.
    pub fn bare(text: impl Into<String>) -> Message {
        Message {
            format: Format::Bare,
            ..Message::create_with_text(text)
        }
    }

    pub fn time(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn channel(&self) -> Option<Channel> {
        self.channel
    }

    pub fn set_channel(mut self, channel: Channel) -> Message {
        self.channel = Some(channel);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn format(&self) -> Format {
        self.format
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.format {
            Format::Bare => f.write_str(&self.text),
            Format::Stamped => {
                let channel = self
                    .channel
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "-".to_string());
                write!(
                    f,
                    "{} ({channel}): {}",
                    format_date_time(&self.timestamp),
                    self.text
                )
            }
        }
    }
}

/// `YYYY/M/D H:M:SS`. Only the seconds are zero-padded.
fn format_date_time<Tz: chrono::TimeZone>(date: &DateTime<Tz>) -> String {
    format!(
        "{}/{}/{} {}:{}:{:02}",
        date.year(),
        date.month(),
        date.day(),
        date.hour(),
        date.minute(),
        date.second()
    )
}
