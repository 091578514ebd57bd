use console::Term;
use itertools::Itertools;
use std::{cell::RefCell, fmt, io, rc::Rc};
use tracing::*;

use super::{Channel, Message};
use crate::{Error, Result};

/// Destination for rendered lines of text.
pub trait Sink {
    fn write_str(&self, text: &str) -> io::Result<()>;
}

impl Sink for Term {
    fn write_str(&self, text: &str) -> io::Result<()> {
        Term::write_str(self, text)
    }
}

/// Sink that keeps everything written to it.
#[derive(Debug, Default)]
pub struct MemorySink {
    buffer: RefCell<String>,
}

impl MemorySink {
    pub fn new() -> MemorySink {
        MemorySink::default()
    }

    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.buffer.borrow().lines().map(str::to_string).collect()
    }
}

impl Sink for MemorySink {
    fn write_str(&self, text: &str) -> io::Result<()> {
        self.buffer.borrow_mut().push_str(text);
        Ok(())
    }
}

/// Where a writer forwards its messages.
#[derive(Clone)]
pub enum PipeTarget {
    Writer(Writer),
    Sink(Rc<dyn Sink>),
}

impl From<Writer> for PipeTarget {
    fn from(writer: Writer) -> Self {
        PipeTarget::Writer(writer)
    }
}

impl From<&Writer> for PipeTarget {
    fn from(writer: &Writer) -> Self {
        PipeTarget::Writer(writer.clone())
    }
}

impl From<Rc<dyn Sink>> for PipeTarget {
    fn from(sink: Rc<dyn Sink>) -> Self {
        PipeTarget::Sink(sink)
    }
}

impl From<Rc<MemorySink>> for PipeTarget {
    fn from(sink: Rc<MemorySink>) -> Self {
        PipeTarget::Sink(sink)
    }
}

impl From<Term> for PipeTarget {
    fn from(term: Term) -> Self {
        PipeTarget::Sink(Rc::new(term))
    }
}

#[derive(Default)]
struct WriterInner {
    messages: RefCell<Vec<Message>>,
    writers: RefCell<Vec<Writer>>,
    sinks: RefCell<Vec<Rc<dyn Sink>>>,
}

/// Append-only message log with fan-out. Clones share the same log.
#[derive(Clone, Default)]
pub struct Writer {
    inner: Rc<WriterInner>,
}

impl fmt::Debug for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("messages", &self.inner.messages.borrow().len())
            .field("writers", &self.inner.writers.borrow().len())
            .field("sinks", &self.inner.sinks.borrow().len())
            .finish()
    }
}

impl fmt::Display for Writer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.messages.borrow().iter().join("\n"))
    }
}

impl Writer {
    pub fn new() -> Writer {
        Writer::default()
    }

    pub fn get_log_messages(&self) -> Vec<Message> {
        self.inner.messages.borrow().clone()
    }

    /// Records `message`, then forwards it to every piped writer and after
    /// that to every piped sink, each group in pipe order.
    pub fn append_to_log(&self, message: Message) {
        self.inner.messages.borrow_mut().push(message.clone());

        let writers = self.inner.writers.borrow().clone();
        for writer in writers {
            writer.append_to_log(message.clone());
        }

        let sinks = self.inner.sinks.borrow().clone();
        if sinks.is_empty() {
            return;
        }
        let line = format!("{message}\n");
        for sink in sinks {
            if let Err(e) = sink.write_str(&line) {
                warn!("failed to write log message to sink: {e}");
            }
        }
    }

    /// Forwards every future message to `target`. Piping the same target
    /// twice has no further effect; piping a writer into itself is an error.
    pub fn pipe_log_messages_to(&self, target: impl Into<PipeTarget>) -> Result<()> {
        match target.into() {
            PipeTarget::Writer(writer) => {
                if Rc::ptr_eq(&writer.inner, &self.inner) {
                    return Err(Error::SelfPipe);
                }
                let mut writers = self.inner.writers.borrow_mut();
                if !writers.iter().any(|w| Rc::ptr_eq(&w.inner, &writer.inner)) {
                    writers.push(writer);
                }
            }
            PipeTarget::Sink(sink) => {
                let mut sinks = self.inner.sinks.borrow_mut();
                if !sinks
                    .iter()
                    .any(|s| std::ptr::addr_eq(Rc::as_ptr(s), Rc::as_ptr(&sink)))
                {
                    sinks.push(sink);
                }
            }
        }
        Ok(())
    }
}

/// Producing log messages. `create_message` is the hook implementors
/// override to change how messages are built; everything else goes through
/// [`Log::writer`].
pub trait Log {
    fn writer(&self) -> &Writer;

    fn create_message(&self, channel: Channel, text: String) -> Message {
        Message::create_with_text(text).set_channel(channel)
    }

    /// Concatenates `parts` without separator and appends the result.
    fn log_message(&self, channel: Channel, parts: &[&str]) {
        let message = self.create_message(channel, parts.concat());
        self.append_to_log(message);
    }

    fn append_to_log(&self, message: Message) {
        self.writer().append_to_log(message);
    }

    fn get_log_messages(&self) -> Vec<Message> {
        self.writer().get_log_messages()
    }

    fn pipe_log_messages_to(&self, target: impl Into<PipeTarget>) -> Result<()> {
        self.writer().pipe_log_messages_to(target)
    }
}

impl Log for Writer {
    fn writer(&self) -> &Writer {
        self
    }
}
