//! Console rendering of unit test trees.
//!
//! A [`CliRenderer`] listens to the lifecycle events of one test and writes a
//! line to its log whenever that test starts (runners only) or finishes. The
//! renderer of a runner owns one child renderer per nested test, each piping
//! its output up, so the whole tree funnels into the root renderer's targets.
//!
//! ```text
//!   CliRenderer(depth 0) -----> Term::stdout()
//!      ^            ^
//!      | pipe       | pipe
//!   CliRenderer(1)  CliRenderer(1)
//!      ^
//!      | pipe
//!   CliRenderer(2)
//! ```
use console::{style, StyledObject};
use std::{
    cell::RefCell,
    collections::BTreeMap,
    fmt::Display,
    rc::{Rc, Weak},
    time::Duration,
};
use tracing::*;

use crate::{
    event::Handler,
    log::{Channel, Log, Message, PipeTarget, Writer},
    state::UnitTestState,
    UnitTest,
};

const INDENT: &str = "\t";
const LINE: &str = "---------------";

struct RendererInner {
    writer: Writer,
    test: UnitTest,
    depth_level: usize,
    children: Vec<CliRenderer>,
    handlers: RefCell<Vec<Handler<()>>>,
}

impl Drop for RendererInner {
    fn drop(&mut self) {
        for handler in self.handlers.borrow().iter() {
            self.test.on_start().unbind(handler);
            self.test.on_finish().unbind(handler);
        }
    }
}

/// Renders the progress and results of a test (tree) as log lines.
#[derive(Clone)]
pub struct CliRenderer {
    inner: Rc<RendererInner>,
}

impl CliRenderer {
    /// Creates a renderer for `test` and, recursively, for every test it
    /// nests. Starts listening right away.
    pub fn new(test: impl Into<UnitTest>) -> CliRenderer {
        CliRenderer::with_depth(test.into(), 0)
    }

    fn with_depth(test: UnitTest, depth_level: usize) -> CliRenderer {
        let writer = Writer::new();
        let children: Vec<_> = test
            .tests()
            .into_iter()
            .map(|nested| {
                let child = CliRenderer::with_depth(nested, depth_level + 1);
                if let Err(e) = child.pipe_log_messages_to(&writer) {
                    error!("failed to pipe child renderer: {e}");
                }
                child
            })
            .collect();

        let inner = Rc::new_cyclic(|me: &Weak<RendererInner>| {
            let mut handlers = Vec::new();
            let renderer = me.clone();
            handlers.push(test.on_finish().subscribe(move |_| {
                if let Some(renderer) = renderer.upgrade() {
                    renderer.render_test_finished();
                }
            }));
            if test.is_runner() {
                let renderer = me.clone();
                handlers.push(test.on_start().subscribe(move |_| {
                    if let Some(renderer) = renderer.upgrade() {
                        renderer.render_test_runner_starting();
                    }
                }));
            }
            RendererInner {
                writer,
                test,
                depth_level,
                children,
                handlers: RefCell::new(handlers),
            }
        });
        CliRenderer { inner }
    }

    pub fn test(&self) -> &UnitTest {
        &self.inner.test
    }

    pub fn depth_level(&self) -> usize {
        self.inner.depth_level
    }

    pub fn children(&self) -> &[CliRenderer] {
        &self.inner.children
    }
}

impl From<&CliRenderer> for PipeTarget {
    fn from(renderer: &CliRenderer) -> Self {
        PipeTarget::Writer(renderer.inner.writer.clone())
    }
}

impl Log for CliRenderer {
    fn writer(&self) -> &Writer {
        self.inner.writer()
    }

    fn create_message(&self, channel: Channel, text: String) -> Message {
        self.inner.create_message(channel, text)
    }
}

impl Log for RendererInner {
    fn writer(&self) -> &Writer {
        &self.writer
    }

    fn create_message(&self, channel: Channel, text: String) -> Message {
        Message::bare(text).set_channel(channel)
    }
}

impl RendererInner {
    fn indent(&self) -> String {
        INDENT.repeat(self.depth_level)
    }

    fn formatted_test_name(&self) -> String {
        style(self.test.name()).bold().to_string()
    }

    fn write(&self, channel: Channel, parts: &[&str]) {
        let indent = self.indent();
        let mut line = Vec::with_capacity(parts.len() + 1);
        line.push(indent.as_str());
        line.extend_from_slice(parts);
        self.log_message(channel, &line);
    }

    fn render_test_runner_starting(&self) {
        let name = self.formatted_test_name();
        self.write(Channel::Notice, &[&format!("{LINE} Running {name} {LINE}")]);
    }

    fn formatted_state_symbol(&self) -> String {
        let state = self.test.state();
        format!("{} ", paint(state, state_symbol(state)).bold())
    }

    fn test_runner_statistics(&self, newline: &str) -> String {
        let Some(runner) = self.test.as_runner() else {
            return String::new();
        };
        let mut by_state: BTreeMap<UnitTestState, usize> = BTreeMap::new();
        for test in runner.get_all_tests_and_child_tests() {
            *by_state.entry(test.state()).or_default() += 1;
        }

        let mut statistics: String = by_state
            .into_iter()
            .map(|(state, count)| format!("{newline}{state}: {count}"))
            .collect();
        statistics.push_str(&format!(
            "{newline}Time: {}s",
            seconds(self.test.exec_time())
        ));
        statistics
    }

    fn render_test_finished(&self) {
        let newline = format!("\n{}{INDENT}", self.indent());
        let state = self.test.state();
        trace!(test = self.test.name(), %state, "rendering finished test");

        let (channel, mut additional) = match state {
            UnitTestState::Successful => (Channel::Notice, String::new()),
            UnitTestState::Error => {
                let mut additional = String::new();
                if let Some(e) = self.test.exception() {
                    let message = e.to_string();
                    additional.push_str(
                        &style(format!("{newline}Error: {message}"))
                            .red()
                            .to_string(),
                    );
                    let trace = format!("{e:?}");
                    if trace != message {
                        let trace = trace.replace('\n', &newline);
                        additional.push_str(
                            &style(format!("{newline}{trace}")).yellow().to_string(),
                        );
                    }
                }
                (Channel::Error, additional)
            }
            UnitTestState::Timeout => (
                Channel::Warn,
                style(format!(
                    "{newline}Timeout after {}s",
                    seconds(Some(self.test.times_out_after()))
                ))
                .red()
                .to_string(),
            ),
            _ => (Channel::Warn, String::new()),
        };

        let mut assertions = String::new();
        if self.test.is_runner() {
            additional = self.test_runner_statistics(&newline);
        } else {
            for result in self.test.assertion_results() {
                let state = if result.successful() {
                    UnitTestState::Successful
                } else {
                    UnitTestState::Fail
                };
                let description = match result.description() {
                    "" => "???",
                    description => description,
                };
                assertions.push_str(&format!(
                    "{newline}{} {description}",
                    paint(state, state_symbol(state))
                ));
            }
        }

        self.write(
            channel,
            &[
                &self.formatted_state_symbol(),
                &self.formatted_test_name(),
                &assertions,
                &additional,
            ],
        );
    }
}

fn state_symbol(state: UnitTestState) -> &'static str {
    match state {
        UnitTestState::Successful => "✓",
        UnitTestState::Fail => "✗",
        UnitTestState::Error => "!",
        UnitTestState::Timeout => "⌬",
        _ => "?",
    }
}

fn paint<D: Display>(state: UnitTestState, text: D) -> StyledObject<D> {
    let styled = style(text);
    match state {
        UnitTestState::Successful => styled.green(),
        UnitTestState::Fail | UnitTestState::Error | UnitTestState::Timeout => styled.red(),
        _ => styled,
    }
}

/// Milliseconds as fractional seconds, `0` when unknown.
fn seconds(duration: Option<Duration>) -> f64 {
    duration.map_or(0.0, |d| d.as_millis() as f64 / 1000.0)
}
