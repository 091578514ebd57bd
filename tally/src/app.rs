use clap::{Arg, ArgAction, ArgMatches, Command as ClapCommand};
use console::Term;
use std::{ffi::OsString, rc::Rc, str::FromStr};
use tracing::*;
use tracing_subscriber::EnvFilter;

use crate::{get_config, CliRenderer, Color, Log, Sink, UnitTest, UnitTestState};

/// Build the CLI with clap's builder pattern
fn build_cli() -> ClapCommand {
    ClapCommand::new("tally")
        .about("tally CLI offers commands for listing and running a test tree")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .subcommand(
            ClapCommand::new("test")
                .about("Run tests and render the results")
                .arg(Arg::new("capture-rust")
                    .long("capture-rust")
                    .help("Capture Rust \"tracing\" based logs. This is useful when tally fails unexpectedly and you would want to see its internal logs. Filtered by RUST_LOG, \"info\" by default")
                    .action(ArgAction::SetTrue))
                .arg(Arg::new("color")
                    .long("color")
                    .help("Produce color output. Default is \"auto\" [env: CARGO_TERM_COLOR]")
                    .value_parser(["auto", "always", "never"]))
        )
        .subcommand(
            ClapCommand::new("ls")
                .about("List the test tree")
        )
}

/// tally CLI.
pub struct App {
    output: Rc<dyn Sink>,
}

impl Default for App {
    fn default() -> Self {
        App::new()
    }
}

impl App {
    /// An app writing to stdout.
    pub fn new() -> App {
        App {
            output: Rc::new(Term::stdout()),
        }
    }

    /// Sends everything the app prints to `output` instead of stdout.
    pub fn with_output(output: Rc<dyn Sink>) -> App {
        App { output }
    }

    /// Parse command-line args and run tally CLI sub command on `root`.
    pub async fn run(self, root: impl Into<UnitTest>) -> eyre::Result<()> {
        let matches = build_cli().get_matches();
        self.dispatch(root.into(), matches).await
    }

    /// Like [`App::run`], with explicit command-line args. Invalid args are
    /// returned as an error instead of exiting the process.
    pub async fn run_from<I, T>(self, root: impl Into<UnitTest>, args: I) -> eyre::Result<()>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = build_cli().try_get_matches_from(args)?;
        self.dispatch(root.into(), matches).await
    }

    async fn dispatch(self, root: UnitTest, matches: ArgMatches) -> eyre::Result<()> {
        if let Err(e) = color_eyre::install() {
            debug!("color-eyre is already installed: {e}");
        }

        match matches.subcommand() {
            Some(("test", test_matches)) => self.test(root, test_matches).await,
            Some(("ls", _)) => self.list(&root, 0),
            _ => unreachable!("Subcommand required is set to true"),
        }
    }

    async fn test(&self, root: UnitTest, matches: &ArgMatches) -> eyre::Result<()> {
        if matches.get_flag("capture-rust") {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            if let Err(e) = tracing_subscriber::fmt().with_env_filter(filter).try_init() {
                debug!("tracing subscriber is already installed: {e}");
            }
        }

        let color_command = matches
            .get_one::<String>("color")
            .and_then(|s| Color::from_str(s).ok());
        let color_env = std::env::var("CARGO_TERM_COLOR");
        let color = match (color_command, color_env) {
            (Some(color), _) => color,
            (None, Ok(color)) => Color::from_str(&color).unwrap_or(get_config().color),
            (None, Err(_)) => get_config().color,
        };
        color.apply();

        let renderer = CliRenderer::new(root.clone());
        renderer.pipe_log_messages_to(self.output.clone())?;

        info!(test = root.name(), "running test tree");
        root.run().await;
        info!(test = root.name(), state = %root.state(), "test tree finished");

        if root.state() != UnitTestState::Successful {
            eyre::bail!("one or more tests failed");
        }
        Ok(())
    }

    fn list(&self, test: &UnitTest, depth: usize) -> eyre::Result<()> {
        let bullet = if test.is_runner() { '*' } else { '-' };
        self.output.write_str(&format!(
            "{}{bullet} {}\n",
            "  ".repeat(depth),
            test.name()
        ))?;
        for child in test.tests() {
            self.list(&child, depth + 1)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Definition, MemorySink, TestFactory, TestRunner};
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    fn leaf(name: &str, outcome: bool) -> TestFactory {
        TestFactory::new(Definition::new(name), move |t| async move {
            t.assert(outcome, "checked").await?;
            Ok(())
        })
    }

    fn suite(outcome: bool) -> UnitTest {
        let nested = TestRunner::runs(Definition::new("Stats"), [leaf("Load Stats", true)]);
        TestRunner::runs(
            Definition::new("API Test Suite"),
            [nested, leaf("Load User", outcome)],
        )
        .instantiate()
    }

    #[tokio::test]
    #[serial]
    async fn test_renders_tree() {
        let sink = Rc::new(MemorySink::new());
        let root = suite(true);

        App::with_output(sink.clone())
            .run_from(root.clone(), ["tally", "test", "--color", "never"])
            .await
            .unwrap();

        assert_eq!(root.state(), UnitTestState::Successful);
        let lines = sink.lines();
        assert_eq!(
            lines[0],
            "--------------- Running API Test Suite ---------------"
        );
        assert!(lines.contains(&"\t\t✓ Load Stats".to_string()), "{lines:?}");
        assert!(lines.contains(&"✓ API Test Suite".to_string()), "{lines:?}");
    }

    #[tokio::test]
    #[serial]
    async fn failing_tree_is_an_error() {
        let sink = Rc::new(MemorySink::new());
        let root = suite(false);

        let result = App::with_output(sink.clone())
            .run_from(root.clone(), ["tally", "test", "--color", "never"])
            .await;

        assert_eq!(root.state(), UnitTestState::Fail);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "one or more tests failed");
        assert!(sink.lines().contains(&"✗ API Test Suite".to_string()));
    }

    #[tokio::test]
    async fn ls_prints_indented_tree() -> eyre::Result<()> {
        let sink = Rc::new(MemorySink::new());
        let root = suite(true);

        App::with_output(sink.clone())
            .run_from(root.clone(), ["tally", "ls"])
            .await?;

        assert_eq!(
            sink.lines(),
            vec![
                "* API Test Suite",
                "  * Stats",
                "    - Load Stats",
                "  - Load User",
            ]
        );
        assert_eq!(root.state(), UnitTestState::Idle);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_subcommand_is_rejected() {
        let result = App::with_output(Rc::new(MemorySink::new()))
            .run_from(suite(true), ["tally", "bench"])
            .await;
        assert!(result.is_err());
    }
}
