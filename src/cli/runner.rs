use crate::app::FaultReport;
use crate::dispatcher::Dispatcher;
use crate::handler::HandlerId;
use crate::http::{Request, Response};
use crate::registry::{HandlerLocator, HandlerRegistry};
use crate::router::{ParamVec, DEFAULT_MODULE};
use clap::Parser;
use std::io::Write;
use tracing::info;

/// Command-line arguments: a command name followed by its positional
/// parameters.
#[derive(Debug, Parser)]
#[command(name = "waypoint")]
#[command(about = "Run console commands through the dispatch pipeline", long_about = None)]
pub struct Cli {
    /// Render the full diagnostic report on failure instead of a one-liner
    #[arg(long, default_value_t = false)]
    pub debug: bool,

    /// Command name followed by positional parameters
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Executes console commands under the web invocation contract.
///
/// A command named `migrate` is the handler registered as
/// `Command::Migrate`; it is dispatched with operation `index` and the
/// remaining argv as positional params.
pub struct CommandRunner<'a> {
    registry: &'a HandlerRegistry,
    dispatcher: Dispatcher,
    debug: bool,
}

impl<'a> CommandRunner<'a> {
    pub fn new(registry: &'a HandlerRegistry) -> Self {
        Self {
            registry,
            dispatcher: Dispatcher::new(),
            debug: false,
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Run one command, writing its captured output (and any failure text)
    /// to `sink`. Returns the process exit code: `0` on success, `-1` on
    /// any resolution or usage failure.
    pub fn run<W: Write>(&self, args: &[String], sink: &mut W) -> i32 {
        let Some((name, params)) = args.split_first() else {
            let _ = writeln!(sink, "Please enter a command name to execute.");
            let _ = writeln!(sink, "    waypoint <command-name> [parameters...]");
            return -1;
        };

        let id = HandlerId::command(name);
        if !self.registry.locate(&id) {
            let _ = writeln!(sink, "Unknown command: {name}");
            return -1;
        }
        info!(command = %name, handler = %id, "running console command");

        let params: ParamVec = params.iter().cloned().collect();
        let request = Request::for_handler(DEFAULT_MODULE, id, "index", params);
        let mut response = Response::new();
        match self.dispatcher.dispatch(self.registry, &request, &mut response) {
            Ok(()) => {
                let _ = sink.write_all(response.body().as_bytes());
                0
            }
            Err(failure) => {
                if self.debug {
                    let report = FaultReport::from_failure(&failure);
                    let rendered = serde_json::to_string_pretty(&report)
                        .unwrap_or_else(|_| report.message.clone());
                    let _ = writeln!(sink, "{rendered}");
                } else {
                    let _ = writeln!(sink, "{failure}");
                }
                -1
            }
        }
    }
}

/// Parse argv and run the named command against `registry`. Convenience for
/// binaries; returns the process exit code.
pub fn run(registry: &HandlerRegistry, argv: impl IntoIterator<Item = String>) -> i32 {
    let cli = match Cli::try_parse_from(argv) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return -1;
        }
    };
    CommandRunner::new(registry)
        .with_debug(cli.debug)
        .run(&cli.args, &mut std::io::stdout())
}

/// Install the fmt/env-filter subscriber for process binaries. Safe to call
/// more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}
