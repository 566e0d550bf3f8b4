#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::doc_markdown)]
//! yelp: search the Yelp v2 local-business API from the command line.

mod api;
mod cli;
mod commands;
mod config;
mod types;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, OutputCtx, write_error};
use config::Settings;
use types::ErrorOutput;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help / --version print to stdout and succeed; usage errors exit 1.
            let code = i32::from(err.use_stderr());
            let _ = err.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.debug);

    let ctx = OutputCtx::new(cli.output, cli.json, cli.no_header);
    let settings = Settings::from_cli(&cli);

    if let Err(err) = commands::dispatch(&cli.command, &settings, &ctx) {
        let code = err.exit_code();
        if code != 0 {
            write_error(&ErrorOutput::from_error(&err), ctx.format);
        }
        std::process::exit(code);
    }
}

/// Log to stderr. `YELP_LOG` takes an `EnvFilter` directive and wins over `--debug`.
fn init_tracing(debug: bool) {
    let default = if debug { "warn,yelp=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("YELP_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
