/// Command dispatch: routes `Command` enum variants to their implementations.
pub mod business;
pub mod search;

use crate::api::YelpError;
use crate::cli::OutputCtx;
use crate::cli::args::Command;
use crate::config::Settings;

/// Dispatch a parsed `Command` to its handler.
///
/// # Errors
///
/// Returns `YelpError` on any command failure.
pub fn dispatch(command: &Command, settings: &Settings, ctx: &OutputCtx) -> Result<(), YelpError> {
    match command {
        Command::Search(args) => search::run(args, settings, ctx),
        Command::Business(args) => business::run(args, settings, ctx),
    }
}
