/// `business` command: fetch one business by id.
use std::io;

use crate::api::YelpError;
use crate::cli::OutputCtx;
use crate::cli::args::BusinessArgs;
use crate::cli::output::write_business;
use crate::config::Settings;

/// Run `yelp business`.
///
/// # Errors
///
/// Returns `YelpError` on a malformed country code, missing credentials, or
/// a failed request (an unknown id comes back as an API error).
pub fn run(args: &BusinessArgs, settings: &Settings, ctx: &OutputCtx) -> Result<(), YelpError> {
    let query = args.to_query();
    query.validate()?;

    let client = settings.connect()?;

    let timer = ctx.timer("business");
    let business = client.business(&args.id, &query)?;
    drop(timer);

    let stdout = io::stdout();
    write_business(&mut stdout.lock(), &business, ctx)?;
    Ok(())
}
