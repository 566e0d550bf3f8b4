/// `search` command: one page of results, or every page with `--depaginate`.
use std::io;

use crate::api::YelpError;
use crate::cli::OutputCtx;
use crate::cli::args::SearchArgs;
use crate::cli::output::{BusinessStream, write_page};
use crate::config::Settings;

/// Run `yelp search`.
///
/// # Errors
///
/// Returns `YelpError` on invalid flags, missing credentials, or any failed
/// request. With `--depaginate`, the first failing page aborts the run.
pub fn run(args: &SearchArgs, settings: &Settings, ctx: &OutputCtx) -> Result<(), YelpError> {
    let query = args.to_query()?;
    query.validate()?;

    let client = settings.connect()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if !args.depaginate {
        let timer = ctx.timer("search");
        let page = client.search(&query)?;
        drop(timer);

        write_page(&mut out, &page, ctx)?;
        return Ok(());
    }

    let _t_depaginate = ctx.timer("depaginate");
    let mut pages = client.depaginate(&query, args.page_ceiling());
    let mut stream = BusinessStream::new(&mut out, ctx);
    for business in pages.by_ref() {
        stream.push(&business?)?;
    }
    let count = stream.finish()?;
    tracing::debug!(businesses = count, pages = pages.pages_fetched(), "depagination finished");
    Ok(())
}
