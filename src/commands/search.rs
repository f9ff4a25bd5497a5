use newsdesk::{Fetcher, Query};

use super::{ViewArgs, render_articles, with_spinner};

pub(crate) fn cmd_search(fetcher: &Fetcher, query: &Query, view: &ViewArgs) -> anyhow::Result<()> {
    let articles = with_spinner("Searching articles...", || fetcher.span(query))?;
    println!("{}", render_articles(&articles, view)?);
    Ok(())
}
