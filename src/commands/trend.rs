use std::path::Path;

use newsdesk::trend::{TrendOutcome, plot_keyword_trend};
use newsdesk::{Fetcher, Query};

use super::with_spinner;

pub(crate) fn cmd_trend(
    fetcher: &Fetcher,
    query: &Query,
    term: &str,
    out: &Path,
    open_plot: bool,
) -> anyhow::Result<()> {
    // A blank term would turn into an unbounded archive search.
    if term.trim().is_empty() {
        println!("No search term provided.");
        return Ok(());
    }

    let articles = with_spinner("Searching articles...", || fetcher.span(query))?;
    match plot_keyword_trend(&articles, term, out)? {
        TrendOutcome::NoTerm => println!("No search term provided."),
        TrendOutcome::NoDatedRecords => println!("No dated articles to plot."),
        TrendOutcome::Series(trend) => {
            println!("{}", trend.y_label());
            for point in &trend.points {
                println!("{}  {}", point.day.format("%Y-%m-%d"), point.count);
            }
            eprintln!("Wrote {}", out.display());
            if open_plot {
                open::that(out)
                    .map_err(|e| anyhow::anyhow!("Could not open plot: {}", e))?;
            }
        }
    }
    Ok(())
}
