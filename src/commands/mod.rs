pub mod headlines;
pub mod search;
pub mod trend;

use std::time::Duration;

use anyhow::ensure;
use clap::ValueEnum;
use indicatif::ProgressBar;
use newsdesk::Article;
use newsdesk::processor::{TableOptions, project, select};

const DEFAULT_WIDTH: usize = 120;

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
pub(crate) enum SortField {
    Title,
    Date,
    Source,
    Author,
}

impl SortField {
    fn key(self, article: &Article) -> String {
        let value = match self {
            SortField::Title => article.title(),
            SortField::Date => article.published_at(),
            SortField::Source => article.source(),
            SortField::Author => article.author(),
        };
        value.unwrap_or_default().to_string()
    }
}

#[derive(clap::Args, Debug, Default)]
pub(crate) struct ViewArgs {
    /// Sort ascending by this field
    #[arg(long, value_enum)]
    pub sort: Option<SortField>,
    /// Only show articles that name an author
    #[arg(long)]
    pub with_author: bool,
    /// Print articles as JSON
    #[arg(long, conflicts_with = "table")]
    pub json: bool,
    /// Print articles as a table
    #[arg(long)]
    pub table: bool,
}

impl ViewArgs {
    fn options(&self) -> TableOptions<'static> {
        let mut options = TableOptions::new();
        if self.with_author {
            options = options.filter(|a| a.author().is_some_and(|s| !s.is_empty()));
        }
        if let Some(field) = self.sort {
            options = options.sort_by_key(move |a| field.key(a));
        }
        options
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(terminal_size::Width(w), _)| w as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

fn format_article(article: &Article) -> String {
    match article.url() {
        Some(url) if !url.is_empty() => format!("{}\n    {}", article, url),
        _ => article.to_string(),
    }
}

pub(crate) fn render_articles(articles: &[Article], view: &ViewArgs) -> anyhow::Result<String> {
    let options = view.options();
    let selected = select(articles, &options);
    ensure!(!selected.is_empty(), "No matching articles");

    let out = if view.json {
        serde_json::to_string_pretty(&selected)?
    } else if view.table {
        project(&selected)
            .render(terminal_width())
            .trim_end_matches('\n')
            .to_string()
    } else {
        selected
            .iter()
            .map(|a| format_article(a))
            .collect::<Vec<_>>()
            .join("\n")
    };
    Ok(out)
}

/// Runs `f` with a spinner on stderr. The spinner stays hidden when stderr
/// is not a terminal.
pub(crate) fn with_spinner<T>(message: &str, f: impl FnOnce() -> T) -> T {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    let result = f();
    pb.finish_and_clear();
    result
}
