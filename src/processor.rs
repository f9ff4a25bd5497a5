use std::cmp::Ordering;
use std::fmt::Write;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::article::Article;

type Predicate<'a> = Box<dyn Fn(&Article) -> bool + 'a>;
type Comparator<'a> = Box<dyn Fn(&Article, &Article) -> Ordering + 'a>;

/// Optional filter and sort applied by [`to_table`]. Without either, every
/// article is kept in its original order.
#[derive(Default)]
pub struct TableOptions<'a> {
    filter: Option<Predicate<'a>>,
    sort: Option<Comparator<'a>>,
}

impl<'a> TableOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only articles for which `predicate` returns true.
    pub fn filter(mut self, predicate: impl Fn(&Article) -> bool + 'a) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Stable ascending sort by the value `key` extracts.
    pub fn sort_by_key<K: Ord + 'a>(mut self, key: impl Fn(&Article) -> K + 'a) -> Self {
        self.sort = Some(Box::new(move |a: &Article, b: &Article| key(a).cmp(&key(b))));
        self
    }
}

pub const COLUMNS: [&str; 7] = [
    "url",
    "source",
    "author",
    "title",
    "description",
    "publishedAt",
    "content",
];

type Row = [Option<String>; 7];

fn row_of(article: &Article) -> Row {
    [
        article.url(),
        article.source(),
        article.author(),
        article.title(),
        article.description(),
        article.published_at(),
        article.content(),
    ]
    .map(|v| v.map(str::to_string))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleTable {
    rows: Vec<Row>,
}

impl ArticleTable {
    pub fn columns(&self) -> &'static [&'static str] {
        &COLUMNS
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let col = COLUMNS.iter().position(|c| *c == column)?;
        self.rows.get(row)?[col].as_deref()
    }

    pub fn column(&self, column: &str) -> Option<Vec<Option<&str>>> {
        let col = COLUMNS.iter().position(|c| *c == column)?;
        Some(self.rows.iter().map(|r| r[col].as_deref()).collect())
    }

    pub fn head(&self, n: usize) -> ArticleTable {
        ArticleTable {
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }

    /// Renders the table as aligned text no wider than `width` columns.
    /// Long cells are cut with an ellipsis; absent cells show as `-`.
    pub fn render(&self, width: usize) -> String {
        let gap = 2;
        let budget = width.saturating_sub(gap * (COLUMNS.len() - 1));
        let widths = column_widths(&self.rows, budget);

        let mut out = String::new();
        let header: Vec<String> = COLUMNS
            .iter()
            .zip(&widths)
            .map(|(name, w)| fit(name, *w))
            .collect();
        writeln!(out, "{}", header.join("  ").trim_end()).unwrap();
        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, w)| fit(cell.as_deref().unwrap_or("-"), *w))
                .collect();
            writeln!(out, "{}", cells.join("  ").trim_end()).unwrap();
        }
        out
    }
}

fn column_widths(rows: &[Row], budget: usize) -> Vec<usize> {
    let natural: Vec<usize> = (0..COLUMNS.len())
        .map(|i| {
            rows.iter()
                .map(|r| single_line(r[i].as_deref().unwrap_or("-")).width())
                .chain(std::iter::once(COLUMNS[i].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut widths = natural.clone();
    // Shrink the widest column until everything fits; never below 3 cells.
    while widths.iter().sum::<usize>() > budget {
        let (widest, w) = widths
            .iter()
            .enumerate()
            .max_by_key(|(_, w)| **w)
            .map(|(i, w)| (i, *w))
            .unwrap_or((0, 0));
        if w <= 3 {
            break;
        }
        widths[widest] = w - 1;
    }
    widths
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn fit(text: &str, width: usize) -> String {
    let text = single_line(text);
    let mut out = String::new();
    if text.width() <= width {
        out.push_str(&text);
    } else {
        let mut used = 0;
        for c in text.chars() {
            let cw = c.width().unwrap_or(0);
            if used + cw + 1 > width {
                break;
            }
            out.push(c);
            used += cw;
        }
        out.push('…');
    }
    let pad = width.saturating_sub(out.width());
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Applies the filter, then the sort, returning the surviving articles.
pub fn select<'a>(articles: &'a [Article], options: &TableOptions<'_>) -> Vec<&'a Article> {
    let mut kept: Vec<&Article> = match &options.filter {
        Some(predicate) => articles.iter().filter(|a| predicate(*a)).collect(),
        None => articles.iter().collect(),
    };
    if let Some(compare) = &options.sort {
        kept.sort_by(|a, b| compare(*a, *b));
    }
    kept
}

/// Projects already-selected articles into the fixed seven columns, in the
/// order given.
pub fn project(articles: &[&Article]) -> ArticleTable {
    ArticleTable {
        rows: articles.iter().map(|a| row_of(a)).collect(),
    }
}

/// Filters, then sorts, then projects articles into the fixed seven columns.
pub fn to_table(articles: &[Article], options: &TableOptions<'_>) -> ArticleTable {
    project(&select(articles, options))
}
