use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use itertools::Itertools;
use plotters::prelude::*;
use tracing::info;

use crate::article::Article;
use crate::error::{Error, Result};

// Basic-format (no separators) timestamps, after a trailing `Z` has been
// rewritten as `+0000`.
const BASIC_OFFSET_FORMATS: [&str; 2] = ["%Y%m%dT%H%M%S%.f%z", "%Y%m%dT%H%M%S%.f%:z"];

const NAIVE_DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

/// Calendar day of an ISO 8601 timestamp, in the timestamp's own offset.
/// Both the extended (`2023-10-01T12:00:00Z`) and the basic
/// (`20231001T120000Z`) forms are understood.
///
/// Falls back to reading the first ten characters as `YYYY-MM-DD`.
pub fn extract_day(timestamp: &str) -> Option<NaiveDate> {
    let s = timestamp.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    let zulu = s.strip_suffix(['Z', 'z']).map(|rest| format!("{rest}+0000"));
    let with_offset = zulu.as_deref().unwrap_or(s);
    if let Some(dt) = BASIC_OFFSET_FORMATS
        .iter()
        .find_map(|f| DateTime::parse_from_str(with_offset, f).ok())
    {
        return Some(dt.date_naive());
    }
    if let Some(dt) = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
    {
        return Some(dt.date());
    }
    if let Ok(day) = NaiveDate::parse_from_str(s, "%Y%m%d") {
        return Some(day);
    }
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrendPoint {
    pub day: NaiveDate,
    pub count: usize,
}

/// Per-day count of articles whose title mentions `term`, one point for
/// every day between the first and last dated article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTrend {
    pub term: String,
    pub points: Vec<TrendPoint>,
}

impl KeywordTrend {
    pub fn title(&self) -> String {
        format!("\"{}\" popularity in titles over time", self.term)
    }

    pub fn y_label(&self) -> String {
        format!("Articles with \"{}\" in title", self.term)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrendOutcome {
    NoTerm,
    NoDatedRecords,
    Series(KeywordTrend),
}

pub fn keyword_trend(articles: &[Article], term: &str) -> TrendOutcome {
    let term = term.trim();
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return TrendOutcome::NoTerm;
    }

    let dated: Vec<(NaiveDate, bool)> = articles
        .iter()
        .filter_map(|a| {
            let day = extract_day(a.published_at()?)?;
            let hit = a
                .title()
                .is_some_and(|t| t.to_lowercase().contains(&needle));
            Some((day, hit))
        })
        .collect();

    let Some((first, last)) = dated.iter().map(|(d, _)| *d).minmax().into_option() else {
        return TrendOutcome::NoDatedRecords;
    };

    let counts = dated
        .iter()
        .filter(|(_, hit)| *hit)
        .map(|(d, _)| *d)
        .counts();

    let points = first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|day| TrendPoint {
            day,
            count: counts.get(&day).copied().unwrap_or(0),
        })
        .collect();

    TrendOutcome::Series(KeywordTrend {
        term: term.to_string(),
        points,
    })
}

/// Builds the keyword trend and draws it as an SVG line chart at `out`.
///
/// A blank term or a set with no dated articles draws nothing; the returned
/// outcome says which.
pub fn plot_keyword_trend(articles: &[Article], term: &str, out: &Path) -> Result<TrendOutcome> {
    let outcome = keyword_trend(articles, term);
    match &outcome {
        TrendOutcome::NoTerm => info!("no search term provided, nothing to plot"),
        TrendOutcome::NoDatedRecords => info!("no dated articles to plot"),
        TrendOutcome::Series(trend) => {
            render_svg(trend, out)?;
            info!(
                term = %trend.term,
                days = trend.points.len(),
                path = %out.display(),
                "wrote keyword trend plot"
            );
        }
    }
    Ok(outcome)
}

fn plot_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

fn render_svg(trend: &KeywordTrend, out: &Path) -> Result<()> {
    let root = SVGBackend::new(out, (960, 540)).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let last_x = trend.points.len().saturating_sub(1) as i64;
    let max_y = trend.points.iter().map(|p| p.count).max().unwrap_or(0) as u32;

    let mut chart = ChartBuilder::on(&root)
        .caption(trend.title(), ("sans-serif", 22).into_font())
        .margin(16)
        .x_label_area_size(60)
        .y_label_area_size(60)
        .build_cartesian_2d(0i64..last_x.max(1), 0u32..max_y + 1)
        .map_err(plot_error)?;

    let days: Vec<String> = trend
        .points
        .iter()
        .map(|p| p.day.format("%Y-%m-%d").to_string())
        .collect();
    let day_label = |x: &i64| {
        usize::try_from(*x)
            .ok()
            .and_then(|i| days.get(i).cloned())
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .x_desc("Date")
        .y_desc(trend.y_label())
        .x_labels(days.len().clamp(2, 12))
        .x_label_formatter(&day_label)
        .draw()
        .map_err(plot_error)?;

    let points: Vec<(i64, u32)> = trend
        .points
        .iter()
        .enumerate()
        .map(|(i, p)| (i as i64, p.count as u32))
        .collect();

    chart
        .draw_series(LineSeries::new(points.iter().copied(), &BLUE))
        .map_err(plot_error)?;
    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 4, BLUE.filled())),
        )
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    Ok(())
}
