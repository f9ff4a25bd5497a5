mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use newsdesk::{DEFAULT_BASE_URL, DEFAULT_KEY_FILE, Fetcher, Query};
use tracing_subscriber::EnvFilter;

use commands::ViewArgs;

/// Query the News API from the command line
#[derive(Parser)]
#[command(version)]
struct Args {
    /// File containing the News API key
    #[arg(long, global = true)]
    key_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show current top headlines
    Headlines {
        /// Two-letter language code, e.g. en
        #[arg(short, long)]
        language: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
        /// Keywords to search for
        terms: Vec<String>,
    },
    /// Search the full article archive
    Search {
        /// Restrict results to a single day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Restrict results to a domain, e.g. bbc.co.uk
        #[arg(long)]
        domain: Option<String>,
        /// Two-letter language code, e.g. en
        #[arg(short, long)]
        language: Option<String>,
        #[command(flatten)]
        view: ViewArgs,
        /// Keywords to search for
        terms: Vec<String>,
    },
    /// Chart how many article titles mention a term on each day
    Trend {
        /// The term to look for in titles
        term: String,
        /// Restrict results to a single day (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// Restrict results to a domain, e.g. bbc.co.uk
        #[arg(long)]
        domain: Option<String>,
        /// Two-letter language code, e.g. en
        #[arg(short, long)]
        language: Option<String>,
        /// Where to write the SVG chart
        #[arg(short, long, default_value = "trend.svg")]
        out: PathBuf,
        /// Open the chart once it is written
        #[arg(long)]
        open: bool,
    },
}

fn key_file(arg: Option<PathBuf>) -> PathBuf {
    arg.or_else(|| std::env::var("NEWS_API_KEY_FILE").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_KEY_FILE))
}

fn base_url() -> String {
    std::env::var("NEWS_API_BASE_URL")
        .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
}

fn query(
    date: Option<String>,
    domain: Option<String>,
    language: Option<String>,
    terms: Vec<String>,
) -> Query {
    Query {
        date,
        domain,
        language,
        terms,
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();
    let fetcher = Fetcher::new(key_file(args.key_file))?.with_base_url(base_url());

    match args.command {
        Command::Headlines {
            language,
            ref view,
            terms,
        } => {
            let q = query(None, None, language, terms);
            commands::headlines::cmd_headlines(&fetcher, &q, view)
        }
        Command::Search {
            date,
            domain,
            language,
            ref view,
            terms,
        } => {
            let q = query(date, domain, language, terms);
            commands::search::cmd_search(&fetcher, &q, view)
        }
        Command::Trend {
            term,
            date,
            domain,
            language,
            ref out,
            open,
        } => {
            let q = query(date, domain, language, vec![term.clone()]);
            commands::trend::cmd_trend(&fetcher, &q, &term, out, open)
        }
    }
}
