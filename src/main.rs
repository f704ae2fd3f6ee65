use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rcomments::{
    init_tracing_once, parse_iso_date, write_records, write_records_to, Dataset, FetchOptions, Fetcher, LocalZone,
    SampleCriteria, SelectBy, DEFAULT_SEED, ENV_BASE_URL, ENV_DATA_DIR,
};
use std::path::PathBuf;
use time::Date;

#[derive(Parser, Debug)]
#[command(name = "rcomments", version, about = "Scrape Reddit comments day by day and sample them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download comments one day at a time and store them as CSV.
    Fetch(FetchArgs),
    /// Select a subset of a stored CSV by date, terms and score.
    Sample(SampleArgs),
}

#[derive(Args, Debug)]
struct FetchArgs {
    /// All comments need to include this term.
    #[arg(long)]
    term: Option<String>,
    /// Limit results to this subreddit ("r/" prefix optional).
    #[arg(long)]
    subreddit: Option<String>,
    /// Max comments per day.
    #[arg(long, default_value_t = 1000, allow_negative_numbers = true)]
    per_day: i64,
    /// First day, inclusive (YYYY-MM-DD).
    #[arg(long, default_value = "2020-01-01", value_parser = parse_date)]
    start: Date,
    /// Last day, inclusive (YYYY-MM-DD); clamped to yesterday.
    #[arg(long, default_value = "2030-01-01", value_parser = parse_date)]
    end: Date,
    /// Minimum score (upvotes).
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    min_score: i64,
    /// Sort key sent as `sort_type`.
    #[arg(long, default_value = "score")]
    sort_by: String,
    /// Output filename inside the data directory (derived from the query if omitted).
    #[arg(long)]
    output: Option<String>,
    #[arg(long, env = ENV_DATA_DIR, default_value = "reddit_data")]
    data_dir: PathBuf,
    #[arg(long, env = ENV_BASE_URL)]
    base_url: Option<String>,
    /// Zone for day boundaries: "local" or an IANA name such as America/New_York.
    #[arg(long, default_value = "local", value_parser = parse_zone)]
    timezone: LocalZone,
    /// Seconds to wait after each request.
    #[arg(long, default_value_t = 1)]
    interval_secs: u64,
    #[arg(long)]
    no_progress: bool,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// CSV file written by `fetch`.
    #[arg(long)]
    input: PathBuf,
    #[arg(long, value_parser = parse_date)]
    start: Option<Date>,
    #[arg(long, value_parser = parse_date)]
    end: Option<Date>,
    /// Number of comments to select (all when omitted).
    #[arg(long)]
    count: Option<usize>,
    #[arg(long, default_value_t = 10)]
    min_words: usize,
    /// "random" or "score".
    #[arg(long, default_value = "random")]
    select_by: String,
    /// Term that must appear as a whole word (repeatable).
    #[arg(long = "include")]
    include: Vec<String>,
    /// Term that must not appear (repeatable).
    #[arg(long = "exclude")]
    exclude: Vec<String>,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    /// Write the sample to this CSV instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn parse_zone(s: &str) -> Result<LocalZone, String> {
    s.parse().map_err(|e: rcomments::RcError| e.to_string())
}

fn parse_date(s: &str) -> Result<Date, String> {
    parse_iso_date(s).map_err(|e| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing_once();

    match cli.command {
        Command::Fetch(args) => fetch(args),
        Command::Sample(args) => sample(args),
    }
}

fn fetch(args: FetchArgs) -> Result<()> {
    let mut opts = FetchOptions::default()
        .with_results_per_day(args.per_day)
        .with_date_range(args.start, args.end)
        .with_zone(args.timezone)
        .with_min_score(args.min_score)
        .with_sort_by(Some(args.sort_by))
        .with_data_dir(&args.data_dir)
        .with_request_interval(std::time::Duration::from_secs(args.interval_secs))
        .with_progress(!args.no_progress);
    if let Some(t) = args.term { opts = opts.with_search_term(t); }
    if let Some(s) = args.subreddit { opts = opts.with_subreddit(s); }
    if let Some(u) = args.base_url { opts = opts.with_base_url(u); }
    if let Some(f) = args.output { opts = opts.with_filename(f); }

    let fetcher = Fetcher::new(opts)?;
    let report = fetcher.execute_and_store(None)?;
    println!("Found {} comments matching your search query; stored in {}", report.records, report.path.display());
    Ok(())
}

fn sample(args: SampleArgs) -> Result<()> {
    // Validate before touching the file.
    let select_by: SelectBy = args.select_by.parse()?;

    let mut criteria = SampleCriteria::new()
        .with_min_words(args.min_words)
        .with_select_by(select_by)
        .must_include(&args.include)
        .must_exclude(&args.exclude);
    if let Some(s) = args.start { criteria.start_date = s; }
    if let Some(e) = args.end { criteria.end_date = e; }
    if let Some(n) = args.count { criteria = criteria.with_max_count(n); }

    let dataset = Dataset::load(&args.input)?;
    let mut rng = StdRng::seed_from_u64(args.seed);
    let picked = dataset.sample_with_rng(&criteria, &mut rng);
    tracing::info!("selected {} of {} comments", picked.len(), dataset.len());

    match args.output {
        Some(path) => {
            write_records(&path, picked.iter().copied())?;
        }
        None => {
            let stdout = std::io::stdout();
            write_records_to(stdout.lock(), picked.iter().copied())?;
        }
    }
    Ok(())
}
