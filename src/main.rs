use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use moviestats::analysis::{
    format_genre_combinations, format_ranked, RuntimeUnit, TitleTypeFilter, TopN,
};
use moviestats::config::{AppConfig, CliConfig, FileConfig};
use moviestats::enrichment::DEFAULT_TMDB_BASE_URL;
use moviestats::ingestion::RowOutcome;
use moviestats::{
    AnalysisSettings, Category, EnrichmentClient, EnrichmentFailurePolicy, IngestionPipeline,
    NoOpEnrichmentClient, RatingsAnalyser, RatingsSource, RetryPolicy, SqliteRatingsStore,
    TmdbClient,
};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "moviestats", version = env!("MOVIESTATS_VERSION"))]
struct CliArgs {
    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Path to the SQLite ratings database file.
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// API key for The Movie Database. Without one, titles are stored without contributors.
    #[clap(long, env = "TMDB_API_KEY", hide_env_values = true)]
    pub tmdb_api_key: Option<String>,

    /// Base URL of The Movie Database API.
    #[clap(long, default_value = DEFAULT_TMDB_BASE_URL)]
    pub tmdb_base_url: String,

    /// Timeout in seconds for each enrichment request.
    #[clap(long, default_value_t = 30)]
    pub enrichment_timeout_sec: u64,

    /// What to do with a title whose contributors could not be fetched.
    #[clap(long, value_enum, default_value = "rollback")]
    pub failure_policy: EnrichmentFailurePolicy,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the database schema if missing.
    Init,
    /// Add every new title of a ratings export to the database.
    Ingest {
        /// Path to the ratings CSV export.
        #[clap(value_parser = parse_path)]
        ratings_file: Option<PathBuf>,
    },
    /// Re-fetch contributors of titles stored with incomplete metadata.
    Backfill {
        /// Maximum number of titles to process.
        #[clap(long, default_value_t = 50)]
        limit: usize,
    },
    /// Print a report.
    Report {
        #[command(subcommand)]
        report: Report,
    },
}

#[derive(Subcommand, Debug)]
enum Report {
    /// Number of stored ratings.
    Count,
    /// Highest rated titles.
    Top {
        #[clap(long)]
        top_n: Option<i64>,
    },
    /// Names with the highest mean personal score.
    Best {
        #[clap(value_enum)]
        category: Category,
        #[clap(long)]
        top_n: Option<i64>,
    },
    /// Names linked to the most titles.
    Frequent {
        #[clap(value_enum)]
        category: Category,
        #[clap(long)]
        top_n: Option<i64>,
    },
    /// Personal minus external score for every title.
    Gaps,
    /// Total movie watching time.
    Runtime {
        #[clap(long, value_enum, default_value = "hours")]
        unit: RuntimeUnit,
    },
    /// Mean personal score.
    Mean,
    /// Number of titles per personal score.
    Distribution,
    /// Personal and external score of every title.
    Ratings,
    /// Best genre combinations by weighted score.
    Combinations {
        #[clap(long)]
        top_n: Option<i64>,
        /// Only movies or only series.
        #[clap(long, value_enum)]
        title_type: Option<TitleTypeFilter>,
    },
    /// Titles linked to a name.
    TitlesFor {
        #[clap(value_enum)]
        category: Category,
        name: String,
    },
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let ratings_file = match &cli_args.command {
        Command::Ingest { ratings_file } => ratings_file.clone(),
        _ => None,
    };
    let cli_config = CliConfig {
        db_path: cli_args.db.clone(),
        ratings_file,
        tmdb_api_key: cli_args.tmdb_api_key.clone(),
        tmdb_base_url: cli_args.tmdb_base_url.clone(),
        enrichment_timeout_sec: cli_args.enrichment_timeout_sec,
        failure_policy: cli_args.failure_policy,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;

    match cli_args.command {
        Command::Init => {
            info!("Initializing ratings database at {:?}", config.db_path);
            SqliteRatingsStore::open(&config.db_path)?;
        }
        Command::Ingest { .. } => run_ingest(&config)?,
        Command::Backfill { limit } => run_backfill(&config, limit)?,
        Command::Report { report } => run_report(&config, report)?,
    }
    Ok(())
}

fn build_enrichment_client(config: &AppConfig) -> Result<Box<dyn EnrichmentClient>> {
    let Some(api_key) = config.tmdb_api_key.clone() else {
        warn!("No TMDB API key configured, titles will be stored without contributors");
        return Ok(Box::new(NoOpEnrichmentClient));
    };

    let client = TmdbClient::new(
        &config.tmdb_base_url,
        api_key,
        config.enrichment_timeout_sec,
    )?;
    if let Err(err) = client.check_connection() {
        error!("TMDB at {} is not usable: {}", client.base_url(), err);
        return Err(err).context("Enrichment endpoint unreachable");
    }
    info!("Using TMDB at {}", client.base_url());
    Ok(Box::new(client))
}

fn run_ingest(config: &AppConfig) -> Result<()> {
    let source = RatingsSource::from_path(&config.ratings_file)?;
    let mut store = SqliteRatingsStore::open(&config.db_path)?;
    let client = build_enrichment_client(config)?;

    let progress = ProgressBar::new(source.rows.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    progress.set_message("Ingesting");

    let mut pipeline = IngestionPipeline::new(
        &mut store,
        client.as_ref(),
        RetryPolicy::new(&config.retry),
        config.failure_policy,
    );
    let report = pipeline.ingest(&source, |outcome| {
        if let RowOutcome::Inserted { title_key, .. }
        | RowOutcome::InsertedIncomplete { title_key, .. } = outcome
        {
            progress.set_message(title_key.clone());
        }
        progress.inc(1);
    })?;
    progress.finish_and_clear();

    for failed in &report.failed {
        warn!("Not ingested: {} ({})", failed.title_key, failed.reason);
    }
    if report.inserted_incomplete > 0 {
        warn!(
            "{} titles stored with incomplete contributors, run `backfill` to complete them",
            report.inserted_incomplete
        );
    }
    println!("{}", report.summary());
    Ok(())
}

fn run_backfill(config: &AppConfig, limit: usize) -> Result<()> {
    let mut store = SqliteRatingsStore::open(&config.db_path)?;
    let client = build_enrichment_client(config)?;

    let report = IngestionPipeline::new(
        &mut store,
        client.as_ref(),
        RetryPolicy::new(&config.retry),
        config.failure_policy,
    )
    .backfill(limit)?;

    println!(
        "{} titles completed, {} still incomplete",
        report.completed, report.still_incomplete
    );
    Ok(())
}

fn run_report(config: &AppConfig, report: Report) -> Result<()> {
    let analyser = RatingsAnalyser::open(&config.db_path)?;
    let settings = &config.analysis;
    let top_n = |n: Option<i64>| n.unwrap_or(settings.top_n);

    let output = match report {
        Report::Count => format!("{}\n", analyser.count()?),
        Report::Top { top_n: n } => format_ranked(&analyser.top_ratings(top_n(n))?),
        Report::Best { category, top_n: n } => {
            format_ranked(&analyser.leaderboard_by_mean(category, top_n(n))?)
        }
        Report::Frequent { category, top_n: n } => {
            format_ranked(&analyser.leaderboard_by_frequency(category, top_n(n))?)
        }
        Report::Gaps => format_ranked(&analyser.rating_gaps()?),
        Report::Runtime { unit } => {
            let total = analyser.total_runtime(unit)?;
            match unit {
                RuntimeUnit::Hours => format!("{:.2} hours\n", total),
                RuntimeUnit::Days => format!("{:.2} days\n", total),
            }
        }
        Report::Mean => match analyser.mean_personal_score()? {
            Some(mean) => format!("{:.2}\n", mean),
            None => "No ratings stored\n".to_string(),
        },
        Report::Distribution => format_ranked(&analyser.rating_distribution()?),
        Report::Ratings => format_ranked(&analyser.ratings()?),
        Report::Combinations {
            top_n: n,
            title_type,
        } => {
            let n = TopN::new(top_n(n))?;
            let settings = AnalysisSettings {
                combination_title_type: title_type.or(settings.combination_title_type),
                ..settings.clone()
            };
            let scores = analyser.genre_combination_scores(&settings)?;
            format_genre_combinations(&scores, n, settings.max_combination_size)
        }
        Report::TitlesFor { category, name } => {
            format_ranked(&analyser.titles_for(category, &name)?)
        }
    };
    print!("{}", output);
    Ok(())
}
