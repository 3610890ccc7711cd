use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use streamboard::config::AppConfig;
use streamboard::render;
use streamboard::table::TrackRecord;
use streamboard::table::transforms::DateRange;
use streamboard::view::{Dashboard, ViewOptions};

#[derive(Parser)]
#[command(
    name = "streamboard",
    version,
    about = "Streaming-stats dashboard for a song spreadsheet"
)]
struct Cli {
    /// Path to the song spreadsheet (.xlsx workbook or CSV)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Path to a config file (defaults to ~/.config/streamboard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Skip malformed rows instead of refusing to load
    #[arg(long, global = true)]
    skip_invalid: bool,

    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Html,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the whole dashboard for one track and date range
    Dashboard {
        /// Track to show details for (defaults to the most streamed)
        #[arg(short, long)]
        track: Option<String>,

        /// Start of the release-date range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// End of the release-date range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show details and audio features for a track
    Track {
        /// Track name (exact, then case-insensitive substring)
        name: String,
    },

    /// Chart the most streamed tracks within a release-date range
    Top {
        /// Start of the release-date range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,

        /// End of the release-date range (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,

        /// Number of results (defaults to config top_n)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },

    /// Show the dataset-wide KPIs
    Summary,

    /// Chart the number of tracks released per year
    Releases,

    /// List selectable track names, most streamed first
    Tracks {
        /// Number of results
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

/// Fill missing range ends from the data bounds.
///
/// Only a user-supplied `--from` after a user-supplied `--to` is an error. A
/// single end outside the data just selects nothing.
fn resolve_range(
    bounds: Option<DateRange>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Option<DateRange>> {
    if let (Some(from), Some(to)) = (from, to) {
        if from > to {
            anyhow::bail!("Date range start {} is after end {}", from, to);
        }
    }
    Ok(bounds.map(|b| DateRange::with_defaults(b, from, to)))
}

/// Exact name first, then the most-streamed case-insensitive substring match.
fn resolve_track<'a>(dash: &Dashboard<'a>, name: &str) -> Result<&'a TrackRecord> {
    match dash.select(Some(name)) {
        Ok(Some(track)) => Ok(track),
        Ok(None) => anyhow::bail!("No tracks loaded."),
        Err(e) => dash.search(name).ok_or_else(|| e.into()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load config file (optional, defaults if missing)
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };

    let mut load_opts = config.load_options();
    if cli.skip_invalid {
        load_opts.skip_invalid_rows = true;
    }

    // Resolve data path: CLI > config > ./dataSet/spotify.xlsx
    let data_path = cli
        .data
        .or(config.data_path.clone())
        .unwrap_or_else(streamboard::config::default_data_path);
    log::info!("Data: {}", data_path.display());

    let table = streamboard::table::load(&data_path, &load_opts)?;
    if !table.skipped_rows.is_empty() {
        eprintln!(
            "Skipped {} malformed rows (run with -v for details)",
            table.skipped_rows.len()
        );
    }

    let dash = Dashboard::new(&table);
    let opts = ViewOptions {
        top_n: config.top_n,
        colors: config.colors.kpi(),
    };

    match cli.command {
        Commands::Dashboard { track, from, to, format } => {
            let range = resolve_range(dash.bounds(), from, to)?;
            let selection = match &track {
                Some(name) if !table.is_empty() => Some(resolve_track(&dash, name)?),
                _ => None,
            };
            let view = dash
                .view(selection.map(|t| t.track_name.as_str()), range, &opts)
                .context("Failed to build dashboard")?;
            match format {
                OutputFormat::Text => print!("{}", render::dashboard_text(&view)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
                OutputFormat::Html => print!("{}", render::dashboard_html(&view)),
            }
        }

        Commands::Track { name } => {
            if table.is_empty() {
                println!("No tracks loaded.");
                return Ok(());
            }
            let track = resolve_track(&dash, &name)?;
            print!("{}", render::track_detail(&dash.track_detail(track, &opts)));
            println!();
            print!("{}", render::feature_tiles(&dash.feature_tiles(track, &opts)));
        }

        Commands::Top { from, to, limit } => {
            let Some(range) = resolve_range(dash.bounds(), from, to)? else {
                println!("No tracks loaded.");
                return Ok(());
            };
            let opts = ViewOptions {
                top_n: limit.unwrap_or(opts.top_n),
                ..opts
            };
            let bars = dash.top_tracks(&range, &opts);
            print!("{}", render::top_tracks(&bars, Some(&range)));
        }

        Commands::Summary => {
            print!("{}", render::kpi_tiles(&dash.kpi_tiles(&opts)));
            println!();
            println!("Tracks:           {}", dash.summary().track_count);
            println!("Rows read:        {}", table.rows_read);
            println!("Rows dropped:     {}", table.dropped_rows.len());
            println!("Rows skipped:     {}", table.skipped_rows.len());
            if let Some(b) = dash.bounds() {
                println!("Release dates:    {} to {}", b.start, b.end);
            }
        }

        Commands::Releases => {
            if dash.releases().is_empty() {
                println!("No tracks loaded.");
                return Ok(());
            }
            print!("{}", render::releases(dash.releases()));
        }

        Commands::Tracks { limit } => {
            let sorted = dash.sorted();
            let limit = limit.unwrap_or(sorted.len());
            println!("{:<4} {:<40} {:>10}", "#", "Track", "Streams");
            println!("{}", "-".repeat(56));
            for (i, t) in sorted.iter().take(limit).enumerate() {
                println!(
                    "{:<4} {:<40} {:>10}",
                    i + 1,
                    render::truncate(&t.track_name, 40),
                    streamboard::format::format_large_number(Some(t.streams as f64), None),
                );
            }
        }
    }

    Ok(())
}
