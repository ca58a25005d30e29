mod cache;
mod export;
mod html;
mod render;

use std::fmt::Write as _;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};
use cogmind_graph::scores::{
    archive_paths, collect_records, read_archive, read_sheet, sheet_paths,
};
use cogmind_graph::{ChartKind, Data, Field, Run, ScanOptions, Scores, XAxis};
use rayon::prelude::*;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cache::{Record, RecordCache};
use crate::render::{render_chart_guard, ImageFormat};

#[derive(Parser, Debug)]
#[command(author, version, about = "Cogmind score sheet progression charts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Chart every player's progression from a folder of score sheets
    Plot(PlotArgs),
    /// Print the fields parsed from individual score sheets or archives
    Inspect(InspectArgs),
}

#[derive(Parser, Debug)]
struct PlotArgs {
    /// Cogmind scores folder
    #[arg(value_hint = ValueHint::DirPath)]
    path: PathBuf,

    /// Output folder
    #[arg(value_hint = ValueHint::DirPath)]
    output: PathBuf,

    /// Folder of additional archived (protobuf) score sheets
    #[arg(long, value_hint = ValueHint::DirPath)]
    pb_path: Option<PathBuf>,

    /// X axis variable
    #[arg(long, value_enum, default_value_t = XAxisOpt::Time)]
    xaxis: XAxisOpt,

    /// Only plot the specified player (repeatable)
    #[arg(long = "player")]
    players: Vec<String>,

    /// Output image format
    #[arg(long, value_enum, default_value_t = FormatOpt::Svg)]
    format: FormatOpt,

    /// Output image width in pixels
    #[arg(long, default_value_t = 1280)]
    size: u32,

    /// Make HTML index files
    #[arg(long, action = ArgAction::SetTrue)]
    html: bool,

    /// Write each player's parsed runs to runs.csv
    #[arg(long, action = ArgAction::SetTrue)]
    csv: bool,

    /// Cache parsed score sheets in this folder
    #[arg(long, value_hint = ValueHint::DirPath)]
    cache_dir: Option<PathBuf>,

    /// Profile major stages with timings
    #[arg(long, action = ArgAction::SetTrue)]
    profile: bool,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Score sheets (.txt) or archived score sheets to inspect
    #[arg(required = true, value_hint = ValueHint::FilePath)]
    inputs: Vec<PathBuf>,

    /// Output report path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Verbose logging
    #[arg(long, action = ArgAction::SetTrue)]
    verbose: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum XAxisOpt {
    Time,
    Turns,
    Actions,
    Runs,
    Date,
}

impl From<XAxisOpt> for XAxis {
    fn from(value: XAxisOpt) -> Self {
        match value {
            XAxisOpt::Time => XAxis::Time,
            XAxisOpt::Turns => XAxis::Turns,
            XAxisOpt::Actions => XAxis::Actions,
            XAxisOpt::Runs => XAxis::Runs,
            XAxisOpt::Date => XAxis::Date,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum FormatOpt {
    Svg,
    Png,
}

impl From<FormatOpt> for ImageFormat {
    fn from(value: FormatOpt) -> Self {
        match value {
            FormatOpt::Svg => ImageFormat::Svg,
            FormatOpt::Png => ImageFormat::Png,
        }
    }
}

/// Where a folder of records comes from.
#[derive(Copy, Clone, Debug)]
enum Source {
    Sheets,
    Archives,
}

struct PlotSettings {
    output: PathBuf,
    xaxis: XAxis,
    format: ImageFormat,
    size: u32,
    html: bool,
    csv: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = match &cli.command {
        Command::Plot(args) => args.verbose,
        Command::Inspect(args) => args.verbose,
    };
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Plot(args) => handle_plot(args),
        Command::Inspect(args) => handle_inspect(args),
    }
}

fn handle_plot(args: PlotArgs) -> Result<()> {
    let opts = ScanOptions {
        players: (!args.players.is_empty()).then(|| args.players.clone()),
        ..ScanOptions::default()
    };
    let cache = args
        .cache_dir
        .as_deref()
        .map(RecordCache::open)
        .transpose()?;

    let t_parse = Instant::now();
    let mut scores = load_scores(&args.path, Source::Sheets, &opts, cache.as_ref())?;
    if let Some(pb_path) = args.pb_path.as_ref() {
        scores.extend(load_scores(pb_path, Source::Archives, &opts, cache.as_ref())?);
    }
    let mut scores = scores.merge_aliases();
    scores.retain_active(opts.min_runs);
    if args.profile || args.verbose {
        info!(
            "Parse stage: {:.1} ms",
            t_parse.elapsed().as_secs_f64() * 1000.0
        );
    }

    if scores.is_empty() {
        warn!(
            "Could not find any players with at least {} games.",
            opts.min_runs
        );
        return Ok(());
    }
    if scores.len() > 1 {
        info!("Plotting {} players", scores.len());
    }

    fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create {}", args.output.display()))?;

    let players = scores.by_activity();
    if args.html {
        let entries: Vec<(String, String, usize)> = players
            .iter()
            .map(|(name, runs)| (name.to_string(), player_dir_name(name), runs.len()))
            .collect();
        html::write_index(&args.output, &entries, args.size)?;
    }

    let settings = PlotSettings {
        output: args.output.clone(),
        xaxis: args.xaxis.into(),
        format: args.format.into(),
        size: args.size,
        html: args.html,
        csv: args.csv,
    };

    let t_plot = Instant::now();
    let written: usize = players
        .par_iter()
        .map(|(name, runs)| plot_player(name, runs, &settings))
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .sum();
    if args.profile || args.verbose {
        info!(
            "Plot stage: {:.1} ms ({} charts)",
            t_plot.elapsed().as_secs_f64() * 1000.0,
            written
        );
    }
    info!("Wrote {} charts to {}", written, args.output.display());
    Ok(())
}

fn load_scores(
    dir: &Path,
    source: Source,
    opts: &ScanOptions,
    cache: Option<&RecordCache>,
) -> Result<Scores> {
    let paths = match source {
        Source::Sheets => sheet_paths(dir)?,
        Source::Archives => archive_paths(dir)?,
    };

    let parsed: Vec<(PathBuf, Result<Record>)> = paths
        .into_par_iter()
        .map(|path| {
            let record = parse_cached(&path, source, cache);
            (path, record)
        })
        .collect();

    Ok(collect_records(parsed, opts))
}

fn parse_record(path: &Path, source: Source) -> cogmind_graph::Result<Record> {
    match source {
        Source::Sheets => read_sheet(path).map(Some),
        Source::Archives => read_archive(path),
    }
}

fn parse_cached(path: &Path, source: Source, cache: Option<&RecordCache>) -> Result<Record> {
    let Some(cache) = cache else {
        return Ok(parse_record(path, source)?);
    };
    let key = RecordCache::key(path)?;
    if let Some(record) = cache.get(&key) {
        return Ok(record);
    }
    let record = parse_record(path, source)?;
    if let Err(err) = cache.put(&key, &record) {
        debug!("cache write skipped: {:#}", err);
    }
    Ok(record)
}

/// Directory name for a player's charts.
fn player_dir_name(player: &str) -> String {
    player.replace(['/', '\\'], "_")
}

fn plot_player(name: &str, runs: &[Run], settings: &PlotSettings) -> Result<usize> {
    info!("{}: {} games", name, runs.len());

    let dir = settings.output.join(player_dir_name(name));
    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let data = Data::new(runs.to_vec(), settings.xaxis);
    let mut written = 0;
    for kind in ChartKind::ALL {
        let chart = kind.build(&data);
        let path = dir.join(format!("{}.{}", kind.name(), settings.format.extension()));
        match render_chart_guard(&chart, name, &path, settings.format, settings.size) {
            Ok(()) => written += 1,
            Err(err) => warn!("Skipping {} ({}): {}", kind.name(), path.display(), err),
        }
    }

    if settings.html {
        html::write_player_index(&dir, name, settings.format)?;
    }
    if settings.csv {
        let path = dir.join("runs.csv");
        export::write_runs_csv(&path, data.runs())?;
        debug!("Wrote {}", path.display());
    }
    Ok(written)
}

fn is_legacy_sheet(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "txt")
}

fn handle_inspect(args: InspectArgs) -> Result<()> {
    let mut report = String::new();

    for path in &args.inputs {
        let parsed = if is_legacy_sheet(path) {
            read_sheet(path).map(Some)
        } else {
            read_archive(path)
        };
        writeln!(report, "== {} ==", path.display())?;
        match parsed {
            Ok(Some((player, run))) => describe_run(&mut report, &player, &run)?,
            Ok(None) => report.push_str("incomplete record: no movement statistics\n"),
            Err(err) => {
                warn!("{}: {}", path.display(), err);
                writeln!(report, "error: {}", err)?;
            }
        }
        report.push('\n');
    }

    if args.output.as_os_str() == "-" {
        io::stdout()
            .write_all(report.as_bytes())
            .context("failed to write report")?;
    } else {
        fs::write(&args.output, report)
            .with_context(|| format!("failed to write {}", args.output.display()))?;
        info!("Wrote report: {}", args.output.display());
    }
    Ok(())
}

fn describe_run(report: &mut String, player: &str, run: &Run) -> std::fmt::Result {
    let defaults = ScanOptions::default();
    writeln!(report, "player: {}", player)?;
    writeln!(report, "date: {}", run.date.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(report, "version: {}", run.version)?;
    writeln!(report, "difficulty: {}", run.difficulty)?;
    if run.extended.is_extended() {
        writeln!(report, "extended: {}", run.extended.marker())?;
    }
    if run.ending.is_empty() {
        writeln!(report, "outcome: {}", run.outcome.name())?;
    } else {
        writeln!(report, "outcome: {} ({})", run.outcome.name(), run.ending)?;
    }
    writeln!(
        report,
        "qualifies: {}",
        if run.qualifies(defaults.min_score) { "yes" } else { "no" }
    )?;
    for field in Field::ALL {
        let value = run.get(field);
        if value.is_finite() {
            writeln!(report, "  {:<13}{}", field.name(), value)?;
        } else {
            writeln!(report, "  {:<13}-", field.name())?;
        }
    }
    Ok(())
}
