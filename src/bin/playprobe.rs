use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use playprobe::{
    DisposalSummary, FailurePolicy, FfmpegEngine, FfmpegLogLevel, FileOutcome, MediaEngine,
    ProbeError, ProbeOptions, ProbeProgress, ProbeRun, ProbeSuite, ProgressCallback, Readiness,
    SimulatedEngine, discovery::list_media_files,
};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  playprobe run videos\n  playprobe run videos --max-wait 5 --keep-going --json\n  playprobe run videos --disposal-delay-ms 750 --progress --verbose\n  playprobe list videos --exclude-suffix .meta --exclude-suffix .txt\n  playprobe completions zsh > _playprobe";

#[derive(Debug, Parser)]
#[command(
    name = "playprobe",
    version,
    about = "Play media files through a playback engine and check their duration metadata",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    ffmpeg_log_level: Option<String>,
}

#[derive(Debug, Args, Clone)]
struct RunArgs {
    /// Directory whose top-level files are probed.
    directory: PathBuf,

    /// Seconds to wait for duration metadata per file.
    #[arg(long, default_value = "10")]
    max_wait: String,

    /// Readiness polling cadence in milliseconds.
    #[arg(long, default_value_t = 16)]
    poll_interval_ms: u64,

    /// Delay before each player is disposed, in milliseconds.
    #[arg(long, default_value_t = 500)]
    disposal_delay_ms: u64,

    /// Drain interval after the last file, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    settle_ms: u64,

    /// Sidecar suffix to skip (repeatable). Defaults to `.meta`.
    #[arg(long = "exclude-suffix")]
    exclude_suffixes: Vec<String>,

    /// Continue with the next file after a failure instead of aborting.
    #[arg(long)]
    keep_going: bool,

    /// Output results as machine-readable JSON.
    #[arg(long)]
    json: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Use the simulated engine instead of FFmpeg; every file reports the
    /// given duration in milliseconds.
    #[arg(long, value_name = "DURATION_MS")]
    dry_run: Option<i64>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Probe every media file in a directory.
    #[command(
        about = "Probe media files",
        visible_alias = "probe",
        after_help = "Examples:\n  playprobe run videos\n  playprobe run videos --json --keep-going"
    )]
    Run(RunArgs),

    /// List the files a run would probe.
    #[command(about = "List candidate media files")]
    List {
        /// Directory to list.
        directory: PathBuf,

        /// Sidecar suffix to skip (repeatable). Defaults to `.meta`.
        #[arg(long = "exclude-suffix")]
        exclude_suffixes: Vec<String>,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn parse_log_level(value: &str) -> Option<FfmpegLogLevel> {
    match value.to_ascii_lowercase().as_str() {
        "quiet" => Some(FfmpegLogLevel::Quiet),
        "panic" => Some(FfmpegLogLevel::Panic),
        "fatal" => Some(FfmpegLogLevel::Fatal),
        "error" => Some(FfmpegLogLevel::Error),
        "warning" | "warn" => Some(FfmpegLogLevel::Warning),
        "info" => Some(FfmpegLogLevel::Info),
        "verbose" => Some(FfmpegLogLevel::Verbose),
        "debug" => Some(FfmpegLogLevel::Debug),
        "trace" => Some(FfmpegLogLevel::Trace),
        _ => None,
    }
}

fn parse_seconds(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim().trim_end_matches('s');
    let seconds = trimmed.parse::<f64>()?;
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(format!("duration must be a positive number of seconds: {value}").into());
    }
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("duration is too large: {value}").into())
}

fn sidecar_suffixes(exclude_suffixes: &[String]) -> Vec<String> {
    if exclude_suffixes.is_empty() {
        ProbeOptions::new().sidecar_suffixes().to_vec()
    } else {
        exclude_suffixes.to_vec()
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "playprobe=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProbeProgress) {
        self.bar.set_length(info.total);
        self.bar.set_position(info.current);
        self.bar.set_message(info.file_name.clone());
        if info.current == info.total {
            self.bar.finish_with_message("done");
        }
    }
}

fn build_options(args: &RunArgs) -> Result<ProbeOptions, Box<dyn std::error::Error>> {
    let mut options = ProbeOptions::new()
        .with_max_wait(parse_seconds(&args.max_wait)?)
        .with_poll_interval(Duration::from_millis(args.poll_interval_ms))
        .with_disposal_delay(Duration::from_millis(args.disposal_delay_ms))
        .with_settle_delay(Duration::from_millis(args.settle_ms))
        .with_sidecar_suffixes(sidecar_suffixes(&args.exclude_suffixes));

    if args.keep_going {
        options = options.with_failure_policy(FailurePolicy::Continue);
    }

    if args.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }

    Ok(options)
}

async fn run_suite<E: MediaEngine>(
    engine: E,
    options: ProbeOptions,
    directory: &Path,
) -> Result<(ProbeRun, DisposalSummary), ProbeError> {
    let suite = ProbeSuite::setup(engine, options);
    let run = suite.run_directory(directory).await;
    // Teardown happens even when enumeration failed.
    let summary = suite.teardown().await?;
    Ok((run?, summary))
}

fn print_text(run: &ProbeRun, summary: &DisposalSummary) {
    for outcome in &run.outcomes {
        match outcome {
            FileOutcome::Passed(report) => {
                println!("{} {report}", "ok".green().bold());
            }
            FileOutcome::Failed { path, error } => {
                println!("{} {}: {error}", "FAILED".red().bold(), path.display());
            }
            FileOutcome::Skipped(path) => {
                println!("{} {}", "skipped".yellow().bold(), path.display());
            }
        }
    }

    for failure in &summary.failures {
        eprintln!("{} {}", "warning:".yellow().bold(), failure.to_string().yellow());
    }

    let passed = run.reports().count();
    let line = format!(
        "{passed}/{} file(s) passed, {} skipped, {} player(s) disposed",
        run.outcomes.len(),
        run.skipped_count(),
        summary.completed
    );
    if run.is_success() {
        println!("{} {}", "success:".green().bold(), line.green());
    } else {
        println!("{} {}", "failure:".red().bold(), line.red());
    }
}

fn print_json(run: &ProbeRun, summary: &DisposalSummary) -> Result<(), serde_json::Error> {
    let files: Vec<_> = run
        .outcomes
        .iter()
        .map(|outcome| match outcome {
            FileOutcome::Passed(report) => json!({
                "path": report.path.display().to_string(),
                "status": "passed",
                "duration_ms": report.duration_millis,
                "waited_ms": report.waited.as_millis() as u64,
                "native_handle": report.native_handle.to_string(),
            }),
            FileOutcome::Failed { path, error } => json!({
                "path": path.display().to_string(),
                "status": "failed",
                "error": error.to_string(),
                "timeout": error.is_timeout(),
            }),
            FileOutcome::Skipped(path) => json!({
                "path": path.display().to_string(),
                "status": "skipped",
            }),
        })
        .collect();

    let payload = json!({
        "success": run.is_success(),
        "files": files,
        "disposal": {
            "in_flight_after_settle": run.disposals.in_flight(),
            "failures": summary.failures.iter().map(ToString::to_string).collect::<Vec<_>>(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    match cli.command {
        Commands::Run(args) => {
            let options = build_options(&args)?;
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()?;

            let (run, summary) = match args.dry_run {
                Some(duration_millis) => {
                    let engine = SimulatedEngine::new()
                        .with_default(Readiness::after(Duration::ZERO, duration_millis));
                    runtime.block_on(run_suite(engine, options, &args.directory))?
                }
                None => {
                    let level = match &cli.global.ffmpeg_log_level {
                        Some(level) => parse_log_level(level)
                            .ok_or(format!("unsupported --ffmpeg-log-level: {level}"))?,
                        None => FfmpegLogLevel::default(),
                    };
                    let engine = FfmpegEngine::initialize(level)?;
                    runtime.block_on(run_suite(engine, options, &args.directory))?
                }
            };

            if args.json {
                print_json(&run, &summary)?;
            } else {
                print_text(&run, &summary);
            }
            Ok(run.is_success())
        }
        Commands::List {
            directory,
            exclude_suffixes,
        } => {
            let files = list_media_files(&directory, &sidecar_suffixes(&exclude_suffixes))?;
            for file in &files {
                println!("{}", file.display());
            }
            Ok(true)
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "playprobe", &mut std::io::stdout());
            Ok(true)
        }
    }
}

fn main() {
    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            eprintln!("{} {error}", "error:".red().bold());
            std::process::exit(1);
        }
    }
}
