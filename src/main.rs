//! Purpose: `lockstep` CLI entry point and command dispatch bootstrap.
//! Role: Binary crate root; parses args, runs commands, emits JSON on stdout.
//! Invariants: Commands emit stable stdout formats (human or JSON by command/flags).
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `core::error::to_exit_code`.
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use clap::{
    CommandFactory, Parser, Subcommand, ValueEnum, ValueHint,
    error::ErrorKind as ClapErrorKind,
};
use clap_complete::aot::Shell;
use serde_json::{Value, json};
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use lockstep::core::compare::{Divergence, Outcome, collect_leaves, compare, format_path};
use lockstep::core::error::{Error, ErrorKind, to_exit_code};
use lockstep::core::sweep::{
    FileReport, SweepConfig, SweepPolicy, SweepReport, run_sweep,
};
use lockstep::json::decode;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage).with_message(clap_error_summary(&err)),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command, color_mode).map_err(|err| (err, color_mode))
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    let first_line = rendered.lines().next().unwrap_or("invalid arguments");
    first_line
        .strip_prefix("error: ")
        .unwrap_or(first_line)
        .to_string()
}

#[derive(Parser)]
#[command(
    name = "lockstep",
    version,
    about = "Differential conformance checking for JSON decoders",
    help_template = r#"{about-with-newline}
{before-help}USAGE
  {usage}

COMMANDS
{subcommands}

OPTIONS
{options}

{after-help}
"#,
    long_about = None,
    before_help = r#"Every data file is decoded twice: once by the trusted reference decoder
and once by the candidate decoder under test. The two trees are walked in
lock-step and the first structural divergence halts the run.

Mental model:
  - `check` sweeps a directory of data files (the conformance session)
  - `diff` compares two files directly
  - `leaves` lists every leaf of one file with its path
"#,
    after_help = r#"EXAMPLES
  $ lockstep check ./data
  $ lockstep check ./data --keep-going --json | jq '.files_diverged'
  $ lockstep diff before.json after.json
  $ lockstep leaves items.json

LEARN MORE
  $ lockstep <command> --help
  https://github.com/sandover/lockstep"#,
    arg_required_else_help = true,
    disable_help_subcommand = false
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    #[command(
        arg_required_else_help = true,
        about = "Sweep a directory of data files through both decoders",
        long_about = r#"Decode every data file with the reference and candidate decoders and
compare the resulting trees in both directions.

If the candidate decoder cannot produce a tree the file is re-decoded with
the reference decoder and checked in degraded mode (logged on stderr)."#,
        after_help = r#"EXAMPLES
  $ lockstep check ./data
  $ lockstep check ./data --ext geojson
  $ lockstep check ./data --keep-going --json

NOTES
  - The first divergence halts the whole session unless --keep-going is set.
  - Per-file progress is logged on stderr; set RUST_LOG to adjust verbosity.
  - Exits 5 when any file diverged, 0 when every file matched."#
    )]
    Check {
        #[arg(help = "Directory containing data files", value_hint = ValueHint::DirPath)]
        dir: PathBuf,
        #[arg(long, default_value = "json", help = "File extension to scan for")]
        ext: String,
        #[arg(
            long,
            help = "Record divergences and keep sweeping instead of halting at the first"
        )]
        keep_going: bool,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "Compare two data files structurally",
        long_about = r#"Decode both files with the reference decoder and walk the two trees in
lock-step, both directions. Prints the first divergence or the matched
leaf counts."#,
        after_help = r#"EXAMPLES
  $ lockstep diff before.json after.json
  $ lockstep diff before.json after.json --json | jq '.equivalent'

NOTES
  - The walk is directional; equivalence requires both directions to match.
  - Exits 5 on divergence, 0 when the trees are equivalent."#
    )]
    Diff {
        #[arg(help = "Left-hand data file", value_hint = ValueHint::FilePath)]
        left: PathBuf,
        #[arg(help = "Right-hand data file", value_hint = ValueHint::FilePath)]
        right: PathBuf,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        arg_required_else_help = true,
        about = "List every leaf of a data file with its path",
        after_help = r#"EXAMPLES
  $ lockstep leaves items.json
  $ lockstep leaves items.json --json | jq '.count'"#
    )]
    Leaves {
        #[arg(help = "Data file to enumerate", value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[arg(long, help = "Emit JSON instead of human-readable output")]
        json: bool,
    },
    #[command(
        about = "Print version info as JSON",
        long_about = r#"Emit version info as JSON (stable, machine-readable)."#,
        after_help = r#"EXAMPLES
  $ lockstep version"#
    )]
    Version,
    #[command(
        arg_required_else_help = true,
        about = "Generate shell completions",
        long_about = r#"Generate shell completion scripts.

Prints a completion script for the given shell to stdout.
Install the generated file in your shell's completion directory (or source it)
to enable tab completion."#,
        after_help = r#"EXAMPLES
  $ lockstep completion bash > ~/.local/share/bash-completion/completions/lockstep
  $ lockstep completion zsh > ~/.zfunc/_lockstep
  $ lockstep completion fish > ~/.config/fish/completions/lockstep.fish"#
    )]
    Completion {
        #[arg(help = "Shell to generate completions for")]
        shell: Shell,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_data_file(path: &Path) -> Result<String, Error> {
    std::fs::read_to_string(path).map_err(|err| {
        let kind = match err.kind() {
            io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::Io,
        };
        Error::new(kind)
            .with_message("failed to read data file")
            .with_path(path)
            .with_source(err)
    })
}

fn add_missing_file_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check the path; data files are plain JSON text.")
}

fn add_missing_dir_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::NotFound || err.hint().is_some() {
        return err;
    }
    err.with_hint("Check the directory path, or pass --ext for a different file extension.")
}

// ── output helpers ────────────────────────────────────────────────────────

fn outcome_json(outcome: &Outcome) -> Value {
    match outcome {
        Outcome::Match { leaves } => json!({
            "status": "match",
            "leaves": leaves,
        }),
        Outcome::Divergence(divergence) => json!({
            "status": "diverged",
            "path": format_path(&divergence.path),
            "left": divergence.left.to_json(),
            "right": divergence.right.to_json(),
            "depth": divergence.depth,
            "leaves_matched": divergence.leaves_matched,
        }),
    }
}

fn file_report_json(report: &FileReport) -> Value {
    json!({
        "file": report.file.display().to_string(),
        "degraded": report.degraded,
        "diverged": report.divergence().is_some(),
        "direction": report.divergence().map(|(direction, _)| direction.label()),
        "forward": outcome_json(&report.forward),
        "reverse": report.reverse.as_ref().map(outcome_json),
    })
}

fn sweep_report_json(report: &SweepReport, dir: &Path) -> Value {
    json!({
        "dir": dir.display().to_string(),
        "files": report.files.iter().map(file_report_json).collect::<Vec<_>>(),
        "files_checked": report.files_checked,
        "files_degraded": report.files_degraded,
        "files_diverged": report.files_diverged,
        "leaves_matched": report.leaves_matched,
        "completed_at": report.completed_at,
    })
}

fn divergence_detail(divergence: &Divergence) -> String {
    format!(
        "diverged at {} (depth {}): left={}, right={}",
        format_path(&divergence.path),
        divergence.depth,
        divergence.left,
        divergence.right
    )
}

fn emit_check_human(report: &SweepReport) {
    if !io::stdout().is_terminal() {
        for file in &report.files {
            emit_check_file_line(file);
        }
        println!(
            "checked {} files, {} leaves matched",
            report.files_checked, report.leaves_matched
        );
        return;
    }

    if report.files_checked == 0 {
        println!("No data files found.");
        return;
    }

    if report.clean() {
        println!(
            "All {} files match ({} leaves).",
            report.files_checked, report.leaves_matched
        );
    } else {
        println!(
            "{} of {} files diverged.",
            report.files_diverged, report.files_checked
        );
    }
    println!();
    for file in &report.files {
        let name = short_display_name(&file.file);
        match file.divergence() {
            Some((direction, divergence)) => {
                println!(
                    "  ✗ {name}   {} [{}]",
                    divergence_detail(divergence),
                    direction.label()
                );
            }
            None => {
                let suffix = if file.degraded {
                    "  (degraded: candidate decoder fell back)"
                } else {
                    ""
                };
                println!("  ✓ {name}   {} leaves{suffix}", file.leaves());
            }
        }
    }
}

fn emit_check_file_line(file: &FileReport) {
    let name = file.file.display();
    match file.divergence() {
        Some((direction, divergence)) => {
            println!(
                "DIVERGED: {name} {} [{}]",
                divergence_detail(divergence),
                direction.label()
            );
        }
        None if file.degraded => {
            println!("MATCH (degraded): {name} {} leaves", file.leaves());
        }
        None => {
            println!("MATCH: {name} {} leaves", file.leaves());
        }
    }
}

fn short_display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

fn emit_version_output(color_mode: ColorMode) {
    if io::stdout().is_terminal() {
        println!("lockstep {}", env!("CARGO_PKG_VERSION"));
    } else {
        emit_json(
            json!({
                "name": "lockstep",
                "version": env!("CARGO_PKG_VERSION"),
            }),
            color_mode,
        );
    }
}

fn emit_json(value: Value, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let pretty = is_tty || color_mode.use_color(is_tty);
    let json = if pretty {
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    } else {
        serde_json::to_string(&value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string())
    };
    println!("{json}");
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_text(err: &Error, use_color: bool) -> String {
    let label = colorize_label("error:", use_color, AnsiColor::Red);
    let mut text = format!("{label} {}", error_message(err));
    if let Some(path) = err.path() {
        text.push_str(&format!(" (path: {})", path.display()));
    }
    if let Some(hint) = err.hint() {
        text.push_str(&format!("\n  hint: {hint}"));
    }
    text
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::NotFound => "not found".to_string(),
        ErrorKind::Decode => "decode failure".to_string(),
        ErrorKind::Mismatch => "structural mismatch".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = std::error::Error::source(err);
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = serde_json::Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }
    json!({ "error": inner })
}
