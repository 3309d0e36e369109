use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use snapsheet_core::SheetConfig;

use crate::error::{HarnessError, Result};
use crate::logging::{DEFAULT_DIRECTIVE, LogFormat, init_tracing};
use crate::replay::{ReplayReport, replay};
use crate::script::GestureScript;

#[derive(Debug, Parser)]
#[command(
    name = "snapsheet-replay",
    about = "Replay scripted gestures against a bottom sheet and report the outcome",
    version
)]
pub struct Cli {
    /// Log line encoding on stderr.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay one or more gesture scripts.
    Replay(ReplayArgs),

    /// Validate a sheet configuration file and print it normalized.
    #[command(name = "check-config")]
    CheckConfig(CheckConfigArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Script files (JSON).
    #[arg(required = true)]
    pub scripts: Vec<PathBuf>,

    /// Print full reports as JSON instead of one summary line per script.
    #[arg(long)]
    pub json: bool,

    /// Compare against this checksum, overriding any pinned in the script.
    #[arg(long)]
    pub expect: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckConfigArgs {
    /// Configuration file (`.toml` or `.json`).
    pub path: PathBuf,
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format, DEFAULT_DIRECTIVE)?;
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay(args) => run_replay(&args),
        Commands::CheckConfig(args) => run_check_config(&args),
    }
}

pub fn run_replay(args: &ReplayArgs) -> Result<()> {
    for path in &args.scripts {
        let report = replay_file(path, args.expect.as_deref())?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            println!("{}", summary_line(&report));
        }
    }
    Ok(())
}

/// Load, replay and optionally verify a single script file.
pub fn replay_file(path: &Path, expect: Option<&str>) -> Result<ReplayReport> {
    let text = fs::read_to_string(path)?;
    let mut script = GestureScript::from_json_str(&text)?;
    if let Some(expected) = expect {
        script.expect_checksum = Some(expected.to_string());
    }
    replay(&script)
}

#[must_use]
pub fn summary_line(report: &ReplayReport) -> String {
    format!(
        "{} state={} engine={} steps={} landings={} checksum={}",
        report.name,
        report.final_state,
        report.final_engine,
        report.steps.len(),
        report.landings().count(),
        report.checksum
    )
}

pub fn run_check_config(args: &CheckConfigArgs) -> Result<()> {
    let config = load_config(&args.path)?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

/// Parse a config file, choosing the format by extension.
pub fn load_config(path: &Path) -> Result<SheetConfig> {
    let parse = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => SheetConfig::from_toml_str,
        Some("json") => SheetConfig::from_json_str,
        _ => {
            return Err(HarnessError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
    };
    let text = fs::read_to_string(path)?;
    Ok(parse(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_command() {
        let cli = Cli::try_parse_from([
            "snapsheet-replay",
            "--log-format",
            "json",
            "replay",
            "a.json",
            "b.json",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormat::Json);
        let Commands::Replay(args) = cli.command else {
            panic!("expected replay");
        };
        assert_eq!(args.scripts, vec![PathBuf::from("a.json"), PathBuf::from("b.json")]);
        assert!(args.json);
        assert_eq!(args.expect, None);
    }

    #[test]
    fn replay_requires_a_script() {
        assert!(Cli::try_parse_from(["snapsheet-replay", "replay"]).is_err());
    }

    #[test]
    fn parses_check_config() {
        let cli = Cli::try_parse_from(["snapsheet-replay", "check-config", "sheet.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::CheckConfig(_)));
        assert_eq!(cli.log_format, LogFormat::Compact);
    }

    #[test]
    fn unknown_config_extension_is_rejected() {
        let err = load_config(Path::new("sheet.yaml")).unwrap_err();
        assert!(matches!(err, HarnessError::UnsupportedFormat { .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
