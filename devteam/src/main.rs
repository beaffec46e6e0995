//! Sequential requirement → code → test generator.
//!
//! Pops requirements off a queue (the built-in list, or `--requirements`),
//! asks the configured model for application code and a matching test, and
//! writes `app_code_N` / `test_code_N` artifacts for each one in order.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use devteam::errors::{GenerationFailure, PersistenceFailure};
use devteam::exit_codes;
use devteam::io::artifacts::FsArtifactWriter;
use devteam::io::config::{DEFAULT_CONFIG_FILE, TeamConfig, load_config, write_config};
use devteam::io::generator::OpenAiGenerator;
use devteam::io::requirements::{default_requirements, load_requirements};
use devteam::io::run_log::write_run_summary;
use devteam::logging;
use devteam::team::{ProcessorOptions, SequentialRequirementProcessor};
use tracing::info;

#[derive(Parser)]
#[command(
    name = "devteam",
    version,
    about = "Generate application code and tests for a list of requirements"
)]
struct Cli {
    /// Defaults to `run` with the built-in requirements.
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Process every requirement in order and write the generated artifacts.
    Run(RunArgs),
    /// Write a default `devteam.toml`.
    Init {
        /// Config file to create.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// JSON list of requirement strings (or TOML with a `requirements` key).
    #[arg(short, long)]
    requirements: Option<PathBuf>,
    /// Config file; defaults apply when it does not exist.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    /// Override `output_dir` from the config.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            requirements: None,
            config: PathBuf::from(DEFAULT_CONFIG_FILE),
            output_dir: None,
        }
    }
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_code_for(&err));
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => cmd_run(&args),
        Command::Init { config, force } => cmd_init(&config, force),
    }
}

fn cmd_run(args: &RunArgs) -> Result<()> {
    let cfg = resolve_config(args)?;
    let queue = match &args.requirements {
        Some(path) => load_requirements(path)?,
        None => default_requirements(),
    };

    let generator = OpenAiGenerator::from_config(&cfg.model)?;
    let writer = FsArtifactWriter::new(&cfg.output_dir, &cfg.extension);
    let options = ProcessorOptions {
        elaborate_requirements: cfg.elaborate_requirements,
        extract_code_blocks: cfg.extract_code_blocks,
    };
    let mut processor = SequentialRequirementProcessor::new(queue, &generator, &writer, options)?;
    let summary = processor.run(|event| println!("{event}"))?;

    if cfg.run_summary && summary.counters.story_count > 0 {
        let path = write_run_summary(&cfg.output_dir, &summary)?;
        info!(path = %path.display(), "run summary written");
    }
    Ok(())
}

fn cmd_init(path: &Path, force: bool) -> Result<()> {
    if !force && path.exists() {
        println!("{} already exists (use --force to overwrite)", path.display());
        return Ok(());
    }
    write_config(path, &TeamConfig::default())
        .with_context(|| format!("write {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<TeamConfig> {
    let mut cfg = load_config(&args.config)?;
    if let Some(dir) = &args.output_dir {
        cfg.output_dir = dir.clone();
        cfg.validate()?;
    }
    Ok(cfg)
}

/// Collaborator failures get their own exit code; everything else is invalid usage.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let collaborator_failed = err
        .chain()
        .any(|cause| cause.is::<GenerationFailure>() || cause.is::<PersistenceFailure>());
    if collaborator_failed {
        exit_codes::FAILED
    } else {
        exit_codes::INVALID
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use devteam::core::types::GenerationStep;
    use devteam::errors::InvalidInputError;

    #[test]
    fn no_subcommand_defaults_to_run() {
        let cli = Cli::parse_from(["devteam"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn parse_run_with_requirements() {
        let cli = Cli::parse_from(["devteam", "run", "--requirements", "reqs.json", "-o", "out"]);
        let Some(Command::Run(args)) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.requirements, Some(PathBuf::from("reqs.json")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG_FILE));
    }

    #[test]
    fn parse_init_force() {
        let cli = Cli::parse_from(["devteam", "init", "--force"]);
        assert!(matches!(cli.command, Some(Command::Init { force: true, .. })));
    }

    #[test]
    fn exit_codes_classify_failures() {
        let generation: anyhow::Error = GenerationFailure {
            step: GenerationStep::TestCode,
            story: 1,
            cause: anyhow!("boom"),
        }
        .into();
        assert_eq!(exit_code_for(&generation), exit_codes::FAILED);

        let invalid: anyhow::Error = InvalidInputError::new("not a list").into();
        assert_eq!(exit_code_for(&invalid), exit_codes::INVALID);

        let wrapped = invalid.context("load requirements");
        assert_eq!(exit_code_for(&wrapped), exit_codes::INVALID);
    }

    #[test]
    fn output_dir_override_is_applied() {
        let temp = tempfile::tempdir().expect("tempdir");
        let args = RunArgs {
            config: temp.path().join("missing.toml"),
            output_dir: Some(temp.path().join("out")),
            ..RunArgs::default()
        };
        let cfg = resolve_config(&args).expect("config");
        assert_eq!(cfg.output_dir, temp.path().join("out"));
    }
}
