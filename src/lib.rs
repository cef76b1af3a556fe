pub mod catalog;
pub mod cli;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod generator;
pub mod lexer;
pub mod scanner;
pub mod variant;
pub mod watch;

use clap::{CommandFactory, Parser};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

pub use catalog::{CatalogRule, RuleCatalog};
pub use cli::{BuildArgs, Cli, Command, WatchArgs};
pub use config::Config;
pub use diagnostic::Diagnostic;
pub use error::{Error, Result};
pub use generator::{GenerateRequest, GenerationResult, assemble, generate};
pub use variant::{Variant, classify, is_supported};

/// Everything a generation pass needs, resolved once per command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub catalog: RuleCatalog,
    pub request: GenerateRequest,
    pub output: PathBuf,
}

impl Project {
    pub fn from_build_args(args: &BuildArgs) -> Result<Self> {
        let config = config::load(&args.config)?;
        let catalog = load_catalog(args.catalog.as_deref(), &config)?;
        let mut scan = config.scan_options();
        scan.exclude_files.push(args.output.clone());
        Ok(Self {
            catalog,
            request: GenerateRequest {
                scan,
                base_stylesheet: args.input.clone(),
            },
            output: args.output.clone(),
        })
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Command::Init { config }) => run_init(&config),
        Some(Command::Build(args)) => run_build(&args),
        Some(Command::Watch(args)) => run_watch(&args),
        Some(Command::Scan { config, catalog }) => run_scan(&config, catalog.as_deref()),
        None => {
            // Nothing useful to do when stdout is gone.
            let _ = Cli::command().print_help();
            Ok(())
        }
    }
}

pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_catalog(flag: Option<&Path>, config: &Config) -> Result<RuleCatalog> {
    let catalog = match flag.or(config.catalog.as_deref()) {
        Some(path) => RuleCatalog::load(path)?,
        None => RuleCatalog::builtin()?,
    };
    tracing::debug!(rules = catalog.len(), "loaded rule catalog");
    Ok(catalog)
}

fn run_init(path: &Path) -> Result<()> {
    if path.exists() {
        return Err(Error::ConfigExists {
            path: path.to_path_buf(),
        });
    }
    let text = config::render_default(path)?;
    fs::write(path, text).map_err(|source| Error::WriteOutput {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!("created default config file: {}", path.display());
    Ok(())
}

/// Runs one pass and overwrites the output file with the result.
pub fn build_once(project: &Project) -> Result<GenerationResult> {
    let result = generate(&project.request, &project.catalog)?;
    fs::write(&project.output, &result.css).map_err(|source| Error::WriteOutput {
        path: project.output.clone(),
        source,
    })?;
    Ok(result)
}

fn run_build(args: &BuildArgs) -> Result<()> {
    let project = Project::from_build_args(args)?;
    let result = build_once(&project)?;
    tracing::info!(
        "generated {} rules from {} files in {} ms",
        result.rule_count,
        result.files_scanned,
        result.elapsed.as_millis()
    );
    Ok(())
}

fn run_watch(args: &WatchArgs) -> Result<()> {
    let project = Project::from_build_args(&args.build)?;
    watch::watch(
        &project,
        watch::WatchOptions {
            poll: args.polling(),
            poll_interval: Duration::from_millis(args.poll_interval_ms()),
        },
    )
}

fn run_scan(config_path: &Path, catalog_path: Option<&Path>) -> Result<()> {
    let config = config::load(config_path)?;
    let catalog = load_catalog(catalog_path, &config)?;
    let files = scanner::discover(&config.scan_options())?;
    let mut diagnostics = Vec::new();
    let tokens = scanner::collect_tokens(&files, &mut diagnostics)?;

    let mut supported: Vec<&str> = tokens
        .iter()
        .map(String::as_str)
        .filter(|token| is_supported(token, &catalog))
        .collect();
    supported.sort_unstable();

    for token in &supported {
        println!("{}", token);
    }
    tracing::info!(
        "scanned {} files, found {} supported classes",
        files.len(),
        supported.len()
    );
    Ok(())
}
