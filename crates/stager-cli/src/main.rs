use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use stager::config::{CliOverrides, Settings, StagerConfig};
use stager::engine::{self, Mode, Reporter};
use stager::guard::PublicationGuard;
use stager::pom;
use stager::properties;
use stager::types::ArtifactCoordinate;
use stager::version::{UnavailablePolicy, VersionResolver, to_pre_release, to_release};
use stager_registry::HttpProbe;

const LOG_ENV: &str = "STAGER_LOG";

#[derive(Parser, Debug)]
#[command(name = "stager")]
#[command(about = "Release versioning, duplicate-publish guarding and POM generation for Maven repositories")]
struct Cli {
    /// Path to a config file (default: <project-dir>/.stager.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Project root used to resolve relative paths.
    #[arg(long, default_value = ".")]
    project_dir: PathBuf,

    /// Base version, overriding project.version and the properties file.
    #[arg(long)]
    version: Option<String>,

    /// Maven group id, overriding project.group.
    #[arg(long)]
    group: Option<String>,

    /// Maven artifact id, overriding project.artifact.
    #[arg(long)]
    artifact: Option<String>,

    /// Continue as if nothing was published when maven-metadata.xml is unreachable.
    #[arg(long)]
    assume_no_alpha_on_error: bool,

    /// Log probe URLs and raw status codes to stderr.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a version derived from the configured base version.
    Version {
        #[arg(value_enum)]
        kind: VersionKind,
    },
    /// Report whether the release form of the version is already published.
    Check,
    /// Print the POM rendered from the project description.
    Pom {
        /// Project description file (default: PUBLISHERS.yml)
        #[arg(long)]
        description: Option<PathBuf>,
    },
    /// Decide version, target and publication for one build.
    Plan {
        #[arg(long, value_enum)]
        mode: CliMode,
    },
    /// Write the release form of the version into the properties file.
    SetVersion {
        /// Properties file (default: gradle.properties)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum VersionKind {
    Snapshot,
    Release,
    NextAlpha,
    LastAlpha,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliMode {
    Snapshot,
    Release,
    Alpha,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Snapshot => Mode::Snapshot,
            CliMode::Release => Mode::Release,
            CliMode::Alpha => Mode::Alpha,
        }
    }
}

struct CliReporter;

impl Reporter for CliReporter {
    fn info(&mut self, msg: &str) {
        eprintln!("[info] {msg}");
    }

    fn warn(&mut self, msg: &str) {
        eprintln!("[warn] {msg}");
    }

    fn error(&mut self, msg: &str) {
        eprintln!("[error] {msg}");
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("stager=debug,stager_registry=debug,stager_cli=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<StagerConfig> {
    let config = match &cli.config {
        Some(path) => StagerConfig::load_from_file(path)?,
        None => StagerConfig::load_from_dir(&cli.project_dir)?.unwrap_or_default(),
    };
    config.validate().context("invalid stager configuration")?;
    Ok(config)
}

fn overrides(cli: &Cli) -> CliOverrides {
    CliOverrides {
        group: cli.group.clone(),
        artifact: cli.artifact.clone(),
        version: cli.version.clone(),
        on_unavailable: cli
            .assume_no_alpha_on_error
            .then_some(UnavailablePolicy::AssumeNone),
        ..CliOverrides::default()
    }
}

fn probe_for(settings: &Settings) -> HttpProbe {
    HttpProbe::with_timeouts(settings.connect_timeout, settings.read_timeout)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let mut cli_overrides = overrides(&cli);
    match &cli.cmd {
        Commands::Pom { description } => cli_overrides.description_file = description.clone(),
        Commands::SetVersion { file } => cli_overrides.properties_file = file.clone(),
        _ => {}
    }
    let settings = config.build_settings(&cli.project_dir, cli_overrides)?;
    tracing::debug!(
        version = %settings.version,
        group = %settings.group_id,
        artifact = %settings.artifact_id,
        "resolved settings"
    );

    let mut reporter = CliReporter;
    match cli.cmd {
        Commands::Version { kind } => print_version(&settings, kind, &mut reporter)?,
        Commands::Check => check(&settings, &mut reporter),
        Commands::Pom { .. } => print_pom(&settings, &mut reporter)?,
        Commands::Plan { mode } => {
            let probe = probe_for(&settings);
            let plan = engine::plan_release(&settings, &probe, mode.into(), &mut reporter)?;
            print_plan(&plan);
        }
        Commands::SetVersion { .. } => set_version(&settings, &mut reporter)?,
    }

    Ok(())
}

fn print_version(settings: &Settings, kind: VersionKind, reporter: &mut dyn Reporter) -> Result<()> {
    let probe = probe_for(settings);
    let resolver = || {
        VersionResolver::new(
            &probe,
            settings.metadata.clone(),
            &settings.group_id,
            &settings.artifact_id,
        )
        .with_unavailable_policy(settings.on_unavailable)
    };

    match kind {
        VersionKind::Snapshot => println!("{}", to_pre_release(&settings.version)),
        VersionKind::Release => println!("{}", to_release(&settings.version)),
        VersionKind::NextAlpha => println!("{}", resolver().next_alpha(&settings.version)?),
        VersionKind::LastAlpha => match resolver().last_alpha(&settings.version)? {
            Some(version) => println!("{version}"),
            None => reporter.info(&format!(
                "no alpha published yet for {}",
                settings.version.root()
            )),
        },
    }
    Ok(())
}

fn check(settings: &Settings, reporter: &mut dyn Reporter) {
    let probe = probe_for(settings);
    let coordinate = ArtifactCoordinate::new(
        &settings.group_id,
        &settings.artifact_id,
        to_release(&settings.version),
    );
    let published = PublicationGuard::new(&probe, &settings.packaging).is_already_published(
        &coordinate,
        &settings.guarded_targets(),
        reporter,
    );
    let verdict = if published { "published" } else { "not published" };
    println!("{coordinate}: {verdict}");
}

fn print_pom(settings: &Settings, reporter: &mut dyn Reporter) -> Result<()> {
    let descriptor = engine::load_pom(settings, reporter)?.unwrap_or_else(|| {
        pom::translate(&Default::default(), &engine::project_defaults(settings))
    });
    let coordinate = ArtifactCoordinate::new(
        &settings.group_id,
        &settings.artifact_id,
        settings.version.clone(),
    );
    print!("{}", pom::render_pom(&descriptor, &coordinate, &settings.packaging)?);
    Ok(())
}

fn print_plan(plan: &engine::ReleasePlan) {
    println!("mode: {}", plan.mode);
    println!("coordinate: {}", plan.coordinate);
    println!("target: {} ({})", plan.target.kind, plan.target.base_url);
    println!("publish_url: {}", plan.publish_url);
    println!("already_published: {}", plan.already_published);
    println!("pom: {}", if plan.pom.is_some() { "yes" } else { "no" });
}

fn set_version(settings: &Settings, reporter: &mut dyn Reporter) -> Result<()> {
    let release = to_release(&settings.version);
    properties::write_version(&settings.properties_file, &release)?;
    reporter.info(&format!(
        "wrote version = {release} to {}",
        display_relative(&settings.properties_file, &settings.project_dir)
    ));
    println!("{release}");
    Ok(())
}

fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .display()
        .to_string()
}
