#![forbid(unsafe_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use cyclegrid_client::{
    API_BASE_ENV, ClientConfig, CycleSource, FixtureSource, HttpSource, MAX_BASE, MIN_BASE,
};
use cyclegrid_core::{AddressingMode, OrderMode, PalettePolicy, RequestKey};

use crate::app::run_interactive;
use crate::dump::{DumpArgs, run_dump};
use crate::error::{AppError, Result};
use crate::logging::{self, LogTarget};

#[derive(Debug, Parser)]
#[command(
    name = "cyclegrid",
    about = "Plot cycles of a modular recurrence on a toroidal grid",
    version
)]
pub struct Cli {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// Log file for the interactive UI (default: cyclegrid.log in the temp dir).
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch once and print the grid, the cell index, or a fixture file.
    Dump(DumpArgs),
}

/// Where datasets come from.
#[derive(Debug, Clone, Args)]
pub struct SourceArgs {
    /// Modulus (grid side), 1..=700.
    #[arg(
        long,
        short = 'b',
        global = true,
        default_value_t = 4,
        value_parser = clap::value_parser!(i64).range(MIN_BASE..=MAX_BASE)
    )]
    pub base: i64,

    /// Request centered coordinates instead of zero-based ones.
    #[arg(long, global = true)]
    pub centered: bool,

    /// Cycles service root (overrides CYCLEGRID_API_BASE).
    #[arg(long, global = true, conflicts_with = "fixtures")]
    pub api_base: Option<String>,

    /// Read `cycles-<base>[-centered].json` files from this directory
    /// instead of calling the service.
    #[arg(long, global = true, value_name = "DIR")]
    pub fixtures: Option<PathBuf>,

    /// Whole-request timeout for the service.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,
}

impl SourceArgs {
    pub fn mode(&self) -> AddressingMode {
        if self.centered {
            AddressingMode::Centered
        } else {
            AddressingMode::ZeroBased
        }
    }

    pub fn request_key(&self) -> RequestKey {
        RequestKey::new(self.base, self.mode())
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_api_base(self.api_base.clone(), std::env::var(API_BASE_ENV).ok())
            .with_timeout(Duration::from_millis(self.timeout_ms))
    }

    /// The fixture directory when given, the HTTP service otherwise.
    ///
    /// A fixture path that is not a directory, or a service root that is not
    /// an `http(s)` URL, is an invalid argument.
    pub fn build_source(&self) -> Result<Arc<dyn CycleSource>> {
        let source: Arc<dyn CycleSource> = match &self.fixtures {
            Some(dir) => {
                if !dir.is_dir() {
                    return Err(AppError::invalid(format!(
                        "--fixtures {} is not a directory",
                        dir.display()
                    )));
                }
                Arc::new(FixtureSource::new(dir.clone()))
            }
            None => {
                let config = self.client_config();
                if !(config.api_base.starts_with("http://")
                    || config.api_base.starts_with("https://"))
                {
                    return Err(AppError::invalid(format!(
                        "service root {:?} must start with http:// or https://",
                        config.api_base
                    )));
                }
                Arc::new(HttpSource::new(&config)?)
            }
        };
        tracing::info!(source = %source.describe(), "dataset source ready");
        Ok(source)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaletteArg {
    Cyclic,
    Rainbow,
}

impl From<PaletteArg> for PalettePolicy {
    fn from(arg: PaletteArg) -> Self {
        match arg {
            PaletteArg::Cyclic => PalettePolicy::Cyclic,
            PaletteArg::Rainbow => PalettePolicy::Rainbow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OrderArg {
    Original,
    LengthAsc,
    LengthDesc,
}

impl From<OrderArg> for OrderMode {
    fn from(arg: OrderArg) -> Self {
        match arg {
            OrderArg::Original => OrderMode::Original,
            OrderArg::LengthAsc => OrderMode::LengthAsc,
            OrderArg::LengthDesc => OrderMode::LengthDesc,
        }
    }
}

/// Initial presentation settings.
#[derive(Debug, Clone, Args)]
pub struct ViewArgs {
    #[arg(long, global = true, value_enum, default_value_t = PaletteArg::Cyclic)]
    pub palette: PaletteArg,

    #[arg(long, global = true, value_enum, default_value_t = OrderArg::Original)]
    pub order: OrderArg,

    /// Draw `(x,y)` inside lit cells that are wide enough.
    #[arg(long, global = true)]
    pub labels: bool,
}

/// Everything the visualizer starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub key: RequestKey,
    pub palette: PalettePolicy,
    pub order: OrderMode,
    pub labels: bool,
}

impl Cli {
    pub fn settings(&self) -> Settings {
        Settings {
            key: self.source.request_key(),
            palette: self.view.palette.into(),
            order: self.view.order.into(),
            labels: self.view.labels,
        }
    }
}

pub fn run_from_env() -> Result<()> {
    let cli = Cli::parse();
    run(cli)
}

pub fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings();
    match &cli.command {
        Some(Commands::Dump(args)) => {
            logging::init(&LogTarget::Stderr)?;
            let source = cli.source.build_source()?;
            run_dump(source.as_ref(), settings, args)
        }
        None => {
            logging::init(&LogTarget::file_or_default(cli.log_file.clone()))?;
            let source = cli.source.build_source()?;
            run_interactive(source, settings)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::*;
    use crate::dump::DumpFormat;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn defaults_request_base_four_zero_based() {
        let cli = Cli::try_parse_from(["cyclegrid"]).unwrap();
        let settings = cli.settings();
        assert_eq!(
            settings.key,
            RequestKey::new(4, AddressingMode::ZeroBased)
        );
        assert_eq!(settings.palette, PalettePolicy::Cyclic);
        assert_eq!(settings.order, OrderMode::Original);
        assert!(!settings.labels);
        assert!(cli.command.is_none());
    }

    #[test]
    fn global_flags_reach_the_dump_subcommand() {
        let cli = Cli::try_parse_from([
            "cyclegrid",
            "dump",
            "--base",
            "9",
            "--centered",
            "--order",
            "length-desc",
            "--palette",
            "rainbow",
            "--format",
            "json",
        ])
        .unwrap();
        let settings = cli.settings();
        assert_eq!(settings.key, RequestKey::new(9, AddressingMode::Centered));
        assert_eq!(settings.order, OrderMode::LengthDesc);
        assert_eq!(settings.palette, PalettePolicy::Rainbow);
        let Some(Commands::Dump(args)) = cli.command else {
            panic!("expected dump");
        };
        assert_eq!(args.format, DumpFormat::Json);
    }

    #[test]
    fn base_outside_service_range_is_rejected() {
        assert!(Cli::try_parse_from(["cyclegrid", "--base", "0"]).is_err());
        assert!(Cli::try_parse_from(["cyclegrid", "--base", "701"]).is_err());
        assert!(Cli::try_parse_from(["cyclegrid", "--base", "700"]).is_ok());
    }

    #[test]
    fn fixtures_and_api_base_conflict() {
        let result = Cli::try_parse_from([
            "cyclegrid",
            "--fixtures",
            "/tmp",
            "--api-base",
            "http://x",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_api_base_and_timeout_feed_client_config() {
        let cli = Cli::try_parse_from([
            "cyclegrid",
            "--api-base",
            "http://cycles.test:9000/",
            "--timeout-ms",
            "250",
        ])
        .unwrap();
        let config = cli.source.client_config();
        assert_eq!(config.endpoint(), "http://cycles.test:9000/cycles");
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn fixture_dir_builds_a_fixture_source() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::try_parse_from::<_, std::ffi::OsString>([
            "cyclegrid".into(),
            "--fixtures".into(),
            dir.path().as_os_str().to_owned(),
        ])
        .unwrap();
        let source = cli.source.build_source().unwrap();
        assert_eq!(source.describe(), format!("fixtures:{}", dir.path().display()));
    }

    #[test]
    fn missing_fixture_dir_is_an_invalid_argument() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");
        let cli = Cli::try_parse_from::<_, std::ffi::OsString>([
            "cyclegrid".into(),
            "--fixtures".into(),
            missing.as_os_str().to_owned(),
        ])
        .unwrap();
        let error = cli.source.build_source().err().unwrap();
        assert_eq!(error.exit_code(), 64);
        assert!(error.to_string().contains("is not a directory"), "{error}");
    }

    #[test]
    fn api_base_without_http_scheme_is_an_invalid_argument() {
        let cli = Cli::try_parse_from(["cyclegrid", "--api-base", "cycles.test:9000"]).unwrap();
        let error = cli.source.build_source().err().unwrap();
        assert_eq!(error.exit_code(), 64);
        assert!(error.to_string().contains("cycles.test:9000"), "{error}");
    }
}
