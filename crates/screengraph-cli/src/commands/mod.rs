use clap::{Parser, Subcommand};
use console::style;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use screengraph_appium::{get_supported_platforms, validate_platform};
use screengraph_config::{ConfigLoader, LoggingConfig, ScreenGraphConfig};
use screengraph_core::{Platform, ScreenGraphError, ToolError};

mod catalog;
mod probe;

use probe::ProbeArgs;

/// ScreenGraph: mobile app automation over Appium
#[derive(Parser, Debug)]
#[command(name = "screengraph", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to screengraph.toml config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level override (e.g. debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress all log output (errors only)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the platforms tools can be created for
    Platforms,
    /// Check whether a platform name is supported
    Validate {
        /// Platform name, e.g. android
        platform: String,
    },
    /// Print the catalog of tool operations
    Tools {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the effective configuration
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Connect to a device, gather its state and disconnect
    Probe(ProbeArgs),
}

/// Pick the log level: --verbose > --quiet > --log-level > config.
/// `RUST_LOG` still overrides whatever this returns.
fn resolve_log_level<'a>(
    verbose: bool,
    quiet: bool,
    flag: Option<&'a str>,
    configured: &'a str,
) -> &'a str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        flag.unwrap_or(configured)
    }
}

fn init_tracing(logging: &LoggingConfig, level: &str) -> screengraph_core::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let writer = match &logging.file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(logging.file.is_none());

    match logging.format.as_str() {
        "json" => builder.json().with_target(true).init(),
        "compact" => builder.compact().with_target(false).init(),
        _ => builder.with_target(false).init(),
    }
    Ok(())
}

impl Cli {
    pub async fn run(self) -> screengraph_core::Result<()> {
        // Config first: it decides the log format and default level.
        let config_loader = ConfigLoader::load(self.config.as_deref())?;
        let config = config_loader.get();

        let level = resolve_log_level(
            self.verbose,
            self.quiet,
            self.log_level.as_deref(),
            &config.logging.level,
        );
        init_tracing(&config.logging, level)?;

        match self.command {
            Commands::Platforms => Self::cmd_platforms(),
            Commands::Validate { platform } => Self::cmd_validate(&platform),
            Commands::Tools { json } => catalog::cmd_tools(json),
            Commands::Config { json } => Self::cmd_config(&config, &config_loader, json),
            Commands::Probe(args) => probe::cmd_probe(&config, args).await,
        }
    }

    fn cmd_platforms() -> screengraph_core::Result<()> {
        for name in get_supported_platforms() {
            let automation = name
                .parse::<Platform>()
                .map(|p| p.automation_name())
                .unwrap_or_default();
            println!("  {}  {}", style(name).green().bold(), style(automation).dim());
        }
        Ok(())
    }

    fn cmd_validate(platform: &str) -> screengraph_core::Result<()> {
        if validate_platform(platform) {
            println!("{} {platform} is supported", style("✓").green().bold());
            return Ok(());
        }
        // Reuse the parser's error so the message lists the supported set.
        let err = match platform.parse::<Platform>() {
            Err(e) => e,
            Ok(_) => ToolError::unknown(format!("'{platform}' failed validation")),
        };
        println!("{} {}", style("✗").red().bold(), err.message);
        Err(ScreenGraphError::Tool(err))
    }

    fn cmd_config(
        config: &ScreenGraphConfig,
        loader: &ConfigLoader,
        json: bool,
    ) -> screengraph_core::Result<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(config)?);
            return Ok(());
        }

        println!("{}", style(format!("# {}", loader.path().display())).dim());
        let rendered = toml::to_string_pretty(config)
            .map_err(|e| ScreenGraphError::Config(e.to_string()))?;
        println!("{rendered}");

        match config.validate() {
            Ok(warnings) => {
                for w in &warnings {
                    println!("{} {w}", style("!").yellow().bold());
                }
            }
            Err(e) => println!("{} {e}", style("✗").red().bold()),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_precedence() {
        assert_eq!(resolve_log_level(true, false, Some("warn"), "info"), "debug");
        assert_eq!(resolve_log_level(false, true, Some("warn"), "info"), "error");
        assert_eq!(resolve_log_level(false, false, Some("warn"), "info"), "warn");
        assert_eq!(resolve_log_level(false, false, None, "trace"), "trace");
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["screengraph", "tools", "--json", "-v"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Tools { json: true }));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["screengraph", "-v", "-q", "platforms"]).is_err());
    }

    #[test]
    fn test_validate_rejects_unknown_platform() {
        let err = Cli::cmd_validate("windows").unwrap_err();
        match err {
            ScreenGraphError::Tool(e) => assert!(e.message.contains("android, ios")),
            other => panic!("unexpected error: {other}"),
        }
        assert!(Cli::cmd_validate("android").is_ok());
    }
}
