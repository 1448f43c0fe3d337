//! AWG config checker
//!
//! Parses an obfuscation config, validates it and prints the result:
//! - as `key=value` text, ready to paste into a peer config
//! - as TOML, for embedding into larger config files

use anyhow::{Context, Result};
use awg_obfs::{AwgConfig, MessageType, Parser};
use clap::{Parser as _, ValueEnum};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// AWG config checker - validate junk packet and magic header settings
#[derive(clap::Parser, Debug)]
#[command(name = "awg-check")]
#[command(about = "Validate AmneziaWG-style obfuscation settings")]
#[command(version)]
struct Args {
    /// Config file path ("-" reads stdin)
    #[arg(default_value = "-")]
    config: PathBuf,

    /// Require whole values (enables `min-max` header ranges)
    #[arg(long)]
    strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Print a random valid config and exit
    #[arg(long)]
    generate: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Toml,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays a clean config
    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .with_writer(std::io::stderr)
        .init();

    if args.generate {
        let config = AwgConfig::generate(&mut rand::thread_rng());
        return print_config(&config, args.format);
    }

    let text = read_input(&args.config)?;
    let parser = Parser::new().strict(args.strict);
    debug!(path = %args.config.display(), strict = parser.is_strict(), "parsing config");
    let config = parser.parse(&text).context("Failed to parse config")?;
    config.validate().context("Invalid obfuscation config")?;

    if config.is_enabled() {
        info!("Obfuscation active");
        for kind in MessageType::ALL {
            debug!(
                ?kind,
                junk = config.junk_size(kind),
                header = %config.magic_header(kind),
                "message settings"
            );
        }
    } else if config.enabled {
        warn!("enabled=true but no junk or header settings, wire format unchanged");
    } else {
        info!("Obfuscation disabled");
    }

    print_config(&config, args.format)
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn print_config(config: &AwgConfig, format: Format) -> Result<()> {
    match format {
        Format::Text => print!("{}", config),
        Format::Toml => {
            let toml = toml::to_string_pretty(config).context("Failed to serialize config")?;
            print!("{}", toml);
        }
    }
    Ok(())
}
