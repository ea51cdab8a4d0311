//! make-dsstore
//!
//! Writes the installer window layout into the mounted disk image. Set
//! `FINDER_LAYOUT_CONFIG` to a YAML file to override the defaults and
//! `RUST_LOG` to change verbosity.

use std::process::ExitCode;

use finder_layout::{LayoutConfig, write_layout};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const CONFIG_ENV: &str = "FINDER_LAYOUT_CONFIG";

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_timer(ChronoUtc::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .init();
}

fn load_config() -> finder_layout::Result<LayoutConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => {
            tracing::info!(path = ?path, "loading layout configuration");
            LayoutConfig::from_yaml_file(path)
        },
        _ => Ok(LayoutConfig::default()),
    }
}

fn main() -> ExitCode {
    init_logging();

    let result = load_config().and_then(|config| write_layout(&config));
    match result {
        Ok(summary) => {
            println!(
                "Wrote {} records to {}",
                summary.records_written,
                summary.store_path.display()
            );
            ExitCode::SUCCESS
        },
        Err(err) => {
            eprintln!("Error: {}", err);
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                eprintln!("  caused by: {}", cause);
                source = cause.source();
            }
            ExitCode::FAILURE
        },
    }
}
