use std::str::FromStr;

use fern::colors::{Color, ColoredLevelConfig};
use thiserror::Error;

use crate::env::get_env;

/// Crates of this workspace, logged at `LOG_LEVEL`. Everything else stays at WARN.
pub const WORKSPACE_CRATES: [&str; 4] = [
    "sui_mm_rs",
    "sui_mm_toolkit",
    "sui_mm_utils",
    "provider_utils",
];

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("LOG_LEVEL invalid: {0:?}")]
    InvalidLevel(String),
    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}

pub fn setup_logger(levels: Option<Vec<(String, log::LevelFilter)>>) -> Result<(), LoggerError> {
    let colors = ColoredLevelConfig {
        trace: Color::Cyan,
        debug: Color::Magenta,
        info: Color::Green,
        warn: Color::Red,
        error: Color::BrightRed,
    };

    let log_level_str = get_env("LOG_LEVEL", Some("INFO".to_string()));
    let log_level = log::LevelFilter::from_str(&log_level_str)
        .map_err(|_| LoggerError::InvalidLevel(log_level_str.clone()))?;

    let mut dispatch = fern::Dispatch::new()
        .format(move |out, message, record| {
            out.finish(format_args!(
                "{}[{}] {}",
                chrono::Local::now().format("[%H:%M:%S.%f]"),
                colors.color(record.level()),
                message
            ))
        })
        .chain(std::io::stdout())
        .level(log::LevelFilter::Warn);
    for crate_name in WORKSPACE_CRATES {
        dispatch = dispatch.level_for(crate_name, log_level);
    }
    if let Some(bin_name) = current_bin_name() {
        dispatch = dispatch.level_for(bin_name, log_level);
    }
    if let Some(levels) = levels {
        for (module, level) in levels {
            dispatch = dispatch.level_for(module, level);
        }
    }

    dispatch.apply()?;
    Ok(())
}

fn current_bin_name() -> Option<String> {
    std::env::current_exe()
        .ok()?
        .file_stem()?
        .to_str()?
        .to_owned()
        .into()
}
