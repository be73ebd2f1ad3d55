use gdman_platform::AppPaths;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};
use std::fs::File;

/// Warnings always reach stderr. With debug logging on, everything from the
/// gdman crates is also written to the log file in the cache directory.
pub fn init_logging(paths: &AppPaths, debug_enabled: bool) {
    let term_level = if debug_enabled && cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .add_filter_allow_str("gdman")
        .build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        term_level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    let log_path = paths.log_file();
    if debug_enabled {
        let _ = paths.ensure_dirs();
        match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, config, file)),
            Err(e) => eprintln!("Cannot open log file {:?}: {}", log_path, e),
        }
    }

    let _ = CombinedLogger::init(loggers);

    if debug_enabled {
        log::info!("Debug logging initialized, log file: {:?}", log_path);
    }
}
