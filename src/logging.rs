use std::io::Write;

use colored::Colorize;
use env_logger::{Builder, Env};
use log::{Level, LevelFilter, SetLoggerError};

/// Map `-v` occurrences to a level filter.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Error, // default: only errors
        1 => LevelFilter::Info,  // -v: which provider/model is called
        2 => LevelFilter::Debug, // -vv: config sources, token usage, file naming
        _ => LevelFilter::Trace, // -vvv: prompts and raw bodies
    }
}

/// Initialise logging to stderr. `RUST_LOG`, when set, takes precedence over `-v`.
///
/// Fails if a global logger is already installed.
pub fn init_logger(verbosity: u8) -> Result<(), SetLoggerError> {
    let mut builder = Builder::new();
    builder.filter_level(level_for(verbosity));
    builder.parse_env(Env::default());

    builder.format(|buf, record| {
        let level_label = match record.level() {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".white().bold(),
            Level::Debug => "DEBUG".bright_black(),
            Level::Trace => "TRACE".bright_black(),
        };

        writeln!(buf, "{} {}", level_label, record.args())
    });

    builder.try_init()
}
