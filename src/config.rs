use crate::cli::{Args, ColorChoice};
use log::{Level, LevelFilter, Log, Metadata, Record};

pub struct AppConfig {
    pub color_enabled: bool,
    pub verbose: bool,
}

impl AppConfig {
    pub fn from_args(args: &Args) -> Self {
        let color_enabled = match args.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => atty::is(atty::Stream::Stderr) && atty::is(atty::Stream::Stdout),
        };

        AppConfig {
            color_enabled,
            verbose: args.verbose,
        }
    }

    /// Installs the stderr logger. Library log records are only shown with
    /// `--verbose`.
    pub fn init_logging(&self) {
        let level = if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Off
        };

        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(level);
        }
    }
}

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[arrowlang:{}] {}",
                record.level().as_str().to_lowercase(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_explicit_color_choice_wins() {
        let args = Args::try_parse_from(["arrowlang", "--color", "always"]).unwrap();
        assert!(AppConfig::from_args(&args).color_enabled);

        let args = Args::try_parse_from(["arrowlang", "--color", "never"]).unwrap();
        assert!(!AppConfig::from_args(&args).color_enabled);
    }

    #[test]
    fn test_logger_skips_trace() {
        let trace = Metadata::builder().level(Level::Trace).build();
        let debug = Metadata::builder().level(Level::Debug).build();
        assert!(!StderrLogger.enabled(&trace));
        assert!(StderrLogger.enabled(&debug));
    }
}
