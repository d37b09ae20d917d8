use log::LevelFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogLevel(pub LevelFilter);
impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level = match s.to_lowercase().as_str() {
            "trace" => LevelFilter::Trace,
            "debug" => LevelFilter::Debug,
            "info" => LevelFilter::Info,
            "warn" | "warning" => LevelFilter::Warn,
            "error" => LevelFilter::Error,
            "off" | "none" => LevelFilter::Off,
            _ => return Err(format!("Invalid log level: {}", s)),
        };
        Ok(LogLevel(level))
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        level.0
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel(LevelFilter::Info)
    }
}

///////////////////////////////
/// Install the global logger. RUST_LOG, if set, overrides the given level
pub fn setup_global_logger(log_level: LogLevel) {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log_level.0)
        .format_timestamp_secs()
        .format_target(false)
        .parse_default_env();

    // A second initialisation (e.g. from tests) is harmless
    if builder.try_init().is_err() {
        log::debug!("Global logger was already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_levels() {
        assert_eq!("trace".parse::<LogLevel>().unwrap().0, LevelFilter::Trace);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap().0, LevelFilter::Warn);
        assert_eq!("none".parse::<LogLevel>().unwrap().0, LevelFilter::Off);
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
