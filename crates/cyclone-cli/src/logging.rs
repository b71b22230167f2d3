use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

use crate::cli::Cli;

/// Installs the global subscriber. Logs always go to stderr so that
/// machine-readable reports on stdout stay clean.
pub fn init_logging(cli: &Cli) {
    let filter = build_filter(cli);
    let subscriber = tracing_subscriber::registry().with(filter);

    if cli.log_json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    }
}

fn build_filter(cli: &Cli) -> EnvFilter {
    let level = cli.log_level.as_tracing_level();
    EnvFilter::from_default_env().add_directive(level.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::LogLevel;
    use clap::Parser;
    use tracing::Level;

    fn parse_cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn warn_level_filters_info_messages() {
        let warn_level = LogLevel::Warn.as_tracing_level();
        let info_level = LogLevel::Info.as_tracing_level();
        assert_eq!(warn_level, Level::WARN);
        assert!(warn_level < info_level);
    }

    #[test]
    fn debug_level_includes_info_messages() {
        let debug_level = LogLevel::Debug.as_tracing_level();
        assert!(debug_level > LogLevel::Info.as_tracing_level());
    }

    #[test]
    fn filter_carries_requested_level() {
        let cli = parse_cli(&["cyclone", "--log-level", "debug", "init"]);

        let filter = build_filter(&cli);

        assert!(filter.to_string().contains("debug"));
    }
}
