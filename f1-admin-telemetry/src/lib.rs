use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

pub const DEFAULT_LOG_LEVEL: &str = "info,hyper=info,hyper_util=info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_LEVEL.into())
}

/// Installs the global subscriber. Log output goes to stderr so it does not
/// interleave with command output.
///
/// Returns `false` if a subscriber was already installed.
pub fn setup_telemetry() -> bool {
    let stderr_log = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter()))
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("telemetry initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_setup_is_rejected() {
        let first = setup_telemetry();
        assert!(!setup_telemetry());
        // only one test in this binary installs a subscriber
        assert!(first);
    }
}
