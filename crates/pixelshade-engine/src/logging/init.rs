use std::sync::Once;

/// Used when neither `LoggingConfig::env_filter` nor `RUST_LOG` is set.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` filter syntax, e.g. `pixelshade_engine=debug`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

fn resolve_filter(configured: Option<String>, env: Option<String>) -> String {
    configured
        .or(env)
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger. Only the first call does anything.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());
        let installed = env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .try_init();

        // A test harness or host may have installed its own logger first.
        if installed.is_ok() {
            log::debug!("log filter `{filter}`");
        }
    });
}
