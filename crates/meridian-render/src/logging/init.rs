use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "meridian_render=debug,meridian_render::atlas=trace").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Adds a timestamp to each record. Frame traces are easier to read without.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; later calls are ignored. An explicit `env_filter` wins over
/// `RUST_LOG`, which wins over the `info` default.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
        }

        builder.write_style(config.write_style);
        if !config.timestamps {
            builder.format_timestamp(None);
        }

        // Another logger may already be installed by the host.
        if builder.try_init().is_err() {
            log::debug!("logger already installed; keeping existing one");
            return;
        }

        log::debug!("logging initialized");
    });
}
