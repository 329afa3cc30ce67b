use crate::infrastructure::error::{ClientError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub json_format: bool,
    pub chrome_trace: bool,
    pub show_spans: bool,
    pub show_thread_ids: bool,
    pub show_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            json_format: false,
            chrome_trace: false,
            show_spans: false,
            show_thread_ids: false,
            show_targets: true,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_spans: true,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Development with Chrome tracing
    pub fn dev_with_trace() -> Self {
        Self {
            chrome_trace: true,
            ..Self::dev()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.default_level = level;
        self
    }

    /// Emit one JSON object per event
    pub fn with_json(mut self) -> Self {
        self.json_format = true;
        self
    }

    /// Enable Chrome tracing
    pub fn with_chrome_trace(mut self) -> Self {
        self.chrome_trace = true;
        self
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }

        let mut filter = EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_PKG_NAME").replace('-', "_"),
            self.default_level
        ));
        for crate_name in ["pairplay_core", "pairplay_p2p"] {
            let directive = format!("{}={}", crate_name, self.default_level)
                .parse()
                .map_err(|e| ClientError::InvalidConfig(format!("log directive: {}", e)))?;
            filter = filter.add_directive(directive);
        }
        Ok(filter)
    }

    pub fn init(self) -> Result<()> {
        let env_filter = self.env_filter()?;
        let init_error = |e: tracing_subscriber::util::TryInitError| {
            ClientError::InvalidConfig(format!("Failed to initialize tracing: {}", e))
        };

        // 🔧 Chrome tracing (highest priority)
        #[cfg(feature = "chrome-trace")]
        if self.chrome_trace {
            use tracing_chrome::ChromeLayerBuilder;

            let (chrome_layer, guard) = ChromeLayerBuilder::new().build();
            eprintln!("📊 Chrome trace enabled (trace-<timestamp>.json, view at https://ui.perfetto.dev/)");

            tracing_subscriber::registry()
                .with(env_filter)
                .with(chrome_layer)
                .with(fmt::layer().with_target(true).compact())
                .try_init()
                .map_err(init_error)?;

            // Keep guard alive for the lifetime of the program
            std::mem::forget(guard);
            return Ok(());
        }

        if self.json_format {
            return tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_current_span(self.show_spans))
                .try_init()
                .map_err(init_error);
        }

        let span_events = if self.show_spans {
            fmt::format::FmtSpan::NEW | fmt::format::FmtSpan::CLOSE
        } else {
            fmt::format::FmtSpan::NONE
        };
        let fmt_layer = fmt::layer()
            .with_target(self.show_targets)
            .with_thread_ids(self.show_thread_ids)
            .with_span_events(span_events);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(init_error)
    }
}
