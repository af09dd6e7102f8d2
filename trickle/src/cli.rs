//! Command-line configuration for the binary.
//!
//! Every option can also come from a `TRICKLE_*` environment variable.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing::Level;
use trickle_provider_openai::OpenAi;
use trickle_sink::{ConsoleSink, OutputSink, SinkConfig, TracingSink};

use crate::demo::{
    DEFAULT_CONVERSATION_SYSTEM, DEFAULT_PROMPT, DEFAULT_SYSTEM, DEFAULT_TURNS, DemoConfig,
};
use crate::logging::LoggingConfig;

/// Stream chat completions from a local OpenAI-compatible server.
#[derive(Debug, Parser)]
#[command(name = "trickle", version, about)]
pub struct Cli {
    /// API base URL, including the version prefix.
    #[arg(long, env = "TRICKLE_API_BASE", default_value = "http://localhost:8080/v1")]
    pub api_base: String,

    /// API key sent as a bearer token. Local servers accept anything.
    #[arg(long, env = "TRICKLE_API_KEY", default_value = "EMPTY", hide_env_values = true)]
    pub api_key: String,

    /// Model name to request.
    #[arg(long, env = "TRICKLE_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// Sampling temperature.
    #[arg(long, env = "TRICKLE_TEMPERATURE", default_value_t = 0.0)]
    pub temperature: f32,

    /// Minimum seconds between two printed chunks.
    #[arg(long, env = "TRICKLE_FLUSH_INTERVAL", default_value = "3", value_parser = parse_seconds)]
    pub flush_interval: Duration,

    /// Print the buffered remainder when a generation fails instead of dropping it.
    #[arg(long, env = "TRICKLE_FLUSH_ON_ERROR")]
    pub flush_on_error: bool,

    /// Seconds allowed for connecting to the server.
    #[arg(long, env = "TRICKLE_CONNECT_TIMEOUT", default_value = "30", value_parser = parse_seconds)]
    pub connect_timeout: Duration,

    /// Seconds of silence from the server before a request fails.
    /// Unset waits forever; a stream that keeps sending is never cut off.
    #[arg(long, env = "TRICKLE_READ_TIMEOUT", value_parser = parse_seconds)]
    pub read_timeout: Option<Duration>,

    /// Where emissions go.
    #[arg(long, env = "TRICKLE_OUTPUT", value_enum, default_value_t = Output::Console)]
    pub output: Output,

    /// Persona for the one-shot request.
    #[arg(long, default_value = DEFAULT_SYSTEM)]
    pub system: String,

    /// Question for the one-shot request.
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    /// System prompt for the remembered conversation.
    #[arg(long, default_value = DEFAULT_CONVERSATION_SYSTEM)]
    pub conversation_system: String,

    /// A conversation turn. Repeat for several; defaults to a two-turn memory check.
    #[arg(long = "turn")]
    pub turns: Vec<String>,

    /// Log level when RUST_LOG is unset.
    #[arg(long, env = "TRICKLE_LOG_LEVEL", default_value = "info")]
    pub log_level: Level,

    /// Emit logs as JSON lines.
    #[arg(long, env = "TRICKLE_LOG_JSON")]
    pub log_json: bool,
}

/// Destination of the throttled text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Output {
    /// `HH:MM:SS: text` lines on stdout.
    Console,
    /// `INFO` events on the `trickle::output` target, next to the logs.
    Tracing,
}

impl Output {
    /// A fresh output sink of this kind.
    #[must_use]
    pub fn sink(self) -> Box<dyn OutputSink> {
        match self {
            Self::Console => Box::new(ConsoleSink::stdout()),
            Self::Tracing => Box::new(TracingSink),
        }
    }
}

/// Parse a non-negative, finite number of seconds.
fn parse_seconds(s: &str) -> Result<Duration, String> {
    let secs: f64 = s
        .trim()
        .parse()
        .map_err(|e| format!("{s:?} is not a number: {e}"))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("{s:?} is not a valid duration: {e}"))
}

impl Cli {
    /// The provider described by the options.
    #[must_use]
    pub fn provider(&self) -> OpenAi {
        let provider = OpenAi::new(self.api_key.clone())
            .base_url(self.api_base.clone())
            .model(self.model.clone())
            .connect_timeout(self.connect_timeout);
        match self.read_timeout {
            Some(timeout) => provider.read_timeout(timeout),
            None => provider,
        }
    }

    /// Sink settings.
    #[must_use]
    pub fn sink_config(&self) -> SinkConfig {
        SinkConfig::default()
            .interval(self.flush_interval)
            .flush_on_error(self.flush_on_error)
    }

    /// Walkthrough settings.
    #[must_use]
    pub fn demo_config(&self) -> DemoConfig {
        let turns = if self.turns.is_empty() {
            DEFAULT_TURNS.iter().map(|t| (*t).to_string()).collect()
        } else {
            self.turns.clone()
        };
        DemoConfig {
            sink: self.sink_config(),
            temperature: self.temperature,
            system: self.system.clone(),
            prompt: self.prompt.clone(),
            conversation_system: self.conversation_system.clone(),
            turns,
        }
    }

    /// Logging settings.
    #[must_use]
    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig {
            level: self.log_level,
            json_format: self.log_json,
        }
    }
}
