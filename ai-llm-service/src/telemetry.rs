use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefixes of the workspace crates whose events the layer renders.
pub const TARGET_PREFIXES: [&str; 5] = [
    "ai_llm_service",
    "rag_store",
    "qabot",
    "api",
    "qabot_backend",
];

/// RFC3339 UTC timer implemented via `chrono` (no extra features).
/// Example output: `2025-09-12T10:20:30Z`
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let now = chrono::Utc::now();
        // Keep timestamps compact: no fractional seconds, Z-suffix
        let s = now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Build a formatting layer that renders only events emitted by the workspace crates.
///
/// - RFC3339 UTC timestamps
/// - Compact single-line format
/// - `file:line` and target (module path)
/// - ANSI colors only when stdout is a terminal
///
/// Dependencies (hyper, h2, tower) stay silent regardless of the global filter.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let use_ansi = io::stdout().is_terminal();

    let only_workspace = filter::filter_fn(|meta| is_workspace_target(meta.target()));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(use_ansi)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_workspace)
}

fn is_workspace_target(target: &str) -> bool {
    TARGET_PREFIXES.iter().any(|p| {
        target == *p
            || target
                .strip_prefix(p)
                .is_some_and(|rest| rest.starts_with("::"))
    })
}

/// Level directive for one workspace crate, e.g. `qabot=debug`.
pub fn level_directive(target: &str, level: Level) -> Result<Directive, ParseError> {
    Directive::from_str(&format!("{target}={}", level.as_str().to_lowercase()))
}

/// `RUST_LOG` if set; otherwise `default` with every workspace crate raised
/// to `level`.
///
/// Example: `default = "warn"`, `level = Level::INFO` keeps dependencies at
/// WARN and shows INFO for the bot crates.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    if let Ok(from_env) = EnvFilter::try_from_default_env() {
        return from_env;
    }
    let mut base = EnvFilter::new(default);
    for target in TARGET_PREFIXES {
        if let Ok(d) = level_directive(target, level) {
            base = base.add_directive(d);
        }
    }
    base
}
