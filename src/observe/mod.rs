//! Observability port for crawl events
//!
//! The crawler does not log through a process-global registry; instead an
//! [`Observer`] is injected at construction time. Every event is offered
//! synchronously to a list of named [`EventSink`] implementations after
//! passing a runtime-adjustable level gate. The default sink forwards to
//! `tracing`, and additional sinks can be registered for cross-cutting
//! concerns (metrics, alerting) without touching the crawl core.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

/// Severity of a crawl event
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
}

impl Level {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            _ => Level::Error,
        }
    }
}

/// Events emitted by the crawl pipeline
#[derive(Debug, Clone)]
pub enum CrawlEvent {
    /// A crawl run began at the given root URL
    CrawlStarted { root: String },

    /// A crawl run drained all tiers
    CrawlFinished { elapsed: Duration },

    /// One fetch attempt completed successfully
    FetchSucceeded {
        url: String,
        attempt: u32,
        elapsed: Duration,
    },

    /// One fetch attempt failed; the fetcher may retry
    FetchFailed {
        url: String,
        attempt: u32,
        elapsed: Duration,
        reason: String,
    },

    /// The retry budget for a URL is spent
    RetriesExhausted { url: String, attempts: u32 },

    /// A category branch terminated early without affecting siblings
    BranchSkipped { url: String, reason: String },

    /// A product record reached storage
    RecordStored { id: i64, jersey_assured: bool },

    /// A product record could not be written
    StoreFailed { url: String, reason: String },
}

impl CrawlEvent {
    /// The severity this event is reported at
    pub fn level(&self) -> Level {
        match self {
            CrawlEvent::CrawlStarted { .. } | CrawlEvent::CrawlFinished { .. } => Level::Info,
            CrawlEvent::FetchSucceeded { .. } => Level::Info,
            CrawlEvent::FetchFailed { .. } => Level::Warn,
            CrawlEvent::RetriesExhausted { .. } => Level::Error,
            CrawlEvent::BranchSkipped { .. } => Level::Error,
            CrawlEvent::RecordStored { .. } => Level::Debug,
            CrawlEvent::StoreFailed { .. } => Level::Error,
        }
    }
}

impl fmt::Display for CrawlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlEvent::CrawlStarted { root } => write!(f, "crawl started at {}", root),
            CrawlEvent::CrawlFinished { elapsed } => {
                write!(f, "crawl finished in {:?}", elapsed)
            }
            CrawlEvent::FetchSucceeded {
                url,
                attempt,
                elapsed,
            } => write!(f, "fetched {} (attempt {}) in {:?}", url, attempt, elapsed),
            CrawlEvent::FetchFailed {
                url,
                attempt,
                elapsed,
                reason,
            } => write!(
                f,
                "fetch of {} failed (attempt {}, {:?}): {}",
                url, attempt, elapsed, reason
            ),
            CrawlEvent::RetriesExhausted { url, attempts } => {
                write!(f, "giving up on {} after {} attempts", url, attempts)
            }
            CrawlEvent::BranchSkipped { url, reason } => {
                write!(f, "skipping branch {}: {}", url, reason)
            }
            CrawlEvent::RecordStored { id, jersey_assured } => {
                write!(f, "stored product {} (jersey_assured={})", id, jersey_assured)
            }
            CrawlEvent::StoreFailed { url, reason } => {
                write!(f, "failed to store product from {}: {}", url, reason)
            }
        }
    }
}

/// A subscriber receiving every event that passes the level gate
pub trait EventSink: Send + Sync {
    fn emit(&self, level: Level, event: &CrawlEvent);
}

/// Level-gated fan-out to a list of named sinks
///
/// The minimum level can be changed at runtime; sinks are fixed at
/// construction so no synchronization is needed around the list itself.
pub struct Observer {
    min_level: AtomicU8,
    sinks: Vec<(String, Box<dyn EventSink>)>,
}

impl Observer {
    /// Creates an observer with the default tracing sink at `Info`
    pub fn new() -> Self {
        let mut observer = Self::empty(Level::Info);
        observer.register_sink("tracing", Box::new(TracingSink));
        observer
    }

    /// Creates an observer with no sinks (events are dropped)
    pub fn empty(min_level: Level) -> Self {
        Self {
            min_level: AtomicU8::new(min_level as u8),
            sinks: Vec::new(),
        }
    }

    /// Registers a named sink that will receive every gated event
    pub fn register_sink(&mut self, name: &str, sink: Box<dyn EventSink>) {
        self.sinks.push((name.to_string(), sink));
    }

    /// Adjusts the minimum emitted level at runtime
    pub fn set_level(&self, level: Level) {
        self.min_level.store(level as u8, Ordering::Relaxed);
    }

    /// The current minimum emitted level
    pub fn level(&self) -> Level {
        Level::from_u8(self.min_level.load(Ordering::Relaxed))
    }

    /// Names of the registered sinks
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|(name, _)| name.as_str()).collect()
    }

    /// Offers an event to every sink if it passes the level gate
    pub fn emit(&self, event: CrawlEvent) {
        let level = event.level();
        if level < self.level() {
            return;
        }
        for (_, sink) in &self.sinks {
            sink.emit(level, &event);
        }
    }
}

impl Default for Observer {
    fn default() -> Self {
        Self::new()
    }
}

/// Default sink forwarding events to the `tracing` macros
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, level: Level, event: &CrawlEvent) {
        match level {
            Level::Debug => tracing::debug!("{}", event),
            Level::Info => tracing::info!("{}", event),
            Level::Warn => tracing::warn!("{}", event),
            Level::Error => tracing::error!("{}", event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    struct CountingSink {
        count: Arc<AtomicUsize>,
    }

    impl EventSink for CountingSink {
        fn emit(&self, _level: Level, _event: &CrawlEvent) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn info_event() -> CrawlEvent {
        CrawlEvent::CrawlStarted {
            root: "https://shop.example.com/".to_string(),
        }
    }

    fn debug_event() -> CrawlEvent {
        CrawlEvent::RecordStored {
            id: 1,
            jersey_assured: false,
        }
    }

    #[test]
    fn test_level_gate_filters_below_minimum() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut observer = Observer::empty(Level::Info);
        observer.register_sink(
            "counter",
            Box::new(CountingSink {
                count: Arc::clone(&count),
            }),
        );

        observer.emit(debug_event());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        observer.emit(info_event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_runtime_level_adjustment() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut observer = Observer::empty(Level::Info);
        observer.register_sink(
            "counter",
            Box::new(CountingSink {
                count: Arc::clone(&count),
            }),
        );

        observer.emit(debug_event());
        assert_eq!(count.load(Ordering::SeqCst), 0);

        observer.set_level(Level::Debug);
        observer.emit(debug_event());
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_all_sinks_receive_events() {
        let count_a = Arc::new(AtomicUsize::new(0));
        let count_b = Arc::new(AtomicUsize::new(0));
        let mut observer = Observer::empty(Level::Debug);
        observer.register_sink(
            "a",
            Box::new(CountingSink {
                count: Arc::clone(&count_a),
            }),
        );
        observer.register_sink(
            "b",
            Box::new(CountingSink {
                count: Arc::clone(&count_b),
            }),
        );

        observer.emit(info_event());
        assert_eq!(count_a.load(Ordering::SeqCst), 1);
        assert_eq!(count_b.load(Ordering::SeqCst), 1);
        assert_eq!(observer.sink_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_event_levels() {
        assert_eq!(
            CrawlEvent::RetriesExhausted {
                url: "x".to_string(),
                attempts: 4
            }
            .level(),
            Level::Error
        );
        assert_eq!(debug_event().level(), Level::Debug);
        assert_eq!(info_event().level(), Level::Info);
    }
}
