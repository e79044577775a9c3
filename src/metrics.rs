use std::sync::atomic::{AtomicUsize, Ordering};

/// A simple counter that can be incremented atomically
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicUsize,
}

impl Counter {
    /// Create a new counter with an initial value
    pub fn new(initial_value: usize) -> Self {
        Self {
            value: AtomicUsize::new(initial_value),
        }
    }

    /// Increment the counter by a specific amount
    pub fn increment(&self, amount: usize) {
        self.value.fetch_add(amount, Ordering::Relaxed);
    }

    /// Get the current value of the counter
    pub fn value(&self) -> usize {
        self.value.load(Ordering::Relaxed)
    }
}

/// Running totals for the lifetime of a server.
///
/// Shared through an `Arc` so a signal handler can print them on shutdown.
#[derive(Debug, Default)]
pub struct ServerStats {
    pub connections: Counter,
    pub responses: Counter,
    pub rejected: Counter,
    pub partial_sends: Counter,
    pub bytes_sent: Counter,
}

impl ServerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a one-line summary
    pub fn format(&self) -> String {
        format!(
            "connections={} responses={} rejected={} partial_sends={} bytes_sent={}",
            self.connections.value(),
            self.responses.value(),
            self.rejected.value(),
            self.partial_sends.value(),
            self.bytes_sent.value()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::new(0);

        counter.increment(1);
        assert_eq!(counter.value(), 1);

        counter.increment(4);
        assert_eq!(counter.value(), 5);
    }

    #[test]
    fn test_stats_format() {
        let stats = ServerStats::new();
        stats.connections.increment(2);
        stats.responses.increment(1);
        stats.rejected.increment(1);
        stats.bytes_sent.increment(120);

        assert_eq!(
            stats.format(),
            "connections=2 responses=1 rejected=1 partial_sends=0 bytes_sent=120"
        );
    }
}
