use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkStats {
    pub messages_sent: u64,
    pub messages_received: u64,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub malformed_messages: u64,
    pub send_failures: u64,
    pub last_received_sequence: Option<u32>,
}

/// Counters shared between a connection and its receive task.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
    bytes_sent: AtomicU64,
    bytes_received: AtomicU64,
    malformed_messages: AtomicU64,
    send_failures: AtomicU64,
    last_received_sequence: AtomicU32,
    has_received: AtomicBool,
}

impl StatsCounters {
    pub(crate) fn record_sent(&self, bytes: usize) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_received(&self, bytes: usize, sequence: u32) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
        self.last_received_sequence.store(sequence, Ordering::Relaxed);
        self.has_received.store(true, Ordering::Release);
    }

    pub(crate) fn record_malformed(&self, bytes: usize) {
        self.malformed_messages.fetch_add(1, Ordering::Relaxed);
        self.bytes_received.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_send_failure(&self) {
        self.send_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> NetworkStats {
        let last_received_sequence = if self.has_received.load(Ordering::Acquire) {
            Some(self.last_received_sequence.load(Ordering::Relaxed))
        } else {
            None
        };

        NetworkStats {
            messages_sent: self.messages_sent.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            bytes_received: self.bytes_received.load(Ordering::Relaxed),
            malformed_messages: self.malformed_messages.load(Ordering::Relaxed),
            send_failures: self.send_failures.load(Ordering::Relaxed),
            last_received_sequence,
        }
    }
}
