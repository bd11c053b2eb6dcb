//! Sliding time window with incremental aggregates.

use std::collections::VecDeque;

/// Minimal projection of a packet retained while it sits in the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowEntry {
    pub timestamp: f64,
    pub length: u32,
    pub is_syn: bool,
    pub is_rst: bool,
}

/// Time-bounded view over the most recent packets.
///
/// Aggregates (packet count, bytes, SYN/RST counts) are adjusted on
/// insert and on evict, never recomputed by rescanning the entries.
/// Eviction assumes timestamps arrive in non-decreasing order; the
/// metrics engine clamps regressions before they reach the window.
#[derive(Debug)]
pub struct SlidingWindow {
    entries: VecDeque<WindowEntry>,
    window_seconds: f64,
    bytes: u64,
    syn_count: u64,
    rst_count: u64,
}

impl SlidingWindow {
    pub fn new(window_seconds: f64) -> Self {
        Self {
            entries: VecDeque::new(),
            window_seconds,
            bytes: 0,
            syn_count: 0,
            rst_count: 0,
        }
    }

    /// Append one entry, then evict every front entry older than
    /// `entry.timestamp - W`. The newest entry defines "now".
    pub fn push(&mut self, entry: WindowEntry) {
        self.entries.push_back(entry);
        self.bytes += u64::from(entry.length);
        if entry.is_syn {
            self.syn_count += 1;
        }
        if entry.is_rst {
            self.rst_count += 1;
        }

        let cutoff = entry.timestamp - self.window_seconds;
        while let Some(front) = self.entries.front().copied() {
            if front.timestamp >= cutoff {
                break;
            }
            self.entries.pop_front();
            self.bytes -= u64::from(front.length);
            if front.is_syn {
                self.syn_count -= 1;
            }
            if front.is_rst {
                self.rst_count -= 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn window_seconds(&self) -> f64 {
        self.window_seconds
    }

    /// Packets per second over the window.
    pub fn packet_rate(&self) -> f64 {
        self.entries.len() as f64 / self.window_seconds
    }

    /// Bytes per second over the window.
    pub fn byte_rate(&self) -> f64 {
        self.bytes as f64 / self.window_seconds
    }

    /// SYN packets per second over the window.
    pub fn syn_rate(&self) -> f64 {
        self.syn_count as f64 / self.window_seconds
    }

    /// RST packets per second over the window.
    pub fn rst_rate(&self) -> f64 {
        self.rst_count as f64 / self.window_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(timestamp: f64, length: u32) -> WindowEntry {
        WindowEntry {
            timestamp,
            length,
            is_syn: false,
            is_rst: false,
        }
    }

    #[test]
    fn rate_without_eviction_is_count_over_window() {
        let mut window = SlidingWindow::new(10.0);
        for i in 0..5 {
            window.push(entry(100.0 + i as f64 * 0.1, 100));
        }
        assert_eq!(window.len(), 5);
        assert_eq!(window.packet_rate(), 0.5);
        assert_eq!(window.byte_rate(), 50.0);
    }

    #[test]
    fn evicts_only_entries_strictly_older_than_cutoff() {
        let mut window = SlidingWindow::new(10.0);
        for t in 0..10 {
            window.push(entry(t as f64, 100));
        }
        assert_eq!(window.len(), 10);

        // t=11 pushes the cutoff to 1.0: only t=0 leaves, t=1 stays.
        window.push(entry(11.0, 100));
        assert_eq!(window.len(), 10);
        assert_eq!(window.packet_rate(), 1.0);
    }

    #[test]
    fn aggregates_shrink_with_evicted_entries() {
        let mut window = SlidingWindow::new(1.0);
        window.push(WindowEntry {
            timestamp: 0.0,
            length: 500,
            is_syn: true,
            is_rst: true,
        });
        window.push(entry(0.5, 300));
        assert_eq!(window.byte_rate(), 800.0);
        assert_eq!(window.syn_rate(), 1.0);

        // Cutoff 1.5 drops both earlier entries.
        window.push(entry(2.5, 100));
        assert_eq!(window.len(), 1);
        assert_eq!(window.byte_rate(), 100.0);
        assert_eq!(window.syn_rate(), 0.0);
        assert_eq!(window.rst_rate(), 0.0);
    }

    #[test]
    fn entry_exactly_at_cutoff_is_kept() {
        let mut window = SlidingWindow::new(10.0);
        window.push(entry(1.0, 100));
        window.push(entry(11.0, 100));
        assert_eq!(window.len(), 2);
    }
}
