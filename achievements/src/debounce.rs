use std::{collections::BTreeMap, time::Duration};

/// Coalesces repeated pushes per key.
///
/// The first push for a key opens a window of `window`; later pushes inside it
/// only replace the value. Keys come back out of [`Debouncer::drain_ready`]
/// once their window has closed.
#[derive(Debug, Clone)]
pub struct Debouncer<K: Ord, V> {
    window: Duration,
    pending: BTreeMap<K, Pending<V>>,
}

#[derive(Debug, Clone)]
struct Pending<V> {
    value: V,
    due: Duration,
}

impl<K: Ord + Clone, V> Debouncer<K, V> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: BTreeMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Returns `true` when the push was folded into an open window.
    pub fn push(&mut self, key: K, value: V, now: Duration) -> bool {
        if let Some(pending) = self.pending.get_mut(&key) {
            pending.value = value;
            return true;
        }
        self.pending.insert(
            key,
            Pending {
                value,
                due: now.saturating_add(self.window),
            },
        );
        false
    }

    pub fn drain_ready(&mut self, now: Duration) -> Vec<(K, V)> {
        let ready: Vec<K> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(key, _)| key.clone())
            .collect();
        ready
            .into_iter()
            .filter_map(|key| {
                let pending = self.pending.remove(&key)?;
                Some((key, pending.value))
            })
            .collect()
    }

    pub fn drain_all(&mut self) -> Vec<(K, V)> {
        std::mem::take(&mut self.pending)
            .into_iter()
            .map(|(key, pending)| (key, pending.value))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(16);

    #[test]
    fn last_value_in_window_wins() {
        let mut debouncer = Debouncer::new(WINDOW);
        assert!(!debouncer.push("a", 1, Duration::ZERO));
        assert!(debouncer.push("a", 2, Duration::from_millis(5)));
        assert!(debouncer.push("a", 3, Duration::from_millis(10)));

        assert!(debouncer.drain_ready(Duration::from_millis(15)).is_empty());
        assert_eq!(debouncer.drain_ready(WINDOW), vec![("a", 3)]);
        assert!(debouncer.is_empty());
    }

    #[test]
    fn windows_are_per_key() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a", 1, Duration::ZERO);
        debouncer.push("b", 1, Duration::from_millis(10));

        assert_eq!(debouncer.drain_ready(Duration::from_millis(20)), vec![("a", 1)]);
        assert_eq!(debouncer.len(), 1);
        assert_eq!(debouncer.drain_all(), vec![("b", 1)]);
    }

    #[test]
    fn window_reopens_after_drain() {
        let mut debouncer = Debouncer::new(WINDOW);
        debouncer.push("a", 1, Duration::ZERO);
        debouncer.drain_ready(WINDOW);
        assert!(!debouncer.push("a", 2, WINDOW));
    }

    #[test]
    fn huge_window_saturates() {
        let mut debouncer = Debouncer::new(Duration::MAX);
        assert!(!debouncer.push("a", 1, Duration::from_millis(5)));
        assert!(debouncer.drain_ready(Duration::from_secs(3_600)).is_empty());
        assert_eq!(debouncer.drain_ready(Duration::MAX), vec![("a", 1)]);
    }
}
