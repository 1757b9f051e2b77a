//! Bounded FIFO frontier of URLs pending fetch
//!
//! All operations are non-blocking and serialised under a single mutex.
//! Callers that need to wait (readers on a full queue, consumers on an
//! empty one) layer their own backoff on top, which keeps the bounding
//! behaviour predictable: the queue never grows past its capacity and
//! never parks a task internally.

use std::collections::VecDeque;
use std::sync::Mutex;

/// Errors that can emerge while queueing URLs into the frontier.
#[derive(Debug)]
pub enum FrontierError {
    /// The queue is at capacity; the caller retains ownership of the URL.
    Full(String),
}

/// A capacity-bounded FIFO queue of URL strings.
pub struct Frontier {
    queue: Mutex<VecDeque<String>>,
    capacity: usize,
}

impl Frontier {
    /// Creates an empty frontier with the given capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Attempts to enqueue a URL, returning it to the caller when full.
    pub fn insert(&self, url: String) -> Result<(), FrontierError> {
        let mut queue = self.queue.lock().expect("frontier mutex poisoned");
        if queue.len() >= self.capacity {
            return Err(FrontierError::Full(url));
        }
        queue.push_back(url);
        Ok(())
    }

    /// Removes and returns the oldest URL, or `None` when empty.
    pub fn remove(&self) -> Option<String> {
        self.queue
            .lock()
            .expect("frontier mutex poisoned")
            .pop_front()
    }

    /// Current number of queued URLs.
    pub fn len(&self) -> usize {
        self.queue.lock().expect("frontier mutex poisoned").len()
    }

    /// Whether the queue is currently empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity this frontier was built with.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Fill ratio in `[0, 1]`, used to scale enqueue budgets and throttling.
    pub fn usage(&self) -> f64 {
        self.len() as f64 / self.capacity as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let frontier = Frontier::new(10);
        for i in 0..5 {
            frontier.insert(format!("https://example.com/{}", i)).unwrap();
        }
        for i in 0..5 {
            assert_eq!(frontier.remove().unwrap(), format!("https://example.com/{}", i));
        }
        assert!(frontier.remove().is_none());
    }

    #[test]
    fn test_capacity_bound() {
        let frontier = Frontier::new(2);
        frontier.insert("https://a.com".to_string()).unwrap();
        frontier.insert("https://b.com".to_string()).unwrap();

        let err = frontier.insert("https://c.com".to_string()).unwrap_err();
        let FrontierError::Full(returned) = err;
        assert_eq!(returned, "https://c.com");
        assert_eq!(frontier.len(), 2);
    }

    #[test]
    fn test_remove_empty() {
        let frontier = Frontier::new(4);
        assert!(frontier.remove().is_none());
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_insert_after_drain() {
        let frontier = Frontier::new(1);
        frontier.insert("https://a.com".to_string()).unwrap();
        assert!(frontier.insert("https://b.com".to_string()).is_err());

        assert_eq!(frontier.remove().unwrap(), "https://a.com");
        frontier.insert("https://b.com".to_string()).unwrap();
        assert_eq!(frontier.remove().unwrap(), "https://b.com");
    }

    #[test]
    fn test_usage() {
        let frontier = Frontier::new(4);
        assert_eq!(frontier.usage(), 0.0);
        frontier.insert("https://a.com".to_string()).unwrap();
        assert_eq!(frontier.usage(), 0.25);
        frontier.insert("https://b.com".to_string()).unwrap();
        assert_eq!(frontier.usage(), 0.5);
    }

    #[test]
    fn test_len_never_exceeds_capacity_under_threads() {
        use std::sync::Arc;
        use std::thread;

        let frontier = Arc::new(Frontier::new(16));
        let mut handles = Vec::new();
        for t in 0..4 {
            let frontier = Arc::clone(&frontier);
            handles.push(thread::spawn(move || {
                for i in 0..100 {
                    let _ = frontier.insert(format!("https://t{}.com/{}", t, i));
                    assert!(frontier.len() <= frontier.capacity());
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(frontier.len(), 16);
    }
}
