//! Persistent Bloom filter over visited URLs
//!
//! The filter answers "has this URL ever been scheduled?" for the whole
//! crawl frontier. False positives silently skip a URL, which the crawl
//! tolerates; false negatives never occur within one filter lifetime.
//!
//! State is snapshotted to a single file every `save_every` marks and again
//! at shutdown. A missing snapshot starts the filter empty; a snapshot that
//! exists but cannot be read back is reported to the caller, which treats
//! it as a startup fault rather than silently re-crawling everything.

use crate::CrawlError;
use bloomfilter::Bloom;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

struct FilterState {
    bloom: Bloom<String>,
    marks_since_save: u32,
}

/// Thread-safe dedup filter with periodic snapshot persistence.
pub struct VisitedFilter {
    state: Mutex<FilterState>,
    snapshot_path: PathBuf,
    save_every: u32,
}

impl VisitedFilter {
    /// Opens the filter, loading an existing snapshot when one is present.
    ///
    /// # Arguments
    ///
    /// * `snapshot_path` - File the filter round-trips through
    /// * `capacity` - Target number of URLs the filter is sized for
    /// * `fp_rate` - Acceptable false-positive rate at that capacity
    /// * `save_every` - Snapshot after this many marks
    pub fn open(
        snapshot_path: &Path,
        capacity: usize,
        fp_rate: f64,
        save_every: u32,
    ) -> Result<Self, CrawlError> {
        let bloom = match std::fs::read(snapshot_path) {
            Ok(bytes) => {
                let bloom = Bloom::from_slice(&bytes).map_err(|e| CrawlError::FilterSnapshot {
                    path: snapshot_path.display().to_string(),
                    reason: e.to_string(),
                })?;
                tracing::info!(
                    "Loaded dedup filter snapshot from {} ({} bytes)",
                    snapshot_path.display(),
                    bytes.len()
                );
                bloom
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(
                    "No dedup filter snapshot at {}, starting empty",
                    snapshot_path.display()
                );
                Bloom::new_for_fp_rate(capacity, fp_rate).map_err(|e| {
                    CrawlError::FilterSnapshot {
                        path: snapshot_path.display().to_string(),
                        reason: e.to_string(),
                    }
                })?
            }
            Err(e) => {
                return Err(CrawlError::FilterSnapshot {
                    path: snapshot_path.display().to_string(),
                    reason: e.to_string(),
                })
            }
        };

        Ok(Self {
            state: Mutex::new(FilterState {
                bloom,
                marks_since_save: 0,
            }),
            snapshot_path: snapshot_path.to_path_buf(),
            save_every,
        })
    }

    /// Membership test. May report a false positive, never a false negative.
    pub fn contains(&self, url: &str) -> bool {
        let key = url.to_string();
        self.state
            .lock()
            .expect("filter mutex poisoned")
            .bloom
            .check(&key)
    }

    /// Idempotent insert, triggering a snapshot when the cadence is due.
    pub fn mark(&self, url: &str) {
        let key = url.to_string();
        let snapshot = {
            let mut state = self.state.lock().expect("filter mutex poisoned");
            state.bloom.set(&key);
            self.take_snapshot_if_due(&mut state)
        };
        self.write_snapshot(snapshot);
    }

    /// Atomic test-and-set: marks the URL and returns its previous membership.
    ///
    /// This is the operation enqueue points use to decide "schedule or skip"
    /// without a race between the test and the insert.
    pub fn check_and_mark(&self, url: &str) -> bool {
        let key = url.to_string();
        let (seen, snapshot) = {
            let mut state = self.state.lock().expect("filter mutex poisoned");
            let seen = state.bloom.check_and_set(&key);
            let snapshot = if seen {
                None
            } else {
                self.take_snapshot_if_due(&mut state)
            };
            (seen, snapshot)
        };
        self.write_snapshot(snapshot);
        seen
    }

    /// Forces a snapshot of the current state to disk.
    pub fn flush(&self) -> std::io::Result<()> {
        let bytes = {
            let state = self.state.lock().expect("filter mutex poisoned");
            state.bloom.as_slice().to_vec()
        };
        std::fs::write(&self.snapshot_path, bytes)
    }

    // Bumps the mark counter and, when the cadence is hit, clones the bitmap
    // so the disk write can happen outside the critical section.
    fn take_snapshot_if_due(&self, state: &mut FilterState) -> Option<Vec<u8>> {
        state.marks_since_save += 1;
        if state.marks_since_save >= self.save_every {
            state.marks_since_save = 0;
            Some(state.bloom.as_slice().to_vec())
        } else {
            None
        }
    }

    // Persistence failures are logged and swallowed: the in-memory state is
    // intact and the next cadence retries.
    fn write_snapshot(&self, snapshot: Option<Vec<u8>>) {
        if let Some(bytes) = snapshot {
            if let Err(e) = std::fs::write(&self.snapshot_path, &bytes) {
                tracing::warn!(
                    "Failed to persist dedup filter to {}: {}",
                    self.snapshot_path.display(),
                    e
                );
            } else {
                tracing::debug!(
                    "Persisted dedup filter snapshot ({} bytes)",
                    bytes.len()
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn open_filter(dir: &tempfile::TempDir, save_every: u32) -> VisitedFilter {
        VisitedFilter::open(&dir.path().join("visited.bloom"), 10_000, 0.01, save_every)
            .expect("filter opens")
    }

    #[test]
    fn test_unseen_then_seen() {
        let dir = tempdir().unwrap();
        let filter = open_filter(&dir, 1000);

        assert!(!filter.contains("https://example.com/"));
        assert!(!filter.check_and_mark("https://example.com/"));
        assert!(filter.check_and_mark("https://example.com/"));
        assert!(filter.contains("https://example.com/"));
    }

    #[test]
    fn test_mark_is_idempotent() {
        let dir = tempdir().unwrap();
        let filter = open_filter(&dir, 1000);

        filter.mark("https://example.com/a");
        filter.mark("https://example.com/a");
        assert!(filter.contains("https://example.com/a"));
        assert!(!filter.contains("https://example.com/b"));
    }

    #[test]
    fn test_membership_is_monotone() {
        let dir = tempdir().unwrap();
        let filter = open_filter(&dir, 1000);

        filter.mark("https://example.com/page");
        for i in 0..50 {
            filter.mark(&format!("https://other.com/{}", i));
            assert!(filter.contains("https://example.com/page"));
        }
    }

    #[test]
    fn test_snapshot_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.bloom");

        {
            let filter = VisitedFilter::open(&path, 10_000, 0.01, 1000).unwrap();
            filter.mark("https://example.com/kept");
            filter.flush().unwrap();
        }

        let reloaded = VisitedFilter::open(&path, 10_000, 0.01, 1000).unwrap();
        assert!(reloaded.contains("https://example.com/kept"));
        assert!(!reloaded.contains("https://example.com/never-seen"));
    }

    #[test]
    fn test_periodic_save_cadence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.bloom");
        let filter = VisitedFilter::open(&path, 10_000, 0.01, 3).unwrap();

        filter.mark("https://a.com/");
        filter.mark("https://b.com/");
        assert!(!path.exists());

        filter.mark("https://c.com/");
        assert!(path.exists());
    }

    #[test]
    fn test_duplicate_marks_do_not_advance_cadence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.bloom");
        let filter = VisitedFilter::open(&path, 10_000, 0.01, 2).unwrap();

        assert!(!filter.check_and_mark("https://a.com/"));
        assert!(filter.check_and_mark("https://a.com/"));
        assert!(filter.check_and_mark("https://a.com/"));
        assert!(!path.exists());

        assert!(!filter.check_and_mark("https://b.com/"));
        assert!(path.exists());
    }

    #[test]
    fn test_corrupt_snapshot_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("visited.bloom");
        std::fs::write(&path, b"definitely not a bloom filter").unwrap();

        let result = VisitedFilter::open(&path, 10_000, 0.01, 1000);
        assert!(matches!(result, Err(CrawlError::FilterSnapshot { .. })));
    }
}
