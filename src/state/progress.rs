//! Seed-file resume counter
//!
//! A single integer on disk: the seed-file line the readers have consumed
//! up to. Rewritten wholesale every `SAVE_EVERY` increments and at the end
//! of each pass, so a restart skips work already handed out without
//! needing anything fancier than one `fs::write`.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Persist after this many increments.
const SAVE_EVERY: u64 = 100;

struct ProgressState {
    line: u64,
    since_save: u64,
}

/// Tracks and persists the seed-file line number to resume from.
pub struct ProgressTracker {
    state: Mutex<ProgressState>,
    path: PathBuf,
}

impl ProgressTracker {
    /// Loads the persisted counter; a missing or unparseable file means 0.
    pub fn load(path: &Path) -> Self {
        let line = std::fs::read_to_string(path)
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .unwrap_or(0);

        if line > 0 {
            tracing::info!("Resuming seed file from line {}", line);
        }

        Self {
            state: Mutex::new(ProgressState {
                line,
                since_save: 0,
            }),
            path: path.to_path_buf(),
        }
    }

    /// The line number to skip to on the next seed pass.
    pub fn current(&self) -> u64 {
        self.state.lock().expect("progress mutex poisoned").line
    }

    /// Counts one consumed seed line, persisting every `SAVE_EVERY` calls.
    pub fn increment(&self) {
        let to_save = {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            state.line += 1;
            state.since_save += 1;
            if state.since_save >= SAVE_EVERY {
                state.since_save = 0;
                Some(state.line)
            } else {
                None
            }
        };
        if let Some(line) = to_save {
            self.persist(line);
        }
    }

    /// Resets the counter to zero at end-of-pass and persists immediately.
    pub fn reset(&self) {
        {
            let mut state = self.state.lock().expect("progress mutex poisoned");
            state.line = 0;
            state.since_save = 0;
        }
        self.persist(0);
    }

    /// Persists the current value regardless of cadence.
    pub fn save(&self) {
        let line = self.current();
        self.persist(line);
    }

    // Write failures are logged and swallowed; losing an update costs at
    // most one re-read pass over already-filtered seeds.
    fn persist(&self, line: u64) {
        if let Err(e) = std::fs::write(&self.path, format!("{}\n", line)) {
            tracing::warn!(
                "Failed to save progress to {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_starts_at_zero() {
        let dir = tempdir().unwrap();
        let progress = ProgressTracker::load(&dir.path().join("progress.txt"));
        assert_eq!(progress.current(), 0);
    }

    #[test]
    fn test_unparseable_file_starts_at_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.txt");
        std::fs::write(&path, "not a number\n").unwrap();

        let progress = ProgressTracker::load(&path);
        assert_eq!(progress.current(), 0);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.txt");

        let progress = ProgressTracker::load(&path);
        for _ in 0..7 {
            progress.increment();
        }
        progress.save();

        let reloaded = ProgressTracker::load(&path);
        assert_eq!(reloaded.current(), 7);
    }

    #[test]
    fn test_periodic_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.txt");

        let progress = ProgressTracker::load(&path);
        for _ in 0..99 {
            progress.increment();
        }
        assert!(!path.exists());

        progress.increment();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "100\n");
    }

    #[test]
    fn test_reset_persists_zero() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.txt");
        std::fs::write(&path, "42\n").unwrap();

        let progress = ProgressTracker::load(&path);
        assert_eq!(progress.current(), 42);

        progress.reset();
        assert_eq!(progress.current(), 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "0\n");
    }

    #[test]
    fn test_whitespace_tolerated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.txt");
        std::fs::write(&path, "  17  \n").unwrap();

        let progress = ProgressTracker::load(&path);
        assert_eq!(progress.current(), 17);
    }
}
