//! Persisted usage counters.
//!
//! The counter file holds a [`UsageSnapshot`] as JSON. Each update takes an
//! exclusive lock file next to it (`<path>.lock`), loads the snapshot,
//! increments through [`UsageCounters`] and writes it back through a
//! temporary file, so concurrent runs never lose a count and readers never
//! see a half-written file. A missing or unreadable file counts as zero.

use lzh_core::{Result, UsageCounters, UsageSnapshot};
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Attempts before a lock is considered stale.
const LOCK_ATTEMPTS: u32 = 250;

const LOCK_RETRY: Duration = Duration::from_millis(20);

/// Exclusive hold on a stats file, released on drop.
struct StatsLock {
    path: PathBuf,
}

impl StatsLock {
    fn acquire(stats_path: &Path) -> Result<Self> {
        let path = sibling(stats_path, ".lock");
        for _ in 0..LOCK_ATTEMPTS {
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => thread::sleep(LOCK_RETRY),
                Err(err) => return Err(err.into()),
            }
        }

        // A run that crashed while holding the lock leaves the file behind.
        log::warn!("removing stale lock {}", path.display());
        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {}
            Err(err) => return Err(err.into()),
        }
        OpenOptions::new().write(true).create_new(true).open(&path)?;
        Ok(Self { path })
    }
}

impl Drop for StatsLock {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            log::warn!("could not release {}: {err}", self.path.display());
        }
    }
}

/// `path` with `suffix` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Read the snapshot at `path`; missing or malformed files read as zero.
pub fn load(path: &Path) -> Result<UsageSnapshot> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(UsageSnapshot::default()),
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str(&text) {
        Ok(snapshot) => Ok(snapshot),
        Err(err) => {
            log::warn!("ignoring corrupt stats file {}: {err}", path.display());
            Ok(UsageSnapshot::default())
        }
    }
}

/// Write `snapshot` as JSON, replacing the file in one rename.
pub fn save(path: &Path, snapshot: &UsageSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(std::io::Error::from)?;
    let staging = sibling(path, ".tmp");
    fs::write(&staging, json + "\n")?;
    fs::rename(&staging, path)?;
    Ok(())
}

/// Apply `update` to the persisted counters and save the result.
pub fn record(path: &Path, update: impl FnOnce(&UsageCounters)) -> Result<UsageSnapshot> {
    let _lock = StatsLock::acquire(path)?;
    let counters = UsageCounters::from_snapshot(load(path)?);
    update(&counters);
    let snapshot = counters.snapshot();
    save(path, &snapshot)?;
    log::debug!("usage counters now {snapshot:?}");
    Ok(snapshot)
}

/// Zero the persisted counters, returning what they held.
pub fn reset(path: &Path) -> Result<UsageSnapshot> {
    let _lock = StatsLock::acquire(path)?;
    let counters = UsageCounters::from_snapshot(load(path)?);
    let previous = counters.reset();
    save(path, &counters.snapshot())?;
    Ok(previous)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("lzh-stats-{}-{name}.json", std::process::id()));
        let _ = fs::remove_file(&path);
        let _ = fs::remove_file(sibling(&path, ".lock"));
        path
    }

    #[test]
    fn test_missing_file_is_zero() {
        let path = scratch("missing");
        assert_eq!(load(&path).unwrap(), UsageSnapshot::default());
    }

    #[test]
    fn test_record_persists_json() {
        let path = scratch("record");
        record(&path, |c| {
            c.record_compress();
        })
        .unwrap();
        let snapshot = record(&path, |c| {
            c.record_compress();
            c.record_decompress();
        })
        .unwrap();

        assert_eq!(snapshot, UsageSnapshot { compressed: 2, decompressed: 1 });
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "compressed": 2, "decompressed": 1 }));
        assert!(!sibling(&path, ".lock").exists());
        assert!(!sibling(&path, ".tmp").exists());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_reset() {
        let path = scratch("reset");
        save(&path, &UsageSnapshot { compressed: 5, decompressed: 9 }).unwrap();

        let previous = reset(&path).unwrap();
        assert_eq!(previous, UsageSnapshot { compressed: 5, decompressed: 9 });
        assert_eq!(load(&path).unwrap(), UsageSnapshot::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_corrupt_file_is_zero() {
        let path = scratch("corrupt");
        fs::write(&path, r#"{"compressed": "many"}"#).unwrap();
        assert_eq!(load(&path).unwrap(), UsageSnapshot::default());
        fs::write(&path, "compressed=3\n").unwrap();
        assert_eq!(load(&path).unwrap(), UsageSnapshot::default());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_partial_file_fills_zero() {
        let path = scratch("partial");
        fs::write(&path, r#"{"decompressed": 4}"#).unwrap();
        assert_eq!(load(&path).unwrap(), UsageSnapshot { compressed: 0, decompressed: 4 });
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_concurrent_records_not_lost() {
        let path = scratch("concurrent");
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let path = path.clone();
                thread::spawn(move || {
                    for _ in 0..10 {
                        record(&path, |c| {
                            c.record_compress();
                        })
                        .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(load(&path).unwrap().compressed, 80);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_stale_lock_recovered() {
        let path = scratch("stale");
        fs::write(sibling(&path, ".lock"), b"").unwrap();

        let snapshot = record(&path, |c| {
            c.record_decompress();
        })
        .unwrap();
        assert_eq!(snapshot.decompressed, 1);
        assert!(!sibling(&path, ".lock").exists());
        fs::remove_file(&path).unwrap();
    }
}
