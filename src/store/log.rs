//! JSON Lines file store for habit events.
//!
//! One serialized [`HabitEvent`] per line, appended with a single write so
//! the format is append-safe by construction: a crash mid-append can leave
//! at most one torn final line, which reads recover from. Deletes rewrite
//! the file atomically (temp file + rename), so previously persisted records
//! are never corrupted by an interrupted mutation.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::Error;
use crate::store::event::{HabitEvent, Selector, require_nonempty};

/// Durable, append-mostly record of habit events.
///
/// Holds only the path; every operation opens the file fresh, so re-reads
/// are idempotent and two `HabitLog` values over the same path observe the
/// same records. Cross-process mutual exclusion is out of scope — the tool
/// assumes sequential single-user invocations.
pub struct HabitLog {
    path: PathBuf,
}

impl HabitLog {
    /// Open a log backed by the given file, creating the parent directory
    /// if needed. A missing file is an empty store, not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, Error> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::storage("creating data directory", e))?;
        }
        Ok(Self { path })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a new event and return it.
    ///
    /// Fails with [`Error::Validation`] before touching the file if either
    /// argument is empty or whitespace-only. The id is one past the highest
    /// id currently on disk, so deleted ids are only reused if every later
    /// event was also deleted — ids of surviving events never shift.
    pub fn log(&self, habit_name: &str, status: &str) -> Result<HabitEvent, Error> {
        require_nonempty("habit name", habit_name)?;
        require_nonempty("status", status)?;

        let raw = self.read_raw()?;
        let events = self.parse_events(&raw)?;
        let next_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        let event = HabitEvent {
            id: next_id,
            habit_name: habit_name.to_string(),
            status: status.to_string(),
            timestamp: Utc::now(),
        };

        let mut line = serde_json::to_string(&event)
            .map_err(|e| Error::storage("encoding event", std::io::Error::other(e)))?;
        line.push('\n');
        // A crashed append can leave the file without a trailing newline.
        // Appending onto that tail would merge the new record into garbage,
        // so repair first: keep a parseable tail (just terminate its line),
        // truncate an unparseable one.
        if !raw.is_empty() && !raw.ends_with('\n') {
            let tail_start = raw.rfind('\n').map_or(0, |p| p + 1);
            #[allow(clippy::string_slice)] // tail_start sits right after '\n'
            let tail = &raw[tail_start..];
            if serde_json::from_str::<HabitEvent>(tail).is_ok() {
                line.insert(0, '\n');
            } else {
                warn!(
                    "Truncating torn final line in {} before append",
                    self.path.display()
                );
                let file = OpenOptions::new()
                    .write(true)
                    .open(&self.path)
                    .map_err(|e| Error::storage("opening events file for repair", e))?;
                file.set_len(tail_start as u64)
                    .map_err(|e| Error::storage("truncating torn events line", e))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::storage("opening events file for append", e))?;
        // Single write of the whole line keeps the append crash-safe.
        file.write_all(line.as_bytes())
            .map_err(|e| Error::storage("appending event", e))?;
        file.flush()
            .map_err(|e| Error::storage("flushing events file", e))?;

        debug!(id = event.id, habit = %event.habit_name, "event logged");
        Ok(event)
    }

    /// All events in creation order (oldest first), optionally restricted
    /// to an exact, case-sensitive habit name match. An empty result is
    /// valid, not an error.
    pub fn view(&self, filter_habit_name: Option<&str>) -> Result<Vec<HabitEvent>, Error> {
        let mut events = self.read_events()?;
        if let Some(name) = filter_habit_name {
            events.retain(|e| e.habit_name == name);
        }
        Ok(events)
    }

    /// Remove the events matched by `selector` and return how many were
    /// removed.
    ///
    /// [`Selector::ByName`] removes every event for that habit;
    /// [`Selector::ById`] removes a single entry. A selector that matches
    /// nothing returns `Ok(0)` — deletion is idempotent, not an error.
    /// Survivors keep their ids and relative order.
    pub fn delete(&self, selector: &Selector) -> Result<usize, Error> {
        let events = self.read_events()?;
        let before = events.len();
        let survivors: Vec<&HabitEvent> = events
            .iter()
            .filter(|e| match selector {
                Selector::ById(id) => e.id != *id,
                Selector::ByName(name) => e.habit_name != *name,
            })
            .collect();
        let removed = before - survivors.len();
        if removed == 0 {
            return Ok(0);
        }

        self.rewrite(&survivors)?;
        debug!(removed, ?selector, "events deleted");
        Ok(removed)
    }

    // ── File access ────────────────────────────────────────────────

    /// Read the raw file content. A missing file is an empty store.
    fn read_raw(&self) -> Result<String, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(c) => Ok(c),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(Error::storage("reading events file", e)),
        }
    }

    fn read_events(&self) -> Result<Vec<HabitEvent>, Error> {
        let raw = self.read_raw()?;
        self.parse_events(&raw)
    }

    /// Parse every line of the events file.
    ///
    /// A final line that fails to parse is treated as the artifact of an
    /// interrupted append: logged and ignored. A malformed line anywhere
    /// earlier is real corruption and surfaces as an error — skipping it
    /// would silently drop data.
    fn parse_events(&self, content: &str) -> Result<Vec<HabitEvent>, Error> {
        let lines: Vec<&str> = content.lines().collect();
        let mut events = Vec::with_capacity(lines.len());
        for (idx, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<HabitEvent>(line) {
                Ok(event) => events.push(event),
                Err(e) if idx + 1 == lines.len() => {
                    warn!(
                        "Ignoring torn final line in {}: {e}",
                        self.path.display()
                    );
                }
                Err(e) => {
                    return Err(Error::StorageCorrupt {
                        line: idx + 1,
                        detail: e.to_string(),
                    });
                }
            }
        }
        Ok(events)
    }

    /// Atomic rewrite: serialize survivors to a temp file in the same
    /// directory, then rename over the original.
    fn rewrite(&self, events: &[&HabitEvent]) -> Result<(), Error> {
        let mut buf = String::new();
        for event in events {
            let line = serde_json::to_string(event)
                .map_err(|e| Error::storage("encoding event", std::io::Error::other(e)))?;
            buf.push_str(&line);
            buf.push('\n');
        }

        let tmp_path = self.path.with_extension("jsonl.tmp");
        std::fs::write(&tmp_path, buf)
            .map_err(|e| Error::storage("writing temp events file", e))?;
        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| Error::storage("renaming temp events file", e))?;
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────────
