//! Capped history of finished rounds.

use crate::error::{GameError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

pub const LEDGER_CAPACITY: usize = 100;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry
{
    pub game: String,
    pub score: u32,
    /// Seconds played.
    pub time: u32,
    pub date: DateTime<Utc>,
}

impl ScoreEntry
{
    pub fn now(game: &str, score: u32, time: u32) -> Self
    {
        Self {
            game: game.to_string(),
            score,
            time,
            date: Utc::now(),
        }
    }
}

/// Where the serialized ledger lives. Always read and written whole.
pub trait ScoreStore
{
    fn load(&self) -> Result<Vec<ScoreEntry>>;
    fn save(&self, entries: &[ScoreEntry]) -> Result<()>;
}

/// `scores.json` on disk, replaced atomically on every write.
pub struct JsonFileStore
{
    path: PathBuf,
}

impl JsonFileStore
{
    pub fn new(path: impl Into<PathBuf>) -> Self
    {
        Self { path: path.into() }
    }

}

impl ScoreStore for JsonFileStore
{
    fn load(&self) -> Result<Vec<ScoreEntry>>
    {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(GameError::Storage(err)),
        };
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&text)?)
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<()>
    {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir).map_err(GameError::Storage)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(entries)?;
        fs::write(&tmp, data).map_err(GameError::Storage)?;
        fs::rename(&tmp, &self.path).map_err(GameError::Storage)?;
        Ok(())
    }
}

/// In-process store, used by tests and when no data directory exists.
#[derive(Default)]
pub struct MemoryStore
{
    entries: Mutex<Vec<ScoreEntry>>,
}

impl ScoreStore for MemoryStore
{
    fn load(&self) -> Result<Vec<ScoreEntry>>
    {
        Ok(self.entries.lock().map(|e| e.clone()).unwrap_or_default())
    }

    fn save(&self, entries: &[ScoreEntry]) -> Result<()>
    {
        if let Ok(mut stored) = self.entries.lock() {
            *stored = entries.to_vec();
        }
        Ok(())
    }
}

pub struct ScoreLedger<S: ScoreStore>
{
    store: S,
}

impl<S: ScoreStore> ScoreLedger<S>
{
    pub fn new(store: S) -> Self
    {
        Self { store }
    }

    /// Appends `entry`, dropping the oldest entries past the cap, and
    /// persists the result. A stored list that can't be read is left
    /// untouched and the error returned.
    pub fn record(&self, entry: ScoreEntry) -> Result<()>
    {
        let mut entries = self.store.load()?;
        tracing::info!(game = %entry.game, score = entry.score, time = entry.time, "recording score");
        entries.push(entry);
        if entries.len() > LEDGER_CAPACITY {
            let excess = entries.len() - LEDGER_CAPACITY;
            entries.drain(..excess);
        }
        self.store.save(&entries)
    }

    /// All entries, or only those for `game` (exact name), oldest first.
    pub fn query(&self, game: Option<&str>) -> Vec<ScoreEntry>
    {
        let entries = self.load_or_empty();
        match game {
            Some(name) => entries.into_iter().filter(|e| e.game == name).collect(),
            None => entries,
        }
    }

    pub fn best(&self, game: &str) -> Option<ScoreEntry>
    {
        self.query(Some(game)).into_iter().max_by_key(|e| e.score)
    }

    pub fn store(&self) -> &S
    {
        &self.store
    }

    fn load_or_empty(&self) -> Vec<ScoreEntry>
    {
        match self.store.load() {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("score ledger unreadable, starting empty: {err}");
                Vec::new()
            }
        }
    }
}
