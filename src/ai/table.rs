//! Sparse state-value table with create-on-miss semantics and a flat text
//! persistence format.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;

use crate::ai::encoding::StateKey;
use crate::error::TableError;

/// Fresh entries are filled with `U[0, 100) / 100` jitter so unseen states
/// never present an all-equal tie to the argmax.
const INIT_JITTER_SCALE: f32 = 0.01;

/// Maps state keys to per-column action values. Entries are created lazily
/// on first reference and live for the table's entire lifetime.
#[derive(Debug, Default)]
pub struct QTable {
    entries: HashMap<StateKey, Vec<f32>>,
}

impl QTable {
    pub fn new() -> Self {
        QTable {
            entries: HashMap::new(),
        }
    }

    /// Get the value vector for `key`, creating it with low-magnitude random
    /// values when absent. `width` is the number of actions in this key's
    /// context: board width for whole-board keys, filter width for window keys.
    pub fn get_or_init(&mut self, key: StateKey, width: usize, rng: &mut StdRng) -> &mut Vec<f32> {
        self.entries.entry(key).or_insert_with(|| {
            (0..width)
                .map(|_| rng.random_range(0..100) as f32 * INIT_JITTER_SCALE)
                .collect()
        })
    }

    /// Read-only lookup, no initialization.
    pub fn get(&self, key: StateKey) -> Option<&[f32]> {
        self.entries.get(&key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write the table as one line per entry: `key,v0,v1,...,` with the
    /// trailing comma as part of the format. Entries are written in key order
    /// so identical tables produce identical files.
    pub fn save(&self, path: &Path) -> Result<(), TableError> {
        let mut keys: Vec<StateKey> = self.entries.keys().copied().collect();
        keys.sort_unstable();

        let mut out = String::new();
        for key in keys {
            out.push_str(&key.to_string());
            out.push(',');
            for value in &self.entries[&key] {
                out.push_str(&value.to_string());
                out.push(',');
            }
            out.push('\n');
        }

        std::fs::write(path, out).map_err(|e| TableError::Write {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load entries from a file written by [`save`](Self::save). Keys already
    /// present keep their current vectors (first occurrence wins); malformed
    /// lines are skipped. Returns the number of entries applied.
    pub fn load(&mut self, path: &Path) -> Result<usize, TableError> {
        let file = File::open(path).map_err(|e| TableError::OpenRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let reader = BufReader::new(file);

        let mut applied = 0;
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    return Err(TableError::OpenRead {
                        path: path.to_path_buf(),
                        source: e,
                    })
                }
            };
            if let Some((key, values)) = parse_line(&line) {
                if !self.entries.contains_key(&key) {
                    self.entries.insert(key, values);
                    applied += 1;
                }
            }
        }
        Ok(applied)
    }
}

/// Parse one `key,v0,v1,...,` line. The key is wider than a standard signed
/// integer, so it is parsed as a full u64.
fn parse_line(line: &str) -> Option<(StateKey, Vec<f32>)> {
    let mut tokens = line.split(',');
    let key: StateKey = tokens.next()?.trim().parse().ok()?;

    let mut values = Vec::new();
    for token in tokens {
        let token = token.trim();
        if token.is_empty() {
            continue; // trailing comma
        }
        values.push(token.parse().ok()?);
    }
    if values.is_empty() {
        return None;
    }
    Some((key, values))
}
