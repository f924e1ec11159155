//! Replays recorded interactions from a cassette.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::format::{Cassette, Interaction};

/// A replayer shared between the replaying adapters of one run.
pub type SharedReplayer = Arc<Mutex<CassetteReplayer>>;

/// Serves a cassette's interactions in order, one queue per
/// port/method pair.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), Vec<Interaction>>,
    cursors: HashMap<(String, String), usize>,
}

impl CassetteReplayer {
    /// Indexes the interactions of `cassette`.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push(interaction.clone());
        }
        Self { queues, cursors: HashMap::new() }
    }

    /// Wraps the replayer for sharing between adapters.
    #[must_use]
    pub fn shared(self) -> SharedReplayer {
        Arc::new(Mutex::new(self))
    }

    /// Returns the next recorded output for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns a message naming the call and the recorded pairs when the
    /// cassette has nothing (more) for it.
    pub fn next_output(&mut self, port: &str, method: &str) -> Result<serde_json::Value, String> {
        let key = (port.to_string(), method.to_string());
        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|(p, m)| format!("{p}::{m}")).collect();
            available.sort();
            return Err(format!(
                "cassette exhausted: nothing recorded for {port}::{method} (recorded: [{}])",
                available.join(", ")
            ));
        };
        let cursor = self.cursors.entry(key).or_insert(0);
        let Some(interaction) = queue.get(*cursor) else {
            return Err(format!(
                "cassette exhausted: all {} {port}::{method} interactions consumed",
                queue.len()
            ));
        };
        *cursor += 1;
        Ok(interaction.output.clone())
    }
}
