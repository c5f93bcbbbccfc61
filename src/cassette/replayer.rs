//! Replays recorded interactions from a cassette.

use super::format::{Cassette, Interaction};

/// Serves recorded interactions back to replaying adapters.
///
/// Concurrent pipeline stages may call ports in a different order than they
/// were recorded in, so a call is first matched on its input and only then
/// falls back to the oldest unserved interaction for the same port and method.
pub struct CassetteReplayer {
    interactions: Vec<Interaction>,
    served: Vec<bool>,
}

impl CassetteReplayer {
    /// Create a replayer over a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut interactions = cassette.interactions.clone();
        interactions.sort_by_key(|i| i.seq);
        let served = vec![false; interactions.len()];
        Self { interactions, served }
    }

    /// Take the interaction recorded for this call.
    ///
    /// # Errors
    ///
    /// Returns an error naming the port and method when no unserved
    /// interaction is left for them.
    pub fn next_matching(
        &mut self,
        port: &str,
        method: &str,
        input: &serde_json::Value,
    ) -> Result<&Interaction, String> {
        let open = |i: usize, it: &Interaction| {
            !self.served[i] && it.port == port && it.method == method
        };
        let index = self
            .interactions
            .iter()
            .enumerate()
            .position(|(i, it)| open(i, it) && &it.input == input)
            .or_else(|| self.interactions.iter().enumerate().position(|(i, it)| open(i, it)));

        let Some(index) = index else {
            let total =
                self.interactions.iter().filter(|i| i.port == port && i.method == method).count();
            return Err(if total == 0 {
                format!("cassette has no interactions for {port}::{method}")
            } else {
                format!(
                    "cassette exhausted: all {total} interactions for {port}::{method} were served"
                )
            });
        };
        self.served[index] = true;
        Ok(&self.interactions[index])
    }

    /// Number of interactions not yet served.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.served.iter().filter(|s| !**s).count()
    }
}
