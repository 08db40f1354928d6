use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::{error, info, warn};

use domain::error::{DomainError, Result};
use domain::machine::{CountingMachine, MachineFactory, Position};

/// Registry of live machine sessions, one per line position.
///
/// Invariant: at most one session is ever retained per position. Under
/// concurrent get-or-create races the extra instance built by the losing
/// caller is disposed before anyone can use it.
pub struct MachineManager {
    machines: DashMap<Position, Arc<dyn CountingMachine>>,
    factory: Arc<dyn MachineFactory>,
}

impl MachineManager {
    pub fn new(factory: Arc<dyn MachineFactory>) -> Self {
        Self {
            machines: DashMap::new(),
            factory,
        }
    }

    /// Return the session for a position, constructing it on first use.
    pub async fn get_or_create(&self, position: &Position) -> Arc<dyn CountingMachine> {
        if let Some(existing) = self.machines.get(position) {
            return existing.clone();
        }

        let candidate = self.factory.create(position);

        // Atomic install; the entry guard must not be held across an await
        let (winner, loser) = match self.machines.entry(position.clone()) {
            Entry::Occupied(entry) => (entry.get().clone(), Some(candidate)),
            Entry::Vacant(entry) => {
                entry.insert(candidate.clone());
                (candidate, None)
            }
        };

        match loser {
            Some(loser) => {
                // Another caller won the install race; clean up the spare
                if let Err(e) = loser.disconnect().await {
                    warn!(position = %position, error = %e, "Error disposing losing session");
                }
            }
            None => {
                info!(position = %position, "Created new machine session");
            }
        }

        winner
    }

    /// Return the session for a position, connected and ready for I/O.
    pub async fn get_connected(&self, position: &Position) -> Result<Arc<dyn CountingMachine>> {
        let machine = self.get_or_create(position).await;
        if !machine.state().is_connected() && !machine.connect().await? {
            return Err(DomainError::ConnectFailed(format!(
                "machine at position {position} did not reach connected state"
            )));
        }
        Ok(machine)
    }

    /// Snapshot of all live sessions.
    pub fn sessions(&self) -> Vec<(Position, Arc<dyn CountingMachine>)> {
        self.machines
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Best-effort drain: disconnect and dispose every session, then clear
    /// the registry. A failure on one session never blocks the rest.
    pub async fn disconnect_all(&self) {
        let drained = self.sessions();
        for (position, machine) in drained {
            if let Err(e) = machine.disconnect().await {
                error!(position = %position, error = %e, "Error disconnecting machine");
            }
        }
        self.machines.clear();
        info!("All machine sessions disconnected");
    }
}
