use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use domain::error::{DomainError, Result};
use domain::event::EventPublisher;
use domain::machine::{
    CountingMachine, MachineConfig, MachineEndpoint, MachineSnapshot, MachineState,
};
use domain::tag::{names, names::status, TagValue};
use domain::MachineEvent;

use crate::config::SimulationSettings;
use crate::sim::{SimulationRng, TagSimulator, ThreadSimulationRng};

/// Virtual session against one simulated counting machine endpoint.
///
/// Owns the machine's tag store, the connection state machine and two
/// background tasks: the store's mutation process and a periodic
/// data-changed notifier. Both are children of the session's lifecycle
/// token, so a process-wide shutdown tears them down with the session.
pub struct SimulatedCountingMachine {
    endpoint: MachineEndpoint,
    state: Arc<RwLock<MachineState>>,
    simulator: TagSimulator,
    publisher: Arc<dyn EventPublisher>,
    settings: SimulationSettings,
    shutdown: CancellationToken,
    notifier: Mutex<Option<CancellationToken>>,
}

impl SimulatedCountingMachine {
    pub fn new(
        endpoint: MachineEndpoint,
        publisher: Arc<dyn EventPublisher>,
        settings: SimulationSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self::with_rng(
            endpoint,
            publisher,
            settings,
            shutdown,
            Box::new(ThreadSimulationRng::new()),
        )
    }

    /// Construct with an injected randomness source (deterministic tests).
    pub fn with_rng(
        endpoint: MachineEndpoint,
        publisher: Arc<dyn EventPublisher>,
        settings: SimulationSettings,
        shutdown: CancellationToken,
        rng: Box<dyn SimulationRng>,
    ) -> Self {
        let simulator = TagSimulator::new(rng, settings.tick_interval());
        Self {
            endpoint,
            state: Arc::new(RwLock::new(MachineState::Disconnected)),
            simulator,
            publisher,
            settings,
            shutdown,
            notifier: Mutex::new(None),
        }
    }

    /// Direct access to the underlying store (tests and diagnostics).
    pub fn simulator(&self) -> &TagSimulator {
        &self.simulator
    }

    fn set_state(&self, state: MachineState) {
        *self.state.write().unwrap() = state;
    }

    async fn publish(&self, event: MachineEvent) {
        if let Err(e) = self.publisher.publish(event).await {
            warn!(position = %self.endpoint.position, error = %e, "Failed to publish event");
        }
    }

    fn current_snapshot(&self) -> MachineSnapshot {
        MachineSnapshot::new(
            self.endpoint.position.clone(),
            Utc::now(),
            self.simulator.snapshot(),
        )
    }

    /// Periodic data-changed notifier, simulating the device's own
    /// subscription updates while the link is up.
    fn start_notifier(&self) {
        let token = self.shutdown.child_token();
        *self.notifier.lock().unwrap() = Some(token.clone());

        let interval = self.settings.data_interval();
        let simulator = self.simulator.clone();
        let publisher = self.publisher.clone();
        let position = self.endpoint.position.clone();
        let state = self.state.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        if !state.read().unwrap().is_connected() {
                            continue;
                        }
                        let snapshot = MachineSnapshot::new(
                            position.clone(),
                            Utc::now(),
                            simulator.snapshot(),
                        );
                        if let Err(e) = publisher.publish(MachineEvent::data_changed(snapshot)).await {
                            warn!(position = %position, error = %e, "Failed to publish data event");
                        }
                    }
                }
            }
        });
    }

    fn stop_notifier(&self) {
        if let Ok(mut guard) = self.notifier.lock() {
            if let Some(token) = guard.take() {
                token.cancel();
            }
        }
    }

    async fn apply_configuration(&self, config: &MachineConfig) -> Result<()> {
        for (name, value) in &config.tags {
            self.simulator.write(name, value.clone())?;
        }

        // Roll the machine through changeover settling back into production
        self.simulator
            .write(names::STATUS, TagValue::from(status::CONFIGURED))?;
        self.simulator
            .write(names::IS_USED_IN_ORDER, TagValue::Boolean(true))?;

        tokio::time::sleep(self.settings.settle_delay()).await;

        self.simulator
            .write(names::STATUS, TagValue::from(status::RUNNING))?;
        Ok(())
    }
}

#[async_trait]
impl CountingMachine for SimulatedCountingMachine {
    fn endpoint(&self) -> &MachineEndpoint {
        &self.endpoint
    }

    fn state(&self) -> MachineState {
        *self.state.read().unwrap()
    }

    async fn connect(&self) -> Result<bool> {
        {
            let mut state = self.state.write().unwrap();
            match state.to_connecting() {
                Ok(next) => *state = next,
                Err(_) => {
                    warn!(
                        position = %self.endpoint.position,
                        state = %*state,
                        "Machine is already connected or connecting"
                    );
                    return Ok(state.is_connected());
                }
            }
        }

        info!(
            position = %self.endpoint.position,
            endpoint = %self.endpoint.endpoint,
            "Connecting to counting machine"
        );

        // Simulated connection delay; a shutdown mid-handshake leaves the
        // session in Error rather than an ambiguous half-open state
        tokio::select! {
            _ = self.shutdown.cancelled() => {
                self.set_state(MachineState::Error);
                return Err(DomainError::ConnectFailed(
                    "connection attempt cancelled".to_string(),
                ));
            }
            _ = tokio::time::sleep(self.settings.connect_delay()) => {}
        }

        {
            let mut state = self.state.write().unwrap();
            match state.to_connected() {
                Ok(next) => *state = next,
                // Disconnected while the handshake was in flight
                Err(_) => {
                    return Err(DomainError::ConnectFailed(
                        "connection attempt interrupted".to_string(),
                    ));
                }
            }
        }

        self.simulator.connect(&self.endpoint.endpoint);
        self.start_notifier();

        info!(position = %self.endpoint.position, "Successfully connected to counting machine");
        self.publish(MachineEvent::machine_connected(
            self.endpoint.position.clone(),
        ))
        .await;

        // Fire initial data event
        self.publish(MachineEvent::data_changed(self.current_snapshot()))
            .await;

        Ok(true)
    }

    async fn disconnect(&self) -> Result<()> {
        info!(position = %self.endpoint.position, "Disconnecting from counting machine");

        self.stop_notifier();
        self.simulator.disconnect();
        self.set_state(MachineState::Disconnected);

        self.publish(MachineEvent::machine_disconnected(
            self.endpoint.position.clone(),
            "disconnect requested",
        ))
        .await;

        Ok(())
    }

    async fn read_data(&self) -> Result<MachineSnapshot> {
        if !self.state().is_connected() {
            return Err(DomainError::NotConnected);
        }
        Ok(self.current_snapshot())
    }

    async fn write_configuration(&self, config: &MachineConfig) -> Result<()> {
        if !self.state().is_connected() {
            return Err(DomainError::NotConnected);
        }

        if config.position != self.endpoint.position {
            return Err(DomainError::PositionMismatch {
                config: config.position.to_string(),
                machine: self.endpoint.position.to_string(),
            });
        }

        info!(
            position = %self.endpoint.position,
            recipe_id = %config.recipe_id(),
            elements_per_bag = %config.elements_per_bag(),
            "Applying configuration"
        );

        match self.apply_configuration(config).await {
            Ok(()) => {
                info!(position = %self.endpoint.position, "Configuration applied successfully");
                self.publish(MachineEvent::data_changed(self.current_snapshot()))
                    .await;
                Ok(())
            }
            Err(e) => {
                error!(
                    position = %self.endpoint.position,
                    error = %e,
                    "Error writing configuration"
                );
                // Best effort: flag the device, then fault the session
                let _ = self
                    .simulator
                    .write(names::STATUS, TagValue::from(status::ERROR));
                self.set_state(MachineState::Error);
                self.publish(MachineEvent::machine_error(
                    self.endpoint.position.clone(),
                    e.to_string(),
                ))
                .await;
                Err(e)
            }
        }
    }

    async fn read_tag(&self, name: &str) -> Result<TagValue> {
        if !self.state().is_connected() {
            return Err(DomainError::NotConnected);
        }
        self.simulator.read(name)
    }

    async fn write_tag(&self, name: &str, value: TagValue) -> Result<()> {
        if !self.state().is_connected() {
            return Err(DomainError::NotConnected);
        }
        self.simulator.write(name, value)
    }
}

impl Drop for SimulatedCountingMachine {
    fn drop(&mut self) {
        // Stop the mutation timer before the store goes away
        self.stop_notifier();
        self.simulator.disconnect();
    }
}
