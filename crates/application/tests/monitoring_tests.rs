use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use application::health::{MachineHealthMonitor, MachineMonitoringService};
use application::machine::MachineManager;
use domain::error::{DomainError, Result};
use domain::machine::{
    CountingMachine, MachineConfig, MachineEndpoint, MachineFactory, MachineSnapshot,
    MachineState, Position, PositionConfiguration,
};
use domain::tag::{names, TagValue};
use infrastructure::config::MonitorSettings;
use infrastructure::StaticPositionConfiguration;

// --- Configurable mock machine ---

struct ScriptedMachine {
    endpoint: MachineEndpoint,
    state: RwLock<MachineState>,
    has_error_tag: AtomicBool,
    fail_reads: AtomicBool,
    connect_calls: AtomicUsize,
    disconnect_calls: AtomicUsize,
}

impl ScriptedMachine {
    fn new(position: &Position) -> Arc<Self> {
        Arc::new(Self {
            endpoint: MachineEndpoint::new(position.clone(), "opc.tcp://mock:4840"),
            state: RwLock::new(MachineState::Disconnected),
            has_error_tag: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            connect_calls: AtomicUsize::new(0),
            disconnect_calls: AtomicUsize::new(0),
        })
    }

    fn set_state(&self, state: MachineState) {
        *self.state.write().unwrap() = state;
    }
}

#[async_trait]
impl CountingMachine for ScriptedMachine {
    fn endpoint(&self) -> &MachineEndpoint {
        &self.endpoint
    }

    fn state(&self) -> MachineState {
        *self.state.read().unwrap()
    }

    async fn connect(&self) -> Result<bool> {
        self.connect_calls.fetch_add(1, Ordering::SeqCst);
        if !self.state().can_connect() {
            return Ok(self.state().is_connected());
        }
        self.set_state(MachineState::Connected);
        Ok(true)
    }

    async fn disconnect(&self) -> Result<()> {
        self.disconnect_calls.fetch_add(1, Ordering::SeqCst);
        self.set_state(MachineState::Disconnected);
        Ok(())
    }

    async fn read_data(&self) -> Result<MachineSnapshot> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DomainError::ConnectFailed("link dropped".to_string()));
        }
        if !self.state().is_connected() {
            return Err(DomainError::NotConnected);
        }
        let mut tags = HashMap::new();
        tags.insert(
            names::HAS_ERROR.to_string(),
            TagValue::Boolean(self.has_error_tag.load(Ordering::SeqCst)),
        );
        Ok(MachineSnapshot::new(
            self.endpoint.position.clone(),
            Utc::now(),
            tags,
        ))
    }

    async fn write_configuration(&self, _config: &MachineConfig) -> Result<()> {
        Ok(())
    }

    async fn read_tag(&self, name: &str) -> Result<TagValue> {
        Err(DomainError::TagNotFound(name.to_string()))
    }

    async fn write_tag(&self, _name: &str, _value: TagValue) -> Result<()> {
        Ok(())
    }
}

struct ScriptedFactory {
    machines: Mutex<HashMap<Position, Arc<ScriptedMachine>>>,
}

impl ScriptedFactory {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            machines: Mutex::new(HashMap::new()),
        })
    }

    fn machine(&self, position: &Position) -> Arc<ScriptedMachine> {
        self.machines
            .lock()
            .unwrap()
            .entry(position.clone())
            .or_insert_with(|| ScriptedMachine::new(position))
            .clone()
    }
}

impl MachineFactory for ScriptedFactory {
    fn create(&self, position: &Position) -> Arc<dyn CountingMachine> {
        self.machine(position)
    }
}

fn positions(names: &[&str]) -> Arc<dyn PositionConfiguration> {
    let map: HashMap<String, String> = names
        .iter()
        .map(|n| (n.to_string(), format!("opc.tcp://{n}:4840")))
        .collect();
    Arc::new(StaticPositionConfiguration::from_map(
        map,
        "opc.tcp://fallback:4840",
    ))
}

// --- Health checks ---

#[tokio::test]
async fn healthy_machine_reports_healthy() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor = MachineHealthMonitor::new(manager, positions(&["CM01_1"]));

    let position = Position::new("CM01_1").unwrap();
    assert!(monitor.is_healthy(&position).await);
}

#[tokio::test]
async fn error_flag_reports_unhealthy() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor = MachineHealthMonitor::new(manager, positions(&["CM01_1"]));

    let position = Position::new("CM01_1").unwrap();
    factory
        .machine(&position)
        .has_error_tag
        .store(true, Ordering::SeqCst);

    assert!(!monitor.is_healthy(&position).await);
}

#[tokio::test]
async fn read_failure_reports_unhealthy() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor = MachineHealthMonitor::new(manager, positions(&["CM01_1"]));

    let position = Position::new("CM01_1").unwrap();
    factory
        .machine(&position)
        .fail_reads
        .store(true, Ordering::SeqCst);

    assert!(!monitor.is_healthy(&position).await);
}

#[tokio::test]
async fn scan_all_isolates_failing_positions() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor =
        MachineHealthMonitor::new(manager, positions(&["CM01_1", "CM01_2", "CM02_1"]));

    let bad = Position::new("CM01_2").unwrap();
    factory.machine(&bad).fail_reads.store(true, Ordering::SeqCst);

    let health = monitor.scan_all().await;
    assert_eq!(health.len(), 3);
    assert_eq!(health[&Position::new("CM01_1").unwrap()], true);
    assert_eq!(health[&bad], false);
    assert_eq!(health[&Position::new("CM02_1").unwrap()], true);
}

// --- Monitoring loop reconnection policy ---

fn fast_settings() -> MonitorSettings {
    MonitorSettings {
        scan_interval_secs: 1,
        backoff_secs: 1,
        reconnect_delay_secs: 1,
    }
}

#[tokio::test(start_paused = true)]
async fn monitoring_loop_reconnects_errored_sessions() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor = Arc::new(MachineHealthMonitor::new(
        manager.clone(),
        positions(&["CM01_1"]),
    ));

    // Seed the registry with a session and fault it
    let position = Position::new("CM01_1").unwrap();
    let machine = factory.machine(&position);
    manager.get_connected(&position).await.unwrap();
    machine.set_state(MachineState::Error);
    let connects_before = machine.connect_calls.load(Ordering::SeqCst);

    let service = MachineMonitoringService::new(monitor, manager.clone(), fast_settings());
    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { service.run(cancel).await })
    };

    // Give the loop a few virtual cycles to spot and repair the session
    for _ in 0..20 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        if machine.state().is_connected() {
            break;
        }
    }

    assert!(machine.state().is_connected(), "session was not repaired");
    assert!(machine.disconnect_calls.load(Ordering::SeqCst) >= 1);
    assert!(machine.connect_calls.load(Ordering::SeqCst) > connects_before);

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn monitoring_loop_stops_on_cancellation() {
    let factory = ScriptedFactory::new();
    let manager = Arc::new(MachineManager::new(factory.clone()));
    let monitor = Arc::new(MachineHealthMonitor::new(
        manager.clone(),
        positions(&["CM01_1"]),
    ));

    let service = MachineMonitoringService::new(monitor, manager, fast_settings());
    let cancel = CancellationToken::new();
    let handle = {
        let cancel = cancel.clone();
        tokio::spawn(async move { service.run(cancel).await })
    };

    tokio::time::sleep(Duration::from_secs(3)).await;
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("monitoring loop did not stop after cancellation")
        .unwrap();
}
