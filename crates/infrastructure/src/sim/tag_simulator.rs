use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use domain::error::{DomainError, Result};
use domain::tag::{names, names::status, FromTagValue, TagValue};

use super::SimulationRng;

/// Batches per production cycle. A machine reports "Completed" once it has
/// counted ElementsPerBag times this many elements.
const BAGS_PER_CYCLE: i64 = 10;

const ERROR_PROBABILITY: f64 = 0.01;
const RECOVERY_PROBABILITY: f64 = 0.1;
const IDLE_PROBABILITY: f64 = 0.10;

const RECIPE_ID_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const RECIPE_ID_LEN: usize = 8;

/// Simulated device-side tag store.
///
/// Holds the typed key/value tags of one counting machine and, while
/// connected, mutates them from a background task to mimic a live device.
/// Reads and writes are rejected while disconnected, like a real endpoint
/// with the link down.
#[derive(Clone)]
pub struct TagSimulator {
    tags: Arc<DashMap<String, TagValue>>,
    connected: Arc<AtomicBool>,
    rng: Arc<Mutex<Box<dyn SimulationRng>>>,
    tick_interval: Duration,
    mutation: Arc<Mutex<Option<CancellationToken>>>,
}

impl TagSimulator {
    pub fn new(rng: Box<dyn SimulationRng>, tick_interval: Duration) -> Self {
        let simulator = Self {
            tags: Arc::new(DashMap::new()),
            connected: Arc::new(AtomicBool::new(false)),
            rng: Arc::new(Mutex::new(rng)),
            tick_interval,
            mutation: Arc::new(Mutex::new(None)),
        };
        simulator.initialize_default_tags();
        simulator
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Bring the simulated link up and start the mutation task.
    pub fn connect(&self, endpoint: &str) {
        if self.connected.swap(true, Ordering::SeqCst) {
            return;
        }
        info!(endpoint = %endpoint, "Simulating device connection");

        let token = CancellationToken::new();
        let mut mutation = self.mutation.lock().unwrap();
        *mutation = Some(token.clone());

        let simulator = self.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = tokio::time::sleep(simulator.tick_interval) => simulator.step(),
                }
            }
        });
    }

    /// Drop the simulated link. The mutation task is stopped before the
    /// store is gated so a late tick can never touch a disconnected store.
    pub fn disconnect(&self) {
        if let Ok(mut guard) = self.mutation.lock() {
            if let Some(token) = guard.take() {
                token.cancel();
            }
        }
        if self.connected.swap(false, Ordering::SeqCst) {
            info!("Simulating device disconnection");
        }
    }

    /// Read a single tag.
    pub fn read(&self, name: &str) -> Result<TagValue> {
        if !self.is_connected() {
            return Err(DomainError::NotConnected);
        }
        self.tags
            .get(name)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DomainError::TagNotFound(name.to_string()))
    }

    /// Read a single tag, converting it to the requested native type.
    pub fn read_typed<T: FromTagValue>(&self, name: &str) -> Result<T> {
        let value = self.read(name)?;
        T::from_tag_value(&value).ok_or_else(|| DomainError::TypeMismatch {
            tag: name.to_string(),
            expected: T::KIND,
            actual: value.kind(),
        })
    }

    /// Upsert a tag. The value's kind travels with it by construction.
    pub fn write(&self, name: &str, value: TagValue) -> Result<()> {
        if !self.is_connected() {
            return Err(DomainError::NotConnected);
        }
        debug!(tag = %name, value = ?value, "External write");
        self.tags.insert(name.to_string(), value);
        Ok(())
    }

    /// Upsert a tag from a raw JSON value, re-deriving the kind from the
    /// value's native representation.
    pub fn write_json(&self, name: &str, value: serde_json::Value) -> Result<()> {
        if !self.is_connected() {
            return Err(DomainError::NotConnected);
        }
        let value = TagValue::try_from_json(name, value)?;
        self.write(name, value)
    }

    /// Full, independent copy of the tag set. Later mutations are never
    /// observable through a returned snapshot.
    pub fn snapshot(&self) -> HashMap<String, TagValue> {
        self.tags
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Run one simulation cycle.
    ///
    /// Rule order is significant: production counting first, then error
    /// injection, then error recovery, then the spontaneous idle
    /// transition - a later rule may override a status set earlier in the
    /// same cycle. Internal failures are logged, never propagated.
    pub fn step(&self) {
        if !self.is_connected() {
            return;
        }

        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Simulation RNG lock poisoned, skipping cycle");
                poisoned.into_inner()
            }
        };

        let status_value = self.string_tag(names::STATUS);
        let is_used_in_order = self.bool_tag(names::IS_USED_IN_ORDER);

        // Only count while the machine is producing
        if status_value == status::RUNNING && is_used_in_order {
            let new_count = self.int_tag(names::CURRENT_COUNT) + rng.int_between(1, 3);
            self.tags
                .insert(names::CURRENT_COUNT.to_string(), TagValue::Integer(new_count));
            debug!(count = %new_count, "Simulated tag change: CurrentCount");

            let speed = self.int_tag(names::COUNTING_SPEED);
            let new_speed = (speed + rng.int_between(-2, 2)).clamp(0, 100);
            self.tags
                .insert(names::COUNTING_SPEED.to_string(), TagValue::Integer(new_speed));

            let elements_per_bag = self.int_tag(names::ELEMENTS_PER_BAG);
            if new_count >= elements_per_bag * BAGS_PER_CYCLE {
                self.tags.insert(
                    names::STATUS.to_string(),
                    TagValue::from(status::COMPLETED),
                );
                self.tags
                    .insert(names::COUNTING_SPEED.to_string(), TagValue::Integer(0));
                info!(count = %new_count, "Simulated batch cycle completed");
            }
        }

        // Occasionally inject an error
        if rng.chance(ERROR_PROBABILITY) {
            self.tags
                .insert(names::HAS_ERROR.to_string(), TagValue::Boolean(true));
            self.tags
                .insert(names::STATUS.to_string(), TagValue::from(status::ERROR));
            info!("Simulated tag change: machine entered error state");
        } else if self.string_tag(names::STATUS) == status::ERROR
            && rng.chance(RECOVERY_PROBABILITY)
        {
            self.tags
                .insert(names::HAS_ERROR.to_string(), TagValue::Boolean(false));
            self.tags
                .insert(names::STATUS.to_string(), TagValue::from(status::RUNNING));
            info!("Simulated tag change: machine recovered from error");
        }

        // Spontaneous operator pause; applied last so it wins the cycle
        if rng.chance(IDLE_PROBABILITY) {
            self.tags
                .insert(names::STATUS.to_string(), TagValue::from(status::IDLE));
            debug!("Simulated tag change: machine went idle");
        }
    }

    fn initialize_default_tags(&self) {
        let (recipe_id, elements_per_bag) = {
            let mut rng = self.rng.lock().unwrap();
            let recipe_id: String = (0..RECIPE_ID_LEN)
                .map(|_| {
                    let index = rng.int_between(0, RECIPE_ID_CHARS.len() as i64 - 1) as usize;
                    RECIPE_ID_CHARS[index] as char
                })
                .collect();
            let elements_per_bag = rng.int_between(1, 4);
            (recipe_id, elements_per_bag)
        };

        self.tags
            .insert(names::RECIPE_ID.to_string(), TagValue::String(recipe_id));
        self.tags
            .insert(names::CURRENT_COUNT.to_string(), TagValue::Integer(0));
        self.tags
            .insert(names::STATUS.to_string(), TagValue::from(status::RUNNING));
        self.tags.insert(
            names::ELEMENTS_PER_BAG.to_string(),
            TagValue::Integer(elements_per_bag),
        );
        self.tags
            .insert(names::COUNTING_SPEED.to_string(), TagValue::Integer(10));
        self.tags
            .insert(names::FEEDER_SPEED.to_string(), TagValue::Integer(50));
        self.tags
            .insert(names::VIBRATION_STRENGTH.to_string(), TagValue::Integer(2));
        self.tags
            .insert(names::IS_USED_IN_ORDER.to_string(), TagValue::Boolean(true));
        self.tags
            .insert(names::HAS_ERROR.to_string(), TagValue::Boolean(false));
    }

    fn int_tag(&self, name: &str) -> i64 {
        self.tags
            .get(name)
            .and_then(|entry| entry.value().as_integer())
            .unwrap_or_default()
    }

    fn string_tag(&self, name: &str) -> String {
        self.tags
            .get(name)
            .and_then(|entry| entry.value().as_str().map(str::to_string))
            .unwrap_or_default()
    }

    fn bool_tag(&self, name: &str) -> bool {
        self.tags
            .get(name)
            .and_then(|entry| entry.value().as_boolean())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::tag::TagKind;
    use serde_json::json;

    /// Fixed-outcome RNG: every range draw returns the upper bound clamped
    /// to `value`, every chance draw returns `false`.
    struct FixedRng {
        value: i64,
    }

    impl SimulationRng for FixedRng {
        fn int_between(&mut self, lo: i64, hi: i64) -> i64 {
            self.value.clamp(lo, hi)
        }

        fn chance(&mut self, _probability: f64) -> bool {
            false
        }
    }

    fn simulator() -> TagSimulator {
        TagSimulator::new(Box::new(FixedRng { value: 1 }), Duration::from_secs(2))
    }

    #[tokio::test]
    async fn test_reads_fail_when_disconnected() {
        let sim = simulator();
        assert_eq!(
            sim.read(names::STATUS).unwrap_err(),
            DomainError::NotConnected
        );
        assert_eq!(
            sim.write(names::STATUS, TagValue::from("Idle")).unwrap_err(),
            DomainError::NotConnected
        );
        assert_eq!(
            sim.write_json(names::STATUS, json!("Idle")).unwrap_err(),
            DomainError::NotConnected
        );
    }

    #[tokio::test]
    async fn test_default_tags_present_after_connect() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");

        assert_eq!(sim.read_typed::<i64>(names::CURRENT_COUNT).unwrap(), 0);
        assert_eq!(
            sim.read_typed::<String>(names::STATUS).unwrap(),
            status::RUNNING
        );
        assert!(sim.read_typed::<bool>(names::IS_USED_IN_ORDER).unwrap());
        assert!(!sim.read_typed::<bool>(names::HAS_ERROR).unwrap());
        assert_eq!(
            sim.read_typed::<String>(names::RECIPE_ID).unwrap().len(),
            RECIPE_ID_LEN
        );
        let elements = sim.read_typed::<i64>(names::ELEMENTS_PER_BAG).unwrap();
        assert!((1..=4).contains(&elements));
    }

    #[tokio::test]
    async fn test_write_read_round_trip_derives_kind() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");

        sim.write_json("Target", json!(42)).unwrap();
        let value = sim.read("Target").unwrap();
        assert_eq!(value, TagValue::Integer(42));
        assert_eq!(value.kind(), TagKind::Integer);

        sim.write_json("Target", json!("recipe-9")).unwrap();
        assert_eq!(sim.read("Target").unwrap().kind(), TagKind::String);
    }

    #[tokio::test]
    async fn test_unknown_tag_not_found() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");
        assert_eq!(
            sim.read("NoSuchTag").unwrap_err(),
            DomainError::TagNotFound("NoSuchTag".to_string())
        );
    }

    #[tokio::test]
    async fn test_typed_read_mismatch() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");
        let err = sim.read_typed::<bool>(names::CURRENT_COUNT).unwrap_err();
        assert_eq!(
            err,
            DomainError::TypeMismatch {
                tag: names::CURRENT_COUNT.to_string(),
                expected: TagKind::Boolean,
                actual: TagKind::Integer,
            }
        );
    }

    #[tokio::test]
    async fn test_null_write_rejected() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");
        assert_eq!(
            sim.write_json("Target", json!(null)).unwrap_err(),
            DomainError::NullValue("Target".to_string())
        );
    }

    #[tokio::test]
    async fn test_snapshot_is_independent_copy() {
        let sim = simulator();
        sim.connect("opc.tcp://test:4840");

        let snapshot = sim.snapshot();
        sim.write(names::CURRENT_COUNT, TagValue::Integer(99))
            .unwrap();

        assert_eq!(
            snapshot.get(names::CURRENT_COUNT),
            Some(&TagValue::Integer(0))
        );
    }

    #[tokio::test]
    async fn test_step_is_noop_when_disconnected() {
        let sim = simulator();
        sim.step();
        sim.connect("opc.tcp://test:4840");
        assert_eq!(sim.read_typed::<i64>(names::CURRENT_COUNT).unwrap(), 0);
    }
}
