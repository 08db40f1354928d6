use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Position;
use crate::tag::{names, FromTagValue, TagValue};

/// Point-in-time, immutable copy of a machine's full tag set.
///
/// Never stored - always recomputed from the live store. The typed getters
/// fall back to the type's default when a tag is missing or carries an
/// unexpected kind, so a partially configured machine still projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub position: Position,
    pub timestamp: DateTime<Utc>,
    pub tags: HashMap<String, TagValue>,
}

impl MachineSnapshot {
    pub fn new(
        position: Position,
        timestamp: DateTime<Utc>,
        tags: HashMap<String, TagValue>,
    ) -> Self {
        Self {
            position,
            timestamp,
            tags,
        }
    }

    pub fn recipe_id(&self) -> String {
        self.tag(names::RECIPE_ID)
    }

    pub fn current_count(&self) -> i64 {
        self.tag(names::CURRENT_COUNT)
    }

    pub fn status(&self) -> String {
        self.tag(names::STATUS)
    }

    pub fn elements_per_bag(&self) -> i64 {
        self.tag(names::ELEMENTS_PER_BAG)
    }

    pub fn counting_speed(&self) -> i64 {
        self.tag(names::COUNTING_SPEED)
    }

    pub fn feeder_speed(&self) -> i64 {
        self.tag(names::FEEDER_SPEED)
    }

    pub fn vibration_strength(&self) -> i64 {
        self.tag(names::VIBRATION_STRENGTH)
    }

    pub fn is_used_in_order(&self) -> bool {
        self.tag(names::IS_USED_IN_ORDER)
    }

    pub fn has_error(&self) -> bool {
        self.tag(names::HAS_ERROR)
    }

    fn tag<T: FromTagValue + Default>(&self, name: &str) -> T {
        self.tags
            .get(name)
            .and_then(T::from_tag_value)
            .unwrap_or_default()
    }
}
