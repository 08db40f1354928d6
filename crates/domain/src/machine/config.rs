use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::Position;
use crate::tag::{names, FromTagValue, TagValue};

/// Changeover configuration addressed to a single machine position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineConfig {
    pub position: Position,
    pub tags: HashMap<String, TagValue>,
}

impl MachineConfig {
    /// Build the configuration tag set from the recipe parameters.
    pub fn new(
        position: Position,
        recipe_id: impl Into<String>,
        elements_per_bag: i64,
        counting_speed: i64,
        feeder_speed: i64,
        vibration_strength: i64,
    ) -> Self {
        let mut tags = HashMap::new();
        tags.insert(
            names::RECIPE_ID.to_string(),
            TagValue::String(recipe_id.into()),
        );
        tags.insert(
            names::ELEMENTS_PER_BAG.to_string(),
            TagValue::Integer(elements_per_bag),
        );
        tags.insert(
            names::COUNTING_SPEED.to_string(),
            TagValue::Integer(counting_speed),
        );
        tags.insert(
            names::FEEDER_SPEED.to_string(),
            TagValue::Integer(feeder_speed),
        );
        tags.insert(
            names::VIBRATION_STRENGTH.to_string(),
            TagValue::Integer(vibration_strength),
        );
        Self { position, tags }
    }

    pub fn recipe_id(&self) -> String {
        self.tag(names::RECIPE_ID)
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

    fn tag<T: FromTagValue + Default>(&self, name: &str) -> T {
        self.tags
            .get(name)
            .and_then(T::from_tag_value)
            .unwrap_or_default()
    }
}
