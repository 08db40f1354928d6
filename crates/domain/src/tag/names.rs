//! Canonical tag names exposed by every counting machine.

pub const RECIPE_ID: &str = "RecipeId";
pub const CURRENT_COUNT: &str = "CurrentCount";
pub const STATUS: &str = "Status";
pub const ELEMENTS_PER_BAG: &str = "ElementsPerBag";
pub const COUNTING_SPEED: &str = "CountingSpeed";
pub const FEEDER_SPEED: &str = "FeederSpeed";
pub const VIBRATION_STRENGTH: &str = "VibrationStrength";
pub const IS_USED_IN_ORDER: &str = "IsUsedInOrder";
pub const HAS_ERROR: &str = "HasError";

/// Machine status values reported through the `Status` tag.
pub mod status {
    pub const RUNNING: &str = "Running";
    pub const COMPLETED: &str = "Completed";
    pub const CONFIGURED: &str = "Configured";
    pub const ERROR: &str = "Error";
    pub const IDLE: &str = "Idle";
}
