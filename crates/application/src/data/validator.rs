use domain::error::{DomainError, Result};

use super::ConfigurationRequest;

/// Validates changeover requests before they reach a machine session.
///
/// ElementsPerBag is strictly positive: a zero-size bag is physically
/// meaningless.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConfigurationRequestValidator;

impl ConfigurationRequestValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn validate(&self, request: &ConfigurationRequest) -> Result<()> {
        let mut errors = Vec::new();

        if request.recipe_id.trim().is_empty() {
            errors.push("RecipeId is required".to_string());
        }

        if request.elements_per_bag <= 0 {
            errors.push("ElementsPerBag must be greater than zero".to_string());
        }

        if !(0..=100).contains(&request.counting_speed) {
            errors.push("CountingSpeed must be between 0 and 100".to_string());
        }

        if !(0..=100).contains(&request.feeder_speed) {
            errors.push("FeederSpeed must be between 0 and 100".to_string());
        }

        if !(0..=10).contains(&request.vibration_strength) {
            errors.push("VibrationStrength must be between 0 and 10".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::ValidationFailed(errors))
        }
    }
}
