use std::collections::HashMap;

use domain::machine::{Position, PositionConfiguration};

/// Endpoint assigned to positions not present in the line topology.
pub const FALLBACK_ENDPOINT: &str = "opc.tcp://192.168.1.100:4840";

/// Static line topology: position -> endpoint address.
pub struct StaticPositionConfiguration {
    endpoints: HashMap<Position, String>,
    fallback: String,
}

impl StaticPositionConfiguration {
    /// The default four-machine line.
    pub fn new() -> Self {
        let defaults = [
            ("CM01_1", "opc.tcp://192.168.1.101:4840"),
            ("CM01_2", "opc.tcp://192.168.1.102:4840"),
            ("CM02_1", "opc.tcp://192.168.1.201:4840"),
            ("CM02_2", "opc.tcp://192.168.1.202:4840"),
        ];
        let endpoints = defaults
            .iter()
            .filter_map(|(position, endpoint)| {
                Position::new(*position)
                    .ok()
                    .map(|p| (p, endpoint.to_string()))
            })
            .collect();
        Self {
            endpoints,
            fallback: FALLBACK_ENDPOINT.to_string(),
        }
    }

    /// Build a topology from configured position -> endpoint pairs.
    /// Invalid position names are skipped.
    pub fn from_map(map: HashMap<String, String>, fallback: impl Into<String>) -> Self {
        let endpoints = map
            .into_iter()
            .filter_map(|(position, endpoint)| {
                Position::new(position).ok().map(|p| (p, endpoint))
            })
            .collect();
        Self {
            endpoints,
            fallback: fallback.into(),
        }
    }
}

impl Default for StaticPositionConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl PositionConfiguration for StaticPositionConfiguration {
    fn all_positions(&self) -> Vec<Position> {
        let mut positions: Vec<Position> = self.endpoints.keys().cloned().collect();
        positions.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        positions
    }

    fn endpoint_for(&self, position: &Position) -> String {
        self.endpoints
            .get(position)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}
