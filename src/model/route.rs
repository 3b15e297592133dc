use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::station::Station;

pub const DEFAULT_ROUTE_COLOR: &str = "#667eea";

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Free-form headway text like "15분"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<String>,
    #[serde(default)]
    pub stations: Vec<Station>,
    /// Departure times in "HH:MM". Takes precedence over `schedule_by_vehicle` when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<String>>,
    /// Departure times per vehicle ("1호차" -> times).
    ///
    /// Ordered by vehicle id so merged timetables are deterministic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_by_vehicle: Option<BTreeMap<String, Vec<String>>>,
}

impl Route {
    /// The route color, or `fallback` when the dataset has none
    pub fn color_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.color.as_deref().filter(|c| !c.is_empty()).unwrap_or(fallback)
    }

    pub fn has_timetable(&self) -> bool {
        self.schedule.is_some() || self.schedule_by_vehicle.is_some()
    }
}
