use itertools::Itertools;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::model::Route;

/// Hangul syllables followed by 구, at the start of the route name ("송파구 임시1번")
const DISTRICT_PATTERN: &str = r"^([가-힣]+구)";

/// Extracts district labels from route names, remembering every name it has seen
#[derive(Debug)]
pub struct DistrictClassifier {
    pattern: Regex,
    cache: RwLock<HashMap<String, Option<String>>>,
}

impl Default for DistrictClassifier {
    fn default() -> Self {
        DistrictClassifier::new()
    }
}

impl DistrictClassifier {
    pub fn new() -> Self {
        DistrictClassifier {
            pattern: Regex::new(DISTRICT_PATTERN).expect("district pattern is a valid regex"),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn classify(&self, route_name: &str) -> Option<String> {
        if let Some(cached) = self.cache.read().ok().and_then(|c| c.get(route_name).cloned()) {
            return cached;
        }

        let district = self
            .pattern
            .captures(route_name)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(route_name.to_string(), district.clone());
        }

        district
    }

    /// Distinct districts of the given routes, sorted
    pub fn districts<'a>(&self, routes: impl IntoIterator<Item = &'a Route>) -> Vec<String> {
        routes
            .into_iter()
            .filter_map(|r| self.classify(&r.name))
            .unique()
            .sorted()
            .collect()
    }

    /// Routes in `district`, or all of them when no district is selected
    pub fn filter<'a>(&self, routes: &'a [Route], district: Option<&str>) -> Vec<&'a Route> {
        match district.filter(|d| !d.is_empty()) {
            None => routes.iter().collect(),
            Some(district) => routes
                .iter()
                .filter(|r| self.classify(&r.name).as_deref() == Some(district))
                .collect(),
        }
    }

    pub fn cached_names(&self) -> usize {
        self.cache.read().map(|c| c.len()).unwrap_or(0)
    }
}
