//! Responsible for loading the static route collection
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::model::Route;

#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    #[error("couldn't read route file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("route file isn't a valid list of routes")]
    Parse(#[from] serde_json::Error),

    #[error("route id \"{0}\" appears more than once")]
    DuplicateRouteId(String),
}

/// Every route, in the order of the source file
#[derive(Debug, Default)]
pub struct Dataset {
    routes: Vec<Route>,
    by_id: HashMap<String, usize>,
}

impl Dataset {
    pub fn new(routes: Vec<Route>) -> Result<Self, DatasetError> {
        let mut by_id = HashMap::with_capacity(routes.len());

        for (i, route) in routes.iter().enumerate() {
            if by_id.insert(route.id.clone(), i).is_some() {
                return Err(DatasetError::DuplicateRouteId(route.id.clone()));
            }
        }

        Ok(Dataset { routes, by_id })
    }

    pub fn from_json(json: &str) -> Result<Self, DatasetError> {
        let routes: Vec<Route> = serde_json::from_str(json)?;

        Dataset::new(routes)
    }

    #[tracing::instrument(err)]
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let json = std::fs::read_to_string(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let dataset = Dataset::from_json(&json)?;

        info!("loaded {} routes", dataset.routes.len());

        Ok(dataset)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// `None` for ids that aren't in the dataset
    pub fn get(&self, id: &str) -> Option<&Route> {
        self.by_id.get(id).map(|&i| &self.routes[i])
    }
}
