//! Lazy, single-init artifact loading.
//!
//! The graph and mask files load on the first request that needs them, once,
//! behind a `OnceLock` — the only suspension point in the request lifecycle.
//! There is no mutable global: the handle is owned by the service entry
//! point and hands out engines sharing one `Arc<EngineData>`.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use log::info;

use ss_core::EngineConfig;
use ss_graph::artifacts::{load_graph, MASK_FILE, NODES_FILE};
use ss_spatial::WalkabilityMask;

use crate::engine::{EngineData, RouteEngine};
use crate::{EngineError, EngineResult};

/// Owns the artifact locations and the lazily loaded shared data.
pub struct GraphHandle {
    config: EngineConfig,
    cell: OnceLock<Arc<EngineData>>,
}

impl GraphHandle {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            cell: OnceLock::new(),
        }
    }

    /// The shared data, loading it on first call.
    ///
    /// Errors are not cached: a failed load is retried by the next caller,
    /// so a service can come up before its data volume is mounted.
    pub fn data(&self) -> EngineResult<Arc<EngineData>> {
        if let Some(data) = self.cell.get() {
            return Ok(Arc::clone(data));
        }

        let loaded = Arc::new(self.load()?);
        // A concurrent caller may have won the race; use whichever landed.
        let _ = self.cell.set(Arc::clone(&loaded));
        Ok(Arc::clone(self.cell.get().unwrap_or(&loaded)))
    }

    /// A [`RouteEngine`] over the shared data.
    pub fn engine(&self) -> EngineResult<RouteEngine> {
        Ok(RouteEngine::new(self.data()?, self.config.clone()))
    }

    /// The first configured data dir that contains the graph artifacts.
    fn artifact_dir(&self) -> EngineResult<PathBuf> {
        for dir in &self.config.data_dirs {
            if dir.join(NODES_FILE).is_file() {
                return Ok(dir.clone());
            }
        }
        Err(EngineError::DataUnavailable(format!(
            "no graph artifacts under any of {:?}",
            self.config.data_dirs
        )))
    }

    fn load(&self) -> EngineResult<EngineData> {
        let dir = self.artifact_dir()?;
        info!("loading routing data from {}", dir.display());

        let graph = load_graph(&dir)?;
        let mask = WalkabilityMask::load_csv(&dir.join(MASK_FILE))?;
        info!(
            "routing data ready: {} nodes, {} edges, {} walkable cells",
            graph.node_count(),
            graph.edge_count(),
            mask.len()
        );

        Ok(EngineData { graph, mask })
    }
}
