mod watch;

pub use watch::{watch_dump, watch_dump_until};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;

use crate::error::Result;
use crate::loader::parse_mission_dump;
use crate::types::{AnalyzerConfig, MissionTable};
use crate::utils::read_with_fingerprint;

/// One loaded table, published as a unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub table: MissionTable,
    /// SHA-256 of the dump bytes the table was parsed from
    pub fingerprint: String,
    pub source: PathBuf,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    fn load(path: &Path, config: &AnalyzerConfig) -> Result<Self> {
        let (text, fingerprint) = read_with_fingerprint(path)?;
        Self::parse(&text, fingerprint, path, config)
    }

    fn parse(text: &str, fingerprint: String, path: &Path, config: &AnalyzerConfig) -> Result<Self> {
        let table = parse_mission_dump(text, config)?;
        Ok(Self {
            table,
            fingerprint,
            source: path.to_path_buf(),
            loaded_at: Utc::now(),
        })
    }
}

/// Holds the current snapshot behind a single swappable pointer.
///
/// Readers clone the `Arc` and never block a reload for longer than the
/// clone; a reader holding an old snapshot keeps it until dropped.
#[derive(Debug)]
pub struct MissionStore {
    config: AnalyzerConfig,
    current: RwLock<Arc<Snapshot>>,
    /// Held for a whole reload so an older read never replaces a newer one
    reload_lock: Mutex<()>,
}

impl MissionStore {
    /// Load the configured dump; fails rather than serving a partial table
    pub fn open(config: AnalyzerConfig) -> Result<Self> {
        let snapshot = Snapshot::load(&config.dump_path, &config)?;
        info!(
            "Serving {} missions from {} ({})",
            snapshot.table.len(),
            snapshot.source.display(),
            &snapshot.fingerprint[..12]
        );
        Ok(Self {
            config,
            current: RwLock::new(Arc::new(snapshot)),
            reload_lock: Mutex::new(()),
        })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Re-read the dump and publish a new snapshot if its contents changed.
    ///
    /// Returns `false` when the fingerprint is unchanged. On error the
    /// previous snapshot stays current.
    pub fn reload(&self) -> Result<bool> {
        let _reloading = self.reload_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let path = &self.config.dump_path;
        let (text, fingerprint) = read_with_fingerprint(path)?;

        if self.snapshot().fingerprint == fingerprint {
            info!("Dump {} unchanged, keeping current snapshot", path.display());
            return Ok(false);
        }

        let snapshot = match Snapshot::parse(&text, fingerprint, path, &self.config) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Reload of {} failed, previous snapshot kept: {}", path.display(), e);
                return Err(e);
            }
        };

        info!(
            "Reloaded {} missions from {} ({})",
            snapshot.table.len(),
            path.display(),
            &snapshot.fingerprint[..12]
        );
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(snapshot);
        Ok(true)
    }
}
