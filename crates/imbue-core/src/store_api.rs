//! Unified store facade for the host shells
//!
//! `ImbueStore` owns the whole persistence subsystem: platform detection,
//! the bootstrap markers, cold/warm provisioning, the `recipes` CRUD
//! gateway, and the readiness signal. Construction is cheap and
//! deterministic; nothing touches the engine until `initialize`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use tracing::{info, warn};

use imbue_sqlite::{Row, SqlValue, SqliteDatabase, StoreError, StoreProfile};

use crate::codec::{self, CodecError};
use crate::config::{ConfigError, StoreConfig};
use crate::domain::Publication;
use crate::markers::{BootstrapState, FileMarkerStore, MarkerError, MarkerStore};
use crate::platform::{Platform, PlatformError};
use crate::readiness::Readiness;
use crate::seed::SeedError;

const INSERT_SQL: &str =
    "INSERT INTO recipes(id, name, description, time, ingredient, image) VALUES(?, ?, ?, ?, ?, ?)";
const SELECT_SQL: &str = "SELECT * FROM recipes";
const DELETE_SQL: &str = "DELETE FROM recipes WHERE id=?";

const MARKER_FILE: &str = "imbue-bootstrap.json";

/// Error type for the store API, exposed to the shells.
#[derive(Debug, thiserror::Error)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum StoreApiError {
    #[error("Store is not initialized: {0}")]
    NotInitialized(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unavailable: {0}")]
    Unavailable(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for StoreApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => StoreApiError::AlreadyExists(msg),
            StoreError::InvalidDataset(msg) => StoreApiError::InvalidInput(msg),
            other => StoreApiError::Storage(other.to_string()),
        }
    }
}

impl From<MarkerError> for StoreApiError {
    fn from(e: MarkerError) -> Self {
        StoreApiError::Storage(e.to_string())
    }
}

impl From<PlatformError> for StoreApiError {
    fn from(e: PlatformError) -> Self {
        StoreApiError::Unavailable(e.to_string())
    }
}

impl From<SeedError> for StoreApiError {
    fn from(e: SeedError) -> Self {
        match e {
            SeedError::Parse(inner) => StoreApiError::InvalidInput(inner.to_string()),
            other => StoreApiError::Unavailable(other.to_string()),
        }
    }
}

impl From<CodecError> for StoreApiError {
    fn from(e: CodecError) -> Self {
        StoreApiError::Storage(e.to_string())
    }
}

impl From<ConfigError> for StoreApiError {
    fn from(e: ConfigError) -> Self {
        StoreApiError::InvalidInput(e.to_string())
    }
}

/// The main entry point for the shells.
#[cfg_attr(feature = "uniffi", derive(uniffi::Object))]
pub struct ImbueStore {
    config: StoreConfig,
    markers: Box<dyn MarkerStore>,
    db: Mutex<Option<SqliteDatabase>>,
    platform: OnceLock<Platform>,
    active_name: OnceLock<String>,
    readiness: Readiness,
}

// Private helpers (not exported via UniFFI)
impl ImbueStore {
    /// Raw `SELECT * FROM recipes` rows, in engine return order, with the
    /// iOS leading-metadata row dropped. The JSON-text columns stay
    /// encoded; decoding is a separate, caller-driven step.
    pub fn read_rows(&self) -> Result<Vec<Row>, StoreApiError> {
        let platform = self.platform()?;
        let mut rows = self.with_db(|db| db.query(SELECT_SQL, &[]))?;
        match platform {
            Platform::Ios => {
                if !rows.is_empty() {
                    rows.remove(0);
                }
            }
            Platform::Web | Platform::Android => {}
        }
        Ok(rows)
    }

    fn profile_for(platform: Platform) -> StoreProfile {
        match platform {
            Platform::Web => StoreProfile::ephemeral(),
            Platform::Android => StoreProfile::durable(),
            Platform::Ios => StoreProfile::durable().with_leading_column_metadata(),
        }
    }

    fn data_dir(&self) -> PathBuf {
        self.config.resolved_data_dir()
    }

    fn platform(&self) -> Result<Platform, StoreApiError> {
        self.platform.get().copied().ok_or_else(|| {
            StoreApiError::NotInitialized("platform is decided during initialize".into())
        })
    }

    fn with_db<T>(
        &self,
        f: impl FnOnce(&SqliteDatabase) -> Result<T, StoreError>,
    ) -> Result<T, StoreApiError> {
        let guard = self
            .db
            .lock()
            .map_err(|e| StoreApiError::Storage(e.to_string()))?;
        match guard.as_ref() {
            Some(db) => Ok(f(db)?),
            None => Err(StoreApiError::NotInitialized(
                "database connection is not open".into(),
            )),
        }
    }

    fn install_db(&self, db: SqliteDatabase) -> Result<(), StoreApiError> {
        let mut guard = self
            .db
            .lock()
            .map_err(|e| StoreApiError::Storage(e.to_string()))?;
        *guard = Some(db);
        Ok(())
    }

    /// Writes under web go to memory first; every mutation is flushed to
    /// the snapshot so a page reload cannot lose it.
    fn flush_if_web(&self) -> Result<(), StoreApiError> {
        match self.platform()? {
            Platform::Web => self.with_db(|db| db.persist()),
            Platform::Android | Platform::Ios => Ok(()),
        }
    }

    /// Verify the data directory is usable. Failure is logged and tolerated;
    /// the provisioning itself will surface a real error if storage is
    /// genuinely unusable.
    fn storage_access_probe(&self, dir: &Path) -> Result<(), std::io::Error> {
        fs::create_dir_all(dir)?;
        let probe = dir.join(".imbue-probe");
        fs::write(&probe, b"probe")?;
        fs::remove_file(&probe)?;
        Ok(())
    }

    /// First run on a device: acquire the seed, validate it, import it into
    /// a fresh database named by the dataset, then commit the markers.
    async fn cold_start(&self, platform: Platform) -> Result<(), StoreApiError> {
        match platform {
            Platform::Android => {
                if let Err(e) = self.storage_access_probe(&self.data_dir()) {
                    warn!(error = %e, "storage access probe failed, continuing");
                }
            }
            Platform::Web => {
                fs::create_dir_all(self.data_dir())
                    .map_err(|e| StoreApiError::Storage(e.to_string()))?;
            }
            Platform::Ios => {}
        }

        let source = self.config.seed_source().ok_or_else(|| {
            StoreApiError::InvalidInput(
                "first start needs a seed_url or seed_path to provision from".into(),
            )
        })?;
        let dataset = source.fetch().await?;
        dataset.validate()?;

        let name = dataset.database.clone();
        let db = SqliteDatabase::create(&self.data_dir(), &name, Self::profile_for(platform))?;
        db.import(&dataset)?;
        if platform == Platform::Web {
            db.persist()?;
        }

        self.markers.store(&BootstrapState::provisioned(&name))?;
        let _ = self.active_name.set(name.clone());
        self.install_db(db)?;
        self.readiness.mark_ready();
        info!(database = %name, platform = %platform, "cold provisioning complete");
        Ok(())
    }

    /// Every later run: reconnect to the database recorded in the markers.
    fn warm_start(&self, platform: Platform) -> Result<(), StoreApiError> {
        let name = self.markers.active_database_name()?.ok_or_else(|| {
            StoreApiError::Storage("marker record is seeded but carries no database name".into())
        })?;
        let db = SqliteDatabase::create(&self.data_dir(), &name, Self::profile_for(platform))?;
        let _ = self.active_name.set(name.clone());
        self.install_db(db)?;
        self.readiness.mark_ready();
        info!(database = %name, platform = %platform, "warm start complete");
        Ok(())
    }
}

#[cfg_attr(feature = "uniffi", uniffi::export)]
impl ImbueStore {
    /// Open a store with the given configuration.
    ///
    /// No engine call happens here; the store is not ready until
    /// [`initialize`](Self::initialize) has completed.
    #[cfg_attr(feature = "uniffi", uniffi::constructor)]
    pub fn open(config: StoreConfig) -> Result<Arc<Self>, StoreApiError> {
        config.validate()?;
        let marker_path = config.resolved_data_dir().join(MARKER_FILE);
        Ok(Arc::new(Self {
            config,
            markers: Box::new(FileMarkerStore::new(marker_path)),
            db: Mutex::new(None),
            platform: OnceLock::new(),
            active_name: OnceLock::new(),
            readiness: Readiness::new(),
        }))
    }

    // --- Lifecycle ---

    /// Decide the platform, then run the one-time cold provisioning or the
    /// warm reconnect, and flip the readiness signal on success.
    pub async fn initialize(&self) -> Result<(), StoreApiError> {
        let platform = match self.config.platform {
            Some(platform) => platform,
            None => Platform::detect()?,
        };
        let _ = self.platform.set(platform);
        info!(platform = %platform, "initializing store");

        if self.markers.is_seeded()? {
            self.warm_start(platform)
        } else {
            self.cold_start(platform).await
        }
    }

    // --- Readiness ---

    /// Current readiness value. False until `initialize` succeeds.
    pub fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }

    /// Suspend until the store is ready. Returns immediately once it is.
    pub async fn wait_until_ready(&self) {
        let mut probe = self.readiness.probe();
        probe.wait_ready().await;
    }

    // --- CRUD gateway ---

    /// Insert one publication. Returns the engine change count.
    pub fn create_publication(&self, publication: Publication) -> Result<u32, StoreApiError> {
        let params = codec::encode(&publication)?;
        let changes = self.with_db(|db| db.execute(INSERT_SQL, &params))?;
        self.flush_if_web()?;
        Ok(changes as u32)
    }

    /// Raw recipe rows rendered as one JSON array, in engine return order,
    /// after platform result normalization. JSON-text columns stay encoded.
    pub fn publication_rows_json(&self) -> Result<String, StoreApiError> {
        let rows = self.read_rows()?;
        serde_json::to_string(&rows).map_err(|e| StoreApiError::Storage(e.to_string()))
    }

    /// Every stored publication, decoded through the record codec.
    pub fn list_publications(&self) -> Result<Vec<Publication>, StoreApiError> {
        let rows = self.read_rows()?;
        let mut publications = Vec::with_capacity(rows.len());
        for row in &rows {
            publications.push(codec::decode(row)?);
        }
        Ok(publications)
    }

    /// Delete by id. Returns the change count; deleting an absent id is not
    /// an error, it reports zero changes.
    pub fn delete_publication(&self, id: String) -> Result<u32, StoreApiError> {
        let params = [SqlValue::Text(id)];
        let changes = self.with_db(|db| db.execute(DELETE_SQL, &params))?;
        self.flush_if_web()?;
        Ok(changes as u32)
    }

    // --- Bootstrap facts ---

    /// Name of the active database, from the in-process cache once
    /// initialized, otherwise from the marker record.
    pub fn active_database_name(&self) -> Result<Option<String>, StoreApiError> {
        if let Some(name) = self.active_name.get() {
            return Ok(Some(name.clone()));
        }
        Ok(self.markers.active_database_name()?)
    }

    /// True once the one-time provisioning has completed on this device.
    pub fn is_seeded(&self) -> Result<bool, StoreApiError> {
        Ok(self.markers.is_seeded()?)
    }
}
