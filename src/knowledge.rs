//! Lifecycle of trained parameters kept in a pluggable storage backend.
//!
//! A [KnowledgeBase] holds two pieces of state: the model parameters learned
//! by training and the training parameters that configured it. Both are
//! stored together as one JSON blob under the database name.
//!
//! ```
//! use lpkit::{KnowledgeBase, MemoryStorage};
//! let mut kb: KnowledgeBase<Vec<f64>, u32, _> =
//!     KnowledgeBase::with_defaults("weights", MemoryStorage::default());
//! kb.reinitialize().unwrap();
//! kb.model_parameters_mut().unwrap().extend([0.5, 1.5]);
//! kb.save().unwrap();
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors of the knowledge base and its storage backends
#[derive(Debug, Error)]
pub enum KnowledgeBaseError {
    /// Saving without model parameters
    #[error("can not store an empty knowledge base")]
    Empty,
    /// A database name that can not be used as a file name
    #[error("invalid database name {0:?}")]
    InvalidName(String),
    /// Nothing stored under the database name
    #[error("knowledge base {0:?} could not be loaded")]
    NotFound(String),
    /// The backend failed to read or write
    #[error("storage error: {0}")]
    Storage(#[from] io::Error),
    /// The stored blob could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, KnowledgeBaseError>;

/// Where knowledge bases keep their blobs
pub trait StorageBackend {
    /// Store `blob` under `name`, replacing what was there
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()>;

    /// The blob stored under `name`, if any
    fn load(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Forget everything stored under `name`
    fn drop_database(&mut self, name: &str) -> Result<()>;
}

/// In-process storage, lost when dropped
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blobs: HashMap<String, Vec<u8>>,
}

impl StorageBackend for MemoryStorage {
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        self.blobs.insert(name.to_string(), blob.to_vec());
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(name).cloned())
    }

    fn drop_database(&mut self, name: &str) -> Result<()> {
        self.blobs.remove(name);
        Ok(())
    }
}

/// One `<name>.json` file per database under a root directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Storage rooted at `root`. The directory is created on first save.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File of database `name`. Names must stay inside the root directory.
    fn path(&self, name: &str) -> Result<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains(['/', '\\', '\0'])
        {
            return Err(KnowledgeBaseError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(format!("{}.json", name)))
    }
}

impl StorageBackend for FileStorage {
    fn save(&mut self, name: &str, blob: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        fs::write(self.path(name)?, blob)?;
        Ok(())
    }

    fn load(&self, name: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(name)?) {
            Ok(blob) => Ok(Some(blob)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn drop_database(&mut self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Serialize)]
struct StoredRef<'a, MP, TP> {
    model_parameters: &'a MP,
    training_parameters: Option<&'a TP>,
}

#[derive(Deserialize)]
struct Stored<MP, TP> {
    model_parameters: MP,
    training_parameters: Option<TP>,
}

/// Model parameters `MP` and training parameters `TP` persisted in `S`.
pub struct KnowledgeBase<MP, TP, S> {
    db_name: String,
    storage: S,
    trained: bool,
    model_parameters: Option<MP>,
    training_parameters: Option<TP>,
    new_model_parameters: fn() -> MP,
    new_training_parameters: fn() -> TP,
}

impl<MP, TP, S> KnowledgeBase<MP, TP, S>
where
    MP: Serialize + DeserializeOwned,
    TP: Serialize + DeserializeOwned,
    S: StorageBackend,
{
    /// An empty, untrained knowledge base. The factories build fresh
    /// parameter instances on [KnowledgeBase::reinitialize].
    pub fn new(
        db_name: impl Into<String>,
        storage: S,
        new_model_parameters: fn() -> MP,
        new_training_parameters: fn() -> TP,
    ) -> Self {
        Self {
            db_name: db_name.into(),
            storage,
            trained: false,
            model_parameters: None,
            training_parameters: None,
            new_model_parameters,
            new_training_parameters,
        }
    }

    /// Same as [KnowledgeBase::new], with `Default` as factories
    pub fn with_defaults(db_name: impl Into<String>, storage: S) -> Self
    where
        MP: Default,
        TP: Default,
    {
        Self::new(db_name, storage, MP::default, TP::default)
    }

    /// Name under which the state is stored
    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    /// The storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether the model parameters come from a completed training
    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Flag the model parameters as trained or not
    pub fn set_trained(&mut self, trained: bool) {
        self.trained = trained;
    }

    /// Whether both parameter sets are present
    pub fn is_configured(&self) -> bool {
        self.model_parameters.is_some() && self.training_parameters.is_some()
    }

    /// Store the current state
    pub fn save(&mut self) -> Result<()> {
        let model_parameters = self
            .model_parameters
            .as_ref()
            .ok_or(KnowledgeBaseError::Empty)?;
        let blob = serde_json::to_vec(&StoredRef {
            model_parameters,
            training_parameters: self.training_parameters.as_ref(),
        })?;
        log::debug!(
            "Saving knowledge base {:?} ({} bytes)",
            self.db_name,
            blob.len()
        );
        self.storage.save(&self.db_name, &blob)
    }

    /// Load the stored state, unless model parameters are already present.
    /// A loaded knowledge base is trained.
    pub fn load(&mut self) -> Result<()> {
        if self.model_parameters.is_some() {
            return Ok(());
        }
        let blob = self
            .storage
            .load(&self.db_name)?
            .ok_or_else(|| KnowledgeBaseError::NotFound(self.db_name.clone()))?;
        let stored: Stored<MP, TP> = serde_json::from_slice(&blob)?;
        log::debug!("Loaded knowledge base {:?}", self.db_name);
        self.model_parameters = Some(stored.model_parameters);
        self.training_parameters = stored.training_parameters;
        self.set_trained(true);
        Ok(())
    }

    /// Drop the stored state and forget both parameter sets
    pub fn erase(&mut self) -> Result<()> {
        log::debug!("Erasing knowledge base {:?}", self.db_name);
        self.storage.drop_database(&self.db_name)?;
        self.model_parameters = None;
        self.training_parameters = None;
        self.set_trained(false);
        Ok(())
    }

    /// [KnowledgeBase::erase], then start over with fresh parameter sets
    pub fn reinitialize(&mut self) -> Result<()> {
        self.erase()?;
        self.model_parameters = Some((self.new_model_parameters)());
        self.training_parameters = Some(self.empty_training_parameters());
        Ok(())
    }

    /// A fresh training parameter set
    pub fn empty_training_parameters(&self) -> TP {
        (self.new_training_parameters)()
    }

    /// The model parameters
    pub fn model_parameters(&self) -> Option<&MP> {
        self.model_parameters.as_ref()
    }

    /// The model parameters, mutably
    pub fn model_parameters_mut(&mut self) -> Option<&mut MP> {
        self.model_parameters.as_mut()
    }

    /// Replace the model parameters
    pub fn set_model_parameters(&mut self, model_parameters: MP) {
        self.model_parameters = Some(model_parameters);
    }

    /// The training parameters
    pub fn training_parameters(&self) -> Option<&TP> {
        self.training_parameters.as_ref()
    }

    /// Replace the training parameters
    pub fn set_training_parameters(&mut self, training_parameters: TP) {
        self.training_parameters = Some(training_parameters);
    }
}
