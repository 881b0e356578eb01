use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::event::{DocumentChanged, StoreEvents};
use crate::settings::SequencerSettings;
use crate::storage::metadata::{read_vault_config, write_vault_config, VaultConfig};
use crate::storage::{
    DocumentIndex, DocumentRef, DocumentStore, Error, Result, INTERNAL_DIR_NAME, NOTE_EXTENSION,
    VAULT_CONFIG_FILENAME,
};

/// A directory of markdown notes with a `.sequencer` configuration directory.
#[derive(Debug)]
pub struct Vault {
    // Canonical path to the vault root
    absolute_path: PathBuf,
    internal_dir: PathBuf,
    config: RwLock<VaultConfig>,
    pub on: StoreEvents,
}

impl Vault {
    /// Returns the root path of the vault.
    pub fn path(&self) -> &Path {
        &self.absolute_path
    }

    pub fn id(&self) -> Uuid {
        self.config.read().unwrap_or_else(PoisonError::into_inner).id
    }

    /// The settings as last loaded or saved.
    pub fn settings(&self) -> SequencerSettings {
        self.config.read().unwrap_or_else(PoisonError::into_inner).settings
    }

    /// Persists `settings` to the vault config.
    #[instrument(skip(self), fields(vault = %self.absolute_path.display()))]
    pub async fn save_settings(&self, settings: SequencerSettings) -> Result<()> {
        let mut config = self.config.read().unwrap_or_else(PoisonError::into_inner).clone();
        config.settings = settings;

        write_vault_config(&self.config_path(), &config).await?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    fn config_path(&self) -> PathBuf {
        self.internal_dir.join(VAULT_CONFIG_FILENAME)
    }

    /// Opens an existing vault.
    ///
    /// Checks that the directory exists, contains the `.sequencer`
    /// subdirectory, and that its config file is readable.
    pub async fn open(path: impl AsRef<Path>) -> Result<Arc<Vault>> {
        let path = path.as_ref();
        debug!("Attempting to open vault at {}", path.display());

        let meta = fs::metadata(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DirectoryNotFound(path.to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(path.to_path_buf()));
        }

        let absolute_path = fs::canonicalize(path).await.map_err(Error::Io)?;
        Vault::open_internal(absolute_path).await
    }

    #[instrument(skip(absolute_path), fields(absolute_path = %absolute_path.display()))]
    async fn open_internal(absolute_path: PathBuf) -> Result<Arc<Vault>> {
        let internal_dir = absolute_path.join(INTERNAL_DIR_NAME);
        let internal_meta = fs::metadata(&internal_dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotAVault(absolute_path.clone())
            } else {
                Error::Io(e)
            }
        })?;
        if !internal_meta.is_dir() {
            return Err(Error::NotAVault(absolute_path));
        }

        let config = read_vault_config(&internal_dir.join(VAULT_CONFIG_FILENAME)).await?;

        debug!("Vault opened successfully");
        Ok(Arc::new(Vault {
            absolute_path,
            internal_dir,
            config: RwLock::new(config),
            on: StoreEvents::new(),
        }))
    }

    /// Creates a vault at `path`.
    ///
    /// - If the path does not exist, creates it.
    /// - Existing notes in the directory are kept; they become the vault's notes.
    /// - Fails if the path is a file or already has a `.sequencer` entry.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub async fn create(path: impl AsRef<Path>) -> Result<Arc<Vault>> {
        let path = path.as_ref();
        let internal_dir = path.join(INTERNAL_DIR_NAME);

        match fs::metadata(path).await {
            Ok(meta) => {
                if !meta.is_dir() {
                    debug!("Vault creation failed: path exists and is a file");
                    return Err(Error::PathIsFile(path.to_path_buf()));
                }
                if fs::metadata(&internal_dir).await.is_ok() {
                    debug!("Vault creation failed: '.sequencer' already exists");
                    return Err(Error::VaultCreationConflict(path.to_path_buf()));
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Path does not exist. Creating vault directory.");
                fs::create_dir_all(path).await.map_err(Error::Io)?;
            }
            Err(e) => return Err(Error::Io(e)),
        }

        fs::create_dir(&internal_dir).await.map_err(Error::Io)?;
        let config = VaultConfig::new();
        write_vault_config(&internal_dir.join(VAULT_CONFIG_FILENAME), &config).await?;

        let absolute_path = fs::canonicalize(path).await.map_err(Error::Io)?;
        debug!("Vault created at {}", absolute_path.display());

        Ok(Arc::new(Vault {
            internal_dir: absolute_path.join(INTERNAL_DIR_NAME),
            absolute_path,
            config: RwLock::new(config),
            on: StoreEvents::new(),
        }))
    }

    /// Opens the vault containing `start`, looking in `start` and then each
    /// of its parents.
    pub async fn discover(start: impl AsRef<Path>) -> Result<Arc<Vault>> {
        let start = fs::canonicalize(start.as_ref()).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DirectoryNotFound(start.as_ref().to_path_buf())
            } else {
                Error::Io(e)
            }
        })?;

        for dir in start.ancestors() {
            let is_vault = fs::metadata(dir.join(INTERNAL_DIR_NAME))
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false);
            if is_vault {
                return Vault::open_internal(dir.to_path_buf()).await;
            }
            debug!("No vault at {}", dir.display());
        }

        Err(Error::NotAVault(start))
    }

    /// Returns the document at `path`, which may be absolute or relative to
    /// the current directory. The file must exist inside the vault.
    pub async fn document(&self, path: &Path) -> Result<DocumentRef> {
        let abs_path = fs::canonicalize(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::DocumentNotFound(path.display().to_string())
            } else {
                Error::Io(e)
            }
        })?;

        let relative = abs_path
            .strip_prefix(&self.absolute_path)
            .map_err(|_| Error::PathOutsideVault(path.to_path_buf()))?;
        // Hidden entries (`.sequencer` included) are never listed, so never edited either
        let hidden = relative
            .components()
            .any(|c| c.as_os_str().to_string_lossy().starts_with('.'));
        if hidden || !fs::metadata(&abs_path).await.map_err(Error::Io)?.is_file() {
            return Err(Error::InvalidDocumentPath(path.display().to_string()));
        }

        let document = DocumentRef::from_relative(relative)?;
        if !document.is_note() {
            return Err(Error::InvalidDocumentPath(path.display().to_string()));
        }
        Ok(document)
    }

    /// Creates an empty note named `name` (`.md` is appended when missing).
    #[instrument(skip(self))]
    pub async fn create_document(&self, name: &str) -> Result<DocumentRef> {
        let suffix = format!(".{}", NOTE_EXTENSION);
        let document = if name.ends_with(&suffix) {
            DocumentRef::new(name)?
        } else {
            DocumentRef::new(format!("{}{}", name, suffix))?
        };
        if document.path().starts_with(INTERNAL_DIR_NAME) {
            return Err(Error::InvalidDocumentPath(name.to_string()));
        }

        let path = document.to_path(&self.absolute_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(Error::Io)?;
        }

        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::AlreadyExists {
                    Error::DocumentExists(document.to_string())
                } else {
                    Error::Io(e)
                }
            })?;

        debug!("Created document {}", document);
        Ok(document)
    }
}

#[async_trait]
impl DocumentStore for Vault {
    #[instrument(skip(self), fields(document = %document))]
    async fn read(&self, document: &DocumentRef) -> Result<String> {
        fs::read_to_string(document.to_path(&self.absolute_path))
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Error::DocumentNotFound(document.to_string())
                } else {
                    Error::Io(e)
                }
            })
    }

    #[instrument(skip(self, content), fields(document = %document, bytes = content.len()))]
    async fn write(&self, document: &DocumentRef, content: &str) -> Result<()> {
        let target = document.to_path(&self.absolute_path);
        let parent = target
            .parent()
            .ok_or_else(|| Error::InvalidDocumentPath(document.to_string()))?;

        // The rename would succeed on a read-only note, so check it up front
        let permissions = match fs::metadata(&target).await {
            Ok(meta) if meta.permissions().readonly() => {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    format!("{} is read-only", target.display()),
                )));
            }
            Ok(meta) => Some(meta.permissions()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(Error::Io(e)),
        };

        // Hidden temp sibling, renamed over the target in one step
        let temp = parent.join(format!(".{}.{}.tmp", document.file_name(), Uuid::new_v4().simple()));
        fs::write(&temp, content).await.map_err(Error::Io)?;
        let replaced = async {
            if let Some(permissions) = permissions {
                fs::set_permissions(&temp, permissions).await?;
            }
            fs::rename(&temp, &target).await
        }
        .await;
        if let Err(e) = replaced {
            warn!("Failed to replace {}: {}", target.display(), e);
            if let Err(cleanup) = fs::remove_file(&temp).await {
                warn!("Failed to remove temp file {}: {}", temp.display(), cleanup);
            }
            return Err(Error::Io(e));
        }

        debug!("Document written");
        self.on.document_changed.dispatch(&DocumentChanged {
            document: document.clone(),
            content: content.to_string(),
        });
        Ok(())
    }
}

#[async_trait]
impl DocumentIndex for Vault {
    /// Lists every `.md` note below the root, skipping hidden entries
    /// (including `.sequencer`).
    async fn list_documents(&self) -> Result<Vec<DocumentRef>> {
        let mut pending = vec![self.absolute_path.clone()];
        let mut documents = Vec::new();

        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await.map_err(Error::Io)?;
            while let Some(entry) = entries.next_entry().await.map_err(Error::Io)? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else {
                    warn!("Skipping non UTF-8 path: {}", entry.path().display());
                    continue;
                };
                if name.starts_with('.') {
                    continue;
                }

                let file_type = entry.file_type().await.map_err(Error::Io)?;
                if file_type.is_dir() {
                    pending.push(entry.path());
                } else if file_type.is_file() {
                    let path = entry.path();
                    let relative = path
                        .strip_prefix(&self.absolute_path)
                        .map_err(|_| Error::PathOutsideVault(path.clone()))?;
                    let document = DocumentRef::from_relative(relative)?;
                    if document.is_note() {
                        documents.push(document);
                    }
                }
            }
        }

        documents.sort();
        Ok(documents)
    }
}
