use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context};
use sequencer_core::storage::{self, resolve_link, DocumentRef, Vault};
use sequencer_core::suggest::Suggestion;
use sequencer_core::{link_notes, Link, LinkKey, LinkOutcome, SequencerSettings};
use tokio::fs;
use tracing::{debug, info};

pub mod picker;

pub struct Sequencer {
    pub vault: anyhow::Result<Arc<Vault>>,
    pub quiet: bool,
}

impl Sequencer {
    /// Opens the vault named by `--vault`, or the one containing the current
    /// directory. A missing vault is kept as an error so that commands which
    /// don't need one (`vault init`) still run.
    pub async fn load(vault_flag: Option<PathBuf>, quiet: bool) -> Self {
        let vault = match vault_flag {
            Some(path) => Vault::open(&path)
                .await
                .with_context(|| format!("Failed to open vault at {}", path.display())),
            None => match std::env::current_dir() {
                Ok(dir) => Vault::discover(&dir)
                    .await
                    .context("No vault found in current directory or its parents"),
                Err(e) => Err(e.into()),
            },
        };
        if let Ok(vault) = &vault {
            debug!("Using vault at {}", vault.path().display());
        }
        Sequencer { vault, quiet }
    }

    pub fn vault(&self) -> anyhow::Result<&Arc<Vault>> {
        self.vault.as_ref().map_err(|e| anyhow!("{:#}", e))
    }

    /// Prints a confirmation unless `--quiet` is set.
    pub fn say(&self, message: impl Display) {
        if !self.quiet {
            println!("{}", message);
        }
    }

    /// Finds the note `arg` refers to.
    ///
    /// `arg` is tried as a path relative to the current directory, then as a
    /// path relative to the vault root, then as link text (`Chapter 2`,
    /// `[[Book/Chapter 2]]`).
    pub async fn find_note(&self, arg: &str) -> anyhow::Result<Option<DocumentRef>> {
        let vault = self.vault()?;

        for candidate in [PathBuf::from(arg), vault.path().join(arg)] {
            if is_file(&candidate).await {
                return Ok(Some(vault.document(&candidate).await?));
            }
        }

        let linktext = Link::parse(arg).map(|link| link.target().to_string());
        match linktext {
            Some(text) => Ok(resolve_link(&**vault, &text).await?),
            None => Ok(None),
        }
    }

    pub async fn note(&self, arg: &str) -> anyhow::Result<DocumentRef> {
        self.find_note(arg)
            .await?
            .ok_or_else(|| storage::Error::DocumentNotFound(arg.to_string()).into())
    }

    /// Like [`Sequencer::note`], but a name with no note behind it becomes a
    /// new-note suggestion.
    pub async fn target(&self, arg: &str) -> anyhow::Result<Suggestion> {
        if let Some(document) = self.find_note(arg).await? {
            return Ok(Suggestion::File(document));
        }
        let link = Link::parse(arg).ok_or_else(|| anyhow!("Empty link target"))?;
        Ok(Suggestion::Unresolved(link.target().to_string()))
    }

    /// Links `from` to the chosen suggestion, creating the note first when
    /// it doesn't exist yet.
    pub async fn choose(
        &self,
        from: &DocumentRef,
        key: LinkKey,
        choice: &Suggestion,
        settings: &SequencerSettings,
    ) -> anyhow::Result<LinkOutcome> {
        let vault = self.vault()?;
        let to = match choice {
            Suggestion::File(document) => document.clone(),
            Suggestion::Unresolved(name) => {
                let created = vault.create_document(name).await?;
                info!("Created note {}", created);
                self.say(format!("Created {}", created));
                created
            }
        };

        Ok(link_notes(&**vault, settings, from, key, &to).await?)
    }
}

async fn is_file(path: &Path) -> bool {
    fs::metadata(path).await.map(|meta| meta.is_file()).unwrap_or(false)
}
