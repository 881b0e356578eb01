use anyhow::{bail, Result};
use console::style;
use sequencer_core::navigation::{resolve_target, NavigationError, SequenceLinks};
use sequencer_core::storage::{DocumentIndex, DocumentStore, Vault};
use sequencer_core::suggest::{build_suggestions, Suggestion};
use sequencer_core::LinkKey;
use tracing::info;

use crate::app::{picker, Sequencer};
use crate::cli::{
    ConfigArgs, ConfigCommands, LinkArgs, NavArgs, ShowArgs, SuggestArgs, VaultArgs, VaultCommands,
};

pub async fn handle_link(args: LinkArgs, seq: Sequencer) -> Result<()> {
    let vault = seq.vault()?;
    let from = seq.note(&args.note).await?;
    let key = args.key();

    let mut settings = vault.settings();
    if args.no_reciprocal {
        settings.reciprocal_links = false;
    }

    let choice = match &args.target {
        Some(target) => seq.target(target).await?,
        None => {
            let suggestions = build_suggestions(&**vault, &from, "", &settings).await?;
            let prompt = format!("Link {} of {} to", key, from.basename());
            match picker::pick(prompt, suggestions).await? {
                Some(choice) => choice,
                None => {
                    info!("Link cancelled");
                    seq.say("Nothing linked.");
                    return Ok(());
                }
            }
        }
    };

    let outcome = seq.choose(&from, key, &choice, &settings).await?;
    match &outcome.reciprocal {
        Some(other) => seq.say(format!("Linked {} ({}) <-> {} ({})", from, key, other, key.inverse())),
        None => seq.say(format!("Linked {} ({}) -> {}", from, key, choice.linktext())),
    }
    Ok(())
}

pub async fn handle_show(args: ShowArgs, seq: Sequencer) -> Result<()> {
    let vault = seq.vault()?;
    let note = seq.note(&args.note).await?;
    let links = SequenceLinks::parse(&vault.read(&note).await?);

    println!("{}", style(note.path()).bold());
    for key in [LinkKey::Prev, LinkKey::Next] {
        let Some(value) = links.get(key) else {
            println!("  {}: {}", key, style("(none)").dim());
            continue;
        };
        match resolve_target(&**vault, value).await {
            Ok(target) => println!("  {}: {} -> {}", key, value, target),
            Err(NavigationError::NotFound(_)) => {
                println!("  {}: {} {}", key, value, style("(not found)").red())
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

pub async fn handle_nav(args: NavArgs, seq: Sequencer) -> Result<()> {
    let vault = seq.vault()?;
    let note = seq.note(&args.note).await?;
    let key = LinkKey::from(args.direction);

    let links = SequenceLinks::parse(&vault.read(&note).await?);
    let Some(value) = links.get(key) else {
        bail!("{} has no {} link", note, key);
    };

    let target = resolve_target(&**vault, value).await?;
    println!("{}", target);
    Ok(())
}

pub async fn handle_suggest(args: SuggestArgs, seq: Sequencer) -> Result<()> {
    let vault = seq.vault()?;
    let note = seq.note(&args.note).await?;
    let suggestions = build_suggestions(&**vault, &note, &args.query, &vault.settings()).await?;

    for suggestion in suggestions {
        match suggestion {
            Suggestion::File(document) => println!("{}", document),
            Suggestion::Unresolved(name) => println!("{} {}", name, style("(new note)").dim()),
        }
    }
    Ok(())
}

pub async fn handle_config(args: ConfigArgs, seq: Sequencer) -> Result<()> {
    let vault = seq.vault()?;
    match args.command {
        ConfigCommands::Get { key } => {
            println!("{}", vault.settings().get(&key)?);
        }
        ConfigCommands::Set { key, value } => {
            let mut settings = vault.settings();
            settings.set(&key, &value)?;
            vault.save_settings(settings).await?;
            seq.say(format!("{} = {}", key, settings.get(&key)?));
        }
        ConfigCommands::List {} => {
            for (key, value) in vault.settings().entries() {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}

pub async fn handle_vault(args: VaultArgs, seq: Sequencer) -> Result<()> {
    match args.command {
        VaultCommands::Init { path } => {
            let path = match path {
                Some(path) => std::path::absolute(path)?,
                None => std::env::current_dir()?,
            };
            if let Ok(existing) = &seq.vault {
                if path.starts_with(existing.path()) || existing.path().starts_with(&path) {
                    bail!("Cannot create a vault inside another one ({})", existing.path().display());
                }
            }

            info!("Creating vault at: {}", path.display());
            let vault = Vault::create(&path).await?;
            seq.say(format!("Vault created at {}", vault.path().display()));
        }
        VaultCommands::Info {} => {
            let vault = seq.vault()?;
            let notes = vault.list_documents().await?;
            println!("Vault: {}", vault.path().display());
            println!("ID: {}", vault.id());
            println!("Notes: {}", notes.len());
            for (key, value) in vault.settings().entries() {
                println!("{} = {}", key, value);
            }
        }
    }
    Ok(())
}
