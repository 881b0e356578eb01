use anyhow::Context;
use console::Term;
use dialoguer::{theme::ColorfulTheme, FuzzySelect};
use sequencer_core::suggest::Suggestion;

/// Lets the user fuzzy-pick one of `suggestions` on the terminal.
///
/// Returns `None` when the list is empty or the user cancels with Esc.
pub async fn pick(prompt: String, suggestions: Vec<Suggestion>) -> anyhow::Result<Option<Suggestion>> {
    if suggestions.is_empty() {
        return Ok(None);
    }
    if !Term::stderr().is_term() {
        anyhow::bail!("No target given and no terminal to pick one from");
    }

    let items: Vec<String> = suggestions.iter().map(ToString::to_string).collect();
    // dialoguer blocks on terminal input
    let selection = tokio::task::spawn_blocking(move || {
        FuzzySelect::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .items(&items)
            .default(0)
            .interact_opt()
            .context("Failed to read selection")
    })
    .await
    .context("Picker task failed (panic)")??;

    Ok(selection.and_then(|index| suggestions.into_iter().nth(index)))
}
