//! Prompt library commands

use anyhow::{bail, Result};
use penny_core::prompts::{default_prompts_dir, PromptId, PromptLibrary};

pub fn cmd_prompts_list() -> Result<()> {
    let mut library = PromptLibrary::new();
    print!("{}", describe_prompts(&mut library));
    Ok(())
}

pub fn cmd_prompts_show(prompt_id: &str) -> Result<()> {
    let mut library = PromptLibrary::new();
    print!("{}", describe_prompt(&mut library, prompt_id)?);
    Ok(())
}

pub fn cmd_prompts_path() -> Result<()> {
    let Some(path) = default_prompts_dir() else {
        bail!("Could not determine the prompts directory on this system");
    };
    println!("{}", path.display());
    if !path.exists() {
        eprintln!("\nNote: this directory does not exist yet. Create it to add custom prompts.");
    }
    Ok(())
}

/// Prompt table with override status and customization hints
pub fn describe_prompts(library: &mut PromptLibrary) -> String {
    let mut out = String::from("Available Prompts:\n\n");
    out.push_str(&format!(
        "{:<16} {:>7}  {:<9}  {}\n",
        "ID", "VERSION", "TASK", "SOURCE"
    ));
    out.push_str(&format!("{}\n", "-".repeat(48)));

    for info in library.list() {
        out.push_str(&format!(
            "{:<16} {:>7}  {:<9}  {}\n",
            info.id,
            info.version,
            info.task_type,
            if info.has_override { "✓ Custom" } else { "Default" }
        ));
    }

    let dir = library
        .override_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(not available)".to_string());
    out.push_str(&format!("\nOverride directory: {}\n", dir));
    out.push_str("Copy a prompt there as <id>.md and keep its {{placeholders}} to customize it.\n");
    out
}

/// One prompt's metadata and content
pub fn describe_prompt(library: &mut PromptLibrary, prompt_id: &str) -> Result<String> {
    let id: PromptId = match prompt_id.parse() {
        Ok(id) => id,
        Err(_) => {
            let known: Vec<&str> = PromptId::all().iter().map(|id| id.as_str()).collect();
            bail!(
                "Unknown prompt ID: {} (available: {})",
                prompt_id,
                known.join(", ")
            );
        }
    };

    let prompt = library.get(id)?;
    let mut out = format!(
        "Prompt: {}\nVersion: {}\nTask Type: {}\nSource: {}\n",
        prompt.metadata.id,
        prompt.metadata.version,
        prompt.metadata.task_type,
        if prompt.is_override { "Override" } else { "Default" }
    );
    if let Some(ref path) = prompt.override_path {
        out.push_str(&format!("Override Path: {}\n", path.display()));
    }
    out.push_str("\n--- Content ---\n");
    out.push_str(&prompt.content);
    out.push('\n');
    Ok(out)
}
