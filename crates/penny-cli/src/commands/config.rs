//! Configuration command and shared loading helpers

use anyhow::{Context, Result};
use penny_core::config::default_config_path;
use penny_core::{AIClient, Assistant, Config, SearchClient};

/// Credential variables reported by `penny config` (values are never printed)
const CREDENTIAL_VARS: &[&str] = &[
    "GEMINI_API_KEY",
    "OPENAI_COMPATIBLE_HOST",
    "OPENAI_COMPATIBLE_API_KEY",
    "OLLAMA_HOST",
    "TAVILY_API_KEY",
];

/// Load configuration (override file or embedded default, plus env overrides)
pub fn load_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Build the assistant, explaining how to configure a backend on failure
pub fn build_assistant(config: &Config) -> Result<Assistant> {
    Assistant::from_config(config).with_context(|| {
        format!(
            "AI backend '{}' is not configured. Set GEMINI_API_KEY, or choose another backend with AI_BACKEND",
            config.ai.backend
        )
    })
}

/// Show resolved configuration and backend selection
pub fn cmd_config() -> Result<()> {
    let config = load_config()?;
    print!("{}", describe_config(&config));
    Ok(())
}

pub fn describe_config(config: &Config) -> String {
    let mut out = String::new();

    out.push_str("\n⚙️  Penny Configuration\n");
    out.push_str("   ─────────────────────────────────────────────────────────────\n");

    match default_config_path() {
        Some(path) if path.exists() => {
            out.push_str(&format!("   Config file: {}\n", path.display()))
        }
        Some(path) => out.push_str(&format!(
            "   Config file: (embedded default; override at {})\n",
            path.display()
        )),
        None => out.push_str("   Config file: (embedded default)\n"),
    }

    out.push_str(&format!("\n   AI backend: {}\n", config.ai.backend));
    match AIClient::from_config(&config.ai) {
        Some(client) => {
            out.push_str(&format!("   ✅ Host: {}\n", client.host()));
            out.push_str(&format!("      Text model: {}\n", client.model()));
            out.push_str(&format!("      Vision model: {}\n", client.vision_model()));
        }
        None => out.push_str("   ❌ Not configured (missing credentials)\n"),
    }
    out.push_str(&format!("      Timeout: {}s\n", config.ai.timeout_secs));

    let search = SearchClient::from_config(&config.search);
    out.push_str(&format!(
        "\n   Search backend: {} ({})\n",
        config.search.backend,
        search.backend_name()
    ));
    out.push_str(&format!("      Query: {}\n", config.search.query));
    out.push_str(&format!("      Max results: {}\n", config.search.max_results));
    out.push_str(&format!(
        "      Snippet: >{} chars → first {} + \"...\"\n",
        config.advisor.snippet_min_chars, config.advisor.snippet_max_chars
    ));

    out.push_str(&format!(
        "\n   Currency symbol: {}\n",
        config.display.currency_symbol
    ));

    out.push_str("\n   Credentials:\n");
    for var in CREDENTIAL_VARS {
        let set = std::env::var(var).map(|v| !v.is_empty()).unwrap_or(false);
        out.push_str(&format!(
            "      {:<28} {}\n",
            var,
            if set { "set" } else { "not set" }
        ));
    }
    out.push('\n');
    out
}
