//! Prompt library
//!
//! Prompts are loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/penny/prompts/overrides/)
//! 2. Fall back to embedded defaults (compiled into binary)

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use serde::Deserialize;

use crate::config::penny_data_dir;
use crate::error::{Error, Result};

/// Embedded default prompts (compiled into binary)
mod defaults {
    pub const SAVINGS_ADVICE: &str = include_str!("../../../prompts/savings_advice.md");
    pub const FINANCE_QA: &str = include_str!("../../../prompts/finance_qa.md");
    pub const IMAGE_QA: &str = include_str!("../../../prompts/image_qa.md");
}

/// Known prompt IDs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PromptId {
    /// Savings tips from a budget summary and a web snippet
    SavingsAdvice,
    /// Plain finance question
    FinanceQa,
    /// Question about a bill or bank statement image
    ImageQa,
}

impl PromptId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SavingsAdvice => "savings_advice",
            Self::FinanceQa => "finance_qa",
            Self::ImageQa => "image_qa",
        }
    }

    pub fn all() -> &'static [PromptId] {
        &[Self::SavingsAdvice, Self::FinanceQa, Self::ImageQa]
    }

    fn default_content(&self) -> &'static str {
        match self {
            Self::SavingsAdvice => defaults::SAVINGS_ADVICE,
            Self::FinanceQa => defaults::FINANCE_QA,
            Self::ImageQa => defaults::IMAGE_QA,
        }
    }
}

impl std::str::FromStr for PromptId {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        PromptId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| format!("Unknown prompt: {}", s))
    }
}

/// Prompt frontmatter metadata
#[derive(Debug, Clone, Deserialize)]
pub struct PromptMetadata {
    pub id: String,
    /// Version number for tracking changes
    pub version: u32,
    /// text or vision
    pub task_type: String,
}

/// A loaded prompt with metadata and content
#[derive(Debug, Clone)]
pub struct Prompt {
    pub metadata: PromptMetadata,
    pub content: String,
    /// Whether this came from an override file
    pub is_override: bool,
    pub override_path: Option<PathBuf>,
}

impl Prompt {
    /// Render the prompt with `{{var}}` placeholders replaced
    ///
    /// Values are inserted verbatim; placeholders without a value are left as-is.
    pub fn render(&self, vars: &HashMap<&str, &str>) -> String {
        let mut result = String::with_capacity(self.content.len());
        let mut rest = self.content.as_str();

        // Single pass so substituted values are never re-scanned
        while let Some(start) = rest.find("{{") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find("}}") {
                Some(end) => {
                    let key = after[..end].trim();
                    match vars.get(key) {
                        Some(value) => result.push_str(value),
                        None => result.push_str(&rest[start..start + 2 + end + 2]),
                    }
                    rest = &after[end + 2..];
                }
                None => {
                    result.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        result.push_str(rest);
        result
    }
}

/// Prompt library for loading and caching prompts
pub struct PromptLibrary {
    override_dir: Option<PathBuf>,
    cache: HashMap<PromptId, Prompt>,
}

impl PromptLibrary {
    /// Create a new prompt library with default paths
    pub fn new() -> Self {
        Self {
            override_dir: default_prompts_dir(),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with a custom override directory
    pub fn with_override_dir(path: PathBuf) -> Self {
        Self {
            override_dir: Some(path),
            cache: HashMap::new(),
        }
    }

    /// Create a prompt library with no override directory (embedded only)
    pub fn embedded_only() -> Self {
        Self {
            override_dir: None,
            cache: HashMap::new(),
        }
    }

    /// Get a prompt by ID, loading from override or default
    pub fn get(&mut self, id: PromptId) -> Result<&Prompt> {
        if !self.cache.contains_key(&id) {
            let prompt = self.load(id)?;
            self.cache.insert(id, prompt);
        }
        self.cache
            .get(&id)
            .ok_or_else(|| Error::InvalidData(format!("Prompt {} not loaded", id.as_str())))
    }

    fn load(&self, id: PromptId) -> Result<Prompt> {
        if let Some(ref override_dir) = self.override_dir {
            let override_path = override_dir.join(format!("{}.md", id.as_str()));
            if override_path.exists() {
                let content = fs::read_to_string(&override_path).map_err(|e| {
                    Error::InvalidData(format!("Failed to read prompt override: {}", e))
                })?;
                let (metadata, body) = parse_prompt(&content)?;
                return Ok(Prompt {
                    metadata,
                    content: body,
                    is_override: true,
                    override_path: Some(override_path),
                });
            }
        }

        let (metadata, body) = parse_prompt(id.default_content())?;
        Ok(Prompt {
            metadata,
            content: body,
            is_override: false,
            override_path: None,
        })
    }

    /// List all prompts with their override status
    pub fn list(&mut self) -> Vec<PromptInfo> {
        PromptId::all()
            .iter()
            .map(|&id| {
                let override_path = self.override_path(id);
                let prompt = self.get(id).ok();
                PromptInfo {
                    id: id.as_str().to_string(),
                    version: prompt.map(|p| p.metadata.version).unwrap_or(0),
                    task_type: prompt
                        .map(|p| p.metadata.task_type.clone())
                        .unwrap_or_default(),
                    has_override: override_path.is_some(),
                    override_path,
                }
            })
            .collect()
    }

    fn override_path(&self, id: PromptId) -> Option<PathBuf> {
        self.override_dir
            .as_ref()
            .map(|d| d.join(format!("{}.md", id.as_str())))
            .filter(|p| p.exists())
    }

    pub fn override_dir(&self) -> Option<&PathBuf> {
        self.override_dir.as_ref()
    }

    /// Clear the cache (useful after editing override files)
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::new()
    }
}

/// Information about a prompt for listing
#[derive(Debug, Clone)]
pub struct PromptInfo {
    pub id: String,
    pub version: u32,
    pub task_type: String,
    pub has_override: bool,
    pub override_path: Option<PathBuf>,
}

/// Default prompts override directory
pub fn default_prompts_dir() -> Option<PathBuf> {
    penny_data_dir().map(|d| d.join("prompts").join("overrides"))
}

/// Parse a prompt file into metadata and body
fn parse_prompt(content: &str) -> Result<(PromptMetadata, String)> {
    let content = content.trim();

    if !content.starts_with("---") {
        return Err(Error::InvalidData(
            "Prompt must start with YAML frontmatter (---)".into(),
        ));
    }

    let rest = &content[3..];
    let end = rest.find("---").ok_or_else(|| {
        Error::InvalidData("Prompt frontmatter not closed (missing second ---)".into())
    })?;

    let frontmatter = rest[..end].trim();
    let body = rest[end + 3..].trim();

    let metadata: PromptMetadata = serde_yaml::from_str(frontmatter)
        .map_err(|e| Error::InvalidData(format!("Invalid prompt frontmatter: {}", e)))?;

    Ok((metadata, body.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prompt() {
        let content = r#"---
id: test_prompt
version: 2
task_type: text
---

Answer {{question}} briefly.
"#;

        let (metadata, body) = parse_prompt(content).unwrap();
        assert_eq!(metadata.id, "test_prompt");
        assert_eq!(metadata.version, 2);
        assert_eq!(metadata.task_type, "text");
        assert_eq!(body, "Answer {{question}} briefly.");
    }

    #[test]
    fn test_parse_prompt_requires_frontmatter() {
        assert!(parse_prompt("Just a prompt").is_err());
        assert!(parse_prompt("---\nid: x\nversion: 1\n").is_err());
    }

    #[test]
    fn test_render_inserts_values_verbatim() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::FinanceQa).unwrap();

        let mut vars = HashMap::new();
        vars.insert("question", "Is {{this}} a *fair* rent?");
        let rendered = prompt.render(&vars);

        assert!(rendered.contains("Is {{this}} a *fair* rent?"));
        assert!(rendered.contains("Give one practical tip if possible."));
        assert!(!rendered.contains("{{question}}"));
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let (metadata, content) =
            parse_prompt("---\nid: t\nversion: 1\ntask_type: text\n---\nA={{a}} B={{b}} C={{c}}")
                .unwrap();
        let prompt = Prompt {
            metadata,
            content,
            is_override: false,
            override_path: None,
        };

        let mut vars = HashMap::new();
        vars.insert("a", "{{b}}");
        vars.insert("b", "two");
        assert_eq!(prompt.render(&vars), "A={{b}} B=two C={{c}}");
    }

    #[test]
    fn test_savings_prompt_has_both_placeholders() {
        let mut lib = PromptLibrary::embedded_only();
        let prompt = lib.get(PromptId::SavingsAdvice).unwrap();
        assert!(prompt.content.contains("{{budget_info}}"));
        assert!(prompt.content.contains("{{web_tips}}"));
        assert!(prompt.content.contains("3 to 5"));
    }

    #[test]
    fn test_default_prompts_parse() {
        for id in PromptId::all() {
            let (metadata, _) = parse_prompt(id.default_content())
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", id.as_str(), e));
            assert_eq!(metadata.id, id.as_str());
        }
    }

    #[test]
    fn test_prompt_library_embedded() {
        let mut lib = PromptLibrary::embedded_only();
        for id in PromptId::all() {
            let prompt = lib.get(*id).unwrap();
            assert!(!prompt.is_override);
        }
        assert!(lib.list().iter().all(|p| !p.has_override));
    }

    #[test]
    fn test_override_takes_precedence() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("finance_qa.md"),
            "---\nid: finance_qa\nversion: 9\ntask_type: text\n---\nShort answer: {{question}}",
        )
        .unwrap();

        let mut lib = PromptLibrary::with_override_dir(dir.path().to_path_buf());
        let prompt = lib.get(PromptId::FinanceQa).unwrap();
        assert!(prompt.is_override);
        assert_eq!(prompt.metadata.version, 9);
        assert_eq!(prompt.content, "Short answer: {{question}}");

        let listed = lib.list();
        let qa = listed.iter().find(|p| p.id == "finance_qa").unwrap();
        assert!(qa.has_override);
        let advice = listed.iter().find(|p| p.id == "savings_advice").unwrap();
        assert!(!advice.has_override);
    }

    #[test]
    fn test_prompt_id_from_str() {
        assert_eq!("image_qa".parse::<PromptId>().unwrap(), PromptId::ImageQa);
        assert!("unknown".parse::<PromptId>().is_err());
    }
}
