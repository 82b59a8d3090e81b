//! Assistant facade
//!
//! Bundles the collaborators, the prompt library and the advisor settings so
//! the CLI and server can call the orchestrators with one handle.

use std::sync::{Arc, RwLock};

use crate::advisor::{self, AdvisorSettings};
use crate::ai::{AIClient, TextGenerator, VisionGenerator};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AdvisoryReport, Expense};
use crate::prompts::{Prompt, PromptId, PromptLibrary};
use crate::qa;
use crate::search::{SearchClient, WebSearch};

#[derive(Clone)]
pub struct Assistant {
    llm: Arc<dyn TextGenerator>,
    vision: Arc<dyn VisionGenerator>,
    search: Arc<dyn WebSearch>,
    prompts: Arc<RwLock<PromptLibrary>>,
    settings: AdvisorSettings,
}

impl Assistant {
    /// Build from arbitrary collaborators (embedded prompts, default settings)
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        vision: Arc<dyn VisionGenerator>,
        search: Arc<dyn WebSearch>,
    ) -> Self {
        Self {
            llm,
            vision,
            search,
            prompts: Arc::new(RwLock::new(PromptLibrary::embedded_only())),
            settings: AdvisorSettings::default(),
        }
    }

    /// Build from configured clients; one AI client serves text and vision
    pub fn from_clients(ai: AIClient, search: SearchClient, config: &Config) -> Self {
        let ai = Arc::new(ai);
        Self {
            llm: ai.clone(),
            vision: ai,
            search: Arc::new(search),
            prompts: Arc::new(RwLock::new(PromptLibrary::new())),
            settings: AdvisorSettings::from(config),
        }
    }

    /// Build from configuration and environment credentials
    pub fn from_config(config: &Config) -> Result<Self> {
        let ai = AIClient::from_config(&config.ai).ok_or_else(|| {
            Error::Config(format!(
                "AI backend '{}' is not configured (missing credentials)",
                config.ai.backend
            ))
        })?;
        let search = SearchClient::from_config(&config.search);
        Ok(Self::from_clients(ai, search, config))
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(RwLock::new(prompts));
        self
    }

    pub fn with_settings(mut self, settings: AdvisorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &AdvisorSettings {
        &self.settings
    }

    /// Clone a prompt out of the library so no lock is held across an await
    fn prompt(&self, id: PromptId) -> Result<Prompt> {
        let mut prompts = self
            .prompts
            .write()
            .map_err(|_| Error::InvalidData("Prompt library lock poisoned".into()))?;
        prompts.get(id).cloned()
    }

    pub async fn advise(&self, expenses: &[Expense]) -> Result<AdvisoryReport> {
        let template = self.prompt(PromptId::SavingsAdvice)?;
        advisor::advise(
            expenses,
            self.llm.as_ref(),
            self.search.as_ref(),
            &template,
            &self.settings,
        )
        .await
    }

    pub async fn answer(&self, question: &str) -> Result<String> {
        let template = self.prompt(PromptId::FinanceQa)?;
        qa::answer(question, self.llm.as_ref(), &template).await
    }

    pub async fn answer_with_image(&self, question: &str, image: &[u8]) -> Result<String> {
        let template = self.prompt(PromptId::ImageQa)?;
        qa::answer_with_image(question, image, self.vision.as_ref(), &template).await
    }
}
