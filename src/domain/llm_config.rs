use serde::{Deserialize, Serialize};

/// Remote text-generation settings. Credential presence decides at engine
/// construction whether analysis uses the hosted model or canned responses;
/// nothing inside the analysis core reads the environment.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/models".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
            max_tokens: None,
            temperature: None,
        }
    }
}

impl LLMConfig {
    pub fn has_credentials(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|key| !key.trim().is_empty())
            .unwrap_or(false)
    }
}
