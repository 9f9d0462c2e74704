//! The genie: AI brainstorm/polish collaborator.
//!
//! Talks to the Gemini generateContent REST endpoint. Brainstorming never
//! fails from the caller's perspective: any network, quota or parse problem
//! yields the fixed "genie is sleeping" placeholder. Polishing propagates
//! failure instead so the caller can keep the original text untouched.

use std::time::Duration;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::json;

use crate::{BoardError, Config, Result};

const GENIE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// What the genie dreams up for a brainstorm request.
#[derive(Debug, Clone, Deserialize)]
pub struct BrainstormedCard {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl BrainstormedCard {
    /// The fixed placeholder substituted when the genie is unreachable.
    pub fn sleeping_genie() -> Self {
        BrainstormedCard {
            title: "Oops!".to_string(),
            content: "The creativity genie is sleeping. Try again later.".to_string(),
            tags: vec!["error".to_string(), "try-again".to_string()],
        }
    }
}

/// How the genie should rework a card's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolishMode {
    /// Fix grammar and spelling
    Fix,
    /// Expand on the thought with a sentence or two
    Expand,
    /// Rewrite with a playful tone
    Tone,
}

impl PolishMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fix" => Some(PolishMode::Fix),
            "expand" => Some(PolishMode::Expand),
            "tone" => Some(PolishMode::Tone),
            _ => None,
        }
    }

    fn prompt(self) -> &'static str {
        match self {
            PolishMode::Fix => "Fix grammar and spelling. Keep the markdown formatting.",
            PolishMode::Expand => "Expand on this thought with 1-2 sentences. Keep it informal.",
            PolishMode::Tone => "Rewrite this to sound more enthusiastic and playful.",
        }
    }
}

// Response shape of the generateContent endpoint, reduced to what we read
#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Client for the generative-text collaborator.
pub struct GenieClient {
    client: reqwest::Client,
    model: String,
    api_key: Option<String>,
}

impl GenieClient {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            model: config.genie_model.clone(),
            api_key: config.genie_api_key.clone(),
        }
    }

    /// Brainstorms a card about the given topic. Never fails: any error is
    /// converted into the sleeping-genie placeholder.
    pub async fn brainstorm(&self, topic: &str) -> BrainstormedCard {
        let topic = if topic.trim().is_empty() {
            "Something random and interesting"
        } else {
            topic
        };

        let prompt = format!(
            "Create a creative sticky note about: \"{}\". \
             Return a JSON object with 'title' (max 5 words), 'content' (max 20 words), \
             and 'tags' (array of 1-3 strings). Keep the tone playful and handwritten.",
            topic
        );

        match self.generate(&prompt, true).await {
            Ok(text) => match serde_json::from_str::<BrainstormedCard>(&text) {
                Ok(card) => card,
                Err(e) => {
                    warn!("Genie returned malformed JSON: {}", e);
                    BrainstormedCard::sleeping_genie()
                }
            },
            Err(e) => {
                warn!("Genie brainstorm failed: {}", e);
                BrainstormedCard::sleeping_genie()
            }
        }
    }

    /// Polishes text in the given mode. Failures propagate so the caller
    /// can leave the original text in place.
    pub async fn polish(&self, text: &str, mode: PolishMode) -> Result<String> {
        let prompt = format!("{}\n\nInput Text:\n{}", mode.prompt(), text);
        self.generate(&prompt, false).await
    }

    /// Sends one generateContent request and extracts the first candidate's
    /// text. With `json_response`, asks the model for a JSON mime type.
    async fn generate(&self, prompt: &str, json_response: bool) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| BoardError::GenieUnavailable {
                message: "No API key configured (set GEMINI_API_KEY)".to_string(),
            })?;

        let url = format!(
            "{}/{}:generateContent?key={}",
            GENIE_BASE_URL, self.model, api_key
        );

        let mut body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });
        if json_response {
            body["generationConfig"] = json!({ "responseMimeType": "application/json" });
        }

        debug!("Sending genie request, model: {}", self.model);
        let resp = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BoardError::GenieUnavailable {
                message: format!("Request failed: {}", e),
            })?;

        if !resp.status().is_success() {
            return Err(BoardError::GenieUnavailable {
                message: format!("HTTP {}", resp.status()),
            });
        }

        let parsed: GenerateResponse =
            resp.json().await.map_err(|e| BoardError::GenieUnavailable {
                message: format!("Malformed response: {}", e),
            })?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BoardError::GenieUnavailable {
                message: "Empty response".to_string(),
            })?;

        Ok(text)
    }
}
