use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::OllamaConfig;
use crate::error::AppError;
use crate::models::plan::ProposedChange;
use crate::services::plan_parser;

const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_LOGGED_CHARS: usize = 500;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Debug, Deserialize)]
struct TagModel {
    name: String,
}

pub fn build_plan_prompt(file_names: &[String], existing_folders: &[String]) -> String {
    let mut prompt = format!(
        "You are an AI file organization assistant. Your task is to organize the following \
         list of files into semantic folders.\nThe list of files is: {}.",
        file_names.join(", ")
    );
    if !existing_folders.is_empty() {
        prompt.push_str(&format!(
            "\nThe current folder already contains these subfolders: {}. You can suggest moving \
             files into these existing folders or creating new ones.",
            existing_folders.join(", ")
        ));
    }
    prompt.push_str(
        "\n\nRespond ONLY with a valid JSON array. Each object in the array represents a folder \
         (either new or existing) and the files that should be in it.\n\
         Each JSON object MUST have the following keys:\n\
         - \"folderName\": the name of the target folder. Use a descriptive name for a new \
         folder, or the exact name of an existing subfolder.\n\
         - \"filesToMove\": an array of exact filenames from the provided list that should be \
         moved into this folder.\n\
         - \"isNewFolder\": true if \"folderName\" is a new folder you are proposing, false if \
         it is one of the existing subfolders.\n\n\
         Do NOT include any explanations, introductory text, or markdown formatting outside of \
         the JSON array itself.\n\n\
         Example of a valid JSON response:\n\
         [\n  {\"folderName\": \"Project Reports Q3\", \"filesToMove\": [\"report_final_v2.docx\", \
         \"data_summary_q3.xlsx\"], \"isNewFolder\": true},\n  \
         {\"folderName\": \"Existing Folder/Images\", \"filesToMove\": [\"logo.png\", \
         \"banner_ad.jpg\"], \"isNewFolder\": false}\n]",
    );
    prompt
}

fn parse_generate_body(body: &str) -> Result<String, AppError> {
    let parsed: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AppError::Model(format!("unexpected generate response: {e}")))?;
    if !parsed.done {
        tracing::warn!("model reported an unfinished response");
    }
    Ok(parsed.response)
}

/// Character count and the leading part of a reply, for debug logs.
fn log_preview(text: &str) -> (usize, String) {
    (
        text.chars().count(),
        text.chars().take(MAX_LOGGED_CHARS).collect(),
    )
}

fn error_message(status: reqwest::StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(err) => format!("HTTP {status}: {}", err.error),
        Err(_) => format!("HTTP {status}: {body}"),
    }
}

/// Client for a local Ollama server.
pub struct OllamaClient {
    client: Client,
    config: OllamaConfig,
}

impl OllamaClient {
    pub fn new(config: OllamaConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.config.endpoint.trim_end_matches('/'))
    }

    /// True when the service answers `/api/tags` with 200.
    pub async fn check_availability(&self) -> bool {
        let result = self
            .client
            .get(self.url("tags"))
            .timeout(AVAILABILITY_TIMEOUT)
            .send()
            .await;
        match result {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(error = %e, endpoint = %self.config.endpoint, "ollama unreachable");
                false
            }
        }
    }

    pub async fn list_models(&self) -> Result<Vec<String>, AppError> {
        let response = self.client.get(self.url("tags")).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Model(error_message(status, &body)));
        }
        let tags: TagsResponse = serde_json::from_str(&body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Sends the raw prompt and returns the model's text.
    pub async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
        };
        let response = self
            .client
            .post(self.url("generate"))
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(AppError::Model(error_message(status, &body)));
        }

        let text = parse_generate_body(&body)?;
        let (chars, preview) = log_preview(&text);
        tracing::debug!(chars, %preview, "model response");
        Ok(text)
    }

    pub async fn propose_plan(
        &self,
        file_names: &[String],
        existing_folders: &[String],
    ) -> Result<Vec<ProposedChange>, AppError> {
        let prompt = build_plan_prompt(file_names, existing_folders);
        let text = self.generate(&prompt).await?;
        plan_parser::parse_plan(&text)
    }
}
