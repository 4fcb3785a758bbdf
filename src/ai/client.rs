use std::{collections::BTreeMap, time::Duration};

use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::AiConfig;

pub(crate) const CHAT_COMPLETIONS: &str = "/v1/chat/completions";
const IMAGE_GENERATIONS: &str = "/v1/images/generations";
const SYSTEM_TEACHER: &str = "You are an experienced teacher.";

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("ai request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("ai service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("ai response could not be decoded: {0}")]
    Decode(String),
}

/// Thin client for an OpenAI-compatible completion API.
pub struct AiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl AiClient {
    pub fn new(cfg: &AiConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }

    #[instrument(skip(self, body), fields(base_url = %self.base_url))]
    pub(crate) async fn post(&self, endpoint: &str, body: &Value) -> Result<Value, AiError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = resp
            .json::<Value>()
            .await
            .map_err(|e| AiError::Decode(e.to_string()))?;
        debug!(%endpoint, "ai response received");
        Ok(value)
    }

    pub(crate) fn chat_body(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": prompt},
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        })
    }

    async fn chat(
        &self,
        system: &str,
        prompt: &str,
        temperature: f32,
        max_tokens: u32,
    ) -> Result<Value, AiError> {
        let body = self.chat_body(system, prompt, temperature, max_tokens);
        self.post(CHAT_COMPLETIONS, &body).await
    }

    pub async fn generate_lesson(
        &self,
        topic: &str,
        template_type: &str,
        extra: &BTreeMap<String, String>,
    ) -> Result<Value, AiError> {
        let prompt = with_requirements(
            format!(
                "Write a complete lesson plan on the topic below using the {template_type} template.\nTopic: {topic}"
            ),
            extra,
        );
        self.chat(
            &format!("{SYSTEM_TEACHER} You write high-quality lesson plans."),
            &prompt,
            0.7,
            2000,
        )
        .await
    }

    pub async fn expand_lesson(
        &self,
        content: &str,
        extra: &BTreeMap<String, String>,
    ) -> Result<Value, AiError> {
        let prompt = with_requirements(
            format!("Expand the following lesson plan content:\n{content}"),
            extra,
        );
        self.chat(
            &format!("{SYSTEM_TEACHER} You expand and complete lesson plans."),
            &prompt,
            0.7,
            1000,
        )
        .await
    }

    pub async fn optimize_lesson(&self, content: &str, style: &str) -> Result<Value, AiError> {
        let prompt = format!(
            "Improve the following lesson plan so that its style is more {style} and its structure clearer:\n{content}"
        );
        self.chat(
            &format!("{SYSTEM_TEACHER} You polish the style and logic of lesson plans."),
            &prompt,
            0.7,
            2000,
        )
        .await
    }

    pub async fn summarize_lesson(&self, content: &str) -> Result<Value, AiError> {
        let prompt = format!("Summarize the following lesson plan in about 100 words:\n{content}");
        self.chat(
            &format!("{SYSTEM_TEACHER} You distill the core of a lesson plan."),
            &prompt,
            0.5,
            200,
        )
        .await
    }

    pub async fn generate_question(
        &self,
        knowledge_point: &str,
        difficulty: &str,
        count: u32,
    ) -> Result<Value, AiError> {
        let prompt = format!(
            "Write {count} {difficulty} questions with options and answers for this knowledge point:\n{knowledge_point}"
        );
        self.chat(
            &format!("{SYSTEM_TEACHER} You write good questions for a given knowledge point."),
            &prompt,
            0.7,
            1500,
        )
        .await
    }

    pub async fn analyze_question(&self, question: &str) -> Result<Value, AiError> {
        let prompt = format!(
            "Explain the following question in detail: what it tests, how to solve it and common mistakes:\n{question}"
        );
        self.chat(
            &format!("{SYSTEM_TEACHER} You explain questions of every kind."),
            &prompt,
            0.7,
            1000,
        )
        .await
    }

    pub async fn generate_image(&self, prompt: &str, style: &str) -> Result<Value, AiError> {
        let body = json!({
            "prompt": format!("{prompt}, style: {style}"),
            "n": 1,
            "size": "1024x1024",
        });
        self.post(IMAGE_GENERATIONS, &body).await
    }

    pub async fn generate_board(&self, content: &str) -> Result<Value, AiError> {
        let body = json!({
            "prompt": format!("Hand-drawn chalk on blackboard, clearly structured, content: {content}"),
            "n": 1,
            "size": "1024x1024",
        });
        self.post(IMAGE_GENERATIONS, &body).await
    }

    pub async fn parse_document(&self, file_url: &str) -> Result<Value, AiError> {
        let body = json!({ "file_url": file_url, "output_format": "json" });
        self.post("/v1/documents/parse", &body).await
    }

    pub async fn generate_ppt(&self, lesson_content: &str) -> Result<Value, AiError> {
        let body = json!({ "lesson_content": lesson_content, "template": "standard" });
        self.post("/v1/ppt/generate", &body).await
    }
}

fn with_requirements(mut prompt: String, extra: &BTreeMap<String, String>) -> String {
    if !extra.is_empty() {
        prompt.push_str("\nAdditional requirements: ");
        for (key, value) in extra {
            prompt.push_str(&format!("{key}: {value}; "));
        }
    }
    prompt
}

/// `choices[0].message.content` of a chat completion.
pub(crate) fn completion_content(response: &Value) -> Option<&str> {
    response
        .get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
}

#[cfg(test)]
pub(crate) fn test_client(base_url: &str) -> AiClient {
    AiClient::new(&AiConfig {
        api_key: "test-key".into(),
        base_url: base_url.into(),
        model: "test-model".into(),
        timeout_secs: 5,
    })
    .expect("client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{body_partial_json, header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[tokio::test]
    async fn chat_forwards_model_prompt_and_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({"model": "test-model", "max_tokens": 200})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "A short summary."}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&format!("{}/", server.uri()));
        let response = client.summarize_lesson("Photosynthesis").await.unwrap();
        assert_eq!(completion_content(&response), Some("A short summary."));
    }

    #[tokio::test]
    async fn image_generation_uses_images_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/images/generations"))
            .and(body_partial_json(json!({"n": 1, "size": "1024x1024"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": [{"url": "https://img.example/1.png"}]
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let response = client.generate_board("Newton's first law").await.unwrap();
        assert_eq!(response["data"][0]["url"], "https://img.example/1.png");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client
            .generate_question("fractions", "medium", 5)
            .await
            .unwrap_err();
        match err {
            AiError::Status { status, body } => {
                assert_eq!(status, 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.parse_document("https://x/doc.pdf").await.unwrap_err();
        assert!(matches!(err, AiError::Decode(_)));
    }

    #[test]
    fn extra_requirements_are_appended_in_order() {
        let mut extra = BTreeMap::new();
        extra.insert("grade".to_string(), "7".to_string());
        extra.insert("duration".to_string(), "45 minutes".to_string());
        let prompt = with_requirements("Base".into(), &extra);
        assert_eq!(
            prompt,
            "Base\nAdditional requirements: duration: 45 minutes; grade: 7; "
        );
        assert_eq!(with_requirements("Base".into(), &BTreeMap::new()), "Base");
    }
}
