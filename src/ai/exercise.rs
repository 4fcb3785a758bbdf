//! Structured exercise generation: the model is asked for JSON and its reply
//! is parsed into typed exercises.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::ai::client::{completion_content, AiClient, AiError, CHAT_COMPLETIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExerciseCategory {
    Choice,
    FillBlank,
    ShortAnswer,
    TrueFalse,
    Calculation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Basic,
    #[default]
    Medium,
    Hard,
    Challenge,
}

impl ExerciseCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            ExerciseCategory::Choice => "choice",
            ExerciseCategory::FillBlank => "fill_blank",
            ExerciseCategory::ShortAnswer => "short_answer",
            ExerciseCategory::TrueFalse => "true_false",
            ExerciseCategory::Calculation => "calculation",
        }
    }
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Basic => "basic",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
            Difficulty::Challenge => "challenge",
        }
    }
}

fn default_num_questions() -> u32 {
    10
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExerciseRequest {
    #[validate(length(min = 2, message = "subject must be at least 2 characters"))]
    pub subject: String,
    #[validate(length(min = 2, message = "topic must be at least 2 characters"))]
    pub topic: String,
    #[serde(default = "default_num_questions")]
    #[validate(range(min = 1, max = 50, message = "num_questions must be between 1 and 50"))]
    pub num_questions: u32,
    #[serde(default)]
    pub difficulty_target: Difficulty,
    /// Reference material the exercises must be grounded in.
    pub required_context: Option<String>,
    #[validate(length(min = 1, message = "target_categories must not be empty"))]
    pub target_categories: Option<Vec<ExerciseCategory>>,
    #[validate(range(min = 1, max = 180))]
    pub suggested_duration_minutes: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExerciseItem {
    pub question_id: String,
    pub question_text: String,
    pub category: ExerciseCategory,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    pub score: f64,
    pub correct_answer: String,
    pub answer_analysis: String,
    pub subject: String,
    pub topic: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub knowledge_tags: Vec<String>,
    #[serde(default)]
    pub suggested_time_minutes: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ExerciseSet {
    exercises: Vec<ExerciseItem>,
}

const EXERCISE_SCHEMA_HINT: &str = r#"{"exercises": [{"question_id": "1", "question_text": "...", "category": "choice|fill_blank|short_answer|true_false|calculation", "options": ["A. ...", "B. ..."] or null, "score": 5, "correct_answer": "...", "answer_analysis": "...", "subject": "...", "topic": "...", "difficulty": "basic|medium|hard|challenge", "knowledge_tags": ["..."], "suggested_time_minutes": 3 or null}]}"#;

pub(crate) fn build_prompts(req: &ExerciseRequest) -> (String, String) {
    let system = format!(
        "You are a subject teacher and an expert exam writer. Produce exactly {} structured exercises. \
         Reply with a single JSON object of this shape and nothing else: {EXERCISE_SCHEMA_HINT}",
        req.num_questions
    );

    let categories = match &req.target_categories {
        Some(list) => list.iter().map(|c| c.as_str()).collect::<Vec<_>>().join(", "),
        None => "any".to_string(),
    };
    let difficulty = req.difficulty_target.as_str();
    let context = req
        .required_context
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("No reference material was supplied; rely on general subject knowledge.");

    let mut user = format!(
        "Subject: {}\nTopic: {}\nCategories: {categories}\nDifficulty: {difficulty}\n",
        req.subject, req.topic
    );
    if let Some(minutes) = req.suggested_duration_minutes {
        user.push_str(&format!("Total time for the whole set: {minutes} minutes\n"));
    }
    user.push_str(&format!(
        "Reference material:\n---\n{context}\n---\nWrite {} exercises based on the material above.",
        req.num_questions
    ));
    (system, user)
}

/// Parses the model's JSON reply, keeping at most `limit` exercises.
pub(crate) fn parse_exercises(content: &str, limit: usize) -> Result<Vec<ExerciseItem>, AiError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();
    let mut set: ExerciseSet =
        serde_json::from_str(trimmed).map_err(|e| AiError::Decode(e.to_string()))?;
    set.exercises.truncate(limit);
    Ok(set.exercises)
}

impl AiClient {
    #[instrument(skip(self, req), fields(subject = %req.subject, n = req.num_questions))]
    pub async fn generate_exercises(
        &self,
        req: &ExerciseRequest,
    ) -> Result<Vec<ExerciseItem>, AiError> {
        let (system, user) = build_prompts(req);
        let mut body = self.chat_body(&system, &user, 0.7, 4000);
        body["response_format"] = json!({"type": "json_object"});

        let response = self.post(CHAT_COMPLETIONS, &body).await?;
        let content = completion_content(&response).ok_or_else(|| {
            warn!("completion had no message content");
            AiError::Decode("missing choices[0].message.content".into())
        })?;

        let exercises = parse_exercises(content, req.num_questions as usize)?;
        info!(count = exercises.len(), "exercises generated");
        Ok(exercises)
    }
}
