use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

fn default_template() -> String {
    "standard".into()
}

fn default_style() -> String {
    "rigorous".into()
}

fn default_image_style() -> String {
    "illustration".into()
}

fn default_difficulty() -> String {
    "medium".into()
}

fn default_count() -> u32 {
    5
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateLessonRequest {
    #[validate(length(min = 1, message = "topic is required"))]
    pub topic: String,
    #[serde(default = "default_template")]
    pub template_type: String,
    /// Free-form extra requirements, e.g. grade or duration.
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ExpandLessonRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OptimizeLessonRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
    #[serde(default = "default_style")]
    pub style: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LessonContentRequest {
    #[validate(length(min = 1, message = "content is required"))]
    pub content: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ParseLessonRequest {
    #[validate(url(message = "file_url must be a valid URL"))]
    pub file_url: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateQuestionRequest {
    #[validate(length(min = 1, message = "knowledge_point is required"))]
    pub knowledge_point: String,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_count")]
    #[validate(range(min = 1, max = 50, message = "count must be between 1 and 50"))]
    pub count: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AnalyzeQuestionRequest {
    #[validate(length(min = 1, message = "question is required"))]
    pub question: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateImageRequest {
    #[validate(length(min = 1, message = "prompt is required"))]
    pub prompt: String,
    #[serde(default = "default_image_style")]
    pub style: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GeneratePptRequest {
    #[validate(length(min = 1, message = "lesson_content is required"))]
    pub lesson_content: String,
}
