use serde_json::{Map, Value};

use crate::models::{Field, UserData};
use crate::services::ai::prompts::{extraction_request, EXTRACTION_PROMPT};
use crate::services::ai::{ChatProfile, LlmProvider, Message};

pub async fn extract_user_fields(
    llm: &dyn LlmProvider,
    message: &str,
    current: &UserData,
) -> Vec<(Field, String)> {
    let request = extraction_request(message, &current.known_fields());
    let messages = [Message {
        role: "user".to_string(),
        content: request,
    }];

    match llm
        .chat(ChatProfile::Extraction, EXTRACTION_PROMPT, &messages)
        .await
    {
        Ok(response) => parse_fields_response(&response),
        Err(e) => {
            tracing::error!(error = %e, "field extraction failed");
            Vec::new()
        }
    }
}

pub fn parse_fields_response(response: &str) -> Vec<(Field, String)> {
    match parse_object(response) {
        Some(object) => fields_from_object(object),
        None => {
            tracing::warn!("failed to parse extraction response as JSON, ignoring");
            Vec::new()
        }
    }
}

fn parse_object(response: &str) -> Option<Map<String, Value>> {
    if let Ok(Value::Object(map)) = serde_json::from_str(response) {
        return Some(map);
    }

    // Strip markdown code fences
    let trimmed = response.trim();
    let cleaned = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    let cleaned = cleaned.strip_suffix("```").unwrap_or(cleaned).trim();

    if let Ok(Value::Object(map)) = serde_json::from_str(cleaned) {
        return Some(map);
    }

    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str(&cleaned[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn fields_from_object(object: Map<String, Value>) -> Vec<(Field, String)> {
    let mut fields: Vec<(Field, String)> = Vec::new();
    for (key, value) in object {
        let Some(field) = Field::from_key(&key) else {
            tracing::debug!(key = %key, "dropping unknown extracted key");
            continue;
        };
        let value = match value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => continue,
        };
        if value.is_empty() || fields.iter().any(|(f, _)| *f == field) {
            continue;
        }
        fields.push((field, value));
    }
    fields
}
