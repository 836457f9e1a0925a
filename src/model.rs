//! Data models for the training backend's request and response shapes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Originator of a conversation turn.
///
/// Serialized as the literal strings `"user"` / `"ai"` the backend expects.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

/// One historical message in a conversation, tagged by originator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
        }
    }
}

/// Body of a chat send, streaming or not.
///
/// `history` is relayed to the backend in the exact order the turns
/// occurred.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: i64,
    pub prompt: String,
    pub history: Vec<Turn>,
}

impl ChatRequest {
    pub fn new(session_id: i64, prompt: impl Into<String>, history: Vec<Turn>) -> Self {
        Self {
            session_id,
            prompt: prompt.into(),
            history,
        }
    }
}

/// Reply of the non-streaming send endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TrainingReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
    #[serde(default)]
    pub child_reply: String,
    #[serde(default)]
    pub emotion_analysis: String,
    #[serde(default)]
    pub ai_guidance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl TrainingReply {
    /// Concatenate the reply sections into the single labeled block the
    /// streaming consumers render. Used when a failed stream is replayed
    /// through the non-streaming endpoint.
    pub fn to_labeled_text(&self) -> String {
        format!(
            "---儿童回复---\n{}\n---情感分析---\n{}\n---指导意见---\n{}",
            self.child_reply, self.emotion_analysis, self.ai_guidance
        )
    }
}

/// Scenario difficulty grades as the backend encodes them.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

/// A simulation scenario available for training.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub difficulty: Difficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<HashMap<String, Value>>,
}

/// Body for creating a custom training scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScenario {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_duration: u32,
}

/// A running training session as returned by the start endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<i64>,
    pub scenario_id: i64,
    #[serde(default)]
    pub session_status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default)]
    pub total_rounds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

/// Evaluation produced when a training session is ended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingEvaluation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub session_id: i64,
    pub overall_score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empathy_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub communication_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub problem_solving_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional_recognition_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strengths: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub areas_for_improvement: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_comprehensive_comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_serialize_to_backend_strings() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn chat_request_preserves_history_order() {
        let request = ChatRequest::new(7, "next?", vec![Turn::user("hi"), Turn::ai("hello")]);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["sessionId"], 7);
        assert_eq!(json["prompt"], "next?");
        let roles: Vec<&str> = json["history"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["role"].as_str().unwrap())
            .collect();
        assert_eq!(roles, vec!["user", "ai"]);
        assert_eq!(json["history"][0]["content"], "hi");
        assert_eq!(json["history"][1]["content"], "hello");
    }

    #[test]
    fn training_reply_deserializes_camel_case() {
        let reply: TrainingReply = serde_json::from_str(
            r#"{"sessionId":3,"childReply":"……嗯。","emotionAnalysis":"{}","aiGuidance":"保持倾听","timestamp":"2025-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(reply.session_id, Some(3));
        assert_eq!(reply.child_reply, "……嗯。");
        assert_eq!(reply.ai_guidance, "保持倾听");
    }

    #[test]
    fn labeled_block_joins_sections_in_order() {
        let reply = TrainingReply {
            child_reply: "a".into(),
            emotion_analysis: "b".into(),
            ai_guidance: "c".into(),
            ..Default::default()
        };
        assert_eq!(
            reply.to_labeled_text(),
            "---儿童回复---\na\n---情感分析---\nb\n---指导意见---\nc"
        );
    }

    #[test]
    fn difficulty_round_trips_uppercase() {
        let scenario: Scenario = serde_json::from_str(
            r#"{"id":1,"title":"孤独的留守儿童","type":"情感表达","description":"d","difficulty":"BASIC"}"#,
        )
        .unwrap();
        assert_eq!(scenario.difficulty, Difficulty::Basic);
    }
}
