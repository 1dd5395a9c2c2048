use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Agent,
}

/// One part of a message: free text, structured data, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            data: None,
        }
    }

    pub fn data(data: Value) -> Self {
        Self {
            text: None,
            data: Some(data),
        }
    }
}

/// A2A message envelope. `context_id` correlates messages belonging to one
/// conversation; `task_id` correlates a reply with the request that caused it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message_id: Uuid,
    pub role: Role,
    pub parts: Vec<Part>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl Message {
    /// Build an agent-role reply carrying a single data part.
    pub fn agent_data(
        data: Value,
        context_id: Option<String>,
        task_id: Option<String>,
    ) -> Self {
        Self {
            message_id: Uuid::new_v4(),
            role: Role::Agent,
            parts: vec![Part::data(data)],
            context_id,
            task_id,
        }
    }

    /// The structured data of the first part, if any.
    pub fn first_data(&self) -> Option<&Value> {
        self.parts.first().and_then(|part| part.data.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_message_with_data_part() {
        let message = Message::agent_data(
            serde_json::json!({"approved": true, "reason": "ok"}),
            Some("ctx-1".to_string()),
            Some("task-1".to_string()),
        );

        let json = serde_json::to_string(&message).unwrap();
        let deserialized: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(message, deserialized);
        assert_eq!(deserialized.role, Role::Agent);
    }

    #[test]
    fn first_data_skips_missing() {
        let message = Message {
            message_id: Uuid::new_v4(),
            role: Role::User,
            parts: vec![],
            context_id: None,
            task_id: None,
        };
        assert!(message.first_data().is_none());
    }

    #[test]
    fn role_serialization() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Agent).unwrap(), "\"agent\"");
    }
}
