//! Strategy shapes exchanged with the model and the client.

pub mod prompts;

use crate::completion::ChatMessage;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Stage-1 breakdown of a natural-language strategy.
///
/// Every field is required when decoding model output; unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyAnalysis {
    pub entry_conditions: Vec<String>,
    pub exit_conditions: Vec<String>,
    pub risk_management: Vec<String>,
    pub position_sizing: Vec<String>,
    pub indicators: Vec<String>,
    pub timeframe: String,
    pub trading_pairs: Vec<String>,
}

/// Named strategy summary returned by the single-call conversation mode.
///
/// Models fill these loosely: missing, `null` or oddly typed fields fall back
/// to empty instead of failing the whole reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOutline {
    #[serde(deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(deserialize_with = "lenient_string")]
    pub description: String,
    #[serde(deserialize_with = "lenient_string")]
    pub timeframe: String,
    #[serde(deserialize_with = "lenient_conditions")]
    pub conditions: OutlineConditions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConditions {
    #[serde(deserialize_with = "lenient_strings")]
    pub entry: Vec<String>,
    #[serde(deserialize_with = "lenient_strings")]
    pub exit: Vec<String>,
}

/// Structured single-call answer: an object `strategy` and a string `pineScript`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyReply {
    #[serde(deserialize_with = "outline_object")]
    pub strategy: StrategyOutline,
    #[serde(rename = "pineScript")]
    pub pine_script: String,
}

/// Scalars become text; `null`, arrays and objects become empty.
fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// A list keeps its scalar items; a lone scalar becomes a one-item list.
fn lenient_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    })
}

fn lenient_conditions<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<OutlineConditions, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        _ => Ok(OutlineConditions::default()),
    }
}

fn outline_object<'de, D: Deserializer<'de>>(deserializer: D) -> Result<StrategyOutline, D::Error> {
    match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).map_err(D::Error::custom),
        other => Err(D::Error::custom(format!(
            "strategy must be an object, got {other}"
        ))),
    }
}

/// One turn of a conversation, owned and resent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<StrategyAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pine_script: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contract_code: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl From<&ChatTurn> for ChatMessage {
    fn from(turn: &ChatTurn) -> Self {
        match turn.role {
            TurnRole::User => ChatMessage::user(&turn.content),
            TurnRole::Assistant => ChatMessage::assistant(&turn.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::ChatMessageRole;
    use crate::normalize::{normalize, Normalized};
    use serde_json::json;

    #[test]
    fn analysis_uses_camel_case_keys() {
        let analysis = StrategyAnalysis {
            entry_conditions: vec!["RSI < 30".into()],
            exit_conditions: vec![],
            risk_management: vec!["2% stop".into()],
            position_sizing: vec![],
            indicators: vec!["RSI".into()],
            timeframe: "1D".into(),
            trading_pairs: vec!["BTCUSDT".into()],
        };
        let value = serde_json::to_value(&analysis).unwrap();
        assert_eq!(value["entryConditions"], json!(["RSI < 30"]));
        assert_eq!(value["riskManagement"], json!(["2% stop"]));
        assert_eq!(value["tradingPairs"], json!(["BTCUSDT"]));
        assert_eq!(value["timeframe"], "1D");
    }

    #[test]
    fn analysis_requires_every_field() {
        let partial = json!({"entryConditions": [], "indicators": ["RSI"]});
        assert!(serde_json::from_value::<StrategyAnalysis>(partial).is_err());
    }

    #[test]
    fn reply_requires_both_keys_but_outline_is_lenient() {
        let reply: StrategyReply = serde_json::from_value(json!({
            "strategy": {"name": "Dip buyer", "conditions": {"entry": ["RSI < 30"]}},
            "pineScript": "//@version=5"
        }))
        .unwrap();
        assert_eq!(reply.strategy.name, "Dip buyer");
        assert_eq!(reply.strategy.conditions.entry, vec!["RSI < 30"]);
        assert!(reply.strategy.conditions.exit.is_empty());

        assert!(serde_json::from_value::<StrategyReply>(json!({"strategy": {}})).is_err());
        assert!(serde_json::from_value::<StrategyReply>(json!({"pineScript": ""})).is_err());
    }

    #[test]
    fn outline_tolerates_null_and_mistyped_fields() {
        let reply: StrategyReply = serde_json::from_value(json!({
            "strategy": {
                "name": "RSI dip",
                "description": null,
                "timeframe": 60,
                "conditions": {"entry": ["RSI < 30", null, 5], "exit": "RSI > 70"}
            },
            "pineScript": "//@version=5"
        }))
        .unwrap();
        assert_eq!(reply.strategy.name, "RSI dip");
        assert_eq!(reply.strategy.description, "");
        assert_eq!(reply.strategy.timeframe, "60");
        assert_eq!(reply.strategy.conditions.entry, vec!["RSI < 30", "5"]);
        assert_eq!(reply.strategy.conditions.exit, vec!["RSI > 70"]);

        let reply: StrategyReply = serde_json::from_value(json!({
            "strategy": {"name": ["x"], "conditions": null},
            "pineScript": ""
        }))
        .unwrap();
        assert_eq!(reply.strategy, StrategyOutline::default());
    }

    #[test]
    fn mistyped_outline_still_normalizes_as_structured() {
        let raw = r#"{"strategy":{"name":"RSI dip","description":null,"timeframe":60,"conditions":{"entry":["RSI < 30"],"exit":[]}},"pineScript":"//@version=5"}"#;
        match normalize::<StrategyReply>(raw) {
            Normalized::Structured(reply) => {
                assert_eq!(reply.strategy.name, "RSI dip");
                assert_eq!(reply.pine_script, "//@version=5");
            }
            other => panic!("expected structured reply, got {other:?}"),
        }
    }

    #[test]
    fn reply_still_requires_object_strategy_and_string_script() {
        assert!(serde_json::from_value::<StrategyReply>(json!({
            "strategy": "RSI dip", "pineScript": "//"
        }))
        .is_err());
        assert!(serde_json::from_value::<StrategyReply>(json!({
            "strategy": [], "pineScript": "//"
        }))
        .is_err());
        assert!(serde_json::from_value::<StrategyReply>(json!({
            "strategy": {}, "pineScript": 5
        }))
        .is_err());
    }

    #[test]
    fn chat_turn_attachments_are_optional() {
        let turn: ChatTurn =
            serde_json::from_value(json!({"role": "assistant", "content": "done", "pineScript": "//"}))
                .unwrap();
        assert_eq!(turn.role, TurnRole::Assistant);
        assert_eq!(turn.pine_script.as_deref(), Some("//"));
        assert!(turn.analysis.is_none());

        let message = ChatMessage::from(&turn);
        assert_eq!(message.role(), ChatMessageRole::Assistant);
        assert_eq!(message.content(), "done");
    }
}
