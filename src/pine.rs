//! Deterministic Pine Script rendering from a condition-based template.
//!
//! Unlike the pipeline's script stage this involves no model call: each
//! condition maps onto one boolean expression and each known indicator onto a
//! fixed declaration.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy described as indicator comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PineTemplate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub timeframe: String,
    pub conditions: TemplateConditions,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConditions {
    #[serde(default)]
    pub entry: Vec<Condition>,
    #[serde(default)]
    pub exit: Vec<Condition>,
}

/// `<indicator> <operator> <value>`, e.g. `rsi < 30`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub indicator: String,
    pub operator: Operator,
    pub value: ConditionValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
            Operator::Eq => "==",
            Operator::Ne => "!=",
        };
        f.write_str(symbol)
    }
}

/// Right-hand side of a condition: numbers render bare, text quoted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionValue::Number(n) => write!(f, "{n}"),
            ConditionValue::Text(s) => write!(f, "{}", PineString(s)),
        }
    }
}

/// Pine string literal: double-quoted, with `\`, `"` and line breaks escaped.
/// Everything else, non-ASCII included, is written as is.
struct PineString<'a>(&'a str);

impl fmt::Display for PineString<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for ch in self.0.chars() {
            match ch {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                '\r' => {}
                _ => write!(f, "{ch}")?,
            }
        }
        f.write_str("\"")
    }
}

/// Declaration for a known indicator; unknown names declare nothing.
fn indicator_declaration(indicator: &str) -> Option<&'static str> {
    match indicator.to_ascii_lowercase().as_str() {
        "rsi" => Some("rsi = ta.rsi(close, 14)"),
        "sma" => Some("sma = ta.sma(close, 20)"),
        "ema" => Some("ema = ta.ema(close, 20)"),
        "macd" => Some(
            "[macdLine, signalLine, histLine] = ta.macd(close, 12, 26, 9)\nmacdHistogram = histLine",
        ),
        "bollinger" => Some(
            "[middle, upper, lower] = ta.bb(close, 20, 2)\nbbWidth = (upper - lower) / middle",
        ),
        _ => None,
    }
}

/// Declarations for every indicator the template uses, first use first.
fn render_indicators(template: &PineTemplate) -> String {
    let mut declarations: Vec<&'static str> = Vec::new();
    for condition in template.conditions.entry.iter().chain(&template.conditions.exit) {
        if let Some(decl) = indicator_declaration(&condition.indicator) {
            if !declarations.contains(&decl) {
                declarations.push(decl);
            }
        }
    }
    declarations.join("\n")
}

fn render_conditions(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return "false".to_string();
    }
    conditions
        .iter()
        .map(|c| {
            format!(
                "{} {} {}",
                c.indicator.to_ascii_lowercase(),
                c.operator,
                c.value
            )
        })
        .collect::<Vec<_>>()
        .join(" and ")
}

/// Render a complete Pine Script v5 long-only strategy.
pub fn render_pine_script(template: &PineTemplate) -> String {
    let script = format!(
        r#"
//@version=5
strategy({name}, overlay=true)

// Input parameters
timeframe = {timeframe}

// Calculate indicators
{indicators}

// Entry conditions
longCondition = {entry}

// Exit conditions
exitCondition = {exit}

// Strategy execution
if (longCondition)
    strategy.entry("Long", strategy.long)

if (exitCondition)
    strategy.close("Long")

// Plot signals
plotshape(longCondition, "Long Entry", shape.triangleup, location.belowbar, color.green, size=size.small)
plotshape(exitCondition, "Exit", shape.triangledown, location.abovebar, color.red, size=size.small)
"#,
        name = PineString(&template.name),
        timeframe = PineString(&template.timeframe),
        indicators = render_indicators(template),
        entry = render_conditions(&template.conditions.entry),
        exit = render_conditions(&template.conditions.exit),
    );
    script.trim().to_string()
}
