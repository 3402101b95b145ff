//! Inline token arrays - small arrays whose values are written directly
//! into the document as whitespace-separated tokens.

use serde::{Deserialize, Serialize};

use super::Values;
use crate::util::{ElementKind, Error, Result};

/// Values embedded directly in the array descriptor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InlineArray {
    pub values: Values,
}

impl InlineArray {
    pub fn new(values: Values) -> Self {
        Self { values }
    }

    /// Parse whitespace-separated tokens as values of `kind`.
    pub fn parse(kind: ElementKind, text: &str) -> Result<Self> {
        let tokens = text.split_whitespace();
        let values = match kind {
            ElementKind::Boolean => Values::Boolean(tokens.map(parse_bool).collect::<Result<_>>()?),
            ElementKind::Integer => Values::Integer(
                tokens
                    .map(|t| t.parse::<i64>().map_err(|_| invalid(t, kind)))
                    .collect::<Result<_>>()?,
            ),
            ElementKind::Float => Values::Float(tokens.map(parse_float).collect::<Result<_>>()?),
            ElementKind::String => Values::String(tokens.map(str::to_string).collect()),
        };
        Ok(Self { values })
    }

    /// Serialize as whitespace-separated tokens.
    ///
    /// Strings that are empty or contain whitespace have no token form and
    /// fail with [`Error::InvalidToken`].
    pub fn to_tokens(&self) -> Result<String> {
        Ok(match &self.values {
            Values::Boolean(v) => join(v.iter().map(|b| b.to_string())),
            Values::Integer(v) => join(v.iter().map(|x| x.to_string())),
            Values::Float(v) => join(v.iter().map(|&x| format_float(x))),
            Values::String(v) => {
                let no_token = |t: &&String| t.is_empty() || t.contains(char::is_whitespace);
                if let Some(bad) = v.iter().find(no_token) {
                    return Err(Error::InvalidToken(format!(
                        "string {:?} cannot be written as a single token",
                        bad
                    )));
                }
                v.join(" ")
            }
        })
    }
}

fn join(tokens: impl Iterator<Item = String>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn invalid(token: &str, kind: ElementKind) -> Error {
    Error::InvalidToken(format!("'{}' is not a valid {}", token, kind))
}

fn parse_bool(token: &str) -> Result<bool> {
    match token {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(invalid(token, ElementKind::Boolean)),
    }
}

fn parse_float(token: &str) -> Result<f64> {
    match token {
        "NaN" => Ok(f64::NAN),
        "INF" | "+INF" => Ok(f64::INFINITY),
        "-INF" => Ok(f64::NEG_INFINITY),
        _ => token
            .parse::<f64>()
            .ok()
            .filter(|x| x.is_finite())
            .ok_or_else(|| invalid(token, ElementKind::Float)),
    }
}

fn format_float(x: f64) -> String {
    if x.is_nan() {
        "NaN".to_string()
    } else if x == f64::INFINITY {
        "INF".to_string()
    } else if x == f64::NEG_INFINITY {
        "-INF".to_string()
    } else {
        x.to_string()
    }
}
