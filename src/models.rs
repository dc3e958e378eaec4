use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::ApiError;

/// Highest number of goals accepted for either side.
pub const MAX_GOALS: i64 = 20;

// Login body: {nome, codigo}
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub name: String,
    pub code: String,
}

// Login success response
#[derive(Serialize, Debug)]
pub struct LoginResponse {
    pub success: bool,
    pub nome: String,
    pub token: String,
    pub message: &'static str,
}

// One guess for a game, as {golsA, golsB}
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Guess {
    #[serde(rename = "golsA")]
    pub goals_home: u8,
    #[serde(rename = "golsB")]
    pub goals_away: u8,
}

// Save body once validated. The client's `token` field is ignored.
#[derive(Debug, Clone)]
pub struct SaveRequest {
    pub participant: String,
    pub guesses: BTreeMap<String, Guess>,
}

// Payload forwarded to the Apps Script
#[derive(Serialize, Debug)]
pub struct ForwardPayload<'a> {
    pub participante: &'a str,
    pub palpites: &'a BTreeMap<String, Guess>,
}

// Save success response
#[derive(Serialize, Debug)]
pub struct SaveResponse {
    pub success: bool,
    pub message: &'static str,
    pub count: usize,
}

fn body_object(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => {
            tracing::error!(kind = json_kind(&other), "request body is not a JSON object");
            Err(ApiError::InternalError)
        }
        Err(e) => {
            tracing::error!(error = %e, "malformed request body");
            Err(ApiError::InternalError)
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// Non-empty string field, anything else counts as absent
fn required_str(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

// JSON values a browser client would treat as "not provided"
fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        _ => false,
    }
}

impl LoginRequest {
    pub fn parse(body: &[u8]) -> Result<Self, ApiError> {
        let map = body_object(body)?;

        match (required_str(&map, "nome"), required_str(&map, "codigo")) {
            (Some(name), Some(code)) => Ok(Self { name, code }),
            _ => Err(ApiError::MissingField),
        }
    }
}

// Integers, and floats with no fractional part (`1.0`)
fn whole_number(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_GOALS as f64)
            .map(|f| f as i64)
    })
}

impl Guess {
    /// Reads `{golsA, golsB}`, both whole numbers in `0..=MAX_GOALS`.
    pub fn from_value(value: &Value) -> Result<Self, ApiError> {
        let goals = |key: &str| {
            value
                .get(key)
                .and_then(whole_number)
                .filter(|g| (0..=MAX_GOALS).contains(g))
                .map(|g| g as u8)
                .ok_or(ApiError::InvalidGuessValue)
        };

        Ok(Self {
            goals_home: goals("golsA")?,
            goals_away: goals("golsB")?,
        })
    }
}

impl SaveRequest {
    /// Validates presence, shape, cardinality and every guess, in that order.
    pub fn parse(body: &[u8], max_guesses: usize) -> Result<Self, ApiError> {
        let mut map = body_object(body)?;

        let Some(participant) = required_str(&map, "participante") else {
            return Err(ApiError::InvalidInput);
        };
        if is_blank(map.get("palpites")) {
            return Err(ApiError::InvalidInput);
        }

        let guesses = match map.remove("palpites") {
            Some(Value::Object(guesses)) => guesses,
            _ => return Err(ApiError::InvalidFormat),
        };

        if guesses.len() > max_guesses {
            return Err(ApiError::TooManyGuesses);
        }

        let guesses = guesses
            .into_iter()
            .map(|(game, value)| Guess::from_value(&value).map(|guess| (game, guess)))
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        Ok(Self {
            participant,
            guesses,
        })
    }

    pub fn count(&self) -> usize {
        self.guesses.len()
    }

    pub fn forward_payload(&self) -> ForwardPayload<'_> {
        ForwardPayload {
            participante: &self.participant,
            palpites: &self.guesses,
        }
    }
}
