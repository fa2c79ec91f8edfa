//! Named construction parameters.
//!
//! Games that can be built from a parameter bag validate it against the keys
//! they recognise: an unrecognised key, a missing key without a default, or a
//! value of the wrong type is a construction-time error.
//!
//! ```
//! use rust_efg::core::{GameParameter, GameParameters};
//!
//! let params = GameParameters::new().with("obstype", "reveal-numturns");
//! assert_eq!(params.get("obstype"), Some(&GameParameter::from("reveal-numturns")));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{GameError, Result};

/// A single parameter value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameParameter {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl GameParameter {
    fn type_name(&self) -> &'static str {
        match self {
            GameParameter::Bool(_) => "bool",
            GameParameter::Int(_) => "int",
            GameParameter::Double(_) => "double",
            GameParameter::String(_) => "string",
        }
    }
}

impl From<&str> for GameParameter {
    fn from(value: &str) -> Self {
        GameParameter::String(value.to_string())
    }
}

impl From<String> for GameParameter {
    fn from(value: String) -> Self {
        GameParameter::String(value)
    }
}

impl From<i64> for GameParameter {
    fn from(value: i64) -> Self {
        GameParameter::Int(value)
    }
}

impl From<f64> for GameParameter {
    fn from(value: f64) -> Self {
        GameParameter::Double(value)
    }
}

impl From<bool> for GameParameter {
    fn from(value: bool) -> Self {
        GameParameter::Bool(value)
    }
}

/// Ordered parameter bag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameParameters {
    values: BTreeMap<String, GameParameter>,
}

impl GameParameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter (builder style).
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<GameParameter>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<GameParameter>) {
        self.values.insert(key.into(), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&GameParameter> {
        self.values.get(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Fail on the first key not listed in `known`.
    pub fn check_known(&self, game: &str, known: &[&str]) -> Result<()> {
        match self.values.keys().find(|k| !known.contains(&k.as_str())) {
            Some(key) => Err(GameError::UnknownParameter {
                game: game.to_string(),
                key: key.clone(),
            }),
            None => Ok(()),
        }
    }

    /// A string parameter, or `default` when absent.
    pub fn string_or(&self, key: &str, default: &str) -> Result<String> {
        match self.values.get(key) {
            None => Ok(default.to_string()),
            Some(GameParameter::String(s)) => Ok(s.clone()),
            Some(other) => Err(Self::wrong_type(key, "string", other)),
        }
    }

    /// A required string parameter.
    pub fn required_string(&self, game: &str, key: &str) -> Result<String> {
        match self.values.get(key) {
            None => Err(GameError::MissingParameter {
                game: game.to_string(),
                key: key.to_string(),
            }),
            Some(GameParameter::String(s)) => Ok(s.clone()),
            Some(other) => Err(Self::wrong_type(key, "string", other)),
        }
    }

    fn wrong_type(key: &str, expected: &str, found: &GameParameter) -> GameError {
        GameError::InvalidParameter {
            key: key.to_string(),
            message: format!("expected {}, found {}", expected, found.type_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let params = GameParameters::new();

        assert!(params.is_empty());
        assert_eq!(params.string_or("obstype", "reveal-nothing").unwrap(), "reveal-nothing");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let params = GameParameters::new().with("filename", "a.efg").with("colour", "red");

        let err = params.check_known("efg_game", &["filename"]).unwrap_err();
        assert!(matches!(err, GameError::UnknownParameter { ref key, .. } if key == "colour"));
    }

    #[test]
    fn test_missing_required() {
        let params = GameParameters::new();
        let err = params.required_string("efg_game", "filename").unwrap_err();
        assert!(matches!(err, GameError::MissingParameter { .. }));
    }

    #[test]
    fn test_wrong_type() {
        let params = GameParameters::new().with("obstype", 3i64);
        let err = params.string_or("obstype", "reveal-nothing").unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter 'obstype': expected string, found int");
    }

    #[test]
    fn test_serialization() {
        let params = GameParameters::new().with("filename", "x.efg").with("flag", true);
        let json = serde_json::to_string(&params).unwrap();
        let deserialized: GameParameters = serde_json::from_str(&json).unwrap();
        assert_eq!(params, deserialized);
    }
}
