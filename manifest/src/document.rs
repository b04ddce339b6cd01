use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::ModelDescriptor;
use crate::error::ManifestError;

/// A validated manifest document.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Manifest {
    pub models: Vec<ModelDescriptor>,
}

impl Manifest {
    /// Parses and validates a manifest. `origin` is only used in errors.
    pub fn from_slice(bytes: &[u8], origin: &str) -> Result<Self, ManifestError> {
        let value: Value = serde_json::from_slice(bytes).map_err(|source| ManifestError::Json {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_value(value, origin)
    }

    /// Validates an already decoded JSON document.
    ///
    /// A document whose `models` entry is absent or falsy (`null`, `false`,
    /// `0`, `""`) is rejected; an empty array is a valid manifest.
    pub fn from_value(value: Value, origin: &str) -> Result<Self, ManifestError> {
        let models = match value {
            Value::Object(mut map) => map.remove("models"),
            _ => None,
        };

        let items = match models {
            Some(Value::Array(items)) => items,
            None | Some(Value::Null) | Some(Value::Bool(false)) => {
                return Err(missing_models(origin));
            }
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {
                return Err(missing_models(origin));
            }
            Some(Value::String(s)) if s.is_empty() => return Err(missing_models(origin)),
            Some(other) => {
                return Err(ManifestError::ModelsNotArray {
                    origin: origin.to_string(),
                    found: json_kind(&other),
                });
            }
        };

        let models = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value::<ModelDescriptor>(item).map_err(|source| {
                    ManifestError::Descriptor {
                        origin: origin.to_string(),
                        index,
                        source,
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { models })
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

fn missing_models(origin: &str) -> ManifestError {
    ManifestError::MissingModels {
        origin: origin.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
