/// Errors produced while reading manifest lists and manifest documents.
#[derive(thiserror::Error, Debug)]
pub enum ManifestError {
    #[error("No JSON files specified")]
    NoManifests,

    #[error("manifest location #{index} is empty")]
    BlankLocation { index: usize },

    #[error("manifest {origin} is not valid JSON: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid JSON format or missing data in file {origin}")]
    MissingModels { origin: String },

    #[error("manifest {origin}: `models` must be an array, found {found}")]
    ModelsNotArray { origin: String, found: &'static str },

    #[error("manifest {origin}: model #{index} is invalid: {source}")]
    Descriptor {
        origin: String,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ManifestError {
    /// Location of the manifest this error refers to, when there is one.
    pub fn origin(&self) -> Option<&str> {
        match self {
            ManifestError::NoManifests | ManifestError::BlankLocation { .. } => None,
            ManifestError::Json { origin, .. }
            | ManifestError::MissingModels { origin }
            | ManifestError::ModelsNotArray { origin, .. }
            | ManifestError::Descriptor { origin, .. } => Some(origin),
        }
    }
}
