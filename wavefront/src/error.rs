/// Errors raised while reading OBJ or MTL text. Line numbers start at 1.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WavefrontError {
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: {kind} index {index} out of range ({len} available)")]
    IndexOutOfRange {
        line: usize,
        kind: &'static str,
        index: i64,
        len: usize,
    },

    #[error("line {line}: `{statement}` before any `newmtl`")]
    NoActiveMaterial { line: usize, statement: String },
}

impl WavefrontError {
    pub(crate) fn syntax(line: usize, message: impl Into<String>) -> Self {
        WavefrontError::Syntax {
            line,
            message: message.into(),
        }
    }

    pub fn line(&self) -> usize {
        match self {
            WavefrontError::Syntax { line, .. }
            | WavefrontError::IndexOutOfRange { line, .. }
            | WavefrontError::NoActiveMaterial { line, .. } => *line,
        }
    }
}

pub type Result<T> = std::result::Result<T, WavefrontError>;
