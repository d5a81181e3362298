use thiserror::Error;

pub type RazborResult<T, E = RazborErr> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum RazborErr {
    #[error("IO err -> {0}")]
    IO(#[from] std::io::Error),

    #[error("Tag err -> {0}")]
    Tag(#[from] TagErr),

    #[error("Stream err -> {0}")]
    Parse(#[from] ParseErr),

    #[error("External tool err -> {0}")]
    Tool(#[from] ToolErr),

    #[error("Serde err -> {0}")]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TagErr {
    #[error("Unknown tag: {0}")]
    Unknown(String),
}

#[derive(Debug, Error)]
pub enum ParseErr {
    #[error("Cannot parse reading: {0}")]
    MalformedReading(String),

    #[error("Malformed stream line: {0}")]
    MalformedLine(String),

    #[error("Empty surface token at position {0}")]
    EmptySurface(usize),

    #[error("Token count mismatch after disambiguation: {before} -> {after}\n{pairs}")]
    Alignment {
        before: usize,
        after: usize,
        pairs: String,
    },
}

#[derive(Debug, derive_more::Display)]
pub enum Tool {
    #[display(fmt = "hfst-lookup (analyzer)")]
    Analyzer,
    #[display(fmt = "hfst-lookup (generator)")]
    Generator,
    #[display(fmt = "vislcg3")]
    Disambiguator,
}

#[derive(Debug, Error)]
pub enum ToolErr {
    #[error("{0} must be installed and be in PATH")]
    Unavailable(Tool),

    #[error("{tool} failed -> {message}")]
    Failed { tool: Tool, message: String },
}
