use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("usage error: {0}")]
    Usage(String),
    #[error("missing prerequisite `{tool}`: {guidance}")]
    Prerequisite { tool: String, guidance: String },
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Emit(#[from] EmitError),
    #[error("failed to deliver {}", path.display())]
    Delivery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn is_usage(&self) -> bool {
        matches!(self, Error::Usage(_))
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input directory not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("input path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("input directory has no usable SVG files: {}", .0.display())]
    Empty(PathBuf),
    #[error(
        "`{}` and `{}` both map to icon name `{name}`",
        first.display(),
        second.display()
    )]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("too many icons: {0} do not fit into the private use area")]
    TooManyIcons(usize),
    #[error("failed to scan input directory: {0}")]
    Walk(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("`{command}` failed with {}: {output}", describe_exit(code))]
    Failed {
        command: String,
        code: Option<i32>,
        output: String,
    },
    #[error("`{command}` timed out after {secs}s")]
    Timeout { command: String, secs: u64 },
    #[error("expected output file is missing: {}", .0.display())]
    MissingOutput(PathBuf),
    #[error("output font {} is implausibly small ({size} bytes)", path.display())]
    ImplausibleOutput { path: PathBuf, size: u64 },
    #[error("glyph map does not match inputs (missing: {missing:?}, unexpected: {unexpected:?})")]
    GlyphMapMismatch {
        missing: Vec<String>,
        unexpected: Vec<String>,
    },
    #[error("invalid glyph map: {0}")]
    InvalidGlyphMap(String),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EmitError {
    #[error("invalid identifier `{0}`")]
    InvalidIdentifier(String),
    #[error("duplicate member `{0}`")]
    DuplicateMember(String),
    #[error("no source path recorded for glyph `{0}`")]
    MissingSourcePath(String),
}

pub type Result<T> = std::result::Result<T, Error>;
