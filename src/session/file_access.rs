use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileReadResult {
    Content(String),
    Failed(String),
}

impl FileReadResult {
    /// Text fed back into the conversation; failures become a readable message.
    pub fn into_text(self) -> String {
        match self {
            Self::Content(content) => content,
            Self::Failed(cause) => format!("Error reading file: {cause}"),
        }
    }
}

/// Acceptance policy for model-supplied paths: anything that currently exists.
pub fn path_exists(path: &str) -> bool {
    !path.is_empty() && Path::new(path).exists()
}

pub fn read_file(path: &Path) -> FileReadResult {
    match fs::read_to_string(path) {
        Ok(content) => FileReadResult::Content(content),
        Err(err) => FileReadResult::Failed(err.to_string()),
    }
}
