use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewParseError {
    #[error("unknown view '{0}', expected all|today|important|planned|assigned|list:<id>")]
    UnknownView(String),
    #[error("invalid list id '{0}' in view")]
    InvalidListId(String),
}

#[derive(Debug, Error)]
pub enum EventDecodeError {
    #[error("malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl EventDecodeError {
    pub fn line(&self) -> usize {
        match self {
            EventDecodeError::Malformed { line, .. } => *line,
        }
    }
}
