use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("launch: {0}: command not found")]
    NotFound(String),

    #[error("launch: {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("launch: {program}: wait failed: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("read: {0}")]
    Read(#[source] io::Error),

    #[error("write: {0}")]
    Output(#[from] io::Error),
}
