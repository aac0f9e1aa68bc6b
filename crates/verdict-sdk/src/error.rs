//! SDK error types

use thiserror::Error;

/// SDK error
#[derive(Error, Debug)]
pub enum SdkError {
    #[error(transparent)]
    Runtime(#[from] verdict_runtime::RuntimeError),

    #[error("Model '{namespace}' is already registered")]
    DuplicateModel { namespace: String },
}

pub type Result<T> = std::result::Result<T, SdkError>;
