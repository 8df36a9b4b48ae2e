//! Extension trait shared by every error enum in the workspace.

use std::error::Error;

use crate::status_code::StatusCode;

/// Classifies an error with a [`StatusCode`].
pub trait ErrorExt: Error {
    fn status_code(&self) -> StatusCode;
}
