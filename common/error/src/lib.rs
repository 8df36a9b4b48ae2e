//! Common error plumbing for the llm-mute workspace.
//!
//! Feature crates define their own `snafu` enums and implement [`ErrorExt`]
//! to classify each variant with a [`StatusCode`].

pub mod ext;
pub mod status_code;

pub use ext::ErrorExt;
pub use snafu::Location;
pub use status_code::StatusCode;
