//! Template reference handling.
//!
//! This module turns user-supplied reference strings into structured
//! specifications:
//! - Normalization of shorthand, prefixed, SSH and browser URL forms
//! - Parsing canonical shorthand into a [`TemplateSpec`]
//! - Classifying a subpath as a single file or a directory

mod classify;
mod normalize;
mod provider;
mod spec;

pub use classify::{SINGLE_FILE_EXTENSIONS, is_single_file};
pub use normalize::{NormalizedReference, normalize};
pub use provider::Provider;
pub use spec::{DEFAULT_REF, RetrievalTarget, TemplateSpec};

#[cfg(test)]
mod tests;
