//! Stencil Core Library
//!
//! Resolves remote template references (GitHub and Codeberg shorthand,
//! prefixed forms, SSH addresses and browser URLs) and materialises them on
//! disk by cloning, downloading a single raw file, or extracting a tarball.

pub mod archive;
pub mod clone;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod reference;

/// Re-exports of commonly used types
pub mod prelude {
    // Errors
    pub use crate::error::{FetchError, FetchResult};

    // Configuration
    pub use crate::config::StencilConfig;

    // References
    pub use crate::reference::{
        NormalizedReference, Provider, RetrievalTarget, TemplateSpec, is_single_file, normalize,
    };

    // Retrieval
    pub use crate::clone::{GitCloner, TemplateCloner};
    pub use crate::fetch::{FetchOptions, FetchReport, Strategy, TemplateFetcher};
    pub use crate::http::{HttpResponse, HttpTransport, ReqwestTransport};
}
