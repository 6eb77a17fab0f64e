//! Default values for configuration fields.
//!
//! These functions are used by serde for default deserialization.

// ============================================================================
// Common Defaults
// ============================================================================

pub fn r#true() -> bool {
    true
}

// ============================================================================
// [paths] Section Defaults
// ============================================================================

pub mod paths {
    use std::path::PathBuf;

    pub fn root() -> Option<PathBuf> {
        None
    }

    pub fn drafts() -> PathBuf {
        "content/drafts".into()
    }

    pub fn published() -> PathBuf {
        "content/published".into()
    }

    pub fn content() -> PathBuf {
        "public/content".into()
    }

    /// `None` means `<content>/indexes`.
    pub fn indexes() -> Option<PathBuf> {
        None
    }
}

// ============================================================================
// [index] Section Defaults
// ============================================================================

pub mod index {
    use crate::config::IndexKind;

    pub fn enable() -> Vec<IndexKind> {
        IndexKind::ALL.to_vec()
    }
}
