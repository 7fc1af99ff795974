//! Path validation for all filesystem-facing routes.
//!
//! Every client-supplied identifier or filename must pass through
//! [`resolve_under_root`] before any file is opened. Validation happens in
//! two stages: a lexical check that rejects traversal sequences before any
//! filesystem access, then canonicalization with a component-wise prefix
//! check so symlinks cannot escape the media root and a sibling directory
//! like `root-evil` never passes for `root`.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Lexically reject a single client-supplied path component.
///
/// # Errors
/// [`Error::Forbidden`] for empty components, separators, `..`, or a
/// leading dot.
pub fn validate_component(component: &str) -> Result<()> {
    if component.is_empty()
        || component.contains('/')
        || component.contains('\\')
        || component.contains("..")
        || component.starts_with('.')
    {
        return Err(Error::Forbidden("invalid path component".into()));
    }
    Ok(())
}

/// Resolve `components` joined onto `root` and verify the result stays
/// inside `root`.
///
/// # Errors
/// - [`Error::Forbidden`] - a component fails the lexical check, or the
///   canonicalized path escapes the root
/// - [`Error::NotFound`] - the target does not exist
/// - [`Error::Internal`] - the media root itself cannot be resolved
pub async fn resolve_under_root(root: &Path, components: &[&str]) -> Result<PathBuf> {
    for component in components {
        validate_component(component)?;
    }

    let canonical_root = tokio::fs::canonicalize(root).await.map_err(|e| {
        tracing::error!("Cannot resolve media root {:?}: {e}", root);
        Error::Internal("media root unavailable".into())
    })?;

    let mut joined = canonical_root.clone();
    for component in components {
        joined.push(component);
    }

    let resolved = tokio::fs::canonicalize(&joined).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::not_found("file", components.join("/"))
        } else {
            Error::from(e)
        }
    })?;

    // Component-wise comparison; a naive string prefix would accept siblings.
    if !resolved.starts_with(&canonical_root) {
        tracing::warn!("Path escape blocked: {:?}", components);
        return Err(Error::Forbidden("path escapes media root".into()));
    }

    Ok(resolved)
}
