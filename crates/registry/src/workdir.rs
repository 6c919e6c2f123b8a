//! Per-framework and per-model scratch directories

use std::path::{Component, Path, PathBuf};
use thiserror::Error;

use crate::error::RegistryError;
use crate::registry::ManifestRegistry;
use crate::types::{FrameworkDescriptor, ModelDescriptor};

/// Subdirectory of the temp root holding model work directories.
pub const MODEL_WORK_ROOT: &str = "dlframework";

#[derive(Debug, Error)]
pub enum WorkDirError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Canonical name '{name}' cannot be used as a work directory")]
    UnsafeName { name: String },

    #[error("Failed to create work directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Make one part of a canonical name usable as a single path component.
///
/// Separators (`:`, `-`, space, `/`, `\`) and `..` become `_`, so the result
/// can never be absolute or climb out of its parent.
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            ':' | '-' | ' ' | '/' | '\\' => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "__")
}

/// `<root>/<framework canonical name>`, created if missing.
pub fn framework_work_dir(root: &Path, framework: &FrameworkDescriptor) -> Result<PathBuf, WorkDirError> {
    let name = framework.canonical_name()?;
    let dir = nested(root, &name, &[name.as_str()])?;
    create_private_dir(&dir)?;
    Ok(dir)
}

/// `<root>/dlframework/<framework canonical name>/<model>:<version>`,
/// created if missing.
///
/// A registered model keeps the directory of the framework it was
/// registered against.
pub fn model_work_dir(
    root: &Path,
    registry: &ManifestRegistry,
    model: &ModelDescriptor,
) -> Result<PathBuf, WorkDirError> {
    let name = registry.model_canonical_name(model)?;
    let framework = registry.framework_for_model(model)?.canonical_name()?;
    let model_part = name
        .strip_prefix(framework.as_str())
        .and_then(|rest| rest.strip_prefix('/'))
        .ok_or_else(|| WorkDirError::UnsafeName { name: name.clone() })?;
    let dir = nested(root, &name, &[MODEL_WORK_ROOT, framework.as_str(), model_part])?;
    create_private_dir(&dir)?;
    Ok(dir)
}

fn nested(root: &Path, name: &str, parts: &[&str]) -> Result<PathBuf, WorkDirError> {
    let mut dir = root.to_path_buf();
    for part in parts {
        let component = sanitize_component(part);
        let mut components = Path::new(&component).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => dir.push(&component),
            _ => {
                return Err(WorkDirError::UnsafeName {
                    name: name.to_string(),
                })
            }
        }
    }
    if !dir.starts_with(root) {
        return Err(WorkDirError::UnsafeName {
            name: name.to_string(),
        });
    }
    Ok(dir)
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) -> Result<(), WorkDirError> {
    use std::os::unix::fs::DirBuilderExt;

    std::fs::DirBuilder::new()
        .recursive(true)
        .mode(0o700)
        .create(dir)
        .map_err(|source| WorkDirError::Io {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) -> Result<(), WorkDirError> {
    std::fs::create_dir_all(dir).map_err(|source| WorkDirError::Io {
        path: dir.to_path_buf(),
        source,
    })
}
