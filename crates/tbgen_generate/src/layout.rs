//! The fixed output tree and path helpers.

use std::fs;
use std::path::{self, Component, Path, PathBuf};

use tbgen_config::Protocol;

use crate::error::GenerateError;

/// Paths of the generated output tree rooted at the configured output directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    /// Creates a layout rooted at `root`. Nothing is created on disk.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The output root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Testbench sources: `<out>/tb`.
    pub fn tb_dir(&self) -> PathBuf {
        self.root.join("tb")
    }

    /// Simulation scripts: `<out>/sim`.
    pub fn sim_dir(&self) -> PathBuf {
        self.root.join("sim")
    }

    /// Rendered component tree for `protocol`: `<out>/vip/<tag>`.
    pub fn vip_dir(&self, protocol: Protocol) -> PathBuf {
        self.root.join("vip").join(protocol.tag())
    }

    /// Creates the output root and its fixed subdirectories if absent.
    ///
    /// Existing files are left alone.
    pub fn create(&self) -> Result<(), GenerateError> {
        for dir in [self.root.clone(), self.tb_dir(), self.sim_dir()] {
            fs::create_dir_all(&dir)
                .map_err(|source| GenerateError::CreateDir { path: dir, source })?;
        }
        Ok(())
    }
}

/// Expresses DUT source `target` relative to the simulation directory.
///
/// Both paths are made absolute against the current directory before the
/// relative form is taken, so an output root given as an absolute path or
/// through `..` still yields a path that resolves from `sim_dir`. Without a
/// relative form (different Windows drives) the absolute source path is used.
pub fn sim_relative_path(target: &Path, sim_dir: &Path) -> String {
    match (path::absolute(target), path::absolute(sim_dir)) {
        (Ok(target), Ok(sim_dir)) => relative_path(&target, &sim_dir),
        _ => relative_path(target, sim_dir),
    }
}

/// Expresses `target` relative to directory `from`, using `/` separators.
///
/// Both paths are normalized lexically first. When no relative form exists
/// (one is absolute and the other is not, or `from` climbs out through `..`),
/// `target` itself is returned.
pub fn relative_path(target: &Path, from: &Path) -> String {
    let target = normalize(target);
    let from = normalize(from);

    if target.is_absolute() != from.is_absolute() {
        return to_slash(&target);
    }

    let target_parts: Vec<Component<'_>> = target.components().collect();
    let from_parts: Vec<Component<'_>> = from.components().collect();
    let common = target_parts
        .iter()
        .zip(&from_parts)
        .take_while(|(a, b)| a == b)
        .count();

    let climbs = &from_parts[common..];
    if climbs.iter().any(|c| !matches!(c, Component::Normal(_))) {
        return to_slash(&target);
    }

    let mut parts: Vec<String> = climbs.iter().map(|_| "..".to_string()).collect();
    parts.extend(
        target_parts[common..]
            .iter()
            .map(|c| c.as_os_str().to_string_lossy().into_owned()),
    );
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Removes `.` components and folds `name/..` pairs without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if matches!(parts.last(), Some(Component::Normal(_))) => {
                parts.pop();
            }
            Component::ParentDir if matches!(parts.last(), Some(Component::RootDir)) => {}
            other => parts.push(other),
        }
    }
    parts.iter().collect()
}

pub(crate) fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
