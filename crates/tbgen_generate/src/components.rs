//! Rendering of per-protocol reusable-component trees.

use std::fs;
use std::path::Path;

use serde_json::Value;
use tbgen_config::Protocol;
use walkdir::WalkDir;

use crate::layout::OutputLayout;
use crate::writer::ArtifactWriter;

/// Renders every file under `<template_root>/vip/<tag>` into `<out>/vip/<tag>`.
///
/// Entries are visited in file-name order and the directory structure is
/// reproduced exactly. A file that fails to render is reported and the walk
/// continues.
pub(crate) fn render_component_tree(
    writer: &mut ArtifactWriter<'_>,
    protocol: Protocol,
    template_root: &Path,
    layout: &OutputLayout,
    context: &Value,
) {
    let artifact = format!("vip/{}", protocol.tag());
    let src_root = template_root.join(protocol.template_dir());
    if !src_root.is_dir() {
        writer.missing(&artifact, &src_root);
        return;
    }

    let dest_root = layout.vip_dir(protocol);
    if let Err(e) = fs::create_dir_all(&dest_root) {
        writer.write_failed(&artifact, &dest_root, &e);
        return;
    }

    for entry in WalkDir::new(&src_root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(src_root.as_path()).to_path_buf();
                writer.render_failed(
                    &artifact,
                    &path,
                    format!("failed to walk template tree: {e}"),
                );
                continue;
            }
        };
        let Ok(relative) = entry.path().strip_prefix(&src_root) else {
            continue;
        };
        let dest = dest_root.join(relative);

        if entry.file_type().is_dir() {
            if let Err(e) = fs::create_dir_all(&dest) {
                writer.write_failed(&artifact, &dest, &e);
            }
            continue;
        }

        log::debug!("rendering component {}", relative.display());
        writer.render_file(&artifact, entry.path(), &dest, context);
    }
}
