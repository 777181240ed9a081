//! Where watermarked copies go.
//!
//! A directory `photos/` is mirrored into the sibling `photos_watermark/`.
//! A single file `trip/a.jpg` lands in `trip_watermark/a.jpg`, a sibling of
//! its parent directory. Inputs are never written to.

use std::ffi::OsString;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Suffix appended to the input directory name.
pub const OUTPUT_DIR_SUFFIX: &str = "_watermark";

/// Maps input files to output paths.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    root: PathBuf,
    suffix: Option<String>,
}

impl OutputLayout {
    /// Build the layout for an (existing, absolute) input path.
    ///
    /// `override_root` replaces the derived `<name>_watermark` directory. It
    /// is resolved the same way the input is, so `photos/../photos/out`
    /// compares equal to `photos/out`.
    pub fn new(input: &Path, override_root: Option<&Path>, suffix: Option<String>) -> io::Result<Self> {
        let root = match override_root {
            Some(dir) if dir.is_absolute() => resolve(dir),
            Some(dir) => resolve(&std::env::current_dir()?.join(dir)),
            None => default_output_root(input),
        };
        Ok(Self { root, suffix })
    }

    /// Directory all outputs are written under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output path for a file at `relative` (relative to the input root).
    pub fn output_for(&self, relative: &Path) -> PathBuf {
        let target = self.root.join(relative);
        match &self.suffix {
            Some(suffix) if !suffix.is_empty() => with_stem_suffix(&target, suffix),
            _ => target,
        }
    }
}

/// `<dir>_watermark` next to `dir`, where `dir` is the input itself for a
/// directory and the file's parent for a single file.
pub fn default_output_root(input: &Path) -> PathBuf {
    let base = if input.is_dir() {
        input
    } else {
        input.parent().unwrap_or(input)
    };

    let mut name = base
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("root"));
    name.push(OUTPUT_DIR_SUFFIX);

    match base.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// Canonical form of `path` for the part that exists, with `.` and `..`
/// applied lexically to the rest.
fn resolve(path: &Path) -> PathBuf {
    let mut resolved = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other),
        }
        if let Ok(real) = std::fs::canonicalize(&resolved) {
            resolved = real;
        }
    }
    resolved
}

/// `dir/name.ext` -> `dir/name<suffix>.ext`
fn with_stem_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut file_name = path.file_stem().map(OsString::from).unwrap_or_default();
    file_name.push(suffix);
    if let Some(ext) = path.extension() {
        file_name.push(".");
        file_name.push(ext);
    }
    path.with_file_name(file_name)
}
