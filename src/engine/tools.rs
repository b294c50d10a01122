//! Path utilities: platform hidden-file check and display form.

use std::borrow::Cow;
use std::path::Path;

/// Hidden on Unix-like systems: name starts with `.`. Paths without a final name (`.`, `..`, `/`)
/// are never hidden.
#[cfg(not(windows))]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .is_some_and(|n| n.as_encoded_bytes().first() == Some(&b'.'))
}

/// Hidden on Windows: the file attribute bit, as reported by the OS.
#[cfg(windows)]
pub fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    std::fs::symlink_metadata(path)
        .map(|m| m.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

/// How a node's path is printed. Standard input is `-`.
pub fn display_path(path: Option<&Path>) -> Cow<'_, str> {
    match path {
        Some(p) => p.to_string_lossy(),
        None => Cow::Borrowed("-"),
    }
}
