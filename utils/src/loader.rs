//! This module handles I/O

use std::io;
use std::path::Path;

/// Loads plaintext such as yaml files and tile maps. Relative paths are resolved against the res
/// directory.
pub fn load_string_at(path: &Path) -> io::Result<String> {
    if path.is_absolute() {
        std::fs::read_to_string(path)
    } else {
        std::fs::read_to_string(Path::new("res").join(path))
    }
}
