//! Atomic file operations
//!
//! Persisted client state is written to a `.tmp` sibling, synced, then
//! renamed over the destination so a crash leaves either the old or the
//! new file, never a partial one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Atomically write content to a file
///
/// ```ignore
/// atomic_write("config/ignored.json", "[\"spammer\"]")?;
/// ```
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    let temp_path = path.with_extension("tmp");

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(&temp_path)?;
    file.write_all(content.as_bytes())?;
    file.sync_all()?;

    fs::rename(&temp_path, path)?;

    Ok(())
}
