//! Filesystem utilities.
//!
//! Output files (the clip schedule and caption bitmaps) are read by an
//! external compositor, which must never observe a half-written file.
//! Every write goes to a sibling temp file first and is swapped into place.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Output Directory
// =============================================================================

/// Ensures `dir` exists and is a directory, creating it if needed.
pub fn prepare_output_dir(dir: &Path) -> CoreResult<PathBuf> {
    if dir.as_os_str().is_empty() {
        return Err(CoreError::InvalidConfiguration(
            "output directory is empty".to_string(),
        ));
    }
    if dir.exists() && !dir.is_dir() {
        return Err(CoreError::InvalidConfiguration(format!(
            "output path is not a directory: {}",
            dir.display()
        )));
    }
    std::fs::create_dir_all(dir)?;
    Ok(dir.to_path_buf())
}

/// File name of the bitmap for the caption at `index` (zero-based)
pub fn caption_file_name(index: usize) -> String {
    format!("caption_{:04}.png", index + 1)
}

// =============================================================================
// Atomic Writes
// =============================================================================

/// Writes `bytes` to `path` through a synced sibling temp file.
pub fn atomic_write_bytes(path: &Path, bytes: &[u8]) -> CoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp_path = sibling_path(path, "tmp");
    let written = (|| -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp_path)?);
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()
    })();
    if let Err(e) = written {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(CoreError::IoError(e));
    }

    swap_into_place(path, &tmp_path)
}

/// Writes a JSON file atomically with pretty formatting.
pub fn atomic_write_json_pretty<T: serde::Serialize>(path: &Path, value: &T) -> CoreResult<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    atomic_write_bytes(path, &bytes)
}

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{file_name}.{}.{suffix}", std::process::id()))
}

fn swap_into_place(dest: &Path, tmp: &Path) -> CoreResult<()> {
    if !dest.exists() {
        std::fs::rename(tmp, dest)?;
        return Ok(());
    }

    // Rename-over-existing is not atomic everywhere; move the old file aside.
    let bak = sibling_path(dest, "bak");
    std::fs::rename(dest, &bak)?;
    match std::fs::rename(tmp, dest) {
        Ok(()) => {
            let _ = std::fs::remove_file(&bak);
            Ok(())
        }
        Err(e) => {
            let _ = std::fs::rename(&bak, dest);
            let _ = std::fs::remove_file(tmp);
            Err(CoreError::IoError(e))
        }
    }
}
