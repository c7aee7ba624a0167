use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::BenchError;

/// Writes `data` next to `path` and renames it into place, so readers never
/// observe a half-written artifact.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), BenchError> {
    let tmp = staging_path(path)?;
    if let Err(err) = fs::write(&tmp, data) {
        let _ = fs::remove_file(&tmp);
        return Err(BenchError::io(format!("{}: {err}", tmp.display())));
    }
    fs::rename(&tmp, path).map_err(|err| {
        let _ = fs::remove_file(&tmp);
        BenchError::io(format!("{}: {err}", path.display()))
    })
}

fn staging_path(path: &Path) -> Result<PathBuf, BenchError> {
    let name = path
        .file_name()
        .ok_or_else(|| BenchError::invalid_input(format!("{} has no file name", path.display())))?;
    let mut staged = name.to_os_string();
    staged.push(".partial");
    Ok(path.with_file_name(staged))
}
