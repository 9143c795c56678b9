//! Crash-safe file replacement
//!
//! Writes go to a temporary file in the target's directory which is then
//! renamed over the target, so readers see either the old or the new
//! content and never a truncated mix.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Replace `path` with whatever `write` produces
///
/// The target is untouched if `write` or any later step fails.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut BufWriter<&mut File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        write(&mut writer)?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;

    debug!(path = %path.display(), "Replaced file atomically");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn replaces_existing_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "old").unwrap();

        write_atomic(&path, |w| w.write_all(b"new")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn failed_write_keeps_target() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("list.txt");
        std::fs::write(&path, "old").unwrap();

        let result = write_atomic(&path, |w| {
            w.write_all(b"partial")?;
            Err(io::Error::new(io::ErrorKind::Other, "disk full"))
        });

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "old");
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
