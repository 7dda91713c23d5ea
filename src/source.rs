use crate::error::MonoError;
use std::path::Path;

pub const DEFAULT_EXTENSION: &str = ".mono";

/// One compile unit. Immutable once read; the pipeline only ever borrows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub source: String,
    pub order: usize,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, source: impl Into<String>, order: usize) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            order,
        }
    }

    /// Reads a mono file from disk, appending `.mono` when the path has no such suffix.
    ///
    /// # Errors
    /// Returns `MonoError::Parser` if the file cannot be read.
    pub fn read(path: impl AsRef<Path>, order: usize) -> Result<Self, MonoError> {
        Self::read_with_extension(path, order, DEFAULT_EXTENSION)
    }

    /// Same as [`SourceFile::read`] with a caller supplied extension.
    ///
    /// # Errors
    /// Returns `MonoError::Parser` if the file cannot be read.
    pub fn read_with_extension(
        path: impl AsRef<Path>,
        order: usize,
        extension: &str,
    ) -> Result<Self, MonoError> {
        let raw = path.as_ref().to_string_lossy().to_string();
        let name = if raw.ends_with(extension) {
            raw
        } else {
            format!("{raw}{extension}")
        };

        log::debug!("reading compile unit {name} (order {order})");
        let source = std::fs::read_to_string(&name).map_err(|err| MonoError::Parser {
            message: format!("Unable to read {name}: {err}"),
            path: name.clone(),
        })?;

        Ok(Self {
            name,
            source,
            order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_read_appends_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("nav.mono"), "nav {\n  display: flex;\n}\n").unwrap();

        let file = SourceFile::read(dir.path().join("nav"), 3).unwrap();
        assert!(file.name.ends_with("nav.mono"));
        assert_eq!(file.order, 3);
        assert!(file.source.contains("display: flex;"));
    }

    #[test]
    fn test_read_keeps_existing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("footer.mono");
        fs::write(&path, "footer {}\n").unwrap();

        let file = SourceFile::read(&path, 0).unwrap();
        assert_eq!(file.name, path.to_string_lossy());
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SourceFile::read(dir.path().join("missing"), 0).unwrap_err();
        match err {
            MonoError::Parser { path, .. } => assert!(path.ends_with("missing.mono")),
            other => panic!("expected a parser error, got {other:?}"),
        }
    }
}
