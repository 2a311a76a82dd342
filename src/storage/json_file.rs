//! Implements a file-backed persistence gateway.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::Error;
use crate::storage::{STORAGE_KEY, StorageGateway};

/// Stores the transaction blob in a JSON file under a data directory.
///
/// The file is named after [STORAGE_KEY], so data written under an old
/// schema version is left untouched when the key changes. Saves write to
/// a temporary file in the same directory and rename it into place, so a
/// reader never observes a partial write.
#[derive(Debug, Clone)]
pub struct JsonFileGateway {
    path: PathBuf,
}

impl JsonFileGateway {
    /// Create a gateway storing its blob inside `data_dir`.
    ///
    /// The directory does not need to exist yet; it is created on the
    /// first save.
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            path: data_dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    /// The path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageGateway for JsonFileGateway {
    fn load(&self) -> Result<Option<String>, Error> {
        match fs::read_to_string(&self.path) {
            Ok(blob) => Ok(Some(blob)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::Persistence(format!(
                "could not read {}: {error}",
                self.path.display()
            ))),
        }
    }

    fn save(&mut self, blob: &str) -> Result<(), Error> {
        let map_error = |error: std::io::Error| {
            Error::Persistence(format!("could not write {}: {error}", self.path.display()))
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(map_error)?;
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, blob).map_err(map_error)?;
        fs::rename(&temp_path, &self.path).map_err(map_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::JsonFileGateway;
    use crate::storage::StorageGateway;

    #[test]
    fn load_returns_none_before_first_save() {
        let dir = tempdir().unwrap();

        let gateway = JsonFileGateway::new(dir.path());

        assert_eq!(gateway.load(), Ok(None));
    }

    #[test]
    fn save_then_load_round_trips_the_blob() {
        let dir = tempdir().unwrap();
        let mut gateway = JsonFileGateway::new(dir.path());

        gateway.save("[1,2,3]").unwrap();

        assert_eq!(gateway.load(), Ok(Some("[1,2,3]".to_owned())));
    }

    #[test]
    fn save_overwrites_the_previous_blob() {
        let dir = tempdir().unwrap();
        let mut gateway = JsonFileGateway::new(dir.path());

        gateway.save("old").unwrap();
        gateway.save("new").unwrap();

        assert_eq!(gateway.load(), Ok(Some("new".to_owned())));
    }

    #[test]
    fn save_creates_missing_data_directory() {
        let dir = tempdir().unwrap();
        let mut gateway = JsonFileGateway::new(dir.path().join("nested").join("data"));

        gateway.save("[]").unwrap();

        assert_eq!(gateway.load(), Ok(Some("[]".to_owned())));
    }

    #[test]
    fn a_second_gateway_sees_the_saved_blob() {
        let dir = tempdir().unwrap();
        let mut first = JsonFileGateway::new(dir.path());

        first.save("shared").unwrap();
        let second = JsonFileGateway::new(dir.path());

        assert_eq!(second.load(), Ok(Some("shared".to_owned())));
    }
}
