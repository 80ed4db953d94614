use std::{collections::BTreeMap, io::ErrorKind, path::PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("preference file I/O failed")]
    Io(#[from] std::io::Error),
    #[error("preference file is not valid TOML")]
    Parse(#[from] toml::de::Error),
    #[error("preferences could not be serialized")]
    Serialize(#[from] toml::ser::Error),
}

/// Origin-scoped string key/value storage, the shape of `localStorage`.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}

/// One TOML file per origin, `key = "value"` lines. A missing file reads as
/// empty and is created on the first write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(toml::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.load()?;
        entries.insert(key.to_owned(), value.to_owned());
        std::fs::write(&self.path, toml::to_string(&entries)?)?;
        Ok(())
    }
}
