use std::fs;
use std::io;
use std::path::PathBuf;

use quorum_core::settings::SettingKey;
use quorum_core::settings::SettingsStore;

/// Settings persisted as a flat TOML table. Reads happen once at open;
/// every write rewrites the whole file.
pub struct FileSettings {
    path: PathBuf,
    table: toml::Table,
}

impl FileSettings {
    pub fn open(path: PathBuf) -> io::Result<Self> {
        let table = match fs::read_to_string(&path) {
            Ok(text) => text
                .parse::<toml::Table>()
                .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => toml::Table::new(),
            Err(err) => return Err(err),
        };
        Ok(Self { path, table })
    }

    fn persist(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, self.table.to_string())
    }
}

impl SettingsStore for FileSettings {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.table
            .get(key.name())
            .and_then(|value| value.as_str())
            .map(str::to_string)
    }

    fn set(&mut self, key: SettingKey, value: &str) -> io::Result<()> {
        self.table
            .insert(key.name().to_string(), toml::Value::String(value.to_string()));
        self.persist()
    }

    fn clear(&mut self, key: SettingKey) -> io::Result<()> {
        if self.table.remove(key.name()).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}
