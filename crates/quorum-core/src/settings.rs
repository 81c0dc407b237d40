use std::collections::HashMap;
use std::io;

/// Connection facts remembered across sessions. Values are opaque strings;
/// validation happens at the point of use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    NodeUrl,
    ApplicationId,
    ContextId,
}

pub const ALL_SETTING_KEYS: [SettingKey; 3] = [
    SettingKey::NodeUrl,
    SettingKey::ApplicationId,
    SettingKey::ContextId,
];

impl SettingKey {
    pub fn name(self) -> &'static str {
        match self {
            Self::NodeUrl => "node_url",
            Self::ApplicationId => "application_id",
            Self::ContextId => "context_id",
        }
    }
}

/// Storage seam for persisted settings. The in-memory variant backs tests;
/// the CLI supplies a file-backed one.
pub trait SettingsStore {
    fn get(&self, key: SettingKey) -> Option<String>;
    fn set(&mut self, key: SettingKey, value: &str) -> io::Result<()>;
    fn clear(&mut self, key: SettingKey) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct MemorySettings {
    values: HashMap<SettingKey, String>,
}

impl MemorySettings {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettings {
    fn get(&self, key: SettingKey) -> Option<String> {
        self.values.get(&key).cloned()
    }

    fn set(&mut self, key: SettingKey, value: &str) -> io::Result<()> {
        self.values.insert(key, value.to_string());
        Ok(())
    }

    fn clear(&mut self, key: SettingKey) -> io::Result<()> {
        self.values.remove(&key);
        Ok(())
    }
}
