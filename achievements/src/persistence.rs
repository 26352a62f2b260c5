use {
    ron::Value,
    serde::{Deserialize, Serialize},
    std::collections::HashMap,
};

/// Storage slot the achievement snapshot is written to.
pub const ACHIEVEMENTS_SAVE_KEY: &str = "achievements";
pub const SNAPSHOT_VERSION: u32 = 1;

/// Narrow key/value contract over whatever actually stores saves.
pub trait PersistenceProvider: Send + Sync {
    /// Returns `false` when the write did not happen.
    fn save(&mut self, key: &str, contents: &str) -> bool;

    fn load(&self, key: &str) -> Option<String>;
}

/// In-memory provider, mostly for tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub(crate) entries: HashMap<String, String>,
    /// When set every write is refused.
    pub read_only: bool,
}

impl MemoryStore {
    pub fn with_entry(mut self, key: &str, contents: &str) -> Self {
        self.entries.insert(key.to_string(), contents.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PersistenceProvider for MemoryStore {
    fn save(&mut self, key: &str, contents: &str) -> bool {
        if self.read_only {
            return false;
        }
        self.entries.insert(key.to_string(), contents.to_string());
        true
    }

    fn load(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementSnapshot {
    pub version: u32,
    /// Unix milliseconds.
    pub saved_at: i64,
    pub achievements: Vec<AchievementRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementRecord {
    pub id: String,
    pub unlocked: bool,
    #[serde(default)]
    pub unlocked_date: Option<i64>,
    #[serde(default)]
    pub current: f64,
}

/// Structural check of a parsed save document.
///
/// The document must be a map whose `achievements` entry is a sequence of maps,
/// each carrying a string `id`.
pub fn validate_save_data(data: &Value) -> bool {
    let Value::Map(document) = data else {
        return false;
    };
    let Some(Value::Seq(entries)) = field(document, "achievements") else {
        return false;
    };
    entries.iter().all(|entry| match entry {
        Value::Map(record) => matches!(field(record, "id"), Some(Value::String(_))),
        _ => false,
    })
}

fn field<'a>(map: &'a ron::Map, name: &str) -> Option<&'a Value> {
    map.iter()
        .find(|(key, _)| matches!(key, Value::String(key) if key == name))
        .map(|(_, value)| value)
}
