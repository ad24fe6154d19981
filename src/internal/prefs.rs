use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

/// Persisted subset of the list query: page size and sort carry across
/// sessions, the page number deliberately does not.
///
/// Values are stored as they came from the user and validated by the caller
/// against the recognized option sets; this type only does structural parse.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    #[serde(rename = "pageSize", skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

/// Storage for [`Preferences`]. Load fails open (any read or parse error
/// yields the empty value) and save fails silently, mirroring how little a
/// listing page can do about a broken preference store.
pub trait PreferenceStore {
    fn load(&self) -> Preferences;
    fn save(&mut self, prefs: &Preferences);
}

/// JSON file store under the per-user config directory.
pub struct FilePreferenceStore {
    path: Option<PathBuf>,
}

impl FilePreferenceStore {
    pub fn new() -> Self {
        let path = dirs::config_dir().map(|dir| dir.join("tui-ideas-app"));

        let path = match path {
            Some(dir) => {
                if !dir.exists()
                    && let Err(e) = fs::create_dir_all(&dir)
                {
                    tracing::warn!("Failed to create config directory {}: {}", dir.display(), e);
                    return Self { path: None };
                }
                Some(dir.join("preferences.json"))
            }
            None => {
                tracing::warn!("Could not find config directory; preferences will not persist");
                None
            }
        };

        Self { path }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }
}

impl Default for FilePreferenceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Preferences {
        let Some(path) = &self.path else {
            return Preferences::default();
        };

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(prefs) => prefs,
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                    Preferences::default()
                }
            },
            // Missing file is the common first-run case; not worth logging.
            Err(_) => Preferences::default(),
        }
    }

    fn save(&mut self, prefs: &Preferences) {
        let Some(path) = &self.path else {
            return;
        };

        match serde_json::to_string_pretty(prefs) {
            Ok(content) => {
                if let Err(e) = fs::write(path, content) {
                    tracing::warn!("Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => {
                tracing::warn!("Failed to serialize preferences: {}", e);
            }
        }
    }
}

/// In-memory store for tests and headless use. Clones share the same
/// underlying value, so a test can keep a handle and observe saves made
/// through a boxed copy.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    prefs: Arc<RwLock<Preferences>>,
}

impl MemoryPreferenceStore {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs: Arc::new(RwLock::new(prefs)),
        }
    }

    pub fn snapshot(&self) -> Preferences {
        self.load()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Preferences {
        self.prefs
            .read()
            .map(|prefs| prefs.clone())
            .unwrap_or_default()
    }

    fn save(&mut self, prefs: &Preferences) {
        if let Ok(mut guard) = self.prefs.write() {
            *guard = prefs.clone();
        }
    }
}
