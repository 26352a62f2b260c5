use {
    achievements::PersistenceProvider,
    bevy::prelude::*,
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

/// Writes each key to `<dir>/<key>.ron`.
#[derive(Debug, Clone)]
pub struct RonFileStore {
    dir: PathBuf,
}

impl RonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.ron"))
    }
}

impl Default for RonFileStore {
    fn default() -> Self {
        Self::new("saves")
    }
}

impl PersistenceProvider for RonFileStore {
    fn save(&mut self, key: &str, contents: &str) -> bool {
        if let Err(e) = fs::create_dir_all(&self.dir) {
            error!("Failed to create saves directory {}: {}", self.dir.display(), e);
            return false;
        }
        let path = self.path_for(key);
        match fs::write(&path, contents) {
            Ok(()) => {
                trace!("wrote {}", path.display());
                true
            }
            Err(e) => {
                error!("Failed to write save file {}: {}", path.display(), e);
                false
            }
        }
    }

    fn load(&self, key: &str) -> Option<String> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read save file {}: {}", path.display(), e);
                None
            }
        }
    }
}
