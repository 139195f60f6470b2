//! The persisted dashboard state.
//!
//! The state lives in one JSON file, `<directory>/<key>.json`, wrapped in an
//! envelope that carries a format version and the SHA-256 digest of the
//! payload. A file that does not match is replaced by the sample data.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::dash::*;

pub const STATE_VERSION: u32 = 4;

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct StateEnvelope {
    version: u32,
    checksum: String,
    payload: String,
}

impl StateEnvelope {
    fn seal(state: &AppState) -> DashResult<StateEnvelope> {
        let payload = serde_json::to_string(state).context(ParsingJsonSnafu {})?;
        Ok(StateEnvelope {
            version: STATE_VERSION,
            checksum: sha256::digest(payload.clone()),
            payload,
        })
    }

    /// The state, if the envelope is intact and from this version.
    fn open(&self) -> Option<AppState> {
        if self.version != STATE_VERSION {
            warn!(
                "StateEnvelope::open: unsupported version {} (expected {})",
                self.version, STATE_VERSION
            );
            return None;
        }
        if sha256::digest(self.payload.clone()) != self.checksum {
            warn!("StateEnvelope::open: checksum mismatch");
            return None;
        }
        match serde_json::from_str::<AppState>(&self.payload) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("StateEnvelope::open: unreadable payload: {}", e);
                None
            }
        }
    }
}

pub struct StateStore {
    path: PathBuf,
    state: Mutex<AppState>,
}

impl StateStore {
    /// Opens the storage slot `key` in `directory`, seeding it with the sample
    /// data when it is missing or cannot be trusted.
    pub fn open(directory: &Path, key: &str) -> DashResult<StateStore> {
        let path = directory.join(format!("{}.json", key));
        let loaded = if path.exists() {
            let contents = fs::read_to_string(&path).context(OpeningJsonSnafu {
                path: path.display().to_string(),
            })?;
            match serde_json::from_str::<StateEnvelope>(&contents) {
                Ok(envelope) => envelope.open(),
                Err(e) => {
                    warn!("StateStore::open: {:?}: unreadable envelope: {}", path, e);
                    None
                }
            }
        } else {
            info!("StateStore::open: no state at {:?}", path);
            None
        };

        let state = match loaded {
            Some(state) => {
                debug!(
                    "StateStore::open: loaded {:?}, last updated {}",
                    path, state.last_updated
                );
                state
            }
            None => {
                warn!("StateStore::open: {:?}: seeding with the sample data", path);
                let seeded = sample_state(&now_timestamp());
                write_state(&path, &seeded)?;
                seeded
            }
        };
        Ok(StateStore {
            path,
            state: Mutex::new(state),
        })
    }

    /// A copy of the current state.
    pub fn get_state(&self) -> DashResult<AppState> {
        let guard = self
            .state
            .lock()
            .map_err(|_| Box::new(DashError::PoisonedLock {}))?;
        Ok(guard.clone())
    }

    /// Persists `state` and makes it the current state. On a write failure,
    /// the current state is left unchanged.
    pub fn replace_state(&self, state: AppState) -> DashResult<()> {
        let mut guard = self
            .state
            .lock()
            .map_err(|_| Box::new(DashError::PoisonedLock {}))?;
        write_state(&self.path, &state)?;
        info!(
            "replace_state: {} responses, {} departments",
            state.university.n,
            state.departments.len()
        );
        *guard = state;
        Ok(())
    }
}

// Written to a temporary file first, then renamed over the slot.
fn write_state(path: &Path, state: &AppState) -> DashResult<()> {
    let envelope = StateEnvelope::seal(state)?;
    let js = serde_json::to_string(&envelope).context(ParsingJsonSnafu {})?;
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context(WritingFileSnafu {
            path: dir.display().to_string(),
        })?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, js).context(WritingFileSnafu {
        path: tmp.display().to_string(),
    })?;
    fs::rename(&tmp, path).context(WritingFileSnafu {
        path: path.display().to_string(),
    })?;
    debug!("write_state: {:?}", path);
    Ok(())
}
