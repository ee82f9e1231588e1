use crate::state::{DockerProject, KubernetesConfig, SystemState, SystemdService};
use chrono::Utc;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const STATE_DIR_NAME: &str = ".discover";
pub const STATE_FILE_NAME: &str = "discover_state.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("error reading state file {path}: {source}")]
    Read { path: String, source: io::Error },
    #[error("error parsing state file {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("error encoding state: {0}")]
    Encode(serde_json::Error),
    #[error("error writing state file {path}: {source}")]
    Write { path: String, source: io::Error },
}

// No locking: the last writer wins.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    // Falls back to the bare file name in the working directory.
    pub fn resolve(state_dir: Option<&Path>) -> Self {
        let dir = match state_dir {
            Some(dir) => Some(dir.to_path_buf()),
            None => dirs::home_dir().map(|home| home.join(STATE_DIR_NAME)),
        };

        let Some(dir) = dir else {
            warn!("home directory is unknown, using the working directory for state");
            return Self::new(STATE_FILE_NAME);
        };

        if let Err(err) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %err, "could not create state directory");
            return Self::new(STATE_FILE_NAME);
        }

        Self::new(dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<SystemState, StoreError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no state file yet");
                return Ok(SystemState::new(Utc::now()));
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.display().to_string(),
                    source,
                })
            }
        };

        serde_json::from_slice(&data).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn save(&self, state: &mut SystemState) -> Result<(), StoreError> {
        state.last_updated = Utc::now();
        let data = serde_json::to_vec_pretty(state).map_err(StoreError::Encode)?;
        fs::write(&self.path, data).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }

    pub fn update(
        &self,
        docker_projects: Vec<DockerProject>,
        kubernetes_configs: Vec<KubernetesConfig>,
        systemd_services: Vec<SystemdService>,
    ) -> Result<SystemState, StoreError> {
        let mut state = self.load()?;
        state.replace_resources(docker_projects, kubernetes_configs, systemd_services);
        self.save(&mut state)?;
        Ok(state)
    }
}
