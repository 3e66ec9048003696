//! services/api/src/adapters/audio_store.rs

use std::path::PathBuf;

use async_trait::async_trait;
use krushi_core::ports::{AudioStore, PortError, PortResult};
use uuid::Uuid;

/// Writes each synthesized answer to its own `output_<8 hex>.mp3` file.
#[derive(Clone)]
pub struct FsAudioStore {
    dir: PathBuf,
}

impl FsAudioStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn fresh_name() -> String {
        let id = Uuid::new_v4().simple().to_string();
        format!("output_{}.mp3", &id[..8])
    }
}

#[async_trait]
impl AudioStore for FsAudioStore {
    async fn save(&self, audio: &[u8]) -> PortResult<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot create audio directory: {e}")))?;

        let name = Self::fresh_name();
        tokio::fs::write(self.dir.join(&name), audio)
            .await
            .map_err(|e| PortError::Unexpected(format!("Cannot write {name}: {e}")))?;
        Ok(name)
    }
}
