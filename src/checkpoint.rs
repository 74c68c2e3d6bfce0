//! Checkpoint persistence for in-progress aggregates.
//!
//! A checkpoint is one MessagePack record holding the aggregate records and
//! the season counter together, so the two are always replaced as a unit.
//! File checkpoints are written to a sibling temporary file, renamed over
//! the previous one, and the directory is synced after the rename.

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::standings::Aggregator;

/// Bumped whenever the encoded layout of `Aggregator` changes.
pub const CHECKPOINT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("checkpoint encoding failed: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    #[error("checkpoint decoding failed: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    #[error("checkpoint format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

/// Where the orchestrator persists aggregate state between chunks.
pub trait CheckpointStore {
    /// The last saved aggregate, or `None` if nothing was saved yet.
    fn load(&self) -> Result<Option<Aggregator>, CheckpointError>;

    fn save(&mut self, state: &Aggregator) -> Result<(), CheckpointError>;
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    aggregate: &'a Aggregator,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    aggregate: Aggregator,
}

/// Encode an aggregate as a versioned MessagePack checkpoint.
pub fn encode(state: &Aggregator) -> Result<Vec<u8>, CheckpointError> {
    let envelope = EnvelopeRef {
        version: CHECKPOINT_VERSION,
        aggregate: state,
    };
    Ok(rmp_serde::to_vec_named(&envelope)?)
}

/// Decode a checkpoint produced by [`encode`].
pub fn decode(bytes: &[u8]) -> Result<Aggregator, CheckpointError> {
    let envelope: Envelope = rmp_serde::from_slice(bytes)?;
    if envelope.version != CHECKPOINT_VERSION {
        return Err(CheckpointError::UnsupportedVersion {
            found: envelope.version,
            expected: CHECKPOINT_VERSION,
        });
    }
    Ok(envelope.aggregate)
}

/// Checkpoint kept in a single file on disk.
#[derive(Clone, Debug)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCheckpointStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Directory holding the checkpoint; `.` for a bare file name.
    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> CheckpointError + '_ {
        move |source| CheckpointError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl CheckpointStore for FileCheckpointStore {
    fn load(&self) -> Result<Option<Aggregator>, CheckpointError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(Self::io_error(&self.path)(e)),
        };
        decode(&bytes).map(Some)
    }

    fn save(&mut self, state: &Aggregator) -> Result<(), CheckpointError> {
        let bytes = encode(state)?;
        let temp = self.temp_path();

        let parent = self.parent_dir();
        fs::create_dir_all(parent).map_err(Self::io_error(parent))?;

        let mut file = File::create(&temp).map_err(Self::io_error(&temp))?;
        file.write_all(&bytes).map_err(Self::io_error(&temp))?;
        file.sync_all().map_err(Self::io_error(&temp))?;
        drop(file);

        fs::rename(&temp, &self.path).map_err(Self::io_error(&self.path))?;
        let dir = self.parent_dir();
        sync_dir(dir).map_err(Self::io_error(dir))?;
        debug!(
            path = %self.path.display(),
            seasons = state.seasons(),
            bytes = bytes.len(),
            "checkpoint written"
        );
        Ok(())
    }
}

/// Flush a directory entry so a completed rename survives a crash.
#[cfg(unix)]
fn sync_dir(dir: &Path) -> std::io::Result<()> {
    File::open(dir)?.sync_all()
}

/// Directories cannot be opened as files here; the rename is left to the OS.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> std::io::Result<()> {
    Ok(())
}

/// In-memory checkpoint; still goes through the encoded form.
#[derive(Clone, Debug, Default)]
pub struct MemoryCheckpointStore {
    bytes: Option<Vec<u8>>,
    saves: usize,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store preloaded with raw checkpoint bytes.
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        MemoryCheckpointStore {
            bytes: Some(bytes),
            saves: 0,
        }
    }

    /// How many times `save` has been called
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl CheckpointStore for MemoryCheckpointStore {
    fn load(&self) -> Result<Option<Aggregator>, CheckpointError> {
        self.bytes.as_deref().map(decode).transpose()
    }

    fn save(&mut self, state: &Aggregator) -> Result<(), CheckpointError> {
        self.bytes = Some(encode(state)?);
        self.saves += 1;
        Ok(())
    }
}
