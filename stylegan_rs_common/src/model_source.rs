use std::{
    fmt::Display,
    fs::File,
    io::{self, Cursor},
    path::PathBuf,
};

use anyhow::{Context, Result};
use hf_hub::{api::sync::ApiBuilder, Repo, RepoType};
use memmap2::Mmap;
use zip::ZipArchive;

use crate::{get_token, TokenSource};

/// Hugging Face repository holding the pretrained snapshot. This locator is
/// fixed; the CLI does not expose it.
pub const PRETRAINED_MODEL_ID: &str = "stylegan-rs/stylegan-anime";
/// Name of the snapshot archive within the repository.
pub const SNAPSHOT_FILENAME: &str = "network-snapshot-005685.zip";

pub enum ModelSource {
    /// A Hugging Face model ID, resolved through the local hub cache and
    /// downloaded on first use.
    ModelId(String),
    /// A snapshot archive already on disk.
    Snapshot(PathBuf),
}

impl Display for ModelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ModelId(model_id) => write!(f, "model id: {model_id}"),
            Self::Snapshot(file) => write!(f, "snapshot file: {}", file.display()),
        }
    }
}

impl ModelSource {
    /// The fixed pretrained generator snapshot.
    pub fn pretrained() -> Self {
        Self::ModelId(PRETRAINED_MODEL_ID.to_string())
    }

    pub fn from_model_id<S: ToString>(model_id: S) -> Self {
        Self::ModelId(model_id.to_string())
    }

    pub fn snapshot<P: Into<PathBuf>>(file: P) -> Self {
        Self::Snapshot(file.into())
    }
}

/// Read access to the entries of a snapshot archive, after resolving the model
/// source to a local file (downloading into the cache directory if needed).
pub struct SnapshotLoader {
    archive: ZipArchive<Cursor<Mmap>>,
}

impl SnapshotLoader {
    /// Resolve `source` to a local snapshot file and open it.
    ///
    /// `token`, `revision` and `cache_dir` only apply to Hugging Face sources.
    pub fn from_source(
        source: ModelSource,
        silent: bool,
        token: TokenSource,
        revision: Option<String>,
        cache_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let path = match source {
            ModelSource::ModelId(model_id) => {
                let mut api_builder = ApiBuilder::new()
                    .with_progress(!silent)
                    .with_token(get_token(&token)?);
                if let Some(cache_dir) = cache_dir {
                    api_builder = api_builder.with_cache_dir(cache_dir);
                }
                let api = api_builder.build()?;
                let revision = revision.unwrap_or("main".to_string());
                let repo = api.repo(Repo::with_revision(
                    model_id.clone(),
                    RepoType::Model,
                    revision,
                ));
                repo.get(SNAPSHOT_FILENAME).with_context(|| {
                    format!("retrieving `{SNAPSHOT_FILENAME}` from `{model_id}`")
                })?
            }
            ModelSource::Snapshot(file) => file,
        };

        let file = File::open(&path)
            .with_context(|| format!("opening snapshot `{}`", path.display()))?;
        let mmap = unsafe { Mmap::map(&file)? };
        let archive = ZipArchive::new(Cursor::new(mmap))
            .context("snapshot is not a valid archive")?;
        Ok(Self { archive })
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Read one archive entry into memory.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = self
            .archive
            .by_name(name)
            .with_context(|| format!("snapshot entry `{name}`"))?;
        let mut data = Vec::new();
        io::copy(&mut entry, &mut data)?;
        Ok(data)
    }
}
