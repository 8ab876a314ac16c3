use super::{ModelMeta, TemplateModel};
use crate::error::{SmResult, StrokeMatchError};
use crate::util::file_digest;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Matching engines a model can be built for. Each engine keeps its models
/// under a subdirectory of the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum EngineKind {
    #[strum(serialize = "dtw")]
    Dtw,
}

impl EngineKind {
    pub fn parse(name: &str) -> SmResult<Self> {
        Self::from_str(name.trim())
            .map_err(|_| StrokeMatchError::Config(format!("unknown recognizer engine '{}'", name)))
    }
}

/// A discovered model: its sidecar plus the resolved model path.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelEntry {
    pub engine: EngineKind,
    pub meta: ModelMeta,
    pub meta_path: PathBuf,
    pub model_path: PathBuf,
}

/// A model in memory, shared read-only between recognizers.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub model: Arc<TemplateModel>,
    pub meta: ModelMeta,
}

/// Index of the models found under an explicit list of directories.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    dirs: Vec<PathBuf>,
    entries: BTreeMap<String, ModelEntry>,
}

impl ModelRegistry {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
            entries: BTreeMap::new(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Rebuilds the index. Later directories override earlier ones on name
    /// clashes. Returns the number of usable models.
    pub fn scan(&mut self) -> SmResult<usize> {
        self.entries.clear();

        for dir in &self.dirs {
            for engine in EngineKind::iter() {
                let engine_dir = dir.join(engine.to_string());
                if !engine_dir.is_dir() {
                    continue;
                }
                debug!("Scanning {:?}", engine_dir);

                for entry in WalkDir::new(&engine_dir)
                    .min_depth(1)
                    .max_depth(1)
                    .sort_by_file_name()
                {
                    let entry = entry.map_err(|e| {
                        StrokeMatchError::Io(e.into_io_error().unwrap_or_else(|| {
                            std::io::Error::other("filesystem loop while scanning models")
                        }))
                    })?;
                    let path = entry.path();
                    if path.extension().and_then(|e| e.to_str()) != Some("meta") {
                        continue;
                    }
                    if let Some(found) = Self::read_entry(engine, path)? {
                        self.entries.insert(found.meta.name().unwrap_or_default().to_string(), found);
                    }
                }
            }
        }

        info!("🔎 Found {} model(s) in {} dir(s)", self.entries.len(), self.dirs.len());
        Ok(self.entries.len())
    }

    fn read_entry(engine: EngineKind, meta_path: &Path) -> SmResult<Option<ModelEntry>> {
        let mut meta = ModelMeta::load_from_file(meta_path)?;
        if meta.validate().is_err() {
            warn!("Skipping {:?}: name or shortname missing", meta_path);
            return Ok(None);
        }

        let model_path = match meta.path() {
            Some(p) if p.is_relative() => meta_path.parent().unwrap_or(Path::new(".")).join(p),
            Some(p) => p,
            None => meta_path.with_extension("model"),
        };
        if !model_path.is_file() {
            warn!("Skipping {:?}: model file {:?} not found", meta_path, model_path);
            return Ok(None);
        }
        if meta.path().is_none() {
            meta.set("path", model_path.to_string_lossy());
        }

        Ok(Some(ModelEntry {
            engine,
            meta,
            meta_path: meta_path.to_path_buf(),
            model_path,
        }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by model name.
    pub fn models(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.values()
    }

    pub fn get(&self, name: &str) -> Option<&ModelEntry> {
        self.entries.get(name)
    }

    /// Reads the model file for `name`. A `checksum` in the meta must match.
    pub fn load(&self, name: &str) -> SmResult<LoadedModel> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| StrokeMatchError::Config(format!("no model named '{}'", name)))?;

        if let Some(declared) = entry.meta.get("recognizer") {
            let engine = EngineKind::parse(declared)?;
            if engine != entry.engine {
                return Err(StrokeMatchError::Config(format!(
                    "model '{}' is declared for engine '{}' but lives under '{}'",
                    name, engine, entry.engine
                )));
            }
        }

        if let Some(expected) = entry.meta.checksum() {
            let actual = file_digest(&entry.model_path)?;
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(StrokeMatchError::CorruptModel(format!(
                    "checksum mismatch for {:?}: expected {}, got {}",
                    entry.model_path, expected, actual
                )));
            }
        }

        let model = TemplateModel::load_from_file(&entry.model_path)?;
        Ok(LoadedModel {
            model: Arc::new(model),
            meta: entry.meta.clone(),
        })
    }
}
