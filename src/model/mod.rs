pub mod codec;
pub mod meta;
pub mod registry;

pub use self::meta::ModelMeta;
pub use self::registry::{EngineKind, LoadedModel, ModelRegistry};

use crate::error::{SmResult, StrokeMatchError};
use crate::features::FeatureVec;
use fnv::FnvHashMap;
use std::path::Path;

/// One stored representative per character label.
///
/// Iteration follows insertion (file) order; lookup goes through a label
/// index. Built once, then shared read-only.
#[derive(Debug, Clone)]
pub struct TemplateModel {
    dimension: u16,
    entries: Vec<(String, FeatureVec)>,
    index: FnvHashMap<String, usize>,
}

impl PartialEq for TemplateModel {
    fn eq(&self, other: &Self) -> bool {
        self.dimension == other.dimension && self.entries == other.entries
    }
}

impl TemplateModel {
    pub fn new(dimension: u16) -> SmResult<Self> {
        if dimension == 0 {
            return Err(StrokeMatchError::Config(
                "model dimension must be positive".to_string(),
            ));
        }
        Ok(Self {
            dimension,
            entries: Vec::new(),
            index: FnvHashMap::default(),
        })
    }

    #[inline(always)]
    pub fn dimension(&self) -> usize {
        self.dimension as usize
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds or replaces the template for `label`. A replaced label keeps its
    /// original position.
    pub fn insert(&mut self, label: impl Into<String>, template: FeatureVec) -> SmResult<()> {
        let label = label.into();
        let d = self.dimension();

        if label.is_empty() {
            return Err(StrokeMatchError::MalformedInput("empty label".to_string()));
        }
        if label.contains('\0') {
            return Err(StrokeMatchError::MalformedInput(format!(
                "label {:?} contains a NUL byte",
                label
            )));
        }
        if template.is_empty() || template.len() % d != 0 {
            return Err(StrokeMatchError::MalformedInput(format!(
                "template for '{}' has {} values, expected a positive multiple of {}",
                label,
                template.len(),
                d
            )));
        }

        if template.iter().any(|v| !v.is_finite()) {
            return Err(StrokeMatchError::MalformedInput(format!(
                "template for '{}' holds a non-finite value",
                label
            )));
        }

        match self.index.get(&label) {
            Some(&i) => self.entries[i].1 = template,
            None => {
                self.index.insert(label.clone(), self.entries.len());
                self.entries.push((label, template));
            }
        }
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&[f32]> {
        self.index
            .get(label)
            .map(|&i| self.entries[i].1.as_slice())
    }

    pub fn contains(&self, label: &str) -> bool {
        self.index.contains_key(label)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(l, _)| l.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f32])> {
        self.entries.iter().map(|(l, t)| (l.as_str(), t.as_slice()))
    }

    pub(crate) fn entries(&self) -> &[(String, FeatureVec)] {
        &self.entries
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SmResult<Self> {
        codec::read_model(path)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SmResult<()> {
        codec::write_model(self, path)
    }
}
