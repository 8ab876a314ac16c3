use crate::error::SmResult;
use crate::writing::Writing;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// All samples of one label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSet {
    pub label: String,
    pub writings: Vec<Writing>,
}

/// Labelled training samples, grouped by label in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SampleCollection {
    sets: Vec<SampleSet>,
}

impl SampleCollection {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, label: &str) -> &mut SampleSet {
        let pos = match self.sets.iter().position(|s| s.label == label) {
            Some(pos) => pos,
            None => {
                self.sets.push(SampleSet {
                    label: label.to_string(),
                    writings: Vec::new(),
                });
                self.sets.len() - 1
            }
        };
        &mut self.sets[pos]
    }

    pub fn add(&mut self, label: &str, writing: Writing) {
        self.set_mut(label).writings.push(writing);
    }

    pub fn add_set<I: IntoIterator<Item = Writing>>(&mut self, label: &str, writings: I) {
        self.set_mut(label).writings.extend(writings);
    }

    pub fn get(&self, label: &str) -> Option<&[Writing]> {
        self.sets
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.writings.as_slice())
    }

    pub fn remove(&mut self, label: &str) -> Option<SampleSet> {
        let pos = self.sets.iter().position(|s| s.label == label)?;
        Some(self.sets.remove(pos))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.sets.iter().map(|s| s.label.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &SampleSet> {
        self.sets.iter()
    }

    /// Number of labels, including labels with no samples.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn n_samples(&self) -> usize {
        self.sets.iter().map(|s| s.writings.len()).sum()
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SmResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SmResult<()> {
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }
}
