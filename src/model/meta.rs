use crate::error::{SmResult, StrokeMatchError};
use crate::util::write_atomic;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Contents of a `.meta` sidecar: one `key = value` pair per line.
///
/// Keys keep their file order. Lines that are not exactly one `key = value`
/// pair are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelMeta {
    entries: Vec<(String, String)>,
}

impl ModelMeta {
    pub fn new(name: &str, shortname: &str) -> Self {
        let mut meta = Self::default();
        meta.set("name", name);
        meta.set("shortname", shortname);
        meta
    }

    pub fn parse(content: &str) -> Self {
        let mut meta = Self::default();
        for line in content.lines() {
            let parts: Vec<&str> = line.trim().split('=').collect();
            if let [key, value] = parts[..] {
                let key = key.trim();
                if !key.is_empty() {
                    meta.set(key, value.trim());
                }
            }
        }
        meta
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> SmResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Replaces `path` in one rename, so readers never see half a sidecar.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> SmResult<()> {
        write_atomic(path.as_ref(), self.to_string().as_bytes())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn shortname(&self) -> Option<&str> {
        self.get("shortname")
    }

    pub fn language(&self) -> Option<&str> {
        self.get("language")
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.get("path").map(PathBuf::from)
    }

    pub fn checksum(&self) -> Option<&str> {
        self.get("checksum")
    }

    /// Both `name` and `shortname` must be present.
    pub fn validate(&self) -> SmResult<()> {
        for key in ["name", "shortname"] {
            if self.get(key).map_or(true, str::is_empty) {
                return Err(StrokeMatchError::Config(format!(
                    "model meta is missing '{}'",
                    key
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for ModelMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.entries {
            writeln!(f, "{} = {}", k, v)?;
        }
        Ok(())
    }
}
