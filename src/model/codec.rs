//! Binary template-model format.
//!
//! All fields are little-endian with fixed widths:
//!
//! ```text
//! magic        u16   MODEL_MAGIC
//! n_characters u32
//! dimension    u16
//! n_characters times:
//!   label_len  u16   byte length of the label including its trailing NUL
//!   label      label_len bytes, UTF-8, NUL-terminated
//!   n_vectors  u16
//!   vectors    n_vectors * dimension * f32
//! ```

use super::TemplateModel;
use crate::consts::{MODEL_HEADER_SIZE, MODEL_MAGIC};
use crate::error::{SmResult, StrokeMatchError};
use crate::util::write_atomic;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

fn corrupt(msg: impl Into<String>) -> StrokeMatchError {
    StrokeMatchError::CorruptModel(msg.into())
}

/// Bounds-checked little-endian reader over the raw file bytes.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> SmResult<&'a [u8]> {
        if n > self.remaining() {
            return Err(corrupt(format!(
                "{} needs {} bytes at offset {}, only {} left",
                what,
                n,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn u16(&mut self, what: &str) -> SmResult<u16> {
        let b = self.take(2, what)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self, what: &str) -> SmResult<u32> {
        let b = self.take(4, what)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }
}

/// Serializes `model` into the on-disk layout.
pub fn encode(model: &TemplateModel) -> SmResult<Vec<u8>> {
    let d = model.dimension();
    let n_chars = u32::try_from(model.len()).map_err(|_| {
        StrokeMatchError::MalformedInput(format!("{} templates do not fit a u32", model.len()))
    })?;

    let payload: usize = model
        .iter()
        .map(|(label, t)| 2 + label.len() + 1 + 2 + t.len() * 4)
        .sum();
    let mut out = Vec::with_capacity(MODEL_HEADER_SIZE + payload);

    out.extend_from_slice(&MODEL_MAGIC.to_le_bytes());
    out.extend_from_slice(&n_chars.to_le_bytes());
    out.extend_from_slice(&(d as u16).to_le_bytes());

    for (label, template) in model.iter() {
        let label_len = u16::try_from(label.len() + 1).map_err(|_| {
            StrokeMatchError::MalformedInput(format!("label '{}' is too long", label))
        })?;
        let n_vectors = u16::try_from(template.len() / d).map_err(|_| {
            StrokeMatchError::MalformedInput(format!(
                "template '{}' has {} vectors, the format allows {}",
                label,
                template.len() / d,
                u16::MAX
            ))
        })?;

        out.extend_from_slice(&label_len.to_le_bytes());
        out.extend_from_slice(label.as_bytes());
        out.push(0);
        out.extend_from_slice(&n_vectors.to_le_bytes());
        for v in template {
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    Ok(out)
}

/// Parses a complete model. Nothing is returned unless every entry validates.
pub fn decode(bytes: &[u8]) -> SmResult<TemplateModel> {
    let mut r = ByteReader::new(bytes);

    let magic = r.u16("magic")?;
    if magic != MODEL_MAGIC {
        return Err(corrupt(format!(
            "bad magic 0x{:04x}, expected 0x{:04x}",
            magic, MODEL_MAGIC
        )));
    }

    let n_chars = r.u32("character count")? as usize;
    let dimension = r.u16("dimension")?;
    if dimension == 0 {
        return Err(corrupt("dimension is zero"));
    }
    let d = dimension as usize;

    let mut model = TemplateModel::new(dimension)?;

    for k in 0..n_chars {
        let label_len = r.u16("label length")? as usize;
        if label_len == 0 {
            return Err(corrupt(format!("entry {} has an empty label field", k)));
        }
        let raw = r.take(label_len, "label")?;
        let text = &raw[..label_len - 1];
        if raw[label_len - 1] != 0 || text.contains(&0) {
            return Err(corrupt(format!("entry {} label is not NUL-terminated", k)));
        }
        let label = std::str::from_utf8(text)
            .map_err(|e| corrupt(format!("entry {} label is not UTF-8: {}", k, e)))?;
        if label.is_empty() {
            return Err(corrupt(format!("entry {} label is empty", k)));
        }
        if model.contains(label) {
            return Err(corrupt(format!("duplicate label '{}'", label)));
        }

        let n_vectors = r.u16("vector count")? as usize;
        if n_vectors == 0 {
            return Err(corrupt(format!("template '{}' has no vectors", label)));
        }
        let n_bytes = n_vectors
            .checked_mul(d * 4)
            .ok_or_else(|| corrupt(format!("template '{}' size overflows", label)))?;
        let data = r.take(n_bytes, "template vectors")?;
        let template: Vec<f32> = data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        if let Some(pos) = template.iter().position(|v| !v.is_finite()) {
            return Err(corrupt(format!(
                "template '{}' holds {} at value {}",
                label, template[pos], pos
            )));
        }

        model.insert(label, template)?;
    }

    if r.remaining() != 0 {
        return Err(corrupt(format!(
            "{} trailing bytes after the last template",
            r.remaining()
        )));
    }

    Ok(model)
}

pub fn read_model<P: AsRef<Path>>(path: P) -> SmResult<TemplateModel> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    let model = decode(&bytes)?;
    info!(
        "📦 Loaded model {:?}: {} templates, dimension {}",
        path,
        model.len(),
        model.dimension()
    );
    Ok(model)
}

/// Writes through a temporary file in the target directory and renames it
/// into place, so a failed write never leaves a partial model behind.
pub fn write_model<P: AsRef<Path>>(model: &TemplateModel, path: P) -> SmResult<()> {
    let path = path.as_ref();
    let bytes = encode(model)?;
    write_atomic(path, &bytes)?;

    debug!("Model bytes written: {}", bytes.len());
    info!(
        "💾 Saved model {:?}: {} templates, dimension {}",
        path,
        model.len(),
        model.dimension()
    );
    Ok(())
}
