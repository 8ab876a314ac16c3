use crate::collection::SampleCollection;
use crate::config::TrainerOptions;
use crate::dtw::dtw;
use crate::error::{SmResult, StrokeMatchError};
use crate::features::FeatureVec;
use crate::model::{EngineKind, ModelMeta, TemplateModel};
use crate::util::file_digest;
use crate::writing::Writing;
use itertools::Itertools;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

pub trait ModelTrainer {
    /// Builds a model from `samples` and writes it to `path`.
    fn train(&self, samples: &SampleCollection, path: &Path) -> SmResult<TemplateModel>;
}

/// Picks one representative sample per label and stores its features.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    options: TrainerOptions,
}

impl Trainer {
    pub fn new(options: TrainerOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TrainerOptions {
        &self.options
    }

    /// Same preprocessing the recognizer applies to a query.
    pub fn features(&self, writing: &Writing) -> SmResult<FeatureVec> {
        self.options
            .features
            .preprocess(writing, self.options.downsample_threshold)
    }

    /// Index of the sample to keep for a label.
    ///
    /// With one or two samples the first one is kept. Otherwise it is the
    /// medoid: the sample with the lowest summed DTW distance to the others.
    /// Ties go to the lower index.
    pub fn representative(&self, writings: &[Writing]) -> SmResult<usize> {
        match writings.len() {
            0 => return Err(StrokeMatchError::NoSamples),
            1 | 2 => return Ok(0),
            _ => {}
        }

        let d = self.options.features.dimension();
        let features: Vec<FeatureVec> = writings
            .iter()
            .map(|w| self.features(w))
            .collect::<SmResult<_>>()?;

        // Distance is symmetric, so only i < j is computed.
        let pairs: Vec<(usize, usize)> = (0..features.len()).tuple_combinations().collect();
        let distances: Vec<f64> = pairs
            .par_iter()
            .map(|&(i, j)| dtw(&features[i], &features[j], d))
            .collect::<SmResult<_>>()?;

        let mut sums = vec![0.0f64; features.len()];
        for (&(i, j), dist) in pairs.iter().zip(&distances) {
            sums[i] += dist;
            sums[j] += dist;
        }

        let mut best = 0;
        for (i, &s) in sums.iter().enumerate().skip(1) {
            if s < sums[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Computes every template without touching the filesystem.
    pub fn build_model(&self, samples: &SampleCollection) -> SmResult<TemplateModel> {
        let d = self.options.features.dimension() as u16;
        let mut model = TemplateModel::new(d)?;

        let total = samples.iter().filter(|s| !s.writings.is_empty()).count();
        if total == 0 {
            return Err(StrokeMatchError::NoSamples);
        }

        let mut done = 0;
        for set in samples.iter() {
            if set.writings.is_empty() {
                warn!("Skipping label '{}': no samples", set.label);
                continue;
            }

            let rep = self.representative(&set.writings)?;
            let mut writing = set.writings[rep].clone();
            // Training data drawn as straight lines has very few points.
            if self.options.upsample_threshold > 0 {
                writing.upsample_threshold(self.options.upsample_threshold as f64)?;
            }
            let template = self.features(&writing)?;
            model.insert(set.label.as_str(), template)?;

            done += 1;
            debug!(
                "{} ({}/{}) sample #{} of {}",
                set.label,
                done,
                total,
                rep,
                set.writings.len()
            );
        }

        info!("🧮 Built {} template(s)", model.len());
        Ok(model)
    }

    /// Trains, then writes `<path>` and a `.meta` sidecar next to it. The
    /// sidecar records the preprocessing options and the model's checksum.
    /// If the sidecar cannot be written the new model is removed again.
    pub fn train_with_meta(
        &self,
        samples: &SampleCollection,
        path: &Path,
        meta: ModelMeta,
    ) -> SmResult<TemplateModel> {
        meta.validate()?;
        let model = self.train(samples, path)?;

        let meta_path = path.with_extension("meta");
        if let Err(e) = self.write_sidecar(path, &meta_path, meta) {
            warn!("Removing {:?}: meta {:?} not written: {}", path, meta_path, e);
            if let Err(rm) = fs::remove_file(path) {
                warn!("Could not remove {:?}: {}", path, rm);
            }
            return Err(e);
        }
        Ok(model)
    }

    fn write_sidecar(&self, model_path: &Path, meta_path: &Path, mut meta: ModelMeta) -> SmResult<()> {
        self.options.write_meta(&mut meta);
        meta.set("recognizer", EngineKind::Dtw.to_string());
        meta.set("checksum", file_digest(model_path)?);

        meta.save_to_file(meta_path)?;
        info!("📝 Wrote meta {:?}", meta_path);
        Ok(())
    }
}

impl ModelTrainer for Trainer {
    fn train(&self, samples: &SampleCollection, path: &Path) -> SmResult<TemplateModel> {
        let model = self.build_model(samples)?;
        model.save_to_file(path)?;
        Ok(model)
    }
}
