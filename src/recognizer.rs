use crate::config::RecognizerOptions;
use crate::consts::DEFAULT_N_RESULTS;
use crate::dtw::{euclidean_distance, CostFn, DtwMatrix};
use crate::error::{SmResult, StrokeMatchError};
use crate::features::FeatureVec;
use crate::model::{LoadedModel, TemplateModel};
use crate::writing::Writing;
use itertools::Itertools;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;
use typed_builder::TypedBuilder;

/// One ranked match.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Key of the template in the model, e.g. `A_2`.
    pub label: String,
    /// The character the label stands for, e.g. `A`.
    pub value: String,
    pub distance: f64,
}

/// Strips an allograph disambiguator (`_` followed by digits) from a label.
pub fn rendered_label(label: &str) -> &str {
    match label.rsplit_once('_') {
        Some((head, tail))
            if !head.is_empty() && !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) =>
        {
            head
        }
        _ => label,
    }
}

/// Candidates in ascending distance, at most one per rendered value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Results {
    candidates: Vec<Candidate>,
}

impl Results {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn first(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    pub fn get(&self, i: usize) -> Option<&Candidate> {
        self.candidates.get(i)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    /// Rendered values in rank order.
    pub fn labels(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.value.as_str()).collect()
    }

    pub fn into_vec(self) -> Vec<Candidate> {
        self.candidates
    }

    /// Maps every value with a small kana form onto it. Pair with
    /// `Writing::is_small` to tell `つ` from `っ`.
    pub fn to_small_kana(&self) -> Results {
        let candidates = self
            .candidates
            .iter()
            .map(|c| Candidate {
                value: small_kana(&c.value).unwrap_or(&c.value).to_string(),
                ..c.clone()
            })
            .collect();
        Results { candidates }
    }
}

impl IntoIterator for Results {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.into_iter()
    }
}

impl<'a> IntoIterator for &'a Results {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

const SMALL_KANA: &[(&str, &str)] = &[
    ("あ", "ぁ"), ("い", "ぃ"), ("う", "ぅ"), ("え", "ぇ"), ("お", "ぉ"),
    ("か", "ゕ"), ("け", "ゖ"), ("つ", "っ"), ("や", "ゃ"), ("ゆ", "ゅ"),
    ("よ", "ょ"), ("わ", "ゎ"),
    ("ア", "ァ"), ("イ", "ィ"), ("ウ", "ゥ"), ("エ", "ェ"), ("オ", "ォ"),
    ("カ", "ヵ"), ("ケ", "ヶ"), ("ツ", "ッ"), ("ヤ", "ャ"), ("ユ", "ュ"),
    ("ヨ", "ョ"), ("ワ", "ヮ"),
];

fn small_kana(value: &str) -> Option<&'static str> {
    SMALL_KANA
        .iter()
        .find(|(big, _)| *big == value)
        .map(|(_, small)| *small)
}

pub trait HandwritingRecognizer {
    /// Up to `n` candidates for `writing`, best first.
    fn recognize(&self, writing: &Writing, n: usize) -> SmResult<Results>;

    fn recognize_default(&self, writing: &Writing) -> SmResult<Results> {
        self.recognize(writing, DEFAULT_N_RESULTS)
    }
}

#[derive(TypedBuilder)]
pub struct RecognizerBuildParams {
    pub model: Arc<TemplateModel>,
    #[builder(default)]
    pub options: RecognizerOptions,
    #[builder(default = euclidean_distance as CostFn)]
    pub cost: CostFn,
}

impl RecognizerBuildParams {
    pub fn build_recognizer(self) -> SmResult<Recognizer> {
        let d = self.options.features.dimension();
        if self.model.dimension() != d {
            return Err(StrokeMatchError::Config(format!(
                "model dimension {} does not match the '{}' extractor dimension {}",
                self.model.dimension(),
                self.options.features,
                d
            )));
        }
        Ok(Recognizer {
            model: self.model,
            options: self.options,
            cost: self.cost,
        })
    }
}

/// Nearest-template matcher over a shared, read-only model.
#[derive(Debug, Clone)]
pub struct Recognizer {
    model: Arc<TemplateModel>,
    options: RecognizerOptions,
    cost: CostFn,
}

impl Recognizer {
    pub fn new(model: Arc<TemplateModel>, options: RecognizerOptions) -> SmResult<Self> {
        RecognizerBuildParams::builder()
            .model(model)
            .options(options)
            .build()
            .build_recognizer()
    }

    /// Applies the preprocessing recorded in the model's meta on top of
    /// `options`.
    pub fn from_loaded(loaded: &LoadedModel, mut options: RecognizerOptions) -> SmResult<Self> {
        options.apply_meta(&loaded.meta)?;
        Self::new(Arc::clone(&loaded.model), options)
    }

    pub fn model(&self) -> &TemplateModel {
        &self.model
    }

    pub fn options(&self) -> &RecognizerOptions {
        &self.options
    }

    /// The query as the model sees it.
    pub fn features(&self, writing: &Writing) -> SmResult<FeatureVec> {
        self.options
            .features
            .preprocess(writing, self.options.downsample_threshold)
    }

    /// Distance to every template, in model order.
    fn distances(&self, query: &[f32]) -> SmResult<Vec<f64>> {
        let d = self.model.dimension();
        let cost = self.cost;
        let entries = self.model.entries();

        if self.options.parallel {
            entries
                .par_iter()
                .map_init(DtwMatrix::new, |matrix, (_, template)| {
                    matrix.compute(query, template, d, cost)
                })
                .collect()
        } else {
            let mut matrix = DtwMatrix::new();
            entries
                .iter()
                .map(|(_, template)| matrix.compute(query, template, d, cost))
                .collect()
        }
    }
}

impl HandwritingRecognizer for Recognizer {
    fn recognize(&self, writing: &Writing, n: usize) -> SmResult<Results> {
        if self.model.is_empty() {
            return Ok(Results::default());
        }

        let query = self.features(writing)?;
        let distances = self.distances(&query)?;

        let mut ranked: Vec<(usize, f64)> = distances.into_iter().enumerate().collect();
        // sort_by is stable: exact ties stay in model order
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

        let entries = self.model.entries();
        let candidates: Vec<Candidate> = ranked
            .into_iter()
            .map(|(i, distance)| {
                let label = &entries[i].0;
                Candidate {
                    label: label.clone(),
                    value: rendered_label(label).to_string(),
                    distance,
                }
            })
            .unique_by(|c| c.value.clone())
            .take(n)
            .collect();

        debug!(
            "Recognized {} candidate(s) from {} templates, query has {} vectors",
            candidates.len(),
            self.model.len(),
            query.len() / self.model.dimension()
        );
        Ok(Results::new(candidates))
    }
}
