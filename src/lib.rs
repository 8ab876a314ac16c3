pub mod collection;
pub mod config;
pub mod consts;
pub mod dtw;
pub mod error;
pub mod features;
pub mod model;
pub mod recognizer;
pub mod trainer;
pub mod util;
pub mod writing;

pub use collection::SampleCollection;
pub use config::{Config, RecognizerOptions, TrainerOptions};
pub use dtw::{dtw, dtw_with};
pub use error::{SmResult, StrokeMatchError};
pub use features::{FeatureKind, FeatureVec};
pub use model::{LoadedModel, ModelMeta, ModelRegistry, TemplateModel};
pub use recognizer::{Candidate, HandwritingRecognizer, Recognizer, Results};
pub use trainer::{ModelTrainer, Trainer};
pub use writing::{Point, Stroke, Writing};
