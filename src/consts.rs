/// Default logical canvas width. Point coordinates are relative to it.
pub const DEFAULT_WIDTH: u32 = 1000;

/// Default logical canvas height.
pub const DEFAULT_HEIGHT: u32 = 1000;

/// Share of the canvas the bounding box occupies after `normalize_size`.
pub const NORMALIZE_PROPORTION: f64 = 0.7;

/// Glyphs thinner than this share of the canvas are not stretched on that axis.
pub const NORMALIZE_MIN_SIZE: f64 = 0.1;

/// 5-tap moving average used by `Stroke::smooth`.
pub const SMOOTH_WEIGHTS: [i64; 5] = [1, 1, 2, 1, 1];

/// Number of smoothing passes.
pub const SMOOTH_PASSES: usize = 3;

/// Minimum distance (in a 1000x1000 canvas) between kept points at
/// recognition and training time.
pub const DEFAULT_DOWNSAMPLE_THRESHOLD: u32 = 50;

/// Target spacing used to densify a representative writing before training.
pub const DEFAULT_UPSAMPLE_THRESHOLD: u32 = 10;

/// Sentinel written at the start of every model file.
pub const MODEL_MAGIC: u16 = 0x7777;

/// Size of the fixed model header: magic (u16) + n_characters (u32) + dimension (u16).
pub const MODEL_HEADER_SIZE: usize = 8;

/// Default number of candidates returned by `recognize`.
pub const DEFAULT_N_RESULTS: usize = 10;
