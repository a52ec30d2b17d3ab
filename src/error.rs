use thiserror::Error;

/// Rejected [`PackingConfig`](crate::config::PackingConfig) values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("sheet dimensions must be positive, got {width}x{height}")]
    InvalidSheet { width: f64, height: f64 },

    #[error("kerf must be a non-negative number, got {0}")]
    InvalidKerf(f64),

    #[error("strip width tolerance must be positive, got {0}")]
    InvalidStripTolerance(f64),

    #[error("strip threshold must lie within 0..=1, got {0}")]
    InvalidStripThreshold(f64),

    #[error("sheet ceiling must allow at least one sheet")]
    ZeroSheetCeiling,

    #[error("conservative mode must allow at least one distinct size per sheet")]
    ZeroDistinctCap,
}
