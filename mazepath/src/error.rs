use thiserror::Error;

/// Reasons a maze configuration cannot be used
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("step must be positive, got {0}")]
    Step(i32),

    #[error("goal tolerance radius must be positive, got {0}")]
    ToleranceRadius(f64),

    #[error("display size must be positive, got {0}x{1}")]
    DisplaySize(f64, f64),

    #[error("step interval must be positive")]
    Interval,

    #[error("blacklist color tolerance must be a non-negative number, got {0}")]
    ColorTolerance(f32),

    #[error("config display size {config:?} does not match the maze snapshot {snapshot:?}")]
    DisplayMismatch {
        config: (f64, f64),
        snapshot: (f64, f64),
    },
}
