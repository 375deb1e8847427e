//! Error types and context management for stippling operations

use std::fmt;
use std::path::PathBuf;

/// Main error type for all stippling operations
#[derive(Debug)]
pub enum AlgorithmError {
    /// Failed to load source image from filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Density field input is malformed or empty
    ///
    /// Raised before any iteration starts:
    /// - Zero width or height
    /// - Data length does not match `width * height`
    /// - Non-finite or out-of-range values
    /// - Maximum value of zero (nothing to normalize by)
    InvalidInput {
        /// Description of what's wrong with the input
        reason: String,
    },

    /// Integer coordinate lies outside the density field
    OutOfBounds {
        /// Requested x coordinate
        x: usize,
        /// Requested y coordinate
        y: usize,
        /// Field dimensions (width, height)
        dimensions: (usize, usize),
    },

    /// Stipples and tessellation cells disagree
    ///
    /// Indicates a defect in the geometry provider or in stipple bookkeeping.
    /// Never recovered.
    GeometryInconsistency {
        /// Relaxation iteration when this occurred
        iteration: usize,
        /// Number of stipples in the current generation
        stipples: usize,
        /// Number of cells in the tessellation
        cells: usize,
        /// Description of the inconsistency
        reason: String,
    },

    /// Algorithm parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// Caller cancelled the run between iterations
    Cancelled {
        /// Iteration that was about to start
        iteration: usize,
    },

    /// Relaxation did not converge within the configured iteration cap
    IterationLimit {
        /// Number of completed iterations
        iterations: usize,
        /// Stipple count when the cap was hit
        stipples: usize,
    },

    /// Failed to save rendered image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl fmt::Display for AlgorithmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::InvalidInput { reason } => {
                write!(f, "Invalid density field input: {reason}")
            }
            Self::OutOfBounds { x, y, dimensions } => {
                write!(
                    f,
                    "Coordinate ({x}, {y}) is outside the density field ({}x{})",
                    dimensions.0, dimensions.1
                )
            }
            Self::GeometryInconsistency {
                iteration,
                stipples,
                cells,
                reason,
            } => {
                write!(
                    f,
                    "Geometry inconsistency at iteration {iteration} ({stipples} stipples, {cells} cells): {reason}"
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Cancelled { iteration } => {
                write!(f, "Stippling cancelled before iteration {iteration}")
            }
            Self::IterationLimit {
                iterations,
                stipples,
            } => {
                write!(
                    f,
                    "No convergence after {iterations} iterations ({stipples} stipples remaining)"
                )
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for AlgorithmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for stippling results
pub type Result<T> = std::result::Result<T, AlgorithmError>;

/// Additional context to enrich error messages
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Current relaxation iteration
    pub iteration: Option<usize>,
    /// Stipple count of the current generation
    pub stipples: Option<usize>,
    /// Cell count of the current tessellation
    pub cells: Option<usize>,
    /// Operation being performed
    pub operation: Option<&'static str>,
}

/// Enriches error messages with relaxation state information
pub trait WithContext<T> {
    /// Add error context to a Result
    ///
    /// # Errors
    ///
    /// Propagates the original error with additional context applied
    fn with_context(self, context: ErrorContext) -> Result<T>;

    /// Add just the iteration context
    ///
    /// # Errors
    ///
    /// Propagates the original error with the iteration applied
    fn with_iteration(self, iteration: usize) -> Result<T>;
}

impl<T, E> WithContext<T> for std::result::Result<T, E>
where
    E: Into<AlgorithmError>,
{
    fn with_context(self, context: ErrorContext) -> Result<T> {
        self.map_err(|e| {
            let mut error = e.into();
            // Only geometry errors carry relaxation state
            if let AlgorithmError::GeometryInconsistency {
                iteration,
                stipples,
                cells,
                reason,
            } = &mut error
            {
                if let Some(iter) = context.iteration {
                    *iteration = iter;
                }
                if let Some(count) = context.stipples {
                    *stipples = count;
                }
                if let Some(count) = context.cells {
                    *cells = count;
                }
                if let Some(operation) = context.operation {
                    *reason = format!("{operation}: {reason}");
                }
            }
            error
        })
    }

    fn with_iteration(self, iteration: usize) -> Result<T> {
        self.with_context(ErrorContext {
            iteration: Some(iteration),
            ..Default::default()
        })
    }
}

impl From<image::ImageError> for AlgorithmError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for AlgorithmError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an invalid input error
pub fn invalid_input(reason: &impl ToString) -> AlgorithmError {
    AlgorithmError::InvalidInput {
        reason: reason.to_string(),
    }
}

/// Create a geometry inconsistency error
///
/// Iteration is left at zero; callers stamp it through [`WithContext`].
pub fn geometry_inconsistency(
    stipples: usize,
    cells: usize,
    reason: &impl ToString,
) -> AlgorithmError {
    AlgorithmError::GeometryInconsistency {
        iteration: 0,
        stipples,
        cells,
        reason: reason.to_string(),
    }
}
