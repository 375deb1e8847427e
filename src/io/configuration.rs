//! Algorithm constants and runtime configuration defaults

// Relaxation defaults
/// Default stipple radius in field pixels
pub const DEFAULT_STIPPLE_RADIUS: f64 = 5.0;
/// Default starting tolerance around the stipple area
pub const DEFAULT_INITIAL_ERROR_THRESHOLD: f64 = 0.0;
/// Amount added to the error threshold after every iteration
pub const DEFAULT_THRESHOLD_CONVERGENCE_RATE: f64 = 0.01;
/// Fraction of the field area covered by the initial random stipples
pub const INITIAL_STIPPLE_FILL: f64 = 0.7;

// Contrast enhancement defaults
/// Default number of equal quantization bands
pub const DEFAULT_QUANTIZATION_STEPS: usize = 5;
/// Default strength of the Mach banding effect
pub const DEFAULT_CONTRAST_WEIGHT: f64 = 0.5;
/// Default radius of the blur applied to the quantized field
pub const DEFAULT_BLUR_RADIUS: f64 = 4.0;
/// Factor applied to `w·(C − B)` before it is added to the field
pub const CONTRAST_DELTA_SCALE: f64 = 4.0;
/// Gaussian kernels are truncated at this many standard deviations
pub const GAUSSIAN_TRUNCATION: f64 = 3.0;

// Luminance weights applied to 8-bit RGB channels
/// Red channel weight
pub const LUMINANCE_RED: f64 = 0.2126;
/// Green channel weight
pub const LUMINANCE_GREEN: f64 = 0.7152;
/// Blue channel weight
pub const LUMINANCE_BLUE: f64 = 0.0722;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed field dimension
pub const MAX_FIELD_DIMENSION: usize = 10_000;

// Default values for configurable parameters
/// Fixed seed for reproducible stippling
pub const DEFAULT_SEED: u64 = 42;

/// Default cap on relaxation iterations
///
/// A radius 5 stipple at the default rate needs about 3000 iterations on
/// ordinary fields; the cap only stops runs that never settle.
pub const DEFAULT_MAX_ITERATIONS: usize = 100_000;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_stippled";
/// Default multiplier from field pixels to output pixels
pub const DEFAULT_OUTPUT_SCALE: f64 = 2.0;
/// Image extensions accepted when scanning a directory
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];
