//! Tests for algorithm configuration constants

#[cfg(test)]
mod tests {
    use fieldstipple::io::configuration::{
        CONTRAST_DELTA_SCALE, DEFAULT_INITIAL_ERROR_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_QUANTIZATION_STEPS,
        DEFAULT_SEED, DEFAULT_STIPPLE_RADIUS, DEFAULT_THRESHOLD_CONVERGENCE_RATE,
        INITIAL_STIPPLE_FILL, LUMINANCE_BLUE, LUMINANCE_GREEN, LUMINANCE_RED,
        MAX_FIELD_DIMENSION, MAX_INDIVIDUAL_PROGRESS_BARS, OUTPUT_SUFFIX, SUPPORTED_EXTENSIONS,
    };

    // Tests relaxation defaults
    // Verified by changing the default radius
    #[test]
    fn test_relaxation_defaults() {
        assert!((DEFAULT_STIPPLE_RADIUS - 5.0).abs() < f64::EPSILON);
        assert!(DEFAULT_INITIAL_ERROR_THRESHOLD.abs() < f64::EPSILON);
        assert!((DEFAULT_THRESHOLD_CONVERGENCE_RATE - 0.01).abs() < f64::EPSILON);
        assert!((INITIAL_STIPPLE_FILL - 0.7).abs() < f64::EPSILON);
        assert_eq!(DEFAULT_QUANTIZATION_STEPS, 5);
    }

    // Tests the Mach banding delta factor
    // Verified by halving the factor
    #[test]
    fn test_contrast_delta_scale() {
        assert!((CONTRAST_DELTA_SCALE - 4.0).abs() < f64::EPSILON);
    }

    // Tests luminance weights sum to one
    // Verified by changing the green weight
    #[test]
    fn test_luminance_weights() {
        assert!((LUMINANCE_RED + LUMINANCE_GREEN + LUMINANCE_BLUE - 1.0).abs() < 1e-12);
        assert!(LUMINANCE_GREEN > LUMINANCE_RED);
        assert!(LUMINANCE_RED > LUMINANCE_BLUE);
    }

    // Tests maximum field dimension value
    // Verified by reducing dimension limit
    #[test]
    fn test_max_field_dimension() {
        assert_eq!(MAX_FIELD_DIMENSION, 10_000);
    }

    // Tests progress bar limit
    // Verified by increasing bar limit
    #[test]
    fn test_max_progress_bars_value() {
        assert_eq!(MAX_INDIVIDUAL_PROGRESS_BARS, 5);
    }

    // Tests default seed and iteration cap
    // Verified by changing seed value
    #[test]
    fn test_run_defaults() {
        assert_eq!(DEFAULT_SEED, 42);
        assert_eq!(DEFAULT_MAX_ITERATIONS, 100_000);
    }

    // Tests filesystem safety of suffix
    // Verified by adding special character
    #[test]
    fn test_output_suffix_format() {
        assert!(OUTPUT_SUFFIX.starts_with('_'));
        for ch in OUTPUT_SUFFIX.chars() {
            assert!(
                ch.is_alphanumeric() || ch == '_' || ch == '-',
                "Output suffix contains invalid character: {ch}"
            );
        }
    }

    // Tests supported extensions are lowercase
    // Verified by adding an uppercase extension
    #[test]
    fn test_supported_extensions() {
        assert!(SUPPORTED_EXTENSIONS.contains(&"png"));
        assert!(
            SUPPORTED_EXTENSIONS
                .iter()
                .all(|ext| ext.chars().all(|c| c.is_ascii_lowercase()))
        );
    }
}
