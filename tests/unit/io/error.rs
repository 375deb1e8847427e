//! Tests for error types including source chaining and message formatting

#[cfg(test)]
mod tests {
    use fieldstipple::AlgorithmError;
    use fieldstipple::io::error::{
        ErrorContext, WithContext, geometry_inconsistency, invalid_input, invalid_parameter,
    };
    use std::error::Error;
    use std::path::PathBuf;

    // Tests error source chaining works correctly
    // Verified by breaking source chain
    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = AlgorithmError::FileSystem {
            path: "/tmp/test.png".into(),
            operation: "read",
            source: io_error,
        };

        assert!(error.source().is_some());
        assert!(invalid_input(&"empty").source().is_none());
    }

    // Tests geometry errors name the iteration and both counts
    // Verified by omitting the cell count from the message
    #[test]
    fn test_geometry_inconsistency_message() {
        let error = AlgorithmError::GeometryInconsistency {
            iteration: 42,
            stipples: 10,
            cells: 9,
            reason: "stipple and cell counts differ".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("iteration 42"));
        assert!(message.contains("10 stipples"));
        assert!(message.contains("9 cells"));
        assert!(message.contains("counts differ"));
    }

    // Tests InvalidParameter error contains all fields
    // Verified by omitting value from message
    #[test]
    fn test_invalid_parameter_error() {
        let error = invalid_parameter("stipple_radius", &-1.0, &"must be positive and finite");

        let message = error.to_string();
        assert!(message.contains("stipple_radius"));
        assert!(message.contains("-1"));
        assert!(message.contains("must be positive"));
    }

    // Tests run termination errors
    // Verified by swapping iteration and stipple counts in the message
    #[test]
    fn test_run_termination_messages() {
        let limit = AlgorithmError::IterationLimit {
            iterations: 1000,
            stipples: 37,
        };
        let message = limit.to_string();
        assert!(message.contains("1000 iterations"));
        assert!(message.contains("37 stipples"));

        let cancelled = AlgorithmError::Cancelled { iteration: 5 };
        assert!(cancelled.to_string().contains("iteration 5"));

        let out_of_bounds = AlgorithmError::OutOfBounds {
            x: 4,
            y: 1,
            dimensions: (4, 3),
        };
        let message = out_of_bounds.to_string();
        assert!(message.contains("(4, 1)"));
        assert!(message.contains("4x3"));
    }

    // Tests ImageExport error with IO source
    // Verified by excluding source error from message
    #[test]
    fn test_image_export_error() {
        let image_error = image::ImageError::IoError(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "access denied",
        ));

        let error = AlgorithmError::ImageExport {
            path: PathBuf::from("/restricted/output.png"),
            source: image_error,
        };

        let message = error.to_string();
        assert!(message.contains("/restricted/output.png"));
        assert!(error.source().is_some());
        assert!(
            message.contains("access denied"),
            "Error message should include source error details: {message}"
        );
    }

    // Tests context is stamped onto geometry errors through conversions
    // Verified by dropping the operation prefix
    #[test]
    fn test_context_through_conversion() {
        let result: Result<(), AlgorithmError> = Err(geometry_inconsistency(4, 3, &"mismatch"));
        let error = result
            .with_context(ErrorContext {
                iteration: Some(12),
                cells: Some(5),
                operation: Some("classification"),
                ..ErrorContext::default()
            })
            .expect_err("error is kept");
        let message = error.to_string();
        assert!(message.contains("iteration 12"));
        assert!(message.contains("4 stipples"));
        assert!(message.contains("5 cells"));
        assert!(message.contains("classification: mismatch"));

        let io: Result<(), std::io::Error> = Err(std::io::Error::other("disk full"));
        let error = io.with_iteration(3).expect_err("error is kept");
        assert!(matches!(error, AlgorithmError::FileSystem { .. }));
    }
}
