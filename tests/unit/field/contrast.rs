//! Tests for quantization and Mach banding

#[cfg(test)]
mod tests {
    use fieldstipple::AlgorithmError;
    use fieldstipple::field::TargetField;
    use fieldstipple::field::blur::{Blur, GaussianBlur};
    use fieldstipple::field::contrast::{ContrastEnhancer, Quantization, quantize};
    use fieldstipple::field::density::DensityField;
    use ndarray::Array2;

    // Blur that drops the last row
    struct Cropping;

    impl Blur for Cropping {
        fn blur(&self, grid: &Array2<f64>, _radius: f64) -> Array2<f64> {
            let (height, width) = grid.dim();
            Array2::zeros((height.saturating_sub(1), width))
        }
    }

    fn step_edge() -> DensityField {
        let row: Vec<f64> = (0..20).map(|x| if x < 10 { 0.2 } else { 0.8 }).collect();
        DensityField::from_grid(&vec![row; 4]).expect("valid grid")
    }

    // Tests equal-step thresholds and explicit threshold validation
    // Verified by including 0 and 1 in the thresholds
    #[test]
    fn test_thresholds() {
        assert_eq!(
            Quantization::Steps(4).thresholds().expect("valid steps"),
            vec![0.25, 0.5, 0.75]
        );
        assert!(Quantization::Steps(1).thresholds().expect("valid steps").is_empty());
        assert!(Quantization::Steps(0).thresholds().is_err());
        assert!(Quantization::Explicit(vec![0.5, 0.5]).thresholds().is_err());
        assert!(Quantization::Explicit(vec![0.7, 0.2]).thresholds().is_err());
        assert!(Quantization::Explicit(vec![f64::NAN]).thresholds().is_err());
        assert_eq!(
            Quantization::Explicit(vec![0.1, 0.9]).thresholds().expect("ascending"),
            vec![0.1, 0.9]
        );
        assert_eq!(Quantization::default(), Quantization::Steps(5));
    }

    // Tests values snap to the lower threshold of their step
    // Verified by snapping to the nearest threshold instead
    #[test]
    fn test_quantize() {
        let thresholds = [0.25, 0.5];

        assert!(quantize(0.1, &thresholds).abs() < f64::EPSILON);
        assert!((quantize(0.25, &thresholds) - 0.25).abs() < f64::EPSILON);
        assert!((quantize(0.4, &thresholds) - 0.25).abs() < f64::EPSILON);
        assert!((quantize(0.5, &thresholds) - 1.0).abs() < f64::EPSILON);
        assert!((quantize(0.6, &thresholds) - 1.0).abs() < f64::EPSILON);
        assert!((quantize(0.3, &[]) - 1.0).abs() < f64::EPSILON);
    }

    // Tests parameter validation
    // Verified by accepting weights above 1
    #[test]
    fn test_validate() {
        assert!(ContrastEnhancer::default().validate().is_ok());

        let heavy = ContrastEnhancer {
            weight: 1.5,
            ..ContrastEnhancer::default()
        };
        assert!(matches!(
            heavy.validate(),
            Err(AlgorithmError::InvalidParameter { parameter: "weight", .. })
        ));

        let negative = ContrastEnhancer {
            blur_radius: -1.0,
            ..ContrastEnhancer::default()
        };
        assert!(negative.validate().is_err());

        let no_steps = ContrastEnhancer {
            quantization: Quantization::Steps(0),
            ..ContrastEnhancer::default()
        };
        assert!(no_steps.enhance(&step_edge(), &GaussianBlur::default()).is_err());
    }

    // Tests a zero weight leaves the field unchanged
    // Verified by dropping the weight from the delta scale
    #[test]
    fn test_zero_weight_is_identity() {
        let field = step_edge();
        let enhancer = ContrastEnhancer {
            quantization: Quantization::Steps(1),
            weight: 0.0,
            blur_radius: 1.0,
        };

        let enhanced = enhancer
            .enhance(&field, &GaussianBlur::default())
            .expect("valid enhancement");
        assert_eq!(enhanced, field);
    }

    // Tests blur implementations must keep the grid shape
    // Verified by zipping mismatched grids
    #[test]
    fn test_blur_shape_checked() {
        let result = ContrastEnhancer::default().enhance(&step_edge(), &Cropping);
        assert!(matches!(
            result,
            Err(AlgorithmError::InvalidParameter { parameter: "blur", .. })
        ));
    }

    // Tests a step edge gains a dark and a bright band
    // Verified by subtracting the quantized field from its blur
    #[test]
    fn test_step_edge_bands() {
        let field = step_edge();
        let enhancer = ContrastEnhancer {
            quantization: Quantization::Steps(2),
            weight: 0.5,
            blur_radius: 1.0,
        };

        let enhanced = enhancer
            .enhance(&field, &GaussianBlur::default())
            .expect("valid enhancement");
        let at = |x: usize| enhanced.density(x, 1).expect("in bounds");

        assert_eq!(enhanced.dimensions(), field.dimensions());
        assert!(at(9) < 0.2);
        assert!(at(10) > 0.8);
        assert!(at(9) < at(0));
        assert!(enhanced.values().iter().all(|v| (0.0..=1.0).contains(v)));
    }

    // Tests the target field keeps the original next to the enhanced copy
    // Verified by returning the original as relaxation target
    #[test]
    fn test_target_field() {
        let field = step_edge();
        let basic = TargetField::from(field.clone());
        assert_eq!(basic.relaxation_target(), &field);
        assert_eq!(basic.original(), &field);

        let enhancer = ContrastEnhancer {
            quantization: Quantization::Steps(2),
            weight: 0.5,
            blur_radius: 1.0,
        };
        let target = TargetField::contrast_enhanced(field.clone(), &enhancer, &GaussianBlur::default())
            .expect("valid enhancement");
        assert_eq!(target.original(), &field);
        assert_ne!(target.relaxation_target(), &field);
    }
}
