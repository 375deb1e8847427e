//! Tests for loading density fields from images and rendering stipples

#[cfg(test)]
mod tests {
    use fieldstipple::AlgorithmError;
    use fieldstipple::algorithm::stipple::Stipple;
    use fieldstipple::io::image::{
        ImageOptions, RenderOptions, export_stipples, load_density_field, render_stipples,
    };
    use image::{Rgba, RgbaImage};
    use std::path::Path;
    use tempfile::TempDir;

    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn write_image(path: &Path, image: &RgbaImage) {
        image.save(path).expect("test image can be written");
    }

    fn half_and_half() -> RgbaImage {
        RgbaImage::from_fn(2, 1, |x, _| if x == 0 { WHITE } else { BLACK })
    }

    fn centred_stipple(density: f64) -> Stipple {
        Stipple {
            density,
            relative_x: 0.5,
            relative_y: 0.5,
            ..Stipple::new(2.0, 2.0)
        }
    }

    fn options() -> RenderOptions {
        RenderOptions {
            stipple_radius: 1.0,
            scale: 2.0,
            scale_by_density: false,
            reverse_colors: false,
        }
    }

    // Tests bright pixels become dense and inversion flips them
    // Verified by ignoring the invert option
    #[test]
    fn test_load_density_field() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("half.png");
        write_image(&path, &half_and_half());

        let field = load_density_field(&path, &ImageOptions::default()).expect("loadable image");
        assert_eq!(field.dimensions(), (2, 1));
        assert!((field.density(0, 0).expect("in bounds") - 1.0).abs() < 1e-12);
        assert!(field.density(1, 0).expect("in bounds").abs() < 1e-12);

        let inverted = load_density_field(
            &path,
            &ImageOptions {
                invert: true,
                ..ImageOptions::default()
            },
        )
        .expect("loadable image");
        assert!(inverted.density(0, 0).expect("in bounds").abs() < 1e-12);
        assert!((inverted.density(1, 0).expect("in bounds") - 1.0).abs() < 1e-12);
    }

    // Tests resizing keeps the aspect ratio
    // Verified by resizing to a square
    #[test]
    fn test_load_resized() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join("half.png");
        write_image(&path, &half_and_half());

        let resized = load_density_field(
            &path,
            &ImageOptions {
                resize_width: Some(4),
                invert: false,
            },
        )
        .expect("loadable image");
        assert_eq!(resized.dimensions(), (4, 2));

        let zero = ImageOptions {
            resize_width: Some(0),
            invert: false,
        };
        assert!(load_density_field(&path, &zero).is_err());
    }

    // Tests unreadable and massless images are rejected
    // Verified by returning an all-zero field for black images
    #[test]
    fn test_load_errors() {
        let temp_dir = TempDir::new().expect("temp dir");

        let missing = temp_dir.path().join("missing.png");
        assert!(matches!(
            load_density_field(&missing, &ImageOptions::default()),
            Err(AlgorithmError::ImageLoad { .. })
        ));

        let black = temp_dir.path().join("black.png");
        write_image(&black, &RgbaImage::from_pixel(3, 3, BLACK));
        assert!(matches!(
            load_density_field(&black, &ImageOptions::default()),
            Err(AlgorithmError::InvalidInput { .. })
        ));
    }

    // Tests discs are drawn at relative positions on the scaled canvas
    // Verified by drawing at absolute field positions
    #[test]
    fn test_render_stipples() {
        let canvas = render_stipples(&[centred_stipple(1.0)], 4, 4, &options()).expect("valid options");

        assert_eq!(canvas.dimensions(), (8, 8));
        assert_eq!(*canvas.get_pixel(4, 4), BLACK);
        assert_eq!(*canvas.get_pixel(3, 3), BLACK);
        assert_eq!(*canvas.get_pixel(0, 0), WHITE);
        assert_eq!(*canvas.get_pixel(7, 7), WHITE);

        let reversed = RenderOptions {
            reverse_colors: true,
            ..options()
        };
        let canvas = render_stipples(&[centred_stipple(1.0)], 4, 4, &reversed).expect("valid options");
        assert_eq!(*canvas.get_pixel(4, 4), WHITE);
        assert_eq!(*canvas.get_pixel(0, 0), BLACK);
    }

    // Tests massless stipples are skipped and radii follow density
    // Verified by drawing every stipple at full size
    #[test]
    fn test_render_density() {
        let canvas = render_stipples(&[centred_stipple(0.0)], 4, 4, &options()).expect("valid options");
        assert!(canvas.pixels().all(|pixel| *pixel == WHITE));

        let scaled = RenderOptions {
            stipple_radius: 3.0,
            scale_by_density: true,
            ..options()
        };
        let small = render_stipples(&[centred_stipple(0.1)], 4, 4, &scaled).expect("valid options");
        let large = render_stipples(&[centred_stipple(1.0)], 4, 4, &scaled).expect("valid options");
        let inked = |image: &RgbaImage| image.pixels().filter(|pixel| **pixel == BLACK).count();
        assert!(inked(&small) >= 1);
        assert!(inked(&small) < inked(&large));
    }

    // Tests invalid render options
    // Verified by accepting a zero scale
    #[test]
    fn test_render_invalid_options() {
        let zero_scale = RenderOptions {
            scale: 0.0,
            ..options()
        };
        assert!(render_stipples(&[], 4, 4, &zero_scale).is_err());

        let negative_radius = RenderOptions {
            stipple_radius: -1.0,
            ..options()
        };
        assert!(render_stipples(&[], 4, 4, &negative_radius).is_err());
    }

    // Tests export creates missing directories
    // Verified by disabling directory creation
    #[test]
    fn test_export_stipples() {
        let temp_dir = TempDir::new().expect("temp dir");
        let output = temp_dir.path().join("nested").join("out.png");

        export_stipples(&[centred_stipple(1.0)], 4, 4, &options(), &output).expect("export succeeds");

        assert!(output.exists());
        let written = image::open(&output).expect("readable output").to_rgba8();
        assert_eq!(written.dimensions(), (8, 8));
    }
}
