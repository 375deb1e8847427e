//! Image loading into density fields and PNG export of stipplings

use std::path::Path;

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

use crate::algorithm::stipple::Stipple;
use crate::field::density::{DensityField, luminance};
use crate::io::error::{AlgorithmError, Result, invalid_parameter};

const INK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const PAPER: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// How a source image becomes a density field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageOptions {
    /// Resize to this width first, keeping the aspect ratio
    pub resize_width: Option<u32>,
    /// Use `1 - luminance` so dark regions attract stipples
    pub invert: bool,
}

/// Load an image file as a density field of its luminance
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be opened or decoded
/// - The resize width is zero
/// - The image has no luminance to normalize by (e.g. it is black)
pub fn load_density_field(path: &Path, options: &ImageOptions) -> Result<DensityField> {
    let mut image = image::open(path).map_err(|source| AlgorithmError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(width) = options.resize_width {
        if width == 0 {
            return Err(invalid_parameter(
                "resize_width",
                &width,
                &"must be positive",
            ));
        }
        let ratio = f64::from(width) / f64::from(image.width().max(1));
        let height = (f64::from(image.height()) * ratio).round().max(1.0) as u32;
        image = image.resize_exact(width, height, FilterType::Triangle);
    }

    let rgba = image.to_rgba8();
    let width = rgba.width() as usize;
    let pixels: Vec<[u8; 4]> = rgba.pixels().map(|pixel| pixel.0).collect();
    let invert = options.invert;

    DensityField::from_samples(&pixels, width, |pixel| {
        let value = luminance(pixel);
        if invert { 1.0 - value } else { value }
    })
}

/// How stipples are drawn
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Stipple radius in field units
    pub stipple_radius: f64,
    /// Output pixels per field unit
    pub scale: f64,
    /// Multiply each radius by the stipple's normalized density
    pub scale_by_density: bool,
    /// White stipples on black instead of black on white
    pub reverse_colors: bool,
}

/// Draw stipples as filled discs on a canvas of the scaled field size
///
/// Stipples with zero density are not drawn.
///
/// # Errors
///
/// Returns an error if the scale or radius is not positive and finite
pub fn render_stipples(
    stipples: &[Stipple],
    field_width: usize,
    field_height: usize,
    options: &RenderOptions,
) -> Result<RgbaImage> {
    if !options.scale.is_finite() || options.scale <= 0.0 {
        return Err(invalid_parameter(
            "scale",
            &options.scale,
            &"must be positive and finite",
        ));
    }
    if !options.stipple_radius.is_finite() || options.stipple_radius <= 0.0 {
        return Err(invalid_parameter(
            "stipple_radius",
            &options.stipple_radius,
            &"must be positive and finite",
        ));
    }

    let width = ((field_width as f64 * options.scale).round() as u32).max(1);
    let height = ((field_height as f64 * options.scale).round() as u32).max(1);
    let (ink, paper) = if options.reverse_colors {
        (PAPER, INK)
    } else {
        (INK, PAPER)
    };

    let mut canvas = RgbaImage::from_pixel(width, height, paper);
    for stipple in stipples.iter().filter(|s| s.density != 0.0) {
        let factor = if options.scale_by_density {
            stipple.density
        } else {
            1.0
        };
        let radius = options.stipple_radius * options.scale * factor;
        let cx = stipple.relative_x * f64::from(width);
        let cy = stipple.relative_y * f64::from(height);
        fill_disc(&mut canvas, cx, cy, radius, ink);
    }

    Ok(canvas)
}

// Sets every pixel whose centre lies in the disc, and at least the centre pixel
fn fill_disc(canvas: &mut RgbaImage, cx: f64, cy: f64, radius: f64, color: Rgba<u8>) {
    let (width, height) = canvas.dimensions();
    let clamp_x = |v: f64| v.clamp(0.0, f64::from(width)) as u32;
    let clamp_y = |v: f64| v.clamp(0.0, f64::from(height)) as u32;

    let radius2 = radius * radius;
    for y in clamp_y((cy - radius).floor())..clamp_y((cy + radius).ceil()) {
        for x in clamp_x((cx - radius).floor())..clamp_x((cx + radius).ceil()) {
            let dx = f64::from(x) + 0.5 - cx;
            let dy = f64::from(y) + 0.5 - cy;
            if dx.mul_add(dx, dy * dy) <= radius2 {
                canvas.put_pixel(x, y, color);
            }
        }
    }

    let (x, y) = (cx.floor(), cy.floor());
    if x >= 0.0 && y >= 0.0 && x < f64::from(width) && y < f64::from(height) {
        canvas.put_pixel(x as u32, y as u32, color);
    }
}

/// Render stipples and save them as an image at `output_path`
///
/// The format follows the file extension.
///
/// # Errors
///
/// Returns an error if:
/// - The render options are invalid
/// - The parent directory cannot be created
/// - The image cannot be saved to the specified path
pub fn export_stipples(
    stipples: &[Stipple],
    field_width: usize,
    field_height: usize,
    options: &RenderOptions,
    output_path: &Path,
) -> Result<()> {
    let canvas = render_stipples(stipples, field_width, field_height, options)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| AlgorithmError::FileSystem {
            path: parent.to_path_buf(),
            operation: "create directory",
            source,
        })?;
    }

    canvas
        .save(output_path)
        .map_err(|source| AlgorithmError::ImageExport {
            path: output_path.to_path_buf(),
            source,
        })
}
