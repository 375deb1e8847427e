//! Blur primitives for contrast enhancement
//!
//! Conventions for [`GaussianBlur`]:
//! - blur strength for a radius `r` is `sigma = π·r²`
//! - the kernel is truncated at `truncation · sigma`, minimum one tap each side
//! - the kernel is normalized to unit sum
//! - borders replicate the nearest edge value

use std::f64::consts::PI;

use ndarray::Array2;

use crate::io::configuration::GAUSSIAN_TRUNCATION;

/// Blur over a scalar grid that keeps its dimensions
pub trait Blur {
    /// Blur `grid` with the given radius
    fn blur(&self, grid: &Array2<f64>, radius: f64) -> Array2<f64>;
}

/// Separable Gaussian blur with clamped borders
#[derive(Clone, Copy, Debug)]
pub struct GaussianBlur {
    /// Kernel half-width in standard deviations
    pub truncation: f64,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self {
            truncation: GAUSSIAN_TRUNCATION,
        }
    }
}

impl GaussianBlur {
    /// Standard deviation used for a blur radius
    pub const fn sigma_for_radius(radius: f64) -> f64 {
        PI * radius * radius
    }

    /// Normalized 1D kernel of length `2 * ceil(truncation * sigma) + 1`
    pub fn kernel(&self, sigma: f64) -> Vec<f64> {
        let radius = ((self.truncation * sigma).ceil() as usize).max(1);
        let two_sigma2 = 2.0 * sigma * sigma;

        let mut kernel: Vec<f64> = (0..=2 * radius)
            .map(|i| {
                let x = i as f64 - radius as f64;
                (-(x * x) / two_sigma2).exp()
            })
            .collect();

        let sum: f64 = kernel.iter().sum();
        for weight in &mut kernel {
            *weight /= sum;
        }
        kernel
    }
}

impl Blur for GaussianBlur {
    fn blur(&self, grid: &Array2<f64>, radius: f64) -> Array2<f64> {
        let sigma = Self::sigma_for_radius(radius);
        if !(sigma.is_finite() && sigma > 0.0) || grid.is_empty() {
            return grid.clone();
        }

        let kernel = self.kernel(sigma);
        let horizontal = convolve_rows(grid, &kernel);

        // Columns are blurred as rows of the transposed grid
        let transposed = horizontal.t().as_standard_layout().into_owned();
        convolve_rows(&transposed, &kernel)
            .reversed_axes()
            .as_standard_layout()
            .into_owned()
    }
}

fn convolve_rows(grid: &Array2<f64>, kernel: &[f64]) -> Array2<f64> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::zeros(grid.raw_dim());

    for (row_in, mut row_out) in grid.rows().into_iter().zip(out.rows_mut()) {
        let last = row_in.len() as isize - 1;
        for (x, value) in row_out.iter_mut().enumerate() {
            let mut acc = 0.0;
            for (k, weight) in kernel.iter().enumerate() {
                let index = (x as isize + k as isize - radius).clamp(0, last) as usize;
                acc += weight * row_in.get(index).copied().unwrap_or(0.0);
            }
            *value = acc;
        }
    }

    out
}
