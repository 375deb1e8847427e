//! Mach banding contrast enhancement
//!
//! The field is quantized into flat steps, the steps are blurred, and the
//! difference between the two is injected back into the field. Edges between
//! steps gain a bright and a dark band, which the relaxation then reproduces
//! as denser and sparser stipples.

use ndarray::Zip;

use crate::field::blur::Blur;
use crate::field::density::DensityField;
use crate::io::configuration::{
    CONTRAST_DELTA_SCALE, DEFAULT_BLUR_RADIUS, DEFAULT_CONTRAST_WEIGHT,
    DEFAULT_QUANTIZATION_STEPS,
};
use crate::io::error::{Result, invalid_parameter};

/// How the field is split into flat steps
#[derive(Clone, Debug, PartialEq)]
pub enum Quantization {
    /// `n` equal steps with thresholds `1/n, 2/n, .., (n-1)/n`
    Steps(usize),
    /// Explicit ascending thresholds
    Explicit(Vec<f64>),
}

impl Default for Quantization {
    fn default() -> Self {
        Self::Steps(DEFAULT_QUANTIZATION_STEPS)
    }
}

impl Quantization {
    /// Ascending thresholds described by this quantization
    ///
    /// # Errors
    ///
    /// Returns an error for zero steps or explicit thresholds that are not
    /// finite and strictly ascending
    pub fn thresholds(&self) -> Result<Vec<f64>> {
        match self {
            Self::Steps(0) => Err(invalid_parameter(
                "quantization",
                &0,
                &"step count must be at least 1",
            )),
            Self::Steps(steps) => Ok((1..*steps).map(|k| k as f64 / *steps as f64).collect()),
            Self::Explicit(thresholds) => {
                if thresholds.iter().any(|t| !t.is_finite()) {
                    return Err(invalid_parameter(
                        "quantization",
                        &format!("{thresholds:?}"),
                        &"thresholds must be finite",
                    ));
                }
                if thresholds.windows(2).any(|pair| matches!(pair, [a, b] if a >= b)) {
                    return Err(invalid_parameter(
                        "quantization",
                        &format!("{thresholds:?}"),
                        &"thresholds must be strictly ascending",
                    ));
                }
                Ok(thresholds.clone())
            }
        }
    }
}

/// Map a value onto the step it falls in
///
/// Values below the first threshold map to 0, values below threshold `i` map
/// to threshold `i - 1`, and values not below any threshold map to 1.
pub fn quantize(value: f64, thresholds: &[f64]) -> f64 {
    let mut floor = 0.0;
    for &threshold in thresholds {
        if value < threshold {
            return floor;
        }
        floor = threshold;
    }
    1.0
}

/// Parameters of the Mach banding transform
#[derive(Clone, Debug, PartialEq)]
pub struct ContrastEnhancer {
    /// Step layout of the quantized field
    pub quantization: Quantization,
    /// Strength of the injected contrast, in [0, 1]
    pub weight: f64,
    /// Blur radius; the Gaussian strength is `π·r²`
    pub blur_radius: f64,
}

impl Default for ContrastEnhancer {
    fn default() -> Self {
        Self {
            quantization: Quantization::default(),
            weight: DEFAULT_CONTRAST_WEIGHT,
            blur_radius: DEFAULT_BLUR_RADIUS,
        }
    }
}

impl ContrastEnhancer {
    /// Check that all parameters are usable
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is outside [0, 1], the blur radius is
    /// negative or not finite, or the quantization is malformed
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.weight) {
            return Err(invalid_parameter(
                "weight",
                &self.weight,
                &"must be within [0, 1]",
            ));
        }
        if !self.blur_radius.is_finite() || self.blur_radius < 0.0 {
            return Err(invalid_parameter(
                "blur_radius",
                &self.blur_radius,
                &"must be finite and non-negative",
            ));
        }
        self.quantization.thresholds().map(|_| ())
    }

    /// Produce the enhanced field `clamp(Φ + 4·w·(C − B), 0, 1)`
    ///
    /// `C` is the quantized field and `B` its blur. The result has the same
    /// dimensions as `field` and is not renormalized.
    ///
    /// # Errors
    ///
    /// Returns an error if the parameters are invalid or the enhanced field
    /// has no mass left
    pub fn enhance<B: Blur + ?Sized>(&self, field: &DensityField, blur: &B) -> Result<DensityField> {
        self.validate()?;
        let thresholds = self.quantization.thresholds()?;

        let quantized = field.values().mapv(|v| quantize(v, &thresholds));
        let blurred = blur.blur(&quantized, self.blur_radius);
        if blurred.dim() != quantized.dim() {
            return Err(invalid_parameter(
                "blur",
                &format!("{:?}", blurred.dim()),
                &format!("must keep the grid shape {:?}", quantized.dim()),
            ));
        }
        let scale = CONTRAST_DELTA_SCALE * self.weight;

        let enhanced = Zip::from(field.values())
            .and(&quantized)
            .and(&blurred)
            .map_collect(|&phi, &c, &b| scale.mul_add(c - b, phi).clamp(0.0, 1.0));

        DensityField::from_array(enhanced)
    }
}
