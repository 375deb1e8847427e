/// Blur primitives used by contrast enhancement
pub mod blur;
/// Mach banding contrast enhancement
pub mod contrast;
/// Normalized density grid and its constructors
pub mod density;
/// Synthetic and point-dataset density sources
pub mod sources;

use crate::field::blur::Blur;
use crate::field::contrast::ContrastEnhancer;
use crate::field::density::DensityField;
use crate::io::error::Result;

/// Field handed to the relaxation loop
#[derive(Clone, Debug)]
pub enum TargetField {
    /// The density field as loaded
    Basic(DensityField),
    /// A Mach banded field that replaces the original as relaxation target
    ContrastEnhanced {
        /// Field before enhancement
        original: DensityField,
        /// Field the stipples are fitted to
        enhanced: DensityField,
    },
}

impl TargetField {
    /// Enhance `field` and keep both versions
    ///
    /// # Errors
    ///
    /// Returns an error if the enhancer parameters are invalid or the
    /// enhanced field has no mass
    pub fn contrast_enhanced<B: Blur + ?Sized>(
        field: DensityField,
        enhancer: &ContrastEnhancer,
        blur: &B,
    ) -> Result<Self> {
        let enhanced = enhancer.enhance(&field, blur)?;
        Ok(Self::ContrastEnhanced {
            original: field,
            enhanced,
        })
    }

    /// Field the relaxation fits stipples to
    pub const fn relaxation_target(&self) -> &DensityField {
        match self {
            Self::Basic(field) | Self::ContrastEnhanced { enhanced: field, .. } => field,
        }
    }

    /// Field before any enhancement
    pub const fn original(&self) -> &DensityField {
        match self {
            Self::Basic(field) | Self::ContrastEnhanced { original: field, .. } => field,
        }
    }
}

impl From<DensityField> for TargetField {
    fn from(field: DensityField) -> Self {
        Self::Basic(field)
    }
}
