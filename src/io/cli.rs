//! Command-line interface for batch stippling of image files

use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Parser, ValueEnum};

use crate::algorithm::assignment::AssignmentStrategy;
use crate::algorithm::relaxation::{RelaxationConfig, RelaxationLoop};
use crate::field::TargetField;
use crate::field::blur::GaussianBlur;
use crate::field::contrast::{ContrastEnhancer, Quantization};
use crate::geometry::voronoi::VoronoiProvider;
use crate::io::configuration::{
    DEFAULT_BLUR_RADIUS, DEFAULT_CONTRAST_WEIGHT, DEFAULT_INITIAL_ERROR_THRESHOLD,
    DEFAULT_MAX_ITERATIONS, DEFAULT_OUTPUT_SCALE, DEFAULT_QUANTIZATION_STEPS, DEFAULT_SEED,
    DEFAULT_STIPPLE_RADIUS, DEFAULT_THRESHOLD_CONVERGENCE_RATE, OUTPUT_SUFFIX,
    SUPPORTED_EXTENSIONS,
};
use crate::io::error::{AlgorithmError, Result, invalid_parameter};
use crate::io::image::{ImageOptions, RenderOptions, export_stipples, load_density_field};
use crate::io::progress::ProgressManager;

/// Mass assignment strategy selectable on the command line
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    /// Sequential row-major scan
    #[default]
    Scan,
    /// Parallel scan over row bands
    Banded,
    /// Parallel per-cell area sums
    CellArea,
}

impl From<StrategyArg> for AssignmentStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Scan => Self::Scan,
            StrategyArg::Banded => Self::BandedScan,
            StrategyArg::CellArea => Self::CellArea,
        }
    }
}

#[derive(Parser)]
#[command(name = "fieldstipple")]
#[command(
    author,
    version,
    about = "Stipple images with split/merge Voronoi relaxation"
)]
/// Command-line arguments for the stippling tool
// CLI tools commonly need multiple boolean flags for various features and user preferences
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    /// Input image file or directory to process
    #[arg(value_name = "TARGET")]
    pub target: PathBuf,

    /// Random seed for reproducible stippling
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Maximum relaxation iterations before giving up
    #[arg(short, long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    pub iterations: usize,

    /// Stipple radius in field pixels
    #[arg(short, long, default_value_t = DEFAULT_STIPPLE_RADIUS)]
    pub radius: f64,

    /// Tolerance around the stipple area in the first iteration
    #[arg(long, default_value_t = DEFAULT_INITIAL_ERROR_THRESHOLD)]
    pub initial_threshold: f64,

    /// Amount the tolerance grows per iteration
    #[arg(long, default_value_t = DEFAULT_THRESHOLD_CONVERGENCE_RATE)]
    pub threshold_rate: f64,

    /// Resize the image to this width before stippling
    #[arg(short = 'w', long)]
    pub width: Option<u32>,

    /// Place stipples in dark regions instead of bright ones
    #[arg(long)]
    pub invert: bool,

    /// Enhance contrast with Mach banding before stippling
    #[arg(short, long)]
    pub mach_banding: bool,

    /// Number of quantization steps for Mach banding
    #[arg(long, default_value_t = DEFAULT_QUANTIZATION_STEPS)]
    pub quantization: usize,

    /// Strength of the Mach banding effect in [0, 1]
    #[arg(long, default_value_t = DEFAULT_CONTRAST_WEIGHT)]
    pub weight: f64,

    /// Blur radius for Mach banding
    #[arg(long, default_value_t = DEFAULT_BLUR_RADIUS)]
    pub blur_radius: f64,

    /// How field mass is assigned to cells
    #[arg(long, value_enum, default_value_t = StrategyArg::Scan)]
    pub strategy: StrategyArg,

    /// Output pixels per field pixel
    #[arg(long, default_value_t = DEFAULT_OUTPUT_SCALE)]
    pub scale: f64,

    /// Scale each dot by its stipple's density
    #[arg(long)]
    pub scale_by_density: bool,

    /// Draw white dots on black
    #[arg(long)]
    pub reverse_colors: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Process files even if output exists
    #[arg(short, long)]
    pub no_skip: bool,
}

impl Cli {
    /// Check if existing output files should be skipped
    pub const fn skip_existing(&self) -> bool {
        !self.no_skip
    }

    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Relaxation parameters selected by the arguments
    pub fn relaxation_config(&self) -> RelaxationConfig {
        RelaxationConfig {
            stipple_radius: self.radius,
            initial_error_threshold: self.initial_threshold,
            threshold_convergence_rate: self.threshold_rate,
            max_iterations: self.iterations,
            seed: self.seed,
            strategy: self.strategy.into(),
        }
    }

    /// Mach banding parameters, if enabled
    pub fn contrast_enhancer(&self) -> Option<ContrastEnhancer> {
        self.mach_banding.then(|| ContrastEnhancer {
            quantization: Quantization::Steps(self.quantization),
            weight: self.weight,
            blur_radius: self.blur_radius,
        })
    }

    /// Drawing parameters for the output image
    pub const fn render_options(&self) -> RenderOptions {
        RenderOptions {
            stipple_radius: self.radius,
            scale: self.scale,
            scale_by_density: self.scale_by_density,
            reverse_colors: self.reverse_colors,
        }
    }
}

/// Orchestrates batch processing of image files with progress tracking
pub struct FileProcessor {
    cli: Cli,
    progress_manager: Option<ProgressManager>,
}

impl FileProcessor {
    /// Create a new file processor with the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let progress_manager = cli.should_show_progress().then(ProgressManager::new);

        Self {
            cli,
            progress_manager,
        }
    }

    /// Process files according to CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if target validation or file processing fails
    pub fn process(&mut self) -> Result<()> {
        let files = self.collect_files()?;

        if files.is_empty() {
            return Ok(());
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.initialize(files.len());
        }

        for (index, file) in files.iter().enumerate() {
            self.process_file(file, index)?;
        }

        if let Some(ref mut pm) = self.progress_manager {
            pm.finish();
        }

        Ok(())
    }

    /// Image files the target refers to, sorted, without existing outputs
    ///
    /// # Errors
    ///
    /// Returns an error if the target is neither a supported image nor a
    /// readable directory
    pub fn collect_files(&self) -> Result<Vec<PathBuf>> {
        let target = &self.cli.target;
        if target.is_file() {
            if !is_supported_image(target) {
                return Err(invalid_parameter(
                    "target",
                    &target.display(),
                    &format!("must be an image with one of the extensions {SUPPORTED_EXTENSIONS:?}"),
                ));
            }
            Ok(self
                .should_process_file(target)
                .then(|| target.clone())
                .into_iter()
                .collect())
        } else if target.is_dir() {
            let entries = std::fs::read_dir(target).map_err(|source| AlgorithmError::FileSystem {
                path: target.clone(),
                operation: "read directory",
                source,
            })?;
            let mut files = Vec::new();
            for entry in entries {
                let path = entry?.path();
                if is_supported_image(&path)
                    && !is_stippled_output(&path)
                    && self.should_process_file(&path)
                {
                    files.push(path);
                }
            }
            files.sort();
            Ok(files)
        } else {
            Err(invalid_parameter(
                "target",
                &target.display(),
                &"must be an image file or directory",
            ))
        }
    }

    fn should_process_file(&self, input_path: &Path) -> bool {
        if !self.cli.skip_existing() {
            return true;
        }

        let output_path = output_path(input_path);
        if output_path.exists() {
            // Allow print for user feedback for progress messages
            #[allow(clippy::print_stderr)]
            if !self.cli.quiet {
                eprintln!("Skipping: {} (output exists)", input_path.display());
            }
            false
        } else {
            true
        }
    }

    fn process_file(&mut self, input_path: &Path, index: usize) -> Result<()> {
        let start_time = Instant::now();

        if let Some(ref mut pm) = self.progress_manager {
            pm.start_file(index, input_path);
        }

        let field = load_density_field(
            input_path,
            &ImageOptions {
                resize_width: self.cli.width,
                invert: self.cli.invert,
            },
        )?;
        let target = match self.cli.contrast_enhancer() {
            Some(enhancer) => {
                TargetField::contrast_enhanced(field, &enhancer, &GaussianBlur::default())?
            }
            None => TargetField::Basic(field),
        };
        let relaxation_field = target.relaxation_target();

        let relaxation = RelaxationLoop::new(
            relaxation_field,
            VoronoiProvider,
            self.cli.relaxation_config(),
        )?;
        let progress = &mut self.progress_manager;
        let stippling = relaxation.run_with(|report| {
            if let Some(pm) = progress.as_mut() {
                pm.update_iteration(index, report);
            }
        })?;

        let (width, height) = relaxation_field.dimensions();
        export_stipples(
            &stippling.stipples,
            width,
            height,
            &self.cli.render_options(),
            &output_path(input_path),
        )?;

        if let Some(ref mut pm) = self.progress_manager {
            pm.complete_file(index, stippling.stipples.len(), start_time.elapsed());
        }

        Ok(())
    }
}

/// Output path for an input image: `<stem>_stippled.png` next to it
pub fn output_path(input_path: &Path) -> PathBuf {
    let stem = input_path.file_stem().unwrap_or_default();
    let output_name = format!("{}{OUTPUT_SUFFIX}.png", stem.to_string_lossy());

    if let Some(parent) = input_path.parent() {
        parent.join(output_name)
    } else {
        PathBuf::from(output_name)
    }
}

fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|supported| ext.eq_ignore_ascii_case(supported))
        })
}

fn is_stippled_output(path: &Path) -> bool {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .is_some_and(|stem| stem.ends_with(OUTPUT_SUFFIX))
}
