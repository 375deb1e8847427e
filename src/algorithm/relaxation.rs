//! Split/merge Voronoi relaxation
//!
//! Each iteration builds the tessellation of the current generation, assigns
//! the field mass to its cells and classifies every stipple against the
//! stipple area `π·r²` widened by the error threshold:
//! - below `π·r² − threshold` the stipple is deleted
//! - above `π·r² + threshold` it is replaced by two children
//! - otherwise it moves to the centroid of its cell
//!
//! The threshold grows every iteration, so classification eventually keeps
//! every stipple. An iteration that deletes and splits nothing converges.

use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::algorithm::assignment::{AssignmentStrategy, CellAssigner};
use crate::algorithm::split::split_cell;
use crate::algorithm::stipple::{Generation, Stipple, StippleSeeder, initial_stipple_count};
use crate::field::density::DensityField;
use crate::geometry::polygon::{Point, Rect, convex_hull, polygon_bounds, polygon_centroid};
use crate::geometry::tessellation::{GeometryProvider, Tessellation};
use crate::io::configuration::{
    DEFAULT_INITIAL_ERROR_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_SEED,
    DEFAULT_STIPPLE_RADIUS, DEFAULT_THRESHOLD_CONVERGENCE_RATE,
};
use crate::io::error::{
    AlgorithmError, ErrorContext, Result, WithContext, geometry_inconsistency, invalid_input,
    invalid_parameter,
};

/// Runtime parameters of the relaxation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RelaxationConfig {
    /// Stipple radius `r`; each stipple represents a mass of `π·r²`
    pub stipple_radius: f64,
    /// Error threshold of the first iteration
    pub initial_error_threshold: f64,
    /// Amount the error threshold grows per iteration
    pub threshold_convergence_rate: f64,
    /// Iterations allowed before the run is abandoned
    pub max_iterations: usize,
    /// Seed for initial placement and reseeding
    pub seed: u64,
    /// How field mass is assigned to cells
    pub strategy: AssignmentStrategy,
}

impl Default for RelaxationConfig {
    fn default() -> Self {
        Self {
            stipple_radius: DEFAULT_STIPPLE_RADIUS,
            initial_error_threshold: DEFAULT_INITIAL_ERROR_THRESHOLD,
            threshold_convergence_rate: DEFAULT_THRESHOLD_CONVERGENCE_RATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            seed: DEFAULT_SEED,
            strategy: AssignmentStrategy::default(),
        }
    }
}

impl RelaxationConfig {
    /// Check that all parameters are usable
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The stipple radius is not positive and finite
    /// - The initial threshold or the convergence rate is negative or not finite
    /// - The iteration cap is zero
    pub fn validate(&self) -> Result<()> {
        if !self.stipple_radius.is_finite() || self.stipple_radius <= 0.0 {
            return Err(invalid_parameter(
                "stipple_radius",
                &self.stipple_radius,
                &"must be positive and finite",
            ));
        }
        if !self.initial_error_threshold.is_finite() || self.initial_error_threshold < 0.0 {
            return Err(invalid_parameter(
                "initial_error_threshold",
                &self.initial_error_threshold,
                &"must be non-negative and finite",
            ));
        }
        if !self.threshold_convergence_rate.is_finite() || self.threshold_convergence_rate < 0.0 {
            return Err(invalid_parameter(
                "threshold_convergence_rate",
                &self.threshold_convergence_rate,
                &"must be non-negative and finite",
            ));
        }
        if self.max_iterations == 0 {
            return Err(invalid_parameter(
                "max_iterations",
                &self.max_iterations,
                &"must be at least 1",
            ));
        }
        Ok(())
    }

    /// Mass represented by one stipple
    pub const fn stipple_area(&self) -> f64 {
        PI * self.stipple_radius * self.stipple_radius
    }
}

/// Shared flag that stops a run before its next iteration
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Token that has not been cancelled
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Lifecycle of a relaxation run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Initial stipples placed, no iteration run yet
    Seeded,
    /// At least one iteration run, not yet converged
    Iterating,
    /// Last iteration deleted and split nothing
    Converged,
}

/// Summary of one iteration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationReport {
    /// 1-based iteration number
    pub iteration: usize,
    /// Stipples the iteration started with
    pub stipples: usize,
    /// Stipples deleted as underfull
    pub deleted: usize,
    /// Stipples split as overfull
    pub split: usize,
    /// Stipples moved to their cell centroid
    pub moved: usize,
    /// Threshold used to classify this iteration
    pub error_threshold: f64,
    /// Whether the next generation had to be reseeded
    pub reseeded: bool,
    /// Whether this iteration converged
    pub converged: bool,
}

/// Time spent in each phase over a whole run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Building tessellations
    pub tessellation: Duration,
    /// Assigning field mass to cells
    pub assignment: Duration,
    /// Classifying and moving stipples
    pub classification: Duration,
}

/// Counters collected over a relaxation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Completed iterations
    pub iterations: usize,
    /// Generations that were emptied and reseeded with one stipple
    pub reseeds: usize,
    /// Stipples deleted over the run
    pub deleted: usize,
    /// Stipples split over the run
    pub split: usize,
    /// Phase timings
    pub timings: PhaseTimings,
}

/// Converged stipples with the tessellation of the final iteration
///
/// The tessellation was built from the positions the final stipples moved
/// away from; cell `i` still belongs to stipple `i`.
#[derive(Clone, Debug)]
pub struct Stippling<T> {
    /// Final stipples with normalized densities and relative positions
    pub stipples: Vec<Stipple>,
    /// Tessellation of the final iteration
    pub tessellation: T,
    /// Run counters
    pub stats: RunStats,
}

impl<T: Tessellation> Stippling<T> {
    /// Group located data by the stipple whose cell owns each location
    ///
    /// Takes `(data index, location)` pairs and returns, for every stipple,
    /// the data indices inside its cell in input order.
    pub fn group_by_owner<I>(&self, locations: I) -> Vec<Vec<usize>>
    where
        I: IntoIterator<Item = (usize, Point)>,
    {
        let mut groups = vec![Vec::new(); self.stipples.len()];
        let mut hint = 0;
        for (index, location) in locations {
            if let Some(owner) = self.tessellation.find_owner(location, hint) {
                if let Some(group) = groups.get_mut(owner) {
                    group.push(index);
                }
                hint = owner;
            }
        }
        groups
    }

    /// Bounding box of the cell belonging to stipple `index`
    pub fn cell_bounds(&self, index: usize) -> Option<Rect> {
        self.tessellation
            .cell_polygon(index)
            .and_then(polygon_bounds)
    }
}

enum Outcome {
    Delete,
    Split([Point; 2]),
    Move(Point),
}

/// Iterative relaxation of stipples against a density field
///
/// Created in [`Phase::Seeded`]; every [`RelaxationLoop::step`] runs one
/// iteration until [`Phase::Converged`] is reached.
pub struct RelaxationLoop<'a, P: GeometryProvider> {
    field: &'a DensityField,
    provider: P,
    config: RelaxationConfig,
    assigner: CellAssigner,
    seeder: StippleSeeder,
    bounds: Rect,
    generation: Generation,
    tessellation: Option<P::Output>,
    error_threshold: f64,
    phase: Phase,
    stats: RunStats,
    cancellation: Option<CancellationToken>,
}

impl<'a, P: GeometryProvider> RelaxationLoop<'a, P> {
    /// Validate the configuration and seed the initial stipples
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn new(field: &'a DensityField, provider: P, config: RelaxationConfig) -> Result<Self> {
        config.validate()?;

        let (width, height) = field.dimensions();
        let mut seeder = StippleSeeder::new(config.seed);
        // Fields smaller than one stipple still start with a single stipple
        let count = initial_stipple_count(width, height, config.stipple_radius).max(1);
        let stipples = seeder.random_stipples(count, width, height);
        log::debug!("Seeded {count} stipples on a {width}x{height} field");

        Ok(Self {
            field,
            provider,
            config,
            assigner: CellAssigner::new(config.strategy),
            seeder,
            bounds: Rect::from_size(width as f64, height as f64),
            generation: Generation::new(0, stipples),
            tessellation: None,
            error_threshold: config.initial_error_threshold,
            phase: Phase::Seeded,
            stats: RunStats::default(),
            cancellation: None,
        })
    }

    /// Check `token` before every iteration
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Current phase
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current generation of stipples
    pub const fn generation(&self) -> &Generation {
        &self.generation
    }

    /// Counters collected so far
    pub const fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Error threshold the next iteration will use
    pub const fn error_threshold(&self) -> f64 {
        self.error_threshold
    }

    /// Run one iteration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The run has already converged
    /// - The iteration cap has been reached
    /// - Cancellation was requested
    /// - The tessellation cannot be built or disagrees with the stipples
    pub fn step(&mut self) -> Result<IterationReport> {
        if self.phase == Phase::Converged {
            return Err(invalid_input(&"relaxation has already converged"));
        }
        if self.stats.iterations >= self.config.max_iterations {
            return Err(AlgorithmError::IterationLimit {
                iterations: self.stats.iterations,
                stipples: self.generation.len(),
            });
        }
        let iteration = self.stats.iterations + 1;
        if self
            .cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(AlgorithmError::Cancelled { iteration });
        }

        let positions = self.generation.positions();
        let started = Instant::now();
        let tessellation = self
            .provider
            .build(&positions, self.bounds)
            .with_iteration(iteration)?;
        let built = Instant::now();

        let mut stipples = self.generation.stipples().to_vec();
        self.assigner
            .assign(self.field, &tessellation, &mut stipples)
            .with_context(ErrorContext {
                iteration: Some(iteration),
                stipples: Some(stipples.len()),
                cells: Some(tessellation.len()),
                operation: Some("assignment"),
            })?;
        let assigned = Instant::now();

        let stipple_area = self.config.stipple_area();
        let delete_below = stipple_area - self.error_threshold;
        let split_above = stipple_area + self.error_threshold;
        let stipple_count = stipples.len();
        let outcomes = stipples
            .par_iter()
            .enumerate()
            .map(|(index, stipple)| {
                classify(stipple, index, stipple_count, &tessellation, delete_below, split_above)
            })
            .collect::<Result<Vec<_>>>()
            .with_context(ErrorContext {
                iteration: Some(iteration),
                stipples: Some(stipples.len()),
                cells: Some(tessellation.len()),
                operation: Some("classification"),
            })?;

        let mut report = IterationReport {
            iteration,
            stipples: stipples.len(),
            deleted: 0,
            split: 0,
            moved: 0,
            error_threshold: self.error_threshold,
            reseeded: false,
            converged: false,
        };
        let mut next = Vec::with_capacity(stipples.len());
        for (stipple, outcome) in stipples.into_iter().zip(outcomes) {
            match outcome {
                Outcome::Delete => report.deleted += 1,
                Outcome::Split(children) => {
                    report.split += 1;
                    next.extend(
                        children.map(|child| Stipple::at(self.bounds.clamp_half_open(child))),
                    );
                }
                Outcome::Move(target) => {
                    report.moved += 1;
                    let target = self.bounds.clamp_half_open(target);
                    next.push(Stipple {
                        x: target.x,
                        y: target.y,
                        ..stipple
                    });
                }
            }
        }

        if next.is_empty() {
            let (width, height) = self.field.dimensions();
            next.push(self.seeder.random_stipple(width, height));
            report.reseeded = true;
            self.stats.reseeds += 1;
            log::warn!("Iteration {iteration} deleted every stipple; reseeding one");
        }
        let classified = Instant::now();

        report.converged = report.deleted == 0 && report.split == 0;
        self.stats.iterations = iteration;
        self.stats.deleted += report.deleted;
        self.stats.split += report.split;
        self.stats.timings.tessellation += built - started;
        self.stats.timings.assignment += assigned - built;
        self.stats.timings.classification += classified - assigned;

        log::debug!(
            "Iteration {iteration}: {} stipples, {} deleted, {} split, {} moved, threshold {:.3}",
            report.stipples,
            report.deleted,
            report.split,
            report.moved,
            report.error_threshold
        );

        self.generation = Generation::new(self.generation.index() + 1, next);
        self.tessellation = Some(tessellation);
        self.error_threshold += self.config.threshold_convergence_rate;
        self.phase = if report.converged {
            Phase::Converged
        } else {
            Phase::Iterating
        };

        Ok(report)
    }

    /// Iterate until convergence
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an iteration
    pub fn run(self) -> Result<Stippling<P::Output>> {
        self.run_with(|_| {})
    }

    /// Iterate until convergence, reporting every iteration to `observer`
    ///
    /// # Errors
    ///
    /// Returns the first error raised by an iteration
    pub fn run_with<F>(mut self, mut observer: F) -> Result<Stippling<P::Output>>
    where
        F: FnMut(&IterationReport),
    {
        while self.phase != Phase::Converged {
            let report = self.step()?;
            observer(&report);
        }
        self.finish()
    }

    /// Normalize the converged stipples and hand out the result
    ///
    /// Densities are divided by the largest density and relative positions
    /// are computed against the field size.
    ///
    /// # Errors
    ///
    /// Returns an error if the run has not converged
    pub fn finish(self) -> Result<Stippling<P::Output>> {
        let tessellation = match (self.phase, self.tessellation) {
            (Phase::Converged, Some(tessellation)) => tessellation,
            _ => return Err(invalid_input(&"relaxation has not converged")),
        };

        let stats = self.stats;
        let timings = stats.timings;
        log::info!(
            "Converged after {} iterations with {} stipples ({} reseeds)",
            stats.iterations,
            self.generation.len(),
            stats.reseeds
        );
        log::debug!(
            "Timings: tessellation {:?}, assignment {:?}, classification {:?}",
            timings.tessellation,
            timings.assignment,
            timings.classification
        );

        let (width, height) = self.field.dimensions();
        let mut stipples = self.generation.into_stipples();
        let max_density = stipples.iter().map(|s| s.density).fold(0.0, f64::max);
        for stipple in &mut stipples {
            if max_density > 0.0 {
                stipple.density /= max_density;
            }
            stipple.relative_x = stipple.x / width as f64;
            stipple.relative_y = stipple.y / height as f64;
        }

        Ok(Stippling {
            stipples,
            tessellation,
            stats,
        })
    }
}

fn classify<T: Tessellation>(
    stipple: &Stipple,
    index: usize,
    stipple_count: usize,
    tessellation: &T,
    delete_below: f64,
    split_above: f64,
) -> Result<Outcome> {
    if stipple.density < delete_below {
        return Ok(Outcome::Delete);
    }

    let polygon = tessellation.cell_polygon(index).ok_or_else(|| {
        geometry_inconsistency(
            stipple_count,
            tessellation.len(),
            &format!("cell {index} has no polygon"),
        )
    })?;
    let Some(centroid) = polygon_centroid(&convex_hull(polygon)) else {
        // Empty cell of a coincident stipple; it stays where it is
        return Ok(Outcome::Move(stipple.position()));
    };

    let children = (stipple.density > split_above)
        .then(|| split_cell(polygon, centroid))
        .flatten();
    Ok(children.map_or(Outcome::Move(centroid), Outcome::Split))
}
