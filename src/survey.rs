//! # Survey detection runs
//!
//! The orchestrator: walks the orbit catalog one object at a time and, for
//! each, runs generate, interpolate, field-of-view filter, photometric
//! adjustment and output. Objects are fully independent; the only shared
//! state is the color-table cache inside the photometry context and the
//! single output writer, which this module owns for the whole run and
//! releases on every exit path.
//!
//! A non-zero propagation status degrades an object (warned and counted,
//! never fatal); configuration errors such as an unknown filter abort the
//! run.
//!
//! ## Example
//! -----------------
//! ```rust,no_run
//! # use skysweep::orbits::OrbitCatalog;
//! # use skysweep::photometry::PhotometryContext;
//! # use skysweep::survey::{generate_observations, SimulationParams};
//! # fn run<P, S>(catalog: OrbitCatalog, visits: Vec<skysweep::visits::VisitRecord>,
//! #              propagator: P, photometry: PhotometryContext<S>) -> Result<(), skysweep::skysweep_errors::SkysweepError>
//! # where P: skysweep::ephemeris::propagator::Propagator,
//! #       S: skysweep::photometry::bandpass::SedLibrary {
//! let mut sink = Vec::new();
//! let summary = generate_observations(
//!     &catalog,
//!     &visits,
//!     propagator,
//!     &photometry,
//!     None,
//!     &mut sink,
//!     &SimulationParams::default(),
//! )?;
//! eprintln!("{summary:#}");
//! # Ok(()) }
//! ```

use std::fmt;
use std::io::Write;

use log::{debug, info};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

use crate::constants::{Degree, MpcCode};
use crate::ephemeris::propagator::Propagator;
use crate::ephemeris::{reshape, EphemerisEngine, EphemerisLayout};
use crate::fov::{FootprintService, FovFilter};
use crate::interpolate::TrackInterpolants;
use crate::orbits::OrbitCatalog;
use crate::output::{MatchedDetection, ObservationWriter};
use crate::photometry::bandpass::SedLibrary;
use crate::photometry::{apparent_magnitude, motion_losses, PhotometricTerms, PhotometryContext};
use crate::skysweep_errors::SkysweepError;
use crate::time_grid::{ObservationWindow, TimeGrid, Timescale};
use crate::visits::VisitRecord;

/// Tuning for one detection run.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Ephemeris grid spacing in days.
    pub time_step: f64,
    /// Coarse field-of-view radius (deg) when no footprint is supplied.
    pub fov_radius: Degree,
    /// Circumscribing camera radius (deg) for the rough stage when a
    /// footprint is supplied.
    pub camera_radius: Degree,
    /// Observatory for topocentric ephemerides.
    pub observatory: MpcCode,
    /// Timescale of visit exposure times and grid samples.
    pub timescale: Timescale,
    /// Processing window; unspecified bounds resolve from the visit log.
    pub window: ObservationWindow,
}

impl Default for SimulationParams {
    fn default() -> Self {
        SimulationParams {
            time_step: 2.0 / 24.0,
            fov_radius: 1.75,
            camera_radius: 2.1,
            observatory: "807".to_string(),
            timescale: Timescale::Tai,
            window: ObservationWindow::default(),
        }
    }
}

/// Outcome counts of one detection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Objects processed.
    pub objects: usize,
    /// Detections written.
    pub detections: usize,
    /// Objects whose propagation batch returned a non-zero status.
    pub degraded: usize,
}

impl fmt::Display for RunSummary {
    /// Compact by default; multi-line with the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Detection run summary")?;
            writeln!(f, "---------------------")?;
            writeln!(f, "objects    : {}", self.objects)?;
            writeln!(f, "detections : {}", self.detections)?;
            write!(f, "degraded   : {}", self.degraded)
        } else {
            write!(
                f,
                "objects={}, detections={}, degraded={}",
                self.objects, self.detections, self.degraded
            )
        }
    }
}

/// Run the full detection pipeline over a catalog and a visit log,
/// streaming matched detections to `sink`.
///
/// Arguments
/// -----------------
/// * `catalog`: the orbit catalog; objects are processed independently.
/// * `visits`: the survey visit log.
/// * `propagator`: the external propagation service.
/// * `photometry`: shared photometric context (bandpasses, color cache).
/// * `footprint`: instrument footprint for the precise stage, or `None`
///   for a purely circular field of view.
/// * `sink`: output sink, overwritten from the start; the header appears
///   with the first matched detection only.
/// * `params`: run tuning.
///
/// Return
/// ----------
/// * A [`RunSummary`], or the first fatal error. Degraded propagation
///   batches are not fatal; they are warned about and counted.
pub fn generate_observations<P, S, W>(
    catalog: &OrbitCatalog,
    visits: &[VisitRecord],
    propagator: P,
    photometry: &PhotometryContext<S>,
    footprint: Option<&dyn FootprintService>,
    sink: W,
    params: &SimulationParams,
) -> Result<RunSummary, SkysweepError>
where
    P: Propagator,
    S: SedLibrary,
    W: Write,
{
    let (start, end) = params.window.resolve(visits)?;
    let grid = TimeGrid::from_range(params.time_step, start, end, params.timescale)?;
    info!(
        "detection run: {} object(s), {} visit(s), grid of {} samples over [{:.5}, {:.5}]",
        catalog.len(),
        visits.len(),
        grid.len(),
        grid.first(),
        grid.last(),
    );

    let mut engine = EphemerisEngine::new(propagator, params.observatory.clone());
    let fov = match footprint {
        Some(service) => FovFilter::with_footprint(params.camera_radius, service),
        None => FovFilter::circular(params.fov_radius),
    };
    let mut writer = ObservationWriter::new(sink);
    let mut summary = RunSummary::default();

    #[cfg(feature = "progress")]
    let pb = {
        let pb = ProgressBar::new(catalog.len().max(1) as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
            )
            .expect("indicatif template"),
        );
        pb
    };

    for record in catalog.iter() {
        summary.objects += 1;
        engine.set_orbits(std::slice::from_ref(record))?;
        let raw = engine.generate(&grid)?;
        if raw.status() != 0 {
            summary.degraded += 1;
        }
        let series = reshape(&raw, EphemerisLayout::ByObject);
        let track = TrackInterpolants::build(&series[0])?;

        let matched = fov.matching_visits(&track, visits, params.timescale)?;
        debug!("object {}: {} matched visit(s)", record.object_id, matched.len());
        if matched.is_empty() {
            #[cfg(feature = "progress")]
            pb.inc(1);
            continue;
        }

        let offsets = photometry.color_offsets(&record.spectral_id)?;
        for &idx in &matched {
            let visit = &visits[idx];
            let ephemeris = track.at(visit.exp_mjd)?;
            let mag_filter = apparent_magnitude(ephemeris.mag_v, &visit.filter, &offsets)?;
            let (dmag_trail, dmag_detect) =
                motion_losses(ephemeris.velocity, visit.seeing_fwhm_geom, visit.exp_time);
            writer.append(&MatchedDetection {
                object_id: &record.object_id,
                ephemeris,
                visit,
                photometry: PhotometricTerms {
                    mag_filter,
                    dmag_color: mag_filter - ephemeris.mag_v,
                    dmag_trail,
                    dmag_detect,
                },
            })?;
            summary.detections += 1;
        }
        writer.flush()?;

        #[cfg(feature = "progress")]
        pb.inc(1);
    }

    #[cfg(feature = "progress")]
    pb.finish_and_clear();

    writer.flush()?;
    info!("detection run complete: {summary}");
    Ok(summary)
}
