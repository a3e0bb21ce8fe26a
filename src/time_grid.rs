//! # Time grids for ephemeris sampling
//!
//! A [`TimeGrid`] is the strictly increasing, evenly spaced sequence of MJD
//! samples over which ephemerides are generated for one processing window.
//! The grid is padded by one step on both sides of the requested window, so
//! every visit time later queried against an interpolant built from it lies
//! strictly inside the sampled domain. Extrapolation is a structural
//! impossibility, not a runtime concern.
//!
//! [`ObservationWindow`] resolves a partially specified window (any of
//! start, end, span) against the visit log's time extent.
//!
//! ## See also
//! ------------
//! * [`EphemerisEngine::generate`](crate::ephemeris::EphemerisEngine::generate) -
//!   consumes the grid in one batched service call.
//! * [`TrackInterpolants`](crate::interpolate::TrackInterpolants) - built
//!   from samples on this grid.

use hifitime::{Epoch, TimeScale};

use crate::constants::MJD;
use crate::skysweep_errors::SkysweepError;
use crate::visits::VisitRecord;

/// Timescale tag carried alongside every MJD handed to the propagation
/// service, using the service's integer codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timescale {
    Utc,
    Ut1,
    Tt,
    Tai,
}

impl Timescale {
    /// Integer code in the propagation-service convention.
    pub fn code(self) -> i32 {
        match self {
            Timescale::Utc => 1,
            Timescale::Ut1 => 2,
            Timescale::Tt => 3,
            Timescale::Tai => 4,
        }
    }

    /// Convert an MJD in this timescale to a [`hifitime::Epoch`].
    ///
    /// UT1 is mapped through UTC: the difference stays under a second, which
    /// is far below the footprint lookup's angular resolution.
    pub fn epoch(self, mjd: MJD) -> Epoch {
        match self {
            Timescale::Utc | Timescale::Ut1 => Epoch::from_mjd_utc(mjd),
            Timescale::Tt => Epoch::from_mjd_in_time_scale(mjd, TimeScale::TT),
            Timescale::Tai => Epoch::from_mjd_tai(mjd),
        }
    }
}

/// Padded, evenly spaced ephemeris sampling for one processing window.
#[derive(Debug, Clone)]
pub struct TimeGrid {
    times: Vec<MJD>,
    timescale: Timescale,
}

impl TimeGrid {
    /// Build a grid covering `[start - step, end + step]` with spacing `step`.
    ///
    /// The padded end is included within half a step's tolerance, guarding
    /// against floating rounding dropping the final sample.
    ///
    /// Arguments
    /// -----------------
    /// * `step`: grid spacing in days, must be strictly positive.
    /// * `start`: first requested time (MJD), padded one step backward.
    /// * `end`: last requested time (MJD), padded one step forward.
    /// * `timescale`: timescale tag applied to every sample.
    ///
    /// Return
    /// ----------
    /// * The grid, or [`SkysweepError::InvalidTimeStep`] when `step <= 0`,
    ///   or [`SkysweepError::InvalidWindow`] when `end < start`.
    pub fn from_range(
        step: f64,
        start: MJD,
        end: MJD,
        timescale: Timescale,
    ) -> Result<Self, SkysweepError> {
        if !(step > 0.0) {
            return Err(SkysweepError::InvalidTimeStep(step));
        }
        if end < start {
            return Err(SkysweepError::InvalidWindow(format!(
                "end {end} precedes start {start}"
            )));
        }
        let first = start - step;
        let last = end + step;
        let mut times = Vec::with_capacity(((last - first) / step) as usize + 2);
        let mut k = 0usize;
        loop {
            let t = first + k as f64 * step;
            // Half-step tolerance keeps the padded endpoint in the grid.
            if t >= last + step / 2.0 {
                break;
            }
            times.push(t);
            k += 1;
        }
        Ok(TimeGrid { times, timescale })
    }

    /// Build a grid from an explicit, strictly increasing set of times.
    pub fn from_times(times: Vec<MJD>, timescale: Timescale) -> Result<Self, SkysweepError> {
        if times.len() < 2 {
            return Err(SkysweepError::InsufficientSamples(times.len()));
        }
        if times.windows(2).any(|w| w[1] <= w[0]) {
            return Err(SkysweepError::InvalidWindow(
                "explicit grid times must be strictly increasing".to_string(),
            ));
        }
        Ok(TimeGrid { times, timescale })
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn first(&self) -> MJD {
        self.times[0]
    }

    pub fn last(&self) -> MJD {
        self.times[self.times.len() - 1]
    }

    pub fn times(&self) -> &[MJD] {
        &self.times
    }

    pub fn timescale(&self) -> Timescale {
        self.timescale
    }

    /// The `(time, timescale code)` pairs in the propagation-service layout.
    pub fn service_times(&self) -> Vec<(MJD, i32)> {
        let code = self.timescale.code();
        self.times.iter().map(|&t| (t, code)).collect()
    }
}

/// A partially specified processing window.
///
/// Any of the three fields may be omitted; [`resolve`](Self::resolve)
/// derives the missing bound from whichever of end or span is given, and
/// falls back to the visit log's time extent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservationWindow {
    pub start: Option<MJD>,
    pub end: Option<MJD>,
    /// Window length in days, used when `end` is absent.
    pub span: Option<f64>,
}

impl ObservationWindow {
    /// Resolve to concrete `(start, end)` bounds.
    ///
    /// Precedence for the end bound: explicit `end`, then `start + span`,
    /// then the latest visit time. The start bound is the explicit `start`
    /// or the earliest visit time.
    pub fn resolve(&self, visits: &[VisitRecord]) -> Result<(MJD, MJD), SkysweepError> {
        let visit_min = visits
            .iter()
            .map(|v| v.exp_mjd)
            .min_by(|a, b| a.total_cmp(b));
        let visit_max = visits
            .iter()
            .map(|v| v.exp_mjd)
            .max_by(|a, b| a.total_cmp(b));

        let start = self.start.or(visit_min).ok_or_else(|| {
            SkysweepError::InvalidWindow(
                "no explicit start and no visits to infer one from".to_string(),
            )
        })?;
        let end = self
            .end
            .or(self.span.map(|s| start + s))
            .or(visit_max)
            .ok_or_else(|| {
                SkysweepError::InvalidWindow(
                    "no explicit end or span and no visits to infer one from".to_string(),
                )
            })?;
        if end <= start {
            return Err(SkysweepError::InvalidWindow(format!(
                "resolved end {end} does not follow start {start}"
            )));
        }
        Ok((start, end))
    }
}
