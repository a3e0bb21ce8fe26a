//! # Piecewise-linear ephemeris interpolation
//!
//! Ephemerides are generated on a sparse, padded time grid; visit times are
//! then answered by linear interpolation between the bracketing grid
//! samples. One [`LinearInterpolant`] is built per quantity except time
//! itself, and the set is bundled as [`TrackInterpolants`].
//!
//! Samples are expected **ascending in time**; that is a caller contract
//! inherited from the grid construction and is not re-validated here.
//! Querying outside `[first_sample, last_sample]` is a domain error, which
//! the grid padding makes unreachable for valid visit times.

use std::sync::Arc;

use crate::constants::{Degree, DegPerDay, Magnitude, MJD};
use crate::ephemeris::EphemerisSeries;
use crate::skysweep_errors::SkysweepError;

/// Ephemeris quantity names in output-column order.
pub const EPHEMERIS_COLUMNS: [&str; 10] = [
    "delta",
    "ra",
    "dec",
    "mag_v",
    "time",
    "dradt",
    "ddecdt",
    "phase",
    "solarelon",
    "velocity",
];

/// One quantity sampled on a shared ascending time grid, evaluable at any
/// time within the sampled span.
#[derive(Debug, Clone)]
pub struct LinearInterpolant {
    times: Arc<[MJD]>,
    values: Vec<f64>,
}

impl LinearInterpolant {
    /// Requires at least two samples and as many values as times.
    pub fn new(times: Arc<[MJD]>, values: Vec<f64>) -> Result<Self, SkysweepError> {
        if times.len() < 2 {
            return Err(SkysweepError::InsufficientSamples(times.len()));
        }
        if values.len() != times.len() {
            return Err(SkysweepError::MalformedEphemerisPayload {
                expected: times.len(),
                actual: values.len(),
            });
        }
        Ok(LinearInterpolant { times, values })
    }

    pub fn min_time(&self) -> MJD {
        self.times[0]
    }

    pub fn max_time(&self) -> MJD {
        self.times[self.times.len() - 1]
    }

    /// Evaluate at `t`, failing with
    /// [`SkysweepError::InterpolationOutOfRange`] outside the sampled span.
    pub fn eval(&self, t: MJD) -> Result<f64, SkysweepError> {
        let (min, max) = (self.min_time(), self.max_time());
        if t < min || t > max {
            return Err(SkysweepError::InterpolationOutOfRange {
                query: t,
                min,
                max,
            });
        }
        let hi = self
            .times
            .partition_point(|&x| x < t)
            .clamp(1, self.times.len() - 1);
        let lo = hi - 1;
        let frac = (t - self.times[lo]) / (self.times[hi] - self.times[lo]);
        Ok(self.values[lo] + frac * (self.values[hi] - self.values[lo]))
    }
}

/// Interpolated ephemeris of one object at one query time.
///
/// Field order matches [`EPHEMERIS_COLUMNS`]; `time` is the query time
/// itself.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EphemerisSample {
    /// Geocentric distance (AU).
    pub delta: f64,
    pub ra: Degree,
    pub dec: Degree,
    /// Reference-band (V) magnitude.
    pub mag_v: Magnitude,
    pub time: MJD,
    pub dradt: DegPerDay,
    pub ddecdt: DegPerDay,
    pub phase: Degree,
    pub solarelon: Degree,
    /// Scalar sky motion, hypotenuse of the two rates.
    pub velocity: DegPerDay,
}

/// The full interpolant set for one object's track: one
/// [`LinearInterpolant`] per quantity except time.
#[derive(Debug, Clone)]
pub struct TrackInterpolants {
    delta: LinearInterpolant,
    ra: LinearInterpolant,
    dec: LinearInterpolant,
    mag_v: LinearInterpolant,
    dradt: LinearInterpolant,
    ddecdt: LinearInterpolant,
    phase: LinearInterpolant,
    solarelon: LinearInterpolant,
    velocity: LinearInterpolant,
}

impl TrackInterpolants {
    /// Build from one object-major ephemeris series.
    ///
    /// The series' time vector must be ascending (caller contract; the
    /// grid construction guarantees it).
    pub fn build(series: &EphemerisSeries) -> Result<Self, SkysweepError> {
        let times: Arc<[MJD]> = Arc::from(series.time.as_slice());
        Ok(TrackInterpolants {
            delta: LinearInterpolant::new(times.clone(), series.delta.clone())?,
            ra: LinearInterpolant::new(times.clone(), series.ra.clone())?,
            dec: LinearInterpolant::new(times.clone(), series.dec.clone())?,
            mag_v: LinearInterpolant::new(times.clone(), series.mag_v.clone())?,
            dradt: LinearInterpolant::new(times.clone(), series.dradt.clone())?,
            ddecdt: LinearInterpolant::new(times.clone(), series.ddecdt.clone())?,
            phase: LinearInterpolant::new(times.clone(), series.phase.clone())?,
            solarelon: LinearInterpolant::new(times.clone(), series.solarelon.clone())?,
            velocity: LinearInterpolant::new(times, series.velocity.clone())?,
        })
    }

    pub fn min_time(&self) -> MJD {
        self.delta.min_time()
    }

    pub fn max_time(&self) -> MJD {
        self.delta.max_time()
    }

    /// Interpolated sky position only; the cheap path for the coarse
    /// field-of-view test.
    pub fn position(&self, t: MJD) -> Result<(Degree, Degree), SkysweepError> {
        Ok((self.ra.eval(t)?, self.dec.eval(t)?))
    }

    /// Full interpolated sample at `t`.
    pub fn at(&self, t: MJD) -> Result<EphemerisSample, SkysweepError> {
        Ok(EphemerisSample {
            delta: self.delta.eval(t)?,
            ra: self.ra.eval(t)?,
            dec: self.dec.eval(t)?,
            mag_v: self.mag_v.eval(t)?,
            time: t,
            dradt: self.dradt.eval(t)?,
            ddecdt: self.ddecdt.eval(t)?,
            phase: self.phase.eval(t)?,
            solarelon: self.solarelon.eval(t)?,
            velocity: self.velocity.eval(t)?,
        })
    }
}
