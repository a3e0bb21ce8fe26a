//! # Survey visit records
//!
//! One [`VisitRecord`] per telescope pointing, with the columns the
//! detection pipeline needs. The survey database layer lives outside this
//! crate; [`read_visit_log`] covers the common case of a delimited export
//! of that database.

use camino::Utf8Path;
use serde::Deserialize;

use crate::constants::{ArcSec, Degree, Magnitude, Seconds, MJD};
use crate::skysweep_errors::SkysweepError;

/// Visit column names, in output order.
pub const VISIT_COLUMNS: [&str; 11] = [
    "exp_mjd",
    "night",
    "field_ra",
    "field_dec",
    "rot_sky_pos",
    "filter",
    "exp_time",
    "seeing_fwhm_eff",
    "seeing_fwhm_geom",
    "five_sigma_depth",
    "solar_elong",
];

/// One telescope pointing from the survey visit log.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisitRecord {
    /// Exposure midpoint (MJD).
    pub exp_mjd: MJD,
    /// Survey night number.
    pub night: u32,
    /// Boresight right ascension (deg).
    pub field_ra: Degree,
    /// Boresight declination (deg).
    pub field_dec: Degree,
    /// Camera rotation on the sky (deg).
    pub rot_sky_pos: Degree,
    /// Filter name.
    pub filter: String,
    /// Open-shutter exposure duration (s).
    pub exp_time: Seconds,
    /// Effective seeing FWHM (arcsec).
    pub seeing_fwhm_eff: ArcSec,
    /// Geometric seeing FWHM (arcsec); drives the motion-loss model.
    pub seeing_fwhm_geom: ArcSec,
    /// 5-sigma limiting magnitude.
    pub five_sigma_depth: Magnitude,
    /// Solar elongation of the pointing (deg).
    pub solar_elong: Degree,
}

/// Read a visit log from a CSV export with a header row naming the
/// [`VISIT_COLUMNS`].
pub fn read_visit_log(path: &Utf8Path) -> Result<Vec<VisitRecord>, SkysweepError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut visits = Vec::new();
    for row in reader.deserialize() {
        visits.push(row?);
    }
    Ok(visits)
}
