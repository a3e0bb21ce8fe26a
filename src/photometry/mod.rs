//! # Photometric adjustment
//!
//! Converts the propagation service's reference-band magnitude into what
//! the instrument would record for a given visit:
//!
//! 1. a **color offset** for the visit's filter, from the object's
//!    spectral type (memoized per spectral id for the run's lifetime);
//! 2. **motion losses**: trailing loss from the image smearing during the
//!    exposure, and detection loss from the mismatch between a trailed
//!    image and a point-source detection filter.
//!
//! The [`PhotometryContext`] is constructed once and shared; its bandpass
//! set loads lazily on first use and a missing resource is fatal then, not
//! at construction.
//!
//! ## See also
//! ------------
//! * [`SedLibrary`](crate::photometry::bandpass::SedLibrary) - the data
//!   seam behind the context.

pub mod bandpass;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ahash::RandomState;
use once_cell::sync::OnceCell;

use crate::constants::{ArcSec, DegPerDay, Magnitude, Seconds};
use crate::skysweep_errors::SkysweepError;

use bandpass::{BandpassSet, SedLibrary};

/// Magnitude offset per filter name, relative to the reference band.
pub type ColorTable = HashMap<String, Magnitude, RandomState>;

/// Photometric output-column names, in output order.
pub const PHOTOMETRY_COLUMNS: [&str; 4] =
    ["mag_filter", "dmag_color", "dmag_trail", "dmag_detect"];

/// Trailing-loss coefficients fitted to survey point-source photometry.
const A_TRAIL: f64 = 0.76;
const B_TRAIL: f64 = 1.16;
/// Detection-loss coefficients for the point-source matched filter.
const A_DETECT: f64 = 0.42;
const B_DETECT: f64 = 0.00;

/// Derived photometric fields of one matched detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotometricTerms {
    /// Apparent magnitude in the visit's filter.
    pub mag_filter: Magnitude,
    /// Color offset applied (filter minus reference band).
    pub dmag_color: Magnitude,
    /// Trailing loss.
    pub dmag_trail: Magnitude,
    /// Detection loss.
    pub dmag_detect: Magnitude,
}

/// Shared, lazily initialized photometric state for one run: the loaded
/// bandpass set and the per-spectral-type color cache.
#[derive(Debug)]
pub struct PhotometryContext<S> {
    library: S,
    bandpasses: OnceCell<BandpassSet>,
    colors: Mutex<HashMap<String, Arc<ColorTable>, RandomState>>,
}

impl<S: SedLibrary> PhotometryContext<S> {
    pub fn new(library: S) -> Self {
        PhotometryContext {
            library,
            bandpasses: OnceCell::new(),
            colors: Mutex::new(HashMap::default()),
        }
    }

    /// Color offsets for one spectral type, computed on first use and
    /// cached for the run's lifetime.
    ///
    /// The first call for a given id loads the SED and integrates it
    /// through every supported filter; later calls return the shared
    /// table without touching the library. The cache lock is held across
    /// the computation, so concurrent callers get at-most-one computation
    /// per id.
    pub fn color_offsets(&self, spectral_id: &str) -> Result<Arc<ColorTable>, SkysweepError> {
        let mut cache = self.colors.lock().expect("color cache poisoned");
        if let Some(table) = cache.get(spectral_id) {
            return Ok(table.clone());
        }

        let bandpasses = self.bandpasses.get_or_try_init(|| self.library.bandpasses())?;
        let sed = self.library.sed(spectral_id)?;
        let reference_mag = sed.magnitude(&bandpasses.reference, "reference")?;

        let mut table = ColorTable::default();
        for (name, band) in &bandpasses.filters {
            table.insert(name.clone(), sed.magnitude(band, name)? - reference_mag);
        }
        let table = Arc::new(table);
        cache.insert(spectral_id.to_string(), table.clone());
        Ok(table)
    }
}

/// Apparent magnitude in `filter`: the reference-band magnitude plus the
/// filter's color offset.
///
/// A filter missing from the table signals a mismatch between the visit
/// log and the supported filter set and is a fatal configuration error,
/// never a silent zero offset.
pub fn apparent_magnitude(
    base_mag: Magnitude,
    filter: &str,
    table: &ColorTable,
) -> Result<Magnitude, SkysweepError> {
    table
        .get(filter)
        .map(|offset| base_mag + offset)
        .ok_or_else(|| SkysweepError::UnknownFilter(filter.to_string()))
}

/// Trailing and detection losses for an object moving at `velocity`
/// (deg/day) during an exposure of `exp_time` seconds under `seeing`
/// arcseconds.
///
/// `x` is the trail length in seeing units; the 1/24 factor converts
/// deg/day into arcsec/s. Both losses vanish exactly as velocity goes to
/// zero.
pub fn motion_losses(
    velocity: DegPerDay,
    seeing: ArcSec,
    exp_time: Seconds,
) -> (Magnitude, Magnitude) {
    let x = velocity * exp_time / seeing / 24.0;
    let dmag_trail = 1.25 * (1.0 + A_TRAIL * x * x / (1.0 + B_TRAIL * x)).log10();
    let dmag_detect = 1.25 * (1.0 + A_DETECT * x * x / (1.0 + B_DETECT * x)).log10();
    (dmag_trail, dmag_detect)
}
