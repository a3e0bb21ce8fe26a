use std::sync::atomic::{AtomicUsize, Ordering};

use skysweep::constants::{Degree, MpcCode, MJD};
use skysweep::ephemeris::propagator::{
    OrbitRow, Propagator, RawEphemerides, EPH_FIELDS, FIELD_DEC, FIELD_DEC_RATE, FIELD_DISTANCE,
    FIELD_MAG, FIELD_PHASE, FIELD_RA, FIELD_RA_RATE, FIELD_SOLAR_ELONG, FIELD_TIME,
    FIELD_TIMESCALE,
};
use skysweep::photometry::bandpass::{Bandpass, BandpassSet, Sed, SedLibrary};
use skysweep::skysweep_errors::SkysweepError;
use skysweep::visits::VisitRecord;

/// Synthetic propagation service: every object follows the same uniform
/// drift on the sky, and its magnitude is H (from the element row) plus a
/// fixed distance term. Good enough to exercise the full pipeline without
/// real orbit integration.
pub struct DriftPropagator {
    pub status: i32,
    pub t0: MJD,
    pub ra0: Degree,
    pub dec0: Degree,
    /// Sky motion in deg/day.
    pub dradt: f64,
    pub ddecdt: f64,
}

impl DriftPropagator {
    pub fn stationary(ra: Degree, dec: Degree) -> Self {
        DriftPropagator {
            status: 0,
            t0: 0.0,
            ra0: ra,
            dec0: dec,
            dradt: 0.0,
            ddecdt: 0.0,
        }
    }
}

impl Propagator for DriftPropagator {
    fn ephemerides(
        &self,
        orbits: &[OrbitRow],
        times: &[(MJD, i32)],
        _observatory: &MpcCode,
    ) -> Result<RawEphemerides, SkysweepError> {
        let mut values = Vec::with_capacity(orbits.len() * times.len() * EPH_FIELDS);
        for row in orbits {
            let h_mag = row[10];
            for &(t, code) in times {
                let dt = t - self.t0;
                let mut fields = [0.0; EPH_FIELDS];
                fields[FIELD_DISTANCE] = 1.5;
                fields[FIELD_RA] = self.ra0 + self.dradt * dt;
                fields[FIELD_DEC] = self.dec0 + self.ddecdt * dt;
                fields[FIELD_MAG] = h_mag + 5.0;
                fields[FIELD_TIME] = t;
                fields[FIELD_TIMESCALE] = code as f64;
                fields[FIELD_RA_RATE] = self.dradt;
                fields[FIELD_DEC_RATE] = self.ddecdt;
                fields[FIELD_PHASE] = 10.0;
                fields[FIELD_SOLAR_ELONG] = 150.0;
                values.extend_from_slice(&fields);
            }
        }
        RawEphemerides::new(self.status, orbits.len(), times.len(), values)
    }

    fn propagate(
        &self,
        orbits: &[OrbitRow],
        epoch: (MJD, i32),
    ) -> Result<Vec<OrbitRow>, SkysweepError> {
        Ok(orbits
            .iter()
            .map(|row| {
                let mut out = *row;
                out[8] = epoch.0;
                out
            })
            .collect())
    }
}

/// In-memory spectral library with box bandpasses and a step spectrum:
/// the "g" offset is exactly 0 and the "r" offset exactly -2.5 log10(2).
/// Counts SED loads so cache behavior is observable.
pub struct StepSedLibrary {
    pub sed_loads: AtomicUsize,
}

impl StepSedLibrary {
    pub fn new() -> Self {
        StepSedLibrary {
            sed_loads: AtomicUsize::new(0),
        }
    }

    pub fn loads(&self) -> usize {
        self.sed_loads.load(Ordering::SeqCst)
    }

    /// The exact "r" color offset this library produces.
    pub fn r_offset() -> f64 {
        -2.5 * 2.0_f64.log10()
    }
}

fn box_band(lo: f64, hi: f64) -> Bandpass {
    Bandpass {
        wavelength: vec![lo, hi],
        throughput: vec![1.0, 1.0],
    }
}

impl SedLibrary for &StepSedLibrary {
    fn bandpasses(&self) -> Result<BandpassSet, SkysweepError> {
        Ok(BandpassSet {
            reference: box_band(400.0, 500.0),
            filters: vec![
                ("g".to_string(), box_band(400.0, 500.0)),
                ("r".to_string(), box_band(600.0, 700.0)),
            ],
        })
    }

    fn sed(&self, spectral_id: &str) -> Result<Sed, SkysweepError> {
        self.sed_loads.fetch_add(1, Ordering::SeqCst);
        match spectral_id {
            "C" | "S" => Ok(Sed {
                wavelength: vec![300.0, 500.0, 600.0, 800.0],
                flambda: vec![1.0, 1.0, 2.0, 2.0],
            }),
            other => Err(SkysweepError::SedDataMissing(other.to_string())),
        }
    }
}

pub fn visit(mjd: MJD, ra: Degree, dec: Degree, filter: &str) -> VisitRecord {
    VisitRecord {
        exp_mjd: mjd,
        night: (mjd - 60000.0).floor() as u32,
        field_ra: ra,
        field_dec: dec,
        rot_sky_pos: 0.0,
        filter: filter.to_string(),
        exp_time: 30.0,
        seeing_fwhm_eff: 0.85,
        seeing_fwhm_geom: 0.7,
        five_sigma_depth: 24.5,
        solar_elong: 120.0,
    }
}
