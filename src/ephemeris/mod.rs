//! # Ephemeris generation
//!
//! [`EphemerisEngine`] turns catalog records into propagation-service rows,
//! retrieves raw ephemerides for a full [`TimeGrid`](crate::time_grid::TimeGrid)
//! in **one batched call**, and regroups the payload into per-object or
//! per-time series.
//!
//! ## Batch semantics
//!
//! The service returns one advisory status per call. A non-zero status is
//! logged as a warning and does **not** abort the run: the payload is
//! returned as-is and the caller treats the affected objects' ephemerides
//! as unreliable. There is no retry.
//!
//! ## See also
//! ------------
//! * [`Propagator`] - the service seam and wire layout.
//! * [`reshape`] - payload regrouping and derived velocity.
//! * [`TrackInterpolants`](crate::interpolate::TrackInterpolants) - built
//!   from the object-major series produced here.

pub mod propagator;

use log::warn;

use crate::constants::{MpcCode, MJD};
use crate::orbits::OrbitRecord;
use crate::skysweep_errors::SkysweepError;
use crate::time_grid::{TimeGrid, Timescale};

use propagator::{
    service_row, OrbitRow, PropagatedElements, Propagator, RawEphemerides, FIELD_DEC,
    FIELD_DEC_RATE, FIELD_DISTANCE, FIELD_MAG, FIELD_PHASE, FIELD_RA, FIELD_RA_RATE,
    FIELD_SOLAR_ELONG, FIELD_TIME,
};

/// Axis along which a reshaped payload is grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EphemerisLayout {
    /// One series per object, vectors indexed by time. The layout the
    /// interpolator consumes.
    ByObject,
    /// One series per time, vectors indexed by object.
    ByTime,
}

/// One regrouped ephemeris series: ten parallel vectors, indexed by time
/// (`ByObject`) or by object (`ByTime`).
///
/// `velocity` is derived, not part of the wire payload: the Euclidean norm
/// of the two sky-motion rates.
#[derive(Debug, Clone, Default)]
pub struct EphemerisSeries {
    pub delta: Vec<f64>,
    pub ra: Vec<f64>,
    pub dec: Vec<f64>,
    pub mag_v: Vec<f64>,
    pub time: Vec<f64>,
    pub dradt: Vec<f64>,
    pub ddecdt: Vec<f64>,
    pub phase: Vec<f64>,
    pub solarelon: Vec<f64>,
    pub velocity: Vec<f64>,
}

impl EphemerisSeries {
    fn with_capacity(n: usize) -> Self {
        EphemerisSeries {
            delta: Vec::with_capacity(n),
            ra: Vec::with_capacity(n),
            dec: Vec::with_capacity(n),
            mag_v: Vec::with_capacity(n),
            time: Vec::with_capacity(n),
            dradt: Vec::with_capacity(n),
            ddecdt: Vec::with_capacity(n),
            phase: Vec::with_capacity(n),
            solarelon: Vec::with_capacity(n),
            velocity: Vec::with_capacity(n),
        }
    }

    fn push_sample(&mut self, raw: &RawEphemerides, object: usize, time: usize) {
        let dradt = raw.value(object, time, FIELD_RA_RATE);
        let ddecdt = raw.value(object, time, FIELD_DEC_RATE);
        self.delta.push(raw.value(object, time, FIELD_DISTANCE));
        self.ra.push(raw.value(object, time, FIELD_RA));
        self.dec.push(raw.value(object, time, FIELD_DEC));
        self.mag_v.push(raw.value(object, time, FIELD_MAG));
        self.time.push(raw.value(object, time, FIELD_TIME));
        self.dradt.push(dradt);
        self.ddecdt.push(ddecdt);
        self.phase.push(raw.value(object, time, FIELD_PHASE));
        self.solarelon.push(raw.value(object, time, FIELD_SOLAR_ELONG));
        self.velocity.push(dradt.hypot(ddecdt));
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }
}

/// Regroup a raw payload into per-object or per-time series, deriving the
/// scalar sky velocity along the way.
pub fn reshape(raw: &RawEphemerides, layout: EphemerisLayout) -> Vec<EphemerisSeries> {
    match layout {
        EphemerisLayout::ByObject => (0..raw.n_objects())
            .map(|obj| {
                let mut series = EphemerisSeries::with_capacity(raw.n_times());
                for t in 0..raw.n_times() {
                    series.push_sample(raw, obj, t);
                }
                series
            })
            .collect(),
        EphemerisLayout::ByTime => (0..raw.n_times())
            .map(|t| {
                let mut series = EphemerisSeries::with_capacity(raw.n_objects());
                for obj in 0..raw.n_objects() {
                    series.push_sample(raw, obj, t);
                }
                series
            })
            .collect(),
    }
}

/// Converts catalog entries to service rows and drives the batched
/// propagation calls for one run.
#[derive(Debug)]
pub struct EphemerisEngine<P> {
    propagator: P,
    observatory: MpcCode,
    rows: Vec<OrbitRow>,
}

impl<P: Propagator> EphemerisEngine<P> {
    pub fn new(propagator: P, observatory: impl Into<MpcCode>) -> Self {
        EphemerisEngine {
            propagator,
            observatory: observatory.into(),
            rows: Vec::new(),
        }
    }

    /// Load a catalog slice, replacing any previously set orbits.
    ///
    /// Converts each record into the service's fixed numeric layout
    /// (angles to radians, format and epoch-timescale tagged with integer
    /// codes).
    ///
    /// Return
    /// ----------
    /// * [`SkysweepError::EmptyOrbitCatalog`] when the slice is empty.
    pub fn set_orbits(&mut self, catalog_slice: &[OrbitRecord]) -> Result<(), SkysweepError> {
        if catalog_slice.is_empty() {
            return Err(SkysweepError::EmptyOrbitCatalog);
        }
        self.rows = catalog_slice
            .iter()
            .enumerate()
            .map(|(i, record)| service_row(record, i))
            .collect();
        Ok(())
    }

    /// Number of orbits currently loaded.
    pub fn n_orbits(&self) -> usize {
        self.rows.len()
    }

    /// One batched service call for all loaded orbits at all grid times.
    ///
    /// A non-zero advisory status is logged and the payload returned
    /// regardless; it is the caller's responsibility to treat the affected
    /// objects' ephemerides as unreliable.
    pub fn generate(&self, grid: &TimeGrid) -> Result<RawEphemerides, SkysweepError> {
        let raw = self
            .propagator
            .ephemerides(&self.rows, &grid.service_times(), &self.observatory)?;
        if raw.status() != 0 {
            warn!(
                "propagation service returned status {} for a batch of {} orbit(s) x {} time(s)",
                raw.status(),
                raw.n_objects(),
                raw.n_times(),
            );
        }
        Ok(raw)
    }

    /// Propagate loaded orbits to new element epochs.
    ///
    /// Arguments
    /// -----------------
    /// * `epochs`: target element epochs (MJD, TT).
    /// * `subset`: indices into the loaded orbits, or `None` for all.
    ///
    /// Return
    /// ----------
    /// * One [`PropagatedElements`] per requested epoch, in input order.
    pub fn propagate(
        &self,
        epochs: &[MJD],
        subset: Option<&[usize]>,
    ) -> Result<Vec<PropagatedElements>, SkysweepError> {
        let selected: Vec<OrbitRow> = match subset {
            None => self.rows.clone(),
            Some(indices) => indices
                .iter()
                .map(|&i| {
                    self.rows
                        .get(i)
                        .copied()
                        .ok_or(SkysweepError::ObjectIndexOutOfRange {
                            index: i,
                            n_orbits: self.rows.len(),
                        })
                })
                .collect::<Result<_, _>>()?,
        };
        let scale = Timescale::Tt.code();
        epochs
            .iter()
            .map(|&epoch| {
                let rows = self.propagator.propagate(&selected, (epoch, scale))?;
                Ok(PropagatedElements { epoch, rows })
            })
            .collect()
    }
}

#[cfg(test)]
mod ephemeris_engine_test {
    use super::propagator::EPH_FIELDS;
    use super::*;
    use crate::constants::ObjectNumber;
    use crate::orbits::OrbitalElements;

    /// Returns a payload where every field equals
    /// `object * 1000 + time_index`, except the rate fields which are fixed
    /// so the derived velocity is predictable.
    struct StampPropagator {
        status: i32,
    }

    impl Propagator for StampPropagator {
        fn ephemerides(
            &self,
            orbits: &[OrbitRow],
            times: &[(MJD, i32)],
            _observatory: &MpcCode,
        ) -> Result<RawEphemerides, SkysweepError> {
            let mut values = Vec::new();
            for (i, _) in orbits.iter().enumerate() {
                for (j, &(t, code)) in times.iter().enumerate() {
                    let stamp = (i * 1000 + j) as f64;
                    let mut fields = [stamp; EPH_FIELDS];
                    fields[super::propagator::FIELD_TIME] = t;
                    fields[super::propagator::FIELD_TIMESCALE] = code as f64;
                    fields[super::propagator::FIELD_RA_RATE] = 3.0;
                    fields[super::propagator::FIELD_DEC_RATE] = 4.0;
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

    fn record(id: u32) -> OrbitRecord {
        OrbitRecord {
            object_id: ObjectNumber::Int(id),
            elements: OrbitalElements::Keplerian {
                semi_major_axis: 2.0,
                eccentricity: 0.05,
                inclination: 3.0,
                ascending_node: 10.0,
                arg_perihelion: 20.0,
                mean_anomaly: 30.0,
            },
            epoch: 59000.0,
            h_mag: 18.0,
            g_slope: 0.15,
            spectral_id: "S".to_string(),
        }
    }

    #[test]
    fn empty_slice_is_rejected() {
        let mut engine = EphemerisEngine::new(StampPropagator { status: 0 }, "807");
        assert!(matches!(
            engine.set_orbits(&[]),
            Err(SkysweepError::EmptyOrbitCatalog)
        ));
    }

    #[test]
    fn nonzero_status_does_not_abort() {
        let mut engine = EphemerisEngine::new(StampPropagator { status: 12 }, "807");
        engine.set_orbits(&[record(1)]).unwrap();
        let grid = TimeGrid::from_times(vec![1.0, 2.0, 3.0], Timescale::Tai).unwrap();
        let raw = engine.generate(&grid).unwrap();
        assert_eq!(raw.status(), 12);
        assert_eq!(raw.n_times(), 3);
    }

    #[test]
    fn reshape_by_object_derives_velocity() {
        let mut engine = EphemerisEngine::new(StampPropagator { status: 0 }, "807");
        engine.set_orbits(&[record(1), record(2)]).unwrap();
        let grid = TimeGrid::from_times(vec![10.0, 11.0, 12.0], Timescale::Tai).unwrap();
        let raw = engine.generate(&grid).unwrap();

        let by_object = reshape(&raw, EphemerisLayout::ByObject);
        assert_eq!(by_object.len(), 2);
        assert_eq!(by_object[0].len(), 3);
        assert_eq!(by_object[1].delta[2], 1002.0);
        assert_eq!(by_object[0].time, vec![10.0, 11.0, 12.0]);
        // velocity = hypot(3, 4)
        assert!((by_object[0].velocity[0] - 5.0).abs() < 1e-12);

        let by_time = reshape(&raw, EphemerisLayout::ByTime);
        assert_eq!(by_time.len(), 3);
        assert_eq!(by_time[0].len(), 2);
        assert_eq!(by_time[2].delta, vec![2.0, 1002.0]);
    }

    #[test]
    fn propagate_selects_subset_and_stamps_epoch() {
        let mut engine = EphemerisEngine::new(StampPropagator { status: 0 }, "807");
        engine
            .set_orbits(&[record(1), record(2), record(3)])
            .unwrap();

        let out = engine.propagate(&[60000.0, 60100.0], Some(&[2])).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].rows.len(), 1);
        assert_eq!(out[0].rows[0][0], 2.0); // object index preserved
        assert_eq!(out[0].epoch, 60000.0);
        assert_eq!(out[1].rows[0][8], 60100.0);

        assert!(matches!(
            engine.propagate(&[60000.0], Some(&[9])),
            Err(SkysweepError::ObjectIndexOutOfRange { .. })
        ));
    }
}
