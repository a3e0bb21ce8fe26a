//! # Propagation-service contract
//!
//! The orbit propagation engine is an external service reached through the
//! [`Propagator`] trait. This module pins down the wire layout on both
//! sides of that seam:
//!
//! - **input**: one fixed 12-column numeric row per orbit
//!   (see [`service_row`]), plus `(time, timescale code)` pairs and an
//!   observatory code;
//! - **output**: a [`RawEphemerides`] payload of ten fields per
//!   (object, time) pair together with one advisory status for the whole
//!   call. A non-zero status does not block the payload; the caller
//!   decides whether to proceed, skip or abort.

use crate::constants::{MpcCode, MJD};
use crate::orbits::{OrbitRecord, OrbitalElements};
use crate::skysweep_errors::SkysweepError;
use crate::time_grid::Timescale;

/// One orbit in the service's fixed numeric layout:
/// index, six elements (angles in radians), element-format code,
/// epoch (MJD), epoch-timescale code, H, G.
pub type OrbitRow = [f64; 12];

/// Element-format code for cometary element sets.
pub const FORMAT_COMETARY: f64 = 2.0;
/// Element-format code for Keplerian element sets.
pub const FORMAT_KEPLERIAN: f64 = 3.0;

/// Number of fields returned per (object, time) pair.
pub const EPH_FIELDS: usize = 10;

/// Payload field indices, in service order.
pub const FIELD_DISTANCE: usize = 0;
pub const FIELD_RA: usize = 1;
pub const FIELD_DEC: usize = 2;
pub const FIELD_MAG: usize = 3;
pub const FIELD_TIME: usize = 4;
pub const FIELD_TIMESCALE: usize = 5;
pub const FIELD_RA_RATE: usize = 6;
pub const FIELD_DEC_RATE: usize = 7;
pub const FIELD_PHASE: usize = 8;
pub const FIELD_SOLAR_ELONG: usize = 9;

/// Pack one catalog record into the service row layout.
///
/// Angular elements are converted to radians here and nowhere else. The
/// element epoch is always tagged TT, matching the catalog convention.
pub fn service_row(record: &OrbitRecord, index: usize) -> OrbitRow {
    let epoch_scale = Timescale::Tt.code() as f64;
    match record.elements {
        OrbitalElements::Keplerian {
            semi_major_axis,
            eccentricity,
            inclination,
            ascending_node,
            arg_perihelion,
            mean_anomaly,
        } => [
            index as f64,
            semi_major_axis,
            eccentricity,
            inclination.to_radians(),
            ascending_node.to_radians(),
            arg_perihelion.to_radians(),
            mean_anomaly.to_radians(),
            FORMAT_KEPLERIAN,
            record.epoch,
            epoch_scale,
            record.h_mag,
            record.g_slope,
        ],
        OrbitalElements::Cometary {
            perihelion_distance,
            eccentricity,
            inclination,
            ascending_node,
            arg_perihelion,
            perihelion_time,
        } => [
            index as f64,
            perihelion_distance,
            eccentricity,
            inclination.to_radians(),
            ascending_node.to_radians(),
            arg_perihelion.to_radians(),
            perihelion_time,
            FORMAT_COMETARY,
            record.epoch,
            epoch_scale,
            record.h_mag,
            record.g_slope,
        ],
    }
}

/// Dense ephemeris payload for one batched service call, together with the
/// call's advisory status.
///
/// Values are stored object-major: the field `f` of object `i` at time
/// index `j` lives at `(i * n_times + j) * EPH_FIELDS + f`.
#[derive(Debug, Clone)]
pub struct RawEphemerides {
    status: i32,
    n_objects: usize,
    n_times: usize,
    values: Vec<f64>,
}

impl RawEphemerides {
    /// Wrap a payload, checking its dimensions.
    pub fn new(
        status: i32,
        n_objects: usize,
        n_times: usize,
        values: Vec<f64>,
    ) -> Result<Self, SkysweepError> {
        let expected = n_objects * n_times * EPH_FIELDS;
        if values.len() != expected {
            return Err(SkysweepError::MalformedEphemerisPayload {
                expected,
                actual: values.len(),
            });
        }
        Ok(RawEphemerides {
            status,
            n_objects,
            n_times,
            values,
        })
    }

    /// Advisory status of the whole call; 0 means success.
    pub fn status(&self) -> i32 {
        self.status
    }

    pub fn n_objects(&self) -> usize {
        self.n_objects
    }

    pub fn n_times(&self) -> usize {
        self.n_times
    }

    /// Field `field` of object `object` at time index `time`.
    pub fn value(&self, object: usize, time: usize, field: usize) -> f64 {
        debug_assert!(object < self.n_objects && time < self.n_times && field < EPH_FIELDS);
        self.values[(object * self.n_times + time) * EPH_FIELDS + field]
    }
}

/// New element rows valid at one target epoch.
#[derive(Debug, Clone)]
pub struct PropagatedElements {
    pub epoch: MJD,
    pub rows: Vec<OrbitRow>,
}

/// The external propagation engine.
///
/// Implementations are opaque to this crate; tests substitute synthetic
/// ones. Hard failures (the service cannot answer at all) surface as
/// errors; degraded answers travel as a non-zero status inside the
/// returned payload.
pub trait Propagator {
    /// One batched ephemeris computation for all `orbits` at all `times`,
    /// topocentric for `observatory`.
    fn ephemerides(
        &self,
        orbits: &[OrbitRow],
        times: &[(MJD, i32)],
        observatory: &MpcCode,
    ) -> Result<RawEphemerides, SkysweepError>;

    /// Propagate `orbits` to a new element epoch.
    fn propagate(
        &self,
        orbits: &[OrbitRow],
        epoch: (MJD, i32),
    ) -> Result<Vec<OrbitRow>, SkysweepError>;
}
