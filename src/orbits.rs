//! # Orbit catalog types
//!
//! An [`OrbitRecord`] carries one object's orbital element set, absolute
//! magnitude, slope parameter and spectral-type identifier. Records are
//! grouped in an [`OrbitCatalog`], which exposes indexed and sliced access
//! plus an iterator over single objects, so downstream stages can be fed
//! one object at a time without any shared mutable state.
//!
//! Catalog *parsing* lives outside this crate; records arrive already
//! validated.

use crate::constants::{Degree, Magnitude, ObjectNumber, MJD};

/// Orbital element set of a single object.
///
/// Angular elements are stored in **degrees**, matching the catalog
/// convention; conversion to radians happens only when a record is packed
/// into a propagation-service row.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitalElements {
    /// Keplerian elements (semi-major axis in AU).
    Keplerian {
        semi_major_axis: f64,
        eccentricity: f64,
        inclination: Degree,
        ascending_node: Degree,
        arg_perihelion: Degree,
        mean_anomaly: Degree,
    },
    /// Cometary elements (perihelion distance in AU, perihelion time in MJD).
    Cometary {
        perihelion_distance: f64,
        eccentricity: f64,
        inclination: Degree,
        ascending_node: Degree,
        arg_perihelion: Degree,
        perihelion_time: MJD,
    },
}

/// One catalog entry: identity, elements, epoch and photometric parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitRecord {
    pub object_id: ObjectNumber,
    pub elements: OrbitalElements,
    /// Epoch of the elements (MJD, TT).
    pub epoch: MJD,
    /// Absolute magnitude H.
    pub h_mag: Magnitude,
    /// Photometric slope parameter G.
    pub g_slope: f64,
    /// Spectral-type identifier used to pick the object's SED (e.g. "C", "S").
    pub spectral_id: String,
}

/// An in-memory orbit catalog with indexed and sliced access.
#[derive(Debug, Clone, Default)]
pub struct OrbitCatalog {
    records: Vec<OrbitRecord>,
}

impl OrbitCatalog {
    pub fn new(records: Vec<OrbitRecord>) -> Self {
        OrbitCatalog { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&OrbitRecord> {
        self.records.get(index)
    }

    /// Borrow the full record slice.
    pub fn records(&self) -> &[OrbitRecord] {
        &self.records
    }

    /// Borrow a contiguous sub-catalog.
    pub fn slice(&self, range: std::ops::Range<usize>) -> &[OrbitRecord] {
        &self.records[range]
    }

    /// Iterate over the catalog one object at a time.
    pub fn iter(&self) -> impl Iterator<Item = &OrbitRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a OrbitCatalog {
    type Item = &'a OrbitRecord;
    type IntoIter = std::slice::Iter<'a, OrbitRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
