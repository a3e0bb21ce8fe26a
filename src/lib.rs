//! # skysweep
//!
//! Predicts which survey visits would have detected each object of a
//! solar-system catalog, at what sky position and apparent brightness,
//! accounting for the object's motion during the exposure.
//!
//! The pipeline, per object: batched ephemeris generation on a padded time
//! grid, piecewise-linear interpolation to visit times, a two-stage
//! field-of-view test, photometric adjustment (color offsets and motion
//! losses) and streamed delimited-text output.
//!
//! Orbit propagation, instrument-footprint geometry and spectral-data
//! loading are external services reached through the [`Propagator`],
//! [`FootprintService`](crate::fov::FootprintService) and
//! [`SedLibrary`](crate::photometry::bandpass::SedLibrary) traits.

pub mod constants;
pub mod ephemeris;
pub mod fov;
pub mod interpolate;
pub mod orbits;
pub mod output;
pub mod photometry;
pub mod skysweep_errors;
pub mod survey;
pub mod time_grid;
pub mod visits;

pub use constants::ObjectNumber;
pub use ephemeris::propagator::Propagator;
pub use ephemeris::EphemerisEngine;
pub use orbits::{OrbitCatalog, OrbitRecord, OrbitalElements};
pub use skysweep_errors::SkysweepError;
pub use survey::{generate_observations, RunSummary, SimulationParams};
pub use time_grid::{ObservationWindow, TimeGrid, Timescale};
pub use visits::VisitRecord;
