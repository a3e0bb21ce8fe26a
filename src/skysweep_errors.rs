use thiserror::Error;

/// Crate-wide error type.
///
/// Configuration and environment problems (missing spectral data, a filter
/// absent from the color table) are fatal to a run. Advisory propagation
/// statuses are *not* errors; they travel inside
/// [`RawEphemerides`](crate::ephemeris::propagator::RawEphemerides) so the
/// caller decides whether to proceed.
#[derive(Error, Debug)]
pub enum SkysweepError {
    #[error("time step must be strictly positive, got {0}")]
    InvalidTimeStep(f64),

    #[error("cannot resolve observation window: {0}")]
    InvalidWindow(String),

    #[error("orbit catalog slice is empty")]
    EmptyOrbitCatalog,

    #[error("ephemeris payload has wrong size: expected {expected} values, got {actual}")]
    MalformedEphemerisPayload { expected: usize, actual: usize },

    #[error("interpolation query {query} outside sampled domain [{min}, {max}]")]
    InterpolationOutOfRange { query: f64, min: f64, max: f64 },

    #[error("interpolant needs at least two samples, got {0}")]
    InsufficientSamples(usize),

    #[error("filter '{0}' is not present in the color table")]
    UnknownFilter(String),

    #[error("spectral data unavailable: {0}")]
    SedDataMissing(String),

    #[error("bandpass '{0}' collects no positive flux from this spectrum")]
    NonPositiveFlux(String),

    #[error("object subset index {index} out of range for {n_orbits} orbits")]
    ObjectIndexOutOfRange { index: usize, n_orbits: usize },

    #[error("unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("visit log parsing failed: {0}")]
    CsvError(#[from] csv::Error),
}
