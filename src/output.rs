//! # Detection output
//!
//! Matched detections stream to a plain delimited-text sink as they are
//! produced. The single header line is written with the first record, so a
//! run that matches nothing leaves the sink empty. Column order is fixed
//! for the run: object id, then ephemeris quantities, then visit columns,
//! then photometric terms.
//!
//! The writer favors durability over raw throughput: the orchestrator
//! flushes after each object's batch, so an externally aborted run keeps
//! every completed object.

use std::fs::File;
use std::io::{BufWriter, Write};

use camino::Utf8Path;
use itertools::Itertools;

use crate::constants::ObjectNumber;
use crate::interpolate::{EphemerisSample, EPHEMERIS_COLUMNS};
use crate::photometry::{PhotometricTerms, PHOTOMETRY_COLUMNS};
use crate::skysweep_errors::SkysweepError;
use crate::visits::{VisitRecord, VISIT_COLUMNS};

/// Leading column naming the object.
pub const OBJECT_COLUMN: &str = "obj_id";

/// One matched detection, assembled transiently and written immediately.
#[derive(Debug)]
pub struct MatchedDetection<'a> {
    pub object_id: &'a ObjectNumber,
    pub ephemeris: EphemerisSample,
    pub visit: &'a VisitRecord,
    pub photometry: PhotometricTerms,
}

/// Streaming writer over any [`io::Write`](std::io::Write) sink.
#[derive(Debug)]
pub struct ObservationWriter<W> {
    sink: W,
    wrote_header: bool,
}

impl<W: Write> ObservationWriter<W> {
    /// Wrap a sink. Nothing is written until the first record arrives.
    pub fn new(sink: W) -> Self {
        ObservationWriter {
            sink,
            wrote_header: false,
        }
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        let header = std::iter::once(OBJECT_COLUMN)
            .chain(EPHEMERIS_COLUMNS)
            .chain(VISIT_COLUMNS)
            .chain(PHOTOMETRY_COLUMNS)
            .join(" ");
        writeln!(self.sink, "{header}")
    }

    /// Append one detection, emitting the header first when this is the
    /// run's first record.
    pub fn append(&mut self, det: &MatchedDetection<'_>) -> Result<(), SkysweepError> {
        if !self.wrote_header {
            self.write_header()?;
            self.wrote_header = true;
        }
        let e = &det.ephemeris;
        let v = det.visit;
        let p = &det.photometry;
        writeln!(
            self.sink,
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            det.object_id,
            e.delta,
            e.ra,
            e.dec,
            e.mag_v,
            e.time,
            e.dradt,
            e.ddecdt,
            e.phase,
            e.solarelon,
            e.velocity,
            v.exp_mjd,
            v.night,
            v.field_ra,
            v.field_dec,
            v.rot_sky_pos,
            v.filter,
            v.exp_time,
            v.seeing_fwhm_eff,
            v.seeing_fwhm_geom,
            v.five_sigma_depth,
            v.solar_elong,
            p.mag_filter,
            p.dmag_color,
            p.dmag_trail,
            p.dmag_detect,
        )?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), SkysweepError> {
        self.sink.flush()?;
        Ok(())
    }

    /// Whether the header (and therefore at least one record) was written.
    pub fn has_output(&self) -> bool {
        self.wrote_header
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

impl ObservationWriter<BufWriter<File>> {
    /// Create or overwrite the output file at `path`.
    pub fn create(path: &Utf8Path) -> Result<Self, SkysweepError> {
        Ok(ObservationWriter::new(BufWriter::new(File::create(path)?)))
    }
}
