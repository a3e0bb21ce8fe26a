//! # Field-of-view matching
//!
//! Decides which visits an object's interpolated track falls inside, as a
//! pure two-stage pipeline:
//!
//! 1. **rough**: great-circle separation between the interpolated position
//!    and the visit's boresight against a coarse radius. Cheap, eliminates
//!    the overwhelming majority of visits.
//! 2. **precise**: only for rough-test survivors, and only when a
//!    [`FootprintService`] is supplied. The position and pointing metadata
//!    are mapped through the instrument footprint; a visit matches only if
//!    the position lands on a live detector.
//!
//! The two-stage split keeps the expensive footprint call off the
//! non-matching visits. Matched indices come back ordered by visit time.

use hifitime::Epoch;
use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::constants::Degree;
use crate::interpolate::TrackInterpolants;
use crate::skysweep_errors::SkysweepError;
use crate::time_grid::Timescale;
use crate::visits::VisitRecord;

/// Indices into the visit log that an object's track intersects.
pub type MatchedVisits = SmallVec<[usize; 16]>;

/// Identifier of the detector containing a sky position.
pub type DetectorId = String;

/// Pointing metadata handed to the footprint geometry.
#[derive(Debug, Clone)]
pub struct Pointing {
    pub ra: Degree,
    pub dec: Degree,
    pub rotation: Degree,
    pub epoch: Epoch,
}

/// Instrument-footprint geometry, an external service.
///
/// Maps a sky position plus pointing metadata to the containing detector,
/// or `None` when the position misses every live detector region.
pub trait FootprintService {
    fn detector_at(&self, ra: Degree, dec: Degree, pointing: &Pointing) -> Option<DetectorId>;
}

fn radec_unit(ra: Degree, dec: Degree) -> Vector3<f64> {
    let (ra, dec) = (ra.to_radians(), dec.to_radians());
    Vector3::new(
        dec.cos() * ra.cos(),
        dec.cos() * ra.sin(),
        dec.sin(),
    )
}

/// Great-circle angular separation between two sky positions, in degrees.
///
/// Uses atan2 of cross-norm over dot, which stays accurate for both tiny
/// and near-antipodal separations.
pub fn angular_separation(ra1: Degree, dec1: Degree, ra2: Degree, dec2: Degree) -> Degree {
    let u = radec_unit(ra1, dec1);
    let v = radec_unit(ra2, dec2);
    u.cross(&v).norm().atan2(u.dot(&v)).to_degrees()
}

/// The two-stage visit filter for one run.
#[derive(Clone, Copy)]
pub struct FovFilter<'a> {
    rough_radius: Degree,
    footprint: Option<&'a dyn FootprintService>,
}

impl<'a> FovFilter<'a> {
    /// Circular field of view of the given radius; no footprint stage.
    pub fn circular(radius: Degree) -> Self {
        FovFilter {
            rough_radius: radius,
            footprint: None,
        }
    }

    /// Footprint-backed filter. The rough stage runs against the camera's
    /// circumscribing radius, the precise stage against the footprint.
    pub fn with_footprint(camera_radius: Degree, footprint: &'a dyn FootprintService) -> Self {
        FovFilter {
            rough_radius: camera_radius,
            footprint: Some(footprint),
        }
    }

    /// Indices of the visits whose field of view contains the interpolated
    /// track, ordered by visit time.
    ///
    /// Arguments
    /// -----------------
    /// * `track`: the object's interpolants; every visit time must lie
    ///   within its domain (guaranteed by the grid padding).
    /// * `visits`: the full visit log.
    /// * `timescale`: timescale of the visit exposure times, needed to
    ///   stamp the pointing epoch for the footprint stage.
    pub fn matching_visits(
        &self,
        track: &TrackInterpolants,
        visits: &[VisitRecord],
        timescale: Timescale,
    ) -> Result<MatchedVisits, SkysweepError> {
        let mut matched = MatchedVisits::new();
        for (idx, visit) in visits.iter().enumerate() {
            let (ra, dec) = track.position(visit.exp_mjd)?;
            let sep = angular_separation(ra, dec, visit.field_ra, visit.field_dec);
            if sep >= self.rough_radius {
                continue;
            }
            if let Some(footprint) = self.footprint {
                let pointing = Pointing {
                    ra: visit.field_ra,
                    dec: visit.field_dec,
                    rotation: visit.rot_sky_pos,
                    epoch: timescale.epoch(visit.exp_mjd),
                };
                if footprint.detector_at(ra, dec, &pointing).is_none() {
                    continue;
                }
            }
            matched.push(idx);
        }
        matched.sort_unstable_by(|&a, &b| visits[a].exp_mjd.total_cmp(&visits[b].exp_mjd));
        Ok(matched)
    }
}

#[cfg(test)]
mod fov_test {
    use super::*;
    use crate::ephemeris::EphemerisSeries;
    use crate::interpolate::TrackInterpolants;

    /// Track pinned at a fixed sky position over [100, 200].
    fn stationary_track(ra: Degree, dec: Degree) -> TrackInterpolants {
        let series = EphemerisSeries {
            delta: vec![1.0, 1.0],
            ra: vec![ra, ra],
            dec: vec![dec, dec],
            mag_v: vec![18.0, 18.0],
            time: vec![100.0, 200.0],
            dradt: vec![0.0, 0.0],
            ddecdt: vec![0.0, 0.0],
            phase: vec![10.0, 10.0],
            solarelon: vec![150.0, 150.0],
            velocity: vec![0.0, 0.0],
        };
        TrackInterpolants::build(&series).unwrap()
    }

    fn visit_at(mjd: f64, ra: Degree, dec: Degree) -> VisitRecord {
        VisitRecord {
            exp_mjd: mjd,
            night: 1,
            field_ra: ra,
            field_dec: dec,
            rot_sky_pos: 0.0,
            filter: "r".to_string(),
            exp_time: 30.0,
            seeing_fwhm_eff: 0.8,
            seeing_fwhm_geom: 0.7,
            five_sigma_depth: 24.0,
            solar_elong: 120.0,
        }
    }

    struct AcceptAll;
    impl FootprintService for AcceptAll {
        fn detector_at(&self, _ra: Degree, _dec: Degree, _p: &Pointing) -> Option<DetectorId> {
            Some("R22_S11".to_string())
        }
    }

    struct RejectAll;
    impl FootprintService for RejectAll {
        fn detector_at(&self, _ra: Degree, _dec: Degree, _p: &Pointing) -> Option<DetectorId> {
            None
        }
    }

    #[test]
    fn separation_sanity() {
        assert!(angular_separation(0.0, 0.0, 0.0, 0.0).abs() < 1e-12);
        assert!((angular_separation(0.0, 0.0, 90.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((angular_separation(10.0, 45.0, 190.0, -45.0) - 180.0).abs() < 1e-9);
        // Small separations keep precision.
        assert!((angular_separation(0.0, 0.0, 0.0, 1e-5) - 1e-5).abs() < 1e-12);
    }

    #[test]
    fn boresight_object_matches_any_positive_radius() {
        let track = stationary_track(120.0, -30.0);
        let visits = vec![visit_at(150.0, 120.0, -30.0)];
        for radius in [1e-6, 0.1, 1.75] {
            let matched = FovFilter::circular(radius)
                .matching_visits(&track, &visits, Timescale::Tai)
                .unwrap();
            assert_eq!(matched.as_slice(), &[0]);
        }
    }

    #[test]
    fn footprint_stage_can_reject_rough_survivors() {
        let track = stationary_track(120.0, -30.0);
        let visits = vec![visit_at(150.0, 120.0, -30.0)];

        let accept = AcceptAll;
        let matched = FovFilter::with_footprint(2.1, &accept)
            .matching_visits(&track, &visits, Timescale::Tai)
            .unwrap();
        assert_eq!(matched.as_slice(), &[0]);

        let reject = RejectAll;
        let matched = FovFilter::with_footprint(2.1, &reject)
            .matching_visits(&track, &visits, Timescale::Tai)
            .unwrap();
        assert!(matched.is_empty());
    }

    #[test]
    fn matches_come_back_ordered_by_visit_time() {
        let track = stationary_track(50.0, 10.0);
        // Log deliberately out of time order; far pointing in the middle.
        let visits = vec![
            visit_at(180.0, 50.3, 10.0),
            visit_at(110.0, 50.0, 10.2),
            visit_at(150.0, 120.0, -30.0),
        ];
        let matched = FovFilter::circular(1.75)
            .matching_visits(&track, &visits, Timescale::Tai)
            .unwrap();
        assert_eq!(matched.as_slice(), &[1, 0]);
    }
}
