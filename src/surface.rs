//! Double-cone surface evaluation over a polar grid in the branching plane.
//!
//! Once the branching plane parameters are known, the two adiabatic surfaces
//! near the intersection have a closed form in polar coordinates (r, theta)
//! of the plane:
//!
//! ```text
//! E±(r, theta) = E_ref + del_gh * r * sigma * cos(theta - theta_s)
//!                      ± del_gh * r * sqrt(1 + delta_gh * cos(2*theta))
//! ```
//!
//! The first term tilts the cone axis, the second opens the two sheets. The
//! radicand can dip slightly below zero when |delta_gh| is at or near 1; this
//! only affects display at extreme angles, so it is clamped to zero and
//! reported through [`SurfaceGrid::clamped`] instead of failing.
//!
//! Sampling resolution, radius bound and the energy unit conversion live in
//! [`GridConfig`], passed explicitly so tests and callers can override them.

use crate::branching_plane::ConeParams;
use log::warn;
use nalgebra::DMatrix;

/// Hartree to electronvolt conversion applied to the output energies.
pub const HARTREE_TO_EV: f64 = 27.2114;

/// Sampling parameters for the polar evaluation grid.
///
/// The radius bound is a fixed display window in the gradient's natural
/// length units, not a molecular property. `hartree_to_ev` is a unit
/// conversion, not a tunable: override it only when the reference energy is
/// supplied in a unit other than Hartree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridConfig {
    /// Upper bound of the radial range (the grid starts at 0)
    pub r_max: f64,
    /// Number of radial samples
    pub r_samples: usize,
    /// Number of angular samples over a full turn
    pub theta_samples: usize,
    /// Conversion factor from the reference-energy unit to eV
    pub hartree_to_ev: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            r_max: 0.001,
            r_samples: 500,
            theta_samples: 500,
            hartree_to_ev: HARTREE_TO_EV,
        }
    }
}

/// The evaluated surfaces on the polar grid.
///
/// Matrices are indexed `(theta_index, r_index)`: each row is one angle, each
/// column one radius. `x`/`y` hold the Cartesian display coordinates of every
/// grid point in the branching plane; `e_upper`/`e_lower` the two adiabatic
/// energies in eV.
#[derive(Debug, Clone)]
pub struct SurfaceGrid {
    /// Cartesian x = r cos(theta) of every grid point
    pub x: DMatrix<f64>,
    /// Cartesian y = r sin(theta) of every grid point
    pub y: DMatrix<f64>,
    /// Upper adiabatic surface in eV
    pub e_upper: DMatrix<f64>,
    /// Lower adiabatic surface in eV
    pub e_lower: DMatrix<f64>,
    /// True if any radicand was negative and clamped to zero
    pub clamped: bool,
}

/// Evaluates both adiabatic surfaces for the given cone parameters.
///
/// `e_ref` is the energy of the intersection point in the unit that
/// `config.hartree_to_ev` converts from (Hartree by default). The evaluation
/// is deterministic and stateless; the same parameters may be re-evaluated
/// with any number of reference energies or grid configurations.
///
/// A negative radicand is clamped to zero and flagged, never fatal. Sample
/// counts below 2 cannot span a range and are raised to 2 with a warning.
///
/// # Examples
///
/// ```
/// use conezen::branching_plane::ConeParams;
/// use conezen::surface::{evaluate, GridConfig};
///
/// let params = ConeParams { del_gh: 1.0, delta_gh: 0.0, sigma: 0.0, theta_s: 0.0 };
/// let grid = evaluate(&params, 0.0, &GridConfig::default());
/// // Both sheets meet at the apex
/// assert_eq!(grid.e_upper[(0, 0)], grid.e_lower[(0, 0)]);
/// ```
pub fn evaluate(params: &ConeParams, e_ref: f64, config: &GridConfig) -> SurfaceGrid {
    let nr = config.r_samples.max(2);
    let nt = config.theta_samples.max(2);
    if nr != config.r_samples || nt != config.theta_samples {
        warn!(
            "sample counts {} x {} cannot form a grid; raised to {} x {}",
            config.theta_samples, config.r_samples, nt, nr
        );
    }

    let r_step = config.r_max / (nr - 1) as f64;
    let theta_step = 2.0 * std::f64::consts::PI / (nt - 1) as f64;

    let mut x = DMatrix::zeros(nt, nr);
    let mut y = DMatrix::zeros(nt, nr);
    let mut e_upper = DMatrix::zeros(nt, nr);
    let mut e_lower = DMatrix::zeros(nt, nr);
    let mut clamped = false;

    for it in 0..nt {
        let theta = it as f64 * theta_step;
        let (sin_t, cos_t) = theta.sin_cos();
        let tilt = params.sigma * (theta - params.theta_s).cos();
        let mut radicand = 1.0 + params.delta_gh * (2.0 * theta).cos();
        if radicand < 0.0 {
            clamped = true;
            radicand = 0.0;
        }
        let split = radicand.sqrt();

        for ir in 0..nr {
            let r = ir as f64 * r_step;
            x[(it, ir)] = r * cos_t;
            y[(it, ir)] = r * sin_t;

            let part1 = params.del_gh * r * tilt;
            let part2 = params.del_gh * r * split;
            e_upper[(it, ir)] = (e_ref + part1 + part2) * config.hartree_to_ev;
            e_lower[(it, ir)] = (e_ref + part1 - part2) * config.hartree_to_ev;
        }
    }

    if clamped {
        warn!("negative radicand encountered during surface evaluation; clamped to zero");
    }

    SurfaceGrid {
        x,
        y,
        e_upper,
        e_lower,
        clamped,
    }
}
