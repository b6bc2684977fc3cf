#![deny(missing_docs)]

//! ConeZen - Conical Intersection Branching Plane Analysis
//!
//! ConeZen characterizes the local topology of a conical intersection between
//! two electronic states and renders the resulting double-cone energy
//! surfaces.
//!
//! # Overview
//!
//! At a conical intersection two adiabatic potential energy surfaces become
//! degenerate. The degeneracy is lifted linearly in exactly two directions,
//! which span the *branching plane*. Knowing the shape of the cone in that
//! plane tells you how a molecule funnels between states:
//! - peaked vs. sloped intersections
//! - the tilt direction a trajectory is pushed toward
//! - the asymmetry between the two branching directions
//!
//! # Algorithm
//!
//! From the gradients of the two states and the non-adiabatic coupling (NAC)
//! vector, ConeZen builds the gradient difference and mean:
//!
//! ```text
//! g = (grad_B - grad_A) / 2        s = (grad_B + grad_A) / 2
//! ```
//!
//! the coupling is rescaled to |g|, and a rotation angle beta is chosen so
//! the rotated pair (g~, h~) is orthogonal:
//!
//! ```text
//! beta = atan2(2 g.h', g.g - h'.h') / 2
//! ```
//!
//! Normalizing g~ and h~ yields the branching plane unit vectors x and y and
//! the four cone parameters:
//!
//! | Parameter  | Meaning                                    |
//! |------------|--------------------------------------------|
//! | `del_gh`   | Overall pitch (cone steepness)             |
//! | `delta_gh` | Asymmetry between the two directions       |
//! | `sigma`    | Relative tilt of the cone axis             |
//! | `theta_s`  | Heading of the tilt in the branching plane |
//!
//! The two surfaces then have a closed form on a polar grid of the plane,
//! evaluated by [`surface::evaluate`] and rendered by [`render`].
//!
//! # Quick Start
//!
//! ```no_run
//! use conezen::branching_plane;
//! use conezen::io::load_vector_file;
//! use conezen::surface::{evaluate, GridConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (grad_a, _) = load_vector_file(Path::new("grad_a.txt"))?;
//!     let (grad_b, _) = load_vector_file(Path::new("grad_b.txt"))?;
//!     let (nac, _) = load_vector_file(Path::new("nac.txt"))?;
//!
//!     let plane = branching_plane::solve(&grad_a, &grad_b, &nac)?;
//!     println!("tilt heading: {:.3} deg", plane.params.theta_s_degrees());
//!
//!     let grid = evaluate(&plane.params, 0.0, &GridConfig::default());
//!     println!("grid: {} x {}", grid.x.nrows(), grid.x.ncols());
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`branching_plane`](branching_plane/index.html) - The core solver
//! - [`surface`](surface/index.html) - Double-cone surface evaluation
//! - [`geometry`](geometry/index.html) - Vector field data structures
//! - [`io`](io/index.html) - Vector files, reports and parameter persistence
//! - [`qm_output`](qm_output/index.html) - ORCA output extraction
//! - [`render`](render/index.html) - SVG surface plots and animation
//! - [`settings`](settings/index.html) - Configuration management
//! - [`help`](help/index.html) - Built-in help system
//!
//! # References
//!
//! - Fdez. Galvan, I.; Delcey, M. G.; Pedersen, T. B.; Aquilante, F.;
//!   Lindh, R. *J. Chem. Theory Comput.* **2016**, 12, 3636-3653.
//!   [DOI: 10.1021/acs.jctc.6b00384](https://doi.org/10.1021/acs.jctc.6b00384)
//!
//! # License
//!
//! MIT License - see [LICENSE](../LICENSE) file for details

/// The branching plane solver
pub mod branching_plane;
pub mod geometry;
/// Built-in help system
pub mod help;
pub mod io;
/// ORCA output extraction
pub mod qm_output;
/// SVG surface rendering
pub mod render;
/// Configuration management system
pub mod settings;
/// Double-cone surface evaluation
pub mod surface;

pub use branching_plane::{BranchingPlane, ConeParams};
pub use geometry::VectorField;
pub use surface::SurfaceGrid;
