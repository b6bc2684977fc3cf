//! Vector field representation for gradients and couplings.
//!
//! Gradients and NAC vectors arrive as N rows of three Cartesian components,
//! one row per atom. All of the branching plane algebra works on the flat
//! 3N-dimensional form, so [`VectorField`] stores the data as a single
//! `DVector<f64>` in the order [x1, y1, z1, x2, y2, z2, ...], the same flat
//! layout quantum chemistry codes use for coordinates and forces.
//!
//! Fields are immutable once constructed; the solver never modifies them.

use nalgebra::DVector;

/// An N-atom Cartesian vector field (gradient or coupling), stored flattened.
///
/// # Examples
///
/// ```
/// use conezen::geometry::VectorField;
///
/// let grad = VectorField::from_rows(vec![
///     [3.264e-3, -1.2e-4, 0.0],
///     [0.0, 5.5e-3, -2.0e-3],
/// ]);
/// assert_eq!(grad.num_atoms, 2);
/// assert_eq!(grad.data().len(), 6);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField {
    data: DVector<f64>,
    /// Number of atoms the field describes
    pub num_atoms: usize,
}

impl VectorField {
    /// Builds a field from per-atom rows of [x, y, z] components.
    pub fn from_rows(rows: Vec<[f64; 3]>) -> Self {
        let num_atoms = rows.len();
        let data = DVector::from_iterator(num_atoms * 3, rows.into_iter().flatten());
        Self { data, num_atoms }
    }

    /// Builds a field from an already-flattened vector.
    ///
    /// Returns `None` if the length is not a multiple of 3.
    pub fn from_flat(data: DVector<f64>) -> Option<Self> {
        if data.len() % 3 != 0 {
            return None;
        }
        let num_atoms = data.len() / 3;
        Some(Self { data, num_atoms })
    }

    /// The flat 3N component vector.
    pub fn data(&self) -> &DVector<f64> {
        &self.data
    }

    /// The three components of one atom's row.
    pub fn atom_row(&self, atom_idx: usize) -> [f64; 3] {
        let i = atom_idx * 3;
        [self.data[i], self.data[i + 1], self.data[i + 2]]
    }

    /// Checks that three fields describe the same atoms.
    ///
    /// A mismatch is a fatal precondition violation: the solver operates on
    /// equal-length flattened vectors and mixing atom counts is meaningless.
    /// The message names all three shapes so the offending file is obvious.
    pub fn check_same_shape(
        grad_a: &VectorField,
        grad_b: &VectorField,
        nac: &VectorField,
    ) -> Result<(), String> {
        if grad_a.num_atoms == grad_b.num_atoms && grad_a.num_atoms == nac.num_atoms {
            Ok(())
        } else {
            Err(format!(
                "input shape mismatch: gradient A has {} atoms, gradient B has {}, NAC has {}",
                grad_a.num_atoms, grad_b.num_atoms, nac.num_atoms
            ))
        }
    }
}
