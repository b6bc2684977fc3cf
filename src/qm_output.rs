//! Gradient and NAC extraction from quantum chemistry output files.
//!
//! The auto-extraction workflow reads a single ORCA output file from a
//! coupled calculation and pulls out everything the solver needs:
//!
//! - the two `CARTESIAN GRADIENT` blocks (state A first, state B second),
//! - the `CARTESIAN NON-ADIABATIC COUPLINGS` block,
//! - the element labels (taken from the gradient rows),
//! - the last `FINAL SINGLE POINT ENERGY` as an optional reference energy.
//!
//! Block rows look like:
//!
//! ```text
//!    1   C   :    0.003264321   -0.000120000    0.000000000
//! ```
//!
//! Parsing is line-based with block markers, the same approach used for ORCA
//! output elsewhere in this codebase's lineage of tools. Malformed rows
//! inside a block are skipped and counted, matching the vector-file loader's
//! policy of never dropping data silently.

use crate::geometry::VectorField;
use lazy_static::lazy_static;
use log::{debug, warn};
use regex::Regex;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for QM output extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Underlying filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A required block was not found in the output
    #[error("missing block in {file}: {block}")]
    MissingBlock {
        /// File the block was expected in
        file: String,
        /// Human-readable block name
        block: &'static str,
    },
    /// Extracted blocks disagree on the atom count
    #[error("inconsistent extraction from {file}: {message}")]
    Inconsistent {
        /// File the inconsistency was found in
        file: String,
        /// What disagreed
        message: String,
    },
}

/// Type alias for extraction results
type Result<T> = std::result::Result<T, ExtractError>;

// Robust floating-point pattern: handles 1.23, -0.032, 1.2e-4, .123, etc.
const FLOAT_RE: &str = r"[-+]?(?:\d+\.\d*|\.\d+|\d+)(?:[eE][-+]?\d+)?";

lazy_static! {
    // Gradient/NAC row: "   1   C   :    0.003264321  -0.000120000   0.000000000"
    static ref VECTOR_ROW_RE: Regex = Regex::new(&format!(
        r"^\s*\d+\s+([A-Za-z]{{1,2}})\s*:\s*({0})\s+({0})\s+({0})",
        FLOAT_RE
    )).unwrap();

    // "FINAL SINGLE POINT ENERGY      -228.401234567"
    static ref FINAL_ENERGY_RE: Regex = Regex::new(&format!(
        r"FINAL SINGLE POINT ENERGY\s+({0})",
        FLOAT_RE
    )).unwrap();
}

const GRADIENT_MARKER: &str = "CARTESIAN GRADIENT";
const NAC_MARKER: &str = "CARTESIAN NON-ADIABATIC COUPLINGS";

/// Everything extracted from one QM output file.
#[derive(Debug, Clone)]
pub struct QmExtraction {
    /// Energy gradient of state A
    pub grad_a: VectorField,
    /// Energy gradient of state B
    pub grad_b: VectorField,
    /// Non-adiabatic coupling vector between the two states
    pub nac: VectorField,
    /// Ordered element labels taken from the gradient rows
    pub labels: Vec<String>,
    /// Last reported single point energy in Hartree, if present
    pub energy: Option<f64>,
    /// Number of malformed rows skipped inside blocks
    pub skipped_rows: usize,
}

/// One parsed block: labels plus rows, with a malformed-row count.
struct Block {
    labels: Vec<String>,
    rows: Vec<[f64; 3]>,
    skipped: usize,
}

/// Extracts gradients, NAC and labels from an ORCA-style output file.
///
/// The file must contain two gradient blocks (state A first) and one NAC
/// block; their atom counts must agree.
pub fn extract_from_orca(path: &Path) -> Result<QmExtraction> {
    let content = fs::read_to_string(path)?;
    let file = path.display().to_string();

    let gradients = collect_blocks(&content, GRADIENT_MARKER);
    if gradients.len() < 2 {
        return Err(ExtractError::MissingBlock {
            file,
            block: "two CARTESIAN GRADIENT blocks (one per state)",
        });
    }
    if gradients.len() > 2 {
        warn!(
            "{} gradient blocks found in {}; using the first two",
            gradients.len(),
            file
        );
    }

    let nac_blocks = collect_blocks(&content, NAC_MARKER);
    let nac_block = match nac_blocks.into_iter().next() {
        Some(block) => block,
        None => {
            return Err(ExtractError::MissingBlock {
                file,
                block: "CARTESIAN NON-ADIABATIC COUPLINGS",
            })
        }
    };

    let mut gradients = gradients.into_iter();
    let block_a = gradients.next().expect("checked above");
    let block_b = gradients.next().expect("checked above");

    if block_a.rows.len() != block_b.rows.len() || block_a.rows.len() != nac_block.rows.len() {
        return Err(ExtractError::Inconsistent {
            file,
            message: format!(
                "gradient A has {} atoms, gradient B has {}, NAC has {}",
                block_a.rows.len(),
                block_b.rows.len(),
                nac_block.rows.len()
            ),
        });
    }

    let energy = FINAL_ENERGY_RE
        .captures_iter(&content)
        .last()
        .and_then(|cap| cap[1].parse::<f64>().ok());

    let skipped_rows = block_a.skipped + block_b.skipped + nac_block.skipped;
    debug!(
        "extracted {} atoms from {} ({} rows skipped)",
        block_a.rows.len(),
        file,
        skipped_rows
    );

    Ok(QmExtraction {
        grad_a: VectorField::from_rows(block_a.rows),
        grad_b: VectorField::from_rows(block_b.rows),
        nac: VectorField::from_rows(nac_block.rows),
        labels: block_a.labels,
        energy,
        skipped_rows,
    })
}

/// Collects every block introduced by `marker`.
///
/// A block starts after its marker line (separator lines of dashes are
/// tolerated) and ends at the first line that is neither a vector row nor a
/// separator, once at least one row has been read.
fn collect_blocks(content: &str, marker: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut current: Option<Block> = None;

    for line in content.lines() {
        if line.contains(marker) {
            if let Some(block) = current.take() {
                if !block.rows.is_empty() {
                    blocks.push(block);
                }
            }
            current = Some(Block {
                labels: Vec::new(),
                rows: Vec::new(),
                skipped: 0,
            });
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.chars().all(|c| c == '-') {
            continue;
        }

        if let Some(cap) = VECTOR_ROW_RE.captures(line) {
            match (
                cap[2].parse::<f64>(),
                cap[3].parse::<f64>(),
                cap[4].parse::<f64>(),
            ) {
                (Ok(x), Ok(y), Ok(z)) => {
                    block.labels.push(cap[1].to_string());
                    block.rows.push([x, y, z]);
                }
                _ => block.skipped += 1,
            }
        } else if block.rows.is_empty() {
            // Preamble between marker and first row (norm lines, etc.)
            continue;
        } else {
            // First non-row line after the data ends the block
            if let Some(finished) = current.take() {
                blocks.push(finished);
            }
        }
    }

    if let Some(block) = current.take() {
        if !block.rows.is_empty() {
            blocks.push(block);
        }
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
Some ORCA preamble
FINAL SINGLE POINT ENERGY      -228.401234567

------------------
CARTESIAN GRADIENT
------------------

   1   C   :    0.003264321   -0.000120000    0.000000000
   2   H   :    0.000100000    0.005500000   -0.002000000

Norm of the cartesian gradient ...  0.0061

------------------
CARTESIAN GRADIENT
------------------

   1   C   :   -0.001560029    0.000200000    0.000000000
   2   H   :    0.000300000   -0.004100000    0.001000000

----------------------------------
CARTESIAN NON-ADIABATIC COUPLINGS
----------------------------------

   1   C   :    0.010000000    0.020000000    0.000000000
   2   H   :   -0.005000000    0.001000000    0.003000000

FINAL SINGLE POINT ENERGY      -228.399876543
";

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_extract_two_gradients_and_nac() {
        let file = write_temp(SAMPLE);
        let extraction = extract_from_orca(file.path()).unwrap();

        assert_eq!(extraction.grad_a.num_atoms, 2);
        assert_eq!(extraction.grad_b.num_atoms, 2);
        assert_eq!(extraction.nac.num_atoms, 2);
        assert_eq!(extraction.labels, vec!["C", "H"]);
        assert_eq!(extraction.skipped_rows, 0);

        assert!((extraction.grad_a.atom_row(0)[0] - 3.264321e-3).abs() < 1e-12);
        assert!((extraction.grad_b.atom_row(0)[0] - (-1.560029e-3)).abs() < 1e-12);
        assert!((extraction.nac.atom_row(1)[2] - 3.0e-3).abs() < 1e-12);
    }

    #[test]
    fn test_last_final_energy_wins() {
        let file = write_temp(SAMPLE);
        let extraction = extract_from_orca(file.path()).unwrap();
        assert!((extraction.energy.unwrap() - (-228.399876543)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_nac_block() {
        let without_nac = SAMPLE
            .replace("CARTESIAN NON-ADIABATIC COUPLINGS", "SOMETHING ELSE");
        let file = write_temp(&without_nac);
        let result = extract_from_orca(file.path());
        assert!(matches!(result, Err(ExtractError::MissingBlock { .. })));
    }

    #[test]
    fn test_single_gradient_block_is_rejected() {
        let file = write_temp(
            "CARTESIAN GRADIENT\n   1   C   :   0.1  0.2  0.3\n\n\
             CARTESIAN NON-ADIABATIC COUPLINGS\n   1   C   :   0.0  0.1  0.0\n",
        );
        let result = extract_from_orca(file.path());
        assert!(matches!(result, Err(ExtractError::MissingBlock { .. })));
    }
}
