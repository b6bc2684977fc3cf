//! File I/O for vector fields, atom labels and result artifacts.
//!
//! Input side:
//!
//! - [`load_vector_file`]: plain-text gradient/NAC files, three whitespace
//!   separated floating columns per atom after a one-line header. Malformed
//!   rows are skipped and counted, never silently dropped.
//! - [`extract_atom_symbols`]: element symbols from an XYZ file, used only to
//!   label the vector dumps.
//!
//! Output side:
//!
//! - [`write_vector_file`]: the per-atom dump of a branching plane vector,
//!   columns `label x y z` with 10 decimal places.
//! - [`write_params_txt`]: the human-readable key-quantities report.
//! - [`save_params_json`] / [`load_params_json`]: parameter persistence, so a
//!   later run can re-evaluate surfaces without the original gradients.

use crate::branching_plane::ConeParams;
use crate::geometry::VectorField;
use log::debug;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Error type for file operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Underlying filesystem error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// File content could not be interpreted
    #[error("format error in {file}: {message}")]
    Format {
        /// File the error occurred in
        file: String,
        /// What went wrong
        message: String,
    },
    /// JSON (de)serialization failure for parameter files
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for I/O results
type Result<T> = std::result::Result<T, IoError>;

/// Loads a gradient or NAC vector file.
///
/// The first line is treated as a header and skipped. Every following line
/// is expected to carry at least three floating-point columns; extra columns
/// are ignored. Lines with fewer than three fields or unparseable numbers
/// are skipped and counted.
///
/// Returns the parsed field and the number of skipped lines. An empty result
/// (no valid rows at all) is a format error.
pub fn load_vector_file(path: &Path) -> Result<(VectorField, usize)> {
    let content = fs::read_to_string(path)?;
    let mut rows: Vec<[f64; 3]> = Vec::new();
    let mut skipped = 0usize;

    for line in content.lines().skip(1) {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            if !line.trim().is_empty() {
                skipped += 1;
            }
            continue;
        }
        match (
            parts[0].parse::<f64>(),
            parts[1].parse::<f64>(),
            parts[2].parse::<f64>(),
        ) {
            (Ok(x), Ok(y), Ok(z)) => rows.push([x, y, z]),
            _ => skipped += 1,
        }
    }

    if rows.is_empty() {
        return Err(IoError::Format {
            file: path.display().to_string(),
            message: "no valid vector rows found".to_string(),
        });
    }

    debug!(
        "loaded {} atoms from {} ({} lines skipped)",
        rows.len(),
        path.display(),
        skipped
    );
    Ok((VectorField::from_rows(rows), skipped))
}

/// Extracts the ordered element symbols from an XYZ file.
///
/// The first two lines (atom count and comment) are skipped; the symbol is
/// the first token of every body line with at least four fields. The labels
/// are purely cosmetic annotations for the vector dumps.
pub fn extract_atom_symbols(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let symbols: Vec<String> = content
        .lines()
        .skip(2)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 4 {
                Some(parts[0].to_string())
            } else {
                None
            }
        })
        .collect();

    if symbols.is_empty() {
        return Err(IoError::Format {
            file: path.display().to_string(),
            message: "no atom lines found in XYZ file".to_string(),
        });
    }
    Ok(symbols)
}

/// Writes a branching plane vector as a labeled per-atom dump.
///
/// Format: a one-line header, then one row per atom with the element label
/// and the three components at 10 decimal places. `axis` names the vector in
/// the header ("x" or "y").
///
/// Labels and field must describe the same number of atoms.
pub fn write_vector_file(
    path: &Path,
    labels: &[String],
    field: &VectorField,
    axis: &str,
) -> Result<()> {
    if labels.len() != field.num_atoms {
        return Err(IoError::Format {
            file: path.display().to_string(),
            message: format!(
                "label count {} does not match atom count {}",
                labels.len(),
                field.num_atoms
            ),
        });
    }

    let mut content = format!("atoms {} vectors\n", axis);
    for (i, label) in labels.iter().enumerate() {
        let row = field.atom_row(i);
        content.push_str(&format!(
            "{} {:.10} {:.10} {:.10}\n",
            label, row[0], row[1], row[2]
        ));
    }
    fs::write(path, content)?;
    Ok(())
}

/// Writes the "Branching Plane Key Quantities" text report.
pub fn write_params_txt(path: &Path, params: &ConeParams) -> Result<()> {
    let mut content = String::from("Branching Plane Key Quantities\n");
    content.push_str(&"=".repeat(40));
    content.push('\n');
    content.push_str(&format!(
        "theta_s (deg): {:.6}\n",
        params.theta_s_degrees()
    ));
    content.push_str(&format!("del_gh: {:.6}\n", params.del_gh));
    content.push_str(&format!("delta_gh: {:.6}\n", params.delta_gh));
    content.push_str(&format!("sigma: {:.6}\n", params.sigma));
    fs::write(path, content)?;
    Ok(())
}

/// Saves cone parameters as pretty-printed JSON.
pub fn save_params_json(path: &Path, params: &ConeParams) -> Result<()> {
    let json = serde_json::to_string_pretty(params)?;
    fs::write(path, json)?;
    Ok(())
}

/// Loads cone parameters from a JSON file written by [`save_params_json`].
pub fn load_params_json(path: &Path) -> Result<ConeParams> {
    let content = fs::read_to_string(path)?;
    let params: ConeParams = serde_json::from_str(&content)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_temp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_load_vector_file_skips_header_and_counts_bad_rows() {
        let file = write_temp(
            "gradient of state A\n\
             3.264320588434E-003  -1.2e-4  0.0\n\
             garbage line here\n\
             0.001 0.002\n\
             -1.0 2.0 3.0 extra\n",
        );
        let (field, skipped) = load_vector_file(file.path()).unwrap();
        assert_eq!(field.num_atoms, 2);
        assert_eq!(skipped, 2);
        assert!((field.atom_row(0)[0] - 3.264320588434e-3).abs() < 1e-15);
        // Extra columns beyond the third are ignored
        assert_eq!(field.atom_row(1), [-1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_load_vector_file_rejects_empty() {
        let file = write_temp("header only\n");
        assert!(matches!(
            load_vector_file(file.path()),
            Err(IoError::Format { .. })
        ));
    }

    #[test]
    fn test_extract_atom_symbols() {
        let file = write_temp(
            "3\ncomment\n\
             C  0.0 0.0 0.0\n\
             H  1.0 0.0 0.0\n\
             O  0.0 1.0 0.0\n",
        );
        let symbols = extract_atom_symbols(file.path()).unwrap();
        assert_eq!(symbols, vec!["C", "H", "O"]);
    }

    #[test]
    fn test_write_vector_file_ten_decimals() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_vectors.out");
        let field = VectorField::from_rows(vec![[0.5, -0.25, 0.125]]);
        write_vector_file(&path, &["C".to_string()], &field, "x").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "atoms x vectors");
        assert_eq!(
            lines.next().unwrap(),
            "C 0.5000000000 -0.2500000000 0.1250000000"
        );
    }

    #[test]
    fn test_write_vector_file_label_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x_vectors.out");
        let field = VectorField::from_rows(vec![[0.0; 3], [0.0; 3]]);
        let result = write_vector_file(&path, &["C".to_string()], &field, "x");
        assert!(result.is_err());
    }

    #[test]
    fn test_params_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("params.json");
        let params = ConeParams {
            del_gh: 0.123,
            delta_gh: -0.4,
            sigma: 1.5,
            theta_s: 0.9,
        };
        save_params_json(&path, &params).unwrap();
        let loaded = load_params_json(&path).unwrap();
        assert_eq!(loaded, params);
    }
}
