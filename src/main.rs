//! ConeZen Command-Line Interface
//!
//! This module contains the main entry point for the ConeZen program and
//! handles command-line argument parsing, help system integration, and
//! orchestration of the three analysis workflows.
//!
//! # Usage
//!
//! ConeZen supports four commands:
//!
//! 1. **Vector files** (`conezen vectors <grad_a> <grad_b> <nac>`):
//!    Solves the branching plane from three plain-text vector files
//!
//! 2. **QM output** (`conezen qm <orca_output>`):
//!    Extracts gradients, coupling and reference energy from one ORCA
//!    output file, then solves the branching plane
//!
//! 3. **Saved parameters** (`conezen params <params.json>`):
//!    Re-evaluates the surfaces from previously saved cone parameters
//!
//! 4. **Settings template** (`conezen config`):
//!    Creates a conezen_config.cfg template in the current directory
//!
//! # Examples
//!
//! ```bash
//! # Solve from vector files and render the surfaces
//! conezen vectors grad_a.txt grad_b.txt nac.txt --plot
//!
//! # Everything from one ORCA output, with animation
//! conezen qm job.out --plot --animate --outdir results
//!
//! # Re-render from saved parameters
//! conezen params cone_params.json --plot
//! ```
//!
//! # Help System
//!
//! Built-in help is available through the `--help` or `-h` flags:
//!
//! - `conezen --help` - General help
//! - `conezen --help workflows` - Commands and options
//! - `conezen --help formats` - Input and output file formats
//! - `conezen --help config` - Configuration file options

use conezen::branching_plane::{self, BranchingPlane, ConeParams};
use conezen::geometry::VectorField;
use conezen::render::{render_rotation_svg, render_surfaces_svg};
use conezen::settings::SettingsManager;
use conezen::surface::evaluate;
use conezen::{help, io, qm_output};
use log::{info, warn};
use std::env;
use std::path::{Path, PathBuf};
use std::process;

/// Options shared by the vectors, qm and params workflows.
struct CliOptions {
    /// Reference energy override in Hartree
    energy: Option<f64>,
    /// XYZ file supplying element labels for the vector dumps
    xyz: Option<PathBuf>,
    /// Render the static surface plot
    plot: bool,
    /// Render the rotating animation
    animate: bool,
    /// Save the cone parameters as JSON
    params_out: Option<PathBuf>,
    /// Directory for all output files
    outdir: PathBuf,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            energy: None,
            xyz: None,
            plot: false,
            animate: false,
            params_out: None,
            outdir: PathBuf::from("."),
        }
    }
}

/// Parses the option flags that follow the positional arguments.
fn parse_options(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--energy" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--energy requires a value".to_string())?;
                let energy: f64 = value
                    .parse()
                    .map_err(|_| format!("Invalid --energy value: {}", value))?;
                options.energy = Some(energy);
            }
            "--xyz" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--xyz requires a file path".to_string())?;
                options.xyz = Some(PathBuf::from(value));
            }
            "--plot" => options.plot = true,
            "--animate" => options.animate = true,
            "--params-out" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--params-out requires a file path".to_string())?;
                options.params_out = Some(PathBuf::from(value));
            }
            "--outdir" => {
                let value = iter
                    .next()
                    .ok_or_else(|| "--outdir requires a directory".to_string())?;
                options.outdir = PathBuf::from(value);
            }
            other => return Err(format!("Unknown option: {}", other)),
        }
    }

    Ok(options)
}

/// Main entry point for the ConeZen program.
///
/// Initializes the logger, parses command-line arguments, and dispatches to
/// the appropriate workflow. Exits with code 1 on any error.
fn main() {
    // Settings come first: the [logging] section decides the logger level
    let settings = match SettingsManager::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading configuration: {}", e);
            process::exit(1);
        }
    };

    env_logger::Builder::from_default_env()
        .filter_level(settings.logging().level_filter())
        .target(env_logger::Target::Stdout)
        .format_timestamp_millis()
        .init();
    info!("Configuration loaded from: {}", settings.config_source());

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage(&args[0]);
        process::exit(1);
    }

    check_help_flags(&args);

    let command = &args[1];
    let result = match command.as_str() {
        "vectors" => {
            if args.len() < 5 {
                eprintln!("Error: Missing file arguments");
                eprintln!(
                    "Usage: {} vectors <grad_a_file> <grad_b_file> <nac_file> [options]",
                    args[0]
                );
                process::exit(1);
            }
            run_vectors(
                Path::new(&args[2]),
                Path::new(&args[3]),
                Path::new(&args[4]),
                &args[5..],
                &settings,
            )
        }
        "qm" => {
            if args.len() < 3 {
                eprintln!("Error: Missing file argument");
                eprintln!("Usage: {} qm <orca_output_file> [options]", args[0]);
                process::exit(1);
            }
            run_qm(Path::new(&args[2]), &args[3..], &settings)
        }
        "params" => {
            if args.len() < 3 {
                eprintln!("Error: Missing file argument");
                eprintln!("Usage: {} params <params.json> [options]", args[0]);
                process::exit(1);
            }
            run_params(Path::new(&args[2]), &args[3..], &settings)
        }
        "config" => run_create_settings_template(),
        _ => {
            eprintln!("Error: Unknown command: {}", command);
            print_usage(&args[0]);
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Check for help flags and print appropriate help.
fn check_help_flags(args: &[String]) {
    if args.len() >= 3 && (args[1] == "--help" || args[1] == "-h") {
        match args[2].as_str() {
            "workflows" => help::print_workflow_help(),
            "formats" => help::print_format_help(),
            "config" => help::print_config_help(),
            "examples" => help::print_examples(),
            _ => help::print_global_help(),
        }
        process::exit(0);
    }

    if args.len() == 2 && (args[1] == "--help" || args[1] == "-h") {
        help::print_global_help();
        process::exit(0);
    }

    // Command-specific help (conezen vectors --help)
    if args.len() >= 3 && (args[2] == "--help" || args[2] == "-h") {
        help::print_workflow_help();
        process::exit(0);
    }
}

/// Prints usage information to stderr.
fn print_usage(program_name: &str) {
    eprintln!("ConeZen - Conical intersection branching plane analysis");
    eprintln!();
    eprintln!("Usage:");
    eprintln!(
        "  {} vectors <grad_a_file> <grad_b_file> <nac_file> [options]",
        program_name
    );
    eprintln!("                    Solve from three plain-text vector files");
    eprintln!();
    eprintln!("  {} qm <orca_output_file> [options]", program_name);
    eprintln!("                    Extract everything from one ORCA output file");
    eprintln!();
    eprintln!("  {} params <params.json> [options]", program_name);
    eprintln!("                    Re-evaluate surfaces from saved parameters");
    eprintln!();
    eprintln!("  {} config", program_name);
    eprintln!("                    Create a settings template file");
    eprintln!();
    eprintln!("Options: --energy <hartree>, --xyz <file>, --plot, --animate,");
    eprintln!("         --params-out <file>, --outdir <dir>");
    eprintln!();
    eprintln!("Run `{} --help` for the full documentation.", program_name);
}

fn print_banner() {
    println!("**** ConeZen: Conical Intersection Branching Plane Analysis ****");
    println!("              Version {}", env!("CARGO_PKG_VERSION"));
    println!();
}

/// Prints the key quantities table.
fn print_key_quantities(params: &ConeParams) {
    println!("{}", "=".repeat(60));
    println!("BRANCHING PLANE KEY QUANTITIES");
    println!("{}", "=".repeat(60));
    println!();
    println!("  Tilt heading theta_s (deg):   {:>14.6}", params.theta_s_degrees());
    println!("  Pitch del_gh:                 {:>14.6}", params.del_gh);
    println!("  Asymmetry delta_gh:           {:>14.6}", params.delta_gh);
    println!("  Relative tilt sigma:          {:>14.6}", params.sigma);
    println!();
    println!("{}", "=".repeat(60));
    println!();
}

/// Solves the branching plane from three vector files.
fn run_vectors(
    grad_a_path: &Path,
    grad_b_path: &Path,
    nac_path: &Path,
    option_args: &[String],
    settings: &SettingsManager,
) -> Result<(), Box<dyn std::error::Error>> {
    print_banner();
    let options = parse_options(option_args)?;

    let (grad_a, skipped_a) = io::load_vector_file(grad_a_path)?;
    let (grad_b, skipped_b) = io::load_vector_file(grad_b_path)?;
    let (nac, skipped_nac) = io::load_vector_file(nac_path)?;

    println!("Loaded {} atoms from vector files", grad_a.num_atoms);
    let skipped = skipped_a + skipped_b + skipped_nac;
    if skipped > 0 {
        warn!("{} malformed lines skipped across the input files", skipped);
    }

    VectorField::check_same_shape(&grad_a, &grad_b, &nac)?;

    let labels = match options.xyz.as_deref() {
        Some(xyz_path) => io::extract_atom_symbols(xyz_path)?,
        None => index_labels(grad_a.num_atoms),
    };

    let plane = branching_plane::solve(&grad_a, &grad_b, &nac)?;
    finish_run(
        &plane.params,
        Some((&plane, &labels)),
        options.energy,
        &options,
        settings,
    )
}

/// Extracts inputs from an ORCA output file and solves the branching plane.
fn run_qm(
    output_path: &Path,
    option_args: &[String],
    settings: &SettingsManager,
) -> Result<(), Box<dyn std::error::Error>> {
    print_banner();
    let options = parse_options(option_args)?;

    println!("Extracting from QM output: {}", output_path.display());
    let extraction = qm_output::extract_from_orca(output_path)?;

    println!("Extracted {} atoms", extraction.grad_a.num_atoms);
    if extraction.skipped_rows > 0 {
        warn!(
            "{} malformed rows skipped inside extracted blocks",
            extraction.skipped_rows
        );
    }
    if let Some(energy) = extraction.energy {
        println!("Reference energy from output: {:.9} Hartree", energy);
    }

    let labels = match options.xyz.as_deref() {
        Some(xyz_path) => io::extract_atom_symbols(xyz_path)?,
        None => extraction.labels.clone(),
    };

    let plane = branching_plane::solve(&extraction.grad_a, &extraction.grad_b, &extraction.nac)?;
    let energy = options.energy.or(extraction.energy);
    finish_run(
        &plane.params,
        Some((&plane, &labels)),
        energy,
        &options,
        settings,
    )
}

/// Re-evaluates surfaces from previously saved cone parameters.
fn run_params(
    params_path: &Path,
    option_args: &[String],
    settings: &SettingsManager,
) -> Result<(), Box<dyn std::error::Error>> {
    print_banner();
    let options = parse_options(option_args)?;

    // Saved parameters carry no per-atom vectors, so there is nothing for
    // XYZ labels to annotate; rejecting beats silently producing no dumps.
    if options.xyz.is_some() {
        return Err(
            "--xyz is not valid in params mode: saved parameters carry no per-atom vectors to label"
                .into(),
        );
    }

    println!("Loading parameters from: {}", params_path.display());
    let params = io::load_params_json(params_path)?;
    params
        .validate()
        .map_err(|message| format!("Invalid parameters in {}: {}", params_path.display(), message))?;

    // No unit vectors are available in this mode, so no vector dumps
    finish_run(&params, None, options.energy, &options, settings)
}

/// Fallback atom labels when no XYZ file or QM output supplies them.
fn index_labels(num_atoms: usize) -> Vec<String> {
    (1..=num_atoms).map(|i| i.to_string()).collect()
}

/// Shared tail of every workflow: reports, dumps, persistence and rendering.
fn finish_run(
    params: &ConeParams,
    plane_and_labels: Option<(&BranchingPlane, &[String])>,
    energy: Option<f64>,
    options: &CliOptions,
    settings: &SettingsManager,
) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&options.outdir)?;

    print_key_quantities(params);

    if let Some((plane, labels)) = plane_and_labels {
        let x_field = VectorField::from_flat(plane.x_hat.clone())
            .ok_or("branching plane vector length is not a multiple of 3")?;
        let y_field = VectorField::from_flat(plane.y_hat.clone())
            .ok_or("branching plane vector length is not a multiple of 3")?;

        let x_path = options.outdir.join("x_vectors.out");
        let y_path = options.outdir.join("y_vectors.out");
        io::write_vector_file(&x_path, labels, &x_field, "x")?;
        io::write_vector_file(&y_path, labels, &y_field, "y")?;
        println!("Wrote {} and {}", x_path.display(), y_path.display());
    }

    let report_path = options.outdir.join("cone_params.txt");
    io::write_params_txt(&report_path, params)?;
    println!("Wrote {}", report_path.display());

    if let Some(params_out) = options.params_out.as_deref() {
        let json_path = if params_out.is_absolute() {
            params_out.to_path_buf()
        } else {
            options.outdir.join(params_out)
        };
        io::save_params_json(&json_path, params)?;
        println!("Wrote {}", json_path.display());
    }

    if options.plot || options.animate {
        let e_ref = energy.unwrap_or(0.0);
        let grid_config = settings.grid().to_grid_config();
        let render_options = settings.render().to_render_options();

        println!(
            "Evaluating surfaces on a {} x {} grid (E_ref = {} Hartree)",
            grid_config.theta_samples, grid_config.r_samples, e_ref
        );
        let grid = evaluate(params, e_ref, &grid_config);
        if grid.clamped {
            warn!("surface radicand clamped at extreme angles; display only");
        }

        if options.plot {
            let svg_path = options.outdir.join("cone.svg");
            std::fs::write(&svg_path, render_surfaces_svg(&grid, &render_options))?;
            println!("Wrote {}", svg_path.display());
        }
        if options.animate {
            let frames = settings.render().frames;
            let svg_path = options.outdir.join("cone_rotation.svg");
            std::fs::write(
                &svg_path,
                render_rotation_svg(&grid, &render_options, frames, 8.0),
            )?;
            println!("Wrote {}", svg_path.display());
        }
    }

    Ok(())
}

/// Creates a conezen_config.cfg template in the current directory.
fn run_create_settings_template() -> Result<(), Box<dyn std::error::Error>> {
    let settings_path = Path::new("conezen_config.cfg");

    if settings_path.exists() {
        return Err(
            "conezen_config.cfg already exists. Please remove it first or choose a different location."
                .into(),
        );
    }

    SettingsManager::create_template(settings_path)?;
    println!("Settings template created: conezen_config.cfg");
    println!();
    println!("Next steps:");
    println!("  1. Review and edit the conezen_config.cfg file");
    println!("  2. Adjust grid resolution and camera angles as needed");
    println!("  3. The settings are loaded automatically on every run");
    Ok(())
}
