//! Built-in help system for ConeZen.
//!
//! This module provides detailed documentation for the command-line
//! workflows, the input file formats, and the configuration options.

/// Documentation entry for a single command-line option.
#[derive(Debug, Clone)]
pub struct OptionDoc {
    /// The flag as typed on the command line (e.g., "--energy").
    pub flag: &'static str,
    /// The value placeholder, if the option takes one.
    pub value: Option<&'static str>,
    /// A brief description of what the option does.
    pub description: &'static str,
    /// The default behavior when the option is absent.
    pub default: &'static str,
}

/// Documentation for a single workflow command.
#[derive(Debug, Clone)]
pub struct WorkflowDoc {
    /// The command name (e.g., "vectors").
    pub name: &'static str,
    /// The positional arguments the command takes.
    pub usage: &'static str,
    /// What the workflow does and what it needs.
    pub description: &'static str,
}

/// All workflow documentation.
pub const WORKFLOWS: &[WorkflowDoc] = &[
    WorkflowDoc {
        name: "vectors",
        usage: "vectors <grad_a_file> <grad_b_file> <nac_file>",
        description: "Solve the branching plane from three plain-text vector files: \
                      the energy gradient of each electronic state and the \
                      non-adiabatic coupling vector between them.",
    },
    WorkflowDoc {
        name: "qm",
        usage: "qm <orca_output_file>",
        description: "Extract both gradients, the coupling vector, the atom labels \
                      and the reference energy from a single ORCA output file, then \
                      solve the branching plane.",
    },
    WorkflowDoc {
        name: "params",
        usage: "params <params.json>",
        description: "Skip the solver and re-evaluate the surfaces from previously \
                      saved cone parameters. Useful for re-rendering with different \
                      grid or camera settings.",
    },
    WorkflowDoc {
        name: "config",
        usage: "config",
        description: "Create a conezen_config.cfg settings template in the current \
                      directory.",
    },
];

/// All option documentation.
pub const OPTIONS: &[OptionDoc] = &[
    OptionDoc {
        flag: "--energy",
        value: Some("<hartree>"),
        description: "Reference energy of the intersection point in Hartree",
        default: "taken from the QM output in qm mode, otherwise 0.0",
    },
    OptionDoc {
        flag: "--xyz",
        value: Some("<file>"),
        description: "XYZ geometry file supplying element labels for the vector dumps \
                      (vectors and qm modes only; params mode has no vectors to label)",
        default: "labels fall back to the atom index",
    },
    OptionDoc {
        flag: "--plot",
        value: None,
        description: "Render the double-cone surfaces to cone.svg",
        default: "off",
    },
    OptionDoc {
        flag: "--animate",
        value: None,
        description: "Render a rotating animation to cone_rotation.svg",
        default: "off",
    },
    OptionDoc {
        flag: "--params-out",
        value: Some("<file>"),
        description: "Save the cone parameters as JSON for later params runs",
        default: "not saved",
    },
    OptionDoc {
        flag: "--outdir",
        value: Some("<dir>"),
        description: "Directory for all output files",
        default: "current directory",
    },
];

/// Prints the global help overview.
pub fn print_global_help() {
    println!("ConeZen - Conical intersection branching plane analysis");
    println!("========================================================");
    println!();
    println!("ConeZen characterizes the topology of a conical intersection from");
    println!("the gradients of the two electronic states and the non-adiabatic");
    println!("coupling vector, then renders the double-cone energy surfaces.");
    println!();
    println!("Usage:");
    for workflow in WORKFLOWS {
        println!("  conezen {}", workflow.usage);
    }
    println!();
    println!("Help topics:");
    println!("  conezen --help workflows   # What each command does");
    println!("  conezen --help formats     # Input and output file formats");
    println!("  conezen --help config      # Configuration file options");
    println!("  conezen --help examples    # Usage examples");
    println!();
}

/// Prints detailed workflow documentation.
pub fn print_workflow_help() {
    println!("ConeZen Workflows");
    println!("=================");
    println!();
    for workflow in WORKFLOWS {
        println!("conezen {}", workflow.usage);
        println!("  {}", workflow.description);
        println!();
    }
    println!("Options (valid for vectors, qm and params):");
    println!();
    for option in OPTIONS {
        match option.value {
            Some(value) => println!("  {} {}", option.flag, value),
            None => println!("  {}", option.flag),
        }
        println!("      {}", option.description);
        println!("      Default: {}", option.default);
        println!();
    }
}

/// Prints input and output format documentation.
pub fn print_format_help() {
    println!("ConeZen File Formats");
    println!("====================");
    println!();
    println!("Vector files (vectors mode input)");
    println!("  One header line, then one line per atom with three whitespace");
    println!("  separated floating-point components. Extra columns are ignored;");
    println!("  malformed lines are skipped and reported.");
    println!();
    println!("    gradient of state A");
    println!("    3.264320588434E-003  -1.2e-4   0.0");
    println!("    0.000100000000       5.5e-3   -2.0e-3");
    println!();
    println!("ORCA output (qm mode input)");
    println!("  Must contain two CARTESIAN GRADIENT blocks (state A first, then");
    println!("  state B) and one CARTESIAN NON-ADIABATIC COUPLINGS block. The last");
    println!("  FINAL SINGLE POINT ENERGY is used as the reference energy.");
    println!();
    println!("Parameter files (params mode input, --params-out output)");
    println!("  JSON with the four cone parameters:");
    println!();
    println!("    {{ \"del_gh\": ..., \"delta_gh\": ..., \"sigma\": ..., \"theta_s\": ... }}");
    println!();
    println!("Outputs");
    println!("  x_vectors.out / y_vectors.out  Branching plane unit vectors per atom");
    println!("  cone_params.txt                Key quantities report");
    println!("  cone.svg                       Static surface plot (--plot)");
    println!("  cone_rotation.svg              Rotating animation (--animate)");
    println!();
}

/// Prints configuration file documentation.
pub fn print_config_help() {
    println!("ConeZen Configuration");
    println!("=====================");
    println!();
    println!("ConeZen reads conezen_config.cfg from the current directory, falling");
    println!("back to ~/.config/conezen/conezen_config.cfg, then to built-in");
    println!("defaults. Run `conezen config` to create a commented template.");
    println!();
    println!("[grid]");
    println!("  r_max          Radial display window (default 0.001)");
    println!("  r_samples      Radial sample count (default 500)");
    println!("  theta_samples  Angular sample count (default 500)");
    println!();
    println!("[render]");
    println!("  width, height  Canvas size in pixels (defaults 900 x 720)");
    println!("  elev, azim     Camera angles in degrees (defaults 28, -133)");
    println!("  frames         Animation frame count (default 24)");
    println!();
    println!("[logging]");
    println!("  level          debug, info, warn or error (default info)");
    println!();
}

/// Prints usage examples.
pub fn print_examples() {
    println!("ConeZen Examples");
    println!("================");
    println!();
    println!("# Solve from three vector files and plot");
    println!("conezen vectors grad_a.txt grad_b.txt nac.txt --plot");
    println!();
    println!("# Use an XYZ file for atom labels and set the reference energy");
    println!("conezen vectors grad_a.txt grad_b.txt nac.txt \\");
    println!("    --xyz molecule.xyz --energy -228.40123");
    println!();
    println!("# Everything from one ORCA output, with animation");
    println!("conezen qm job.out --plot --animate --outdir results");
    println!();
    println!("# Save parameters now, re-render later without the gradients");
    println!("conezen qm job.out --params-out cone_params.json");
    println!("conezen params cone_params.json --plot");
    println!();
    println!("# Create a settings template");
    println!("conezen config");
    println!();
}
