use clap::{Parser, Subcommand};
use hf_core::UnitSystem;
use hf_core::units::{to_ml, to_ml_per_s, to_mmhg};
use hf_sim::{Instance, SimOptions, SimRecord, run_sim};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error("{0}")]
    Project(#[from] hf_project::ProjectError),

    #[error("{0}")]
    Simulation(#[from] hf_sim::SimError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("simulation stopped at t = {t}: step did not converge (residual {residual_norm:e})")]
    Stopped { t: f64, residual_norm: f64 },
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "HemoFlow CLI - 0D vascular network simulation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a model description and build its system
    Validate {
        /// Path to the model file (YAML or JSON)
        model_path: PathBuf,
    },
    /// List the solver variables of a model
    Variables {
        /// Path to the model file (YAML or JSON)
        model_path: PathBuf,
    },
    /// Run a simulation and print a CSV of the solution
    Run {
        /// Path to the model file (YAML or JSON)
        model_path: PathBuf,
        /// Override the end time
        #[arg(long)]
        t_end: Option<f64>,
        /// Override the time step
        #[arg(long)]
        dt: Option<f64>,
        /// Override the recording interval (in steps)
        #[arg(long)]
        record_every: Option<usize>,
        /// Report pressures in mmHg, flows in mL/s and volumes in mL
        #[arg(long)]
        clinical: bool,
        /// Output CSV file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { model_path } => cmd_validate(&model_path),
        Commands::Variables { model_path } => cmd_variables(&model_path),
        Commands::Run {
            model_path,
            t_end,
            dt,
            record_every,
            clinical,
            output,
        } => cmd_run(
            &model_path,
            RunOverrides {
                t_end,
                dt,
                record_every,
            },
            clinical,
            output.as_deref(),
        ),
    }
}

struct RunOverrides {
    t_end: Option<f64>,
    dt: Option<f64>,
    record_every: Option<usize>,
}

fn cmd_validate(model_path: &Path) -> CliResult<()> {
    println!("Validating model: {}", model_path.display());
    let description = hf_project::load(model_path)?;
    let model = hf_sim::compile(&description)?;
    println!(
        "✓ Model is valid ({} blocks, {} unknowns, {} nonzeros)",
        model.blocks().len(),
        model.size(),
        model.system().nnz()
    );
    Ok(())
}

fn cmd_variables(model_path: &Path) -> CliResult<()> {
    let description = hf_project::load(model_path)?;
    let model = hf_sim::compile(&description)?;
    for (i, name) in model.variable_names().iter().enumerate() {
        println!("{i:>5}  {name}");
    }
    Ok(())
}

fn cmd_run(
    model_path: &Path,
    overrides: RunOverrides,
    clinical: bool,
    output: Option<&Path>,
) -> CliResult<()> {
    let mut description = hf_project::load(model_path)?;
    let sim = &mut description.simulation;
    if let Some(t_end) = overrides.t_end {
        sim.t_end = t_end;
    }
    if let Some(dt) = overrides.dt {
        sim.dt = dt;
    }
    if let Some(n) = overrides.record_every {
        sim.record_every = n;
    }

    tracing::info!(
        model = %model_path.display(),
        dt = description.simulation.dt,
        t_end = description.simulation.t_end,
        "running"
    );
    let mut instance = Instance::new(&description)?;
    let opts = SimOptions::from(&description.simulation);
    let (model, integrator, state) = instance.parts_mut();
    let record = run_sim(model, integrator, state, &opts)?;

    let units = clinical.then_some(description.units);
    match output {
        Some(path) => write_csv(&mut BufWriter::new(File::create(path)?), &record, units)?,
        None => write_csv(&mut io::stdout().lock(), &record, units)?,
    }

    if let Some(hf_sim::Advance::Failed {
        t, residual_norm, ..
    }) = record.failure
    {
        return Err(CliError::Stopped { t, residual_norm });
    }
    Ok(())
}

/// Convert a solver value to clinical units based on its variable name.
fn to_clinical(units: UnitSystem, name: &str, v: f64) -> f64 {
    match name.as_bytes().first() {
        Some(b'P') => to_mmhg(units.pressure(v)),
        Some(b'Q') => to_ml_per_s(units.flow(v)),
        Some(b'V') => to_ml(units.volume(v)),
        _ => v,
    }
}

fn write_csv(out: &mut impl Write, record: &SimRecord, units: Option<UnitSystem>) -> io::Result<()> {
    write!(out, "t")?;
    for name in &record.variables {
        write!(out, ",{name}")?;
    }
    writeln!(out)?;
    for (t, y) in record.t.iter().zip(&record.y) {
        write!(out, "{t}")?;
        for (name, v) in record.variables.iter().zip(y) {
            let v = units.map_or(*v, |u| to_clinical(u, name, *v));
            write!(out, ",{v}")?;
        }
        writeln!(out)?;
    }
    out.flush()
}
