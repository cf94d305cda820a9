use std::path::{Path, PathBuf};

use af_controls::{DualPressureController, FlowMeasurement, OutletState};
use af_sim::run_coupled;
use clap::{Parser, Subcommand};

mod error;
mod setup;

use error::CliError;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "af-cli")]
#[command(about = "ArteryFlow CLI - dual-pressure outlet control for vascular flow cases", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a case file and print its outlet setup
    Validate {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
    },
    /// Evaluate the outlet pressure law once
    Update {
        /// Target flow split of the outlet
        #[arg(long)]
        area_ratio: f64,
        /// Current outlet pressure
        #[arg(long, allow_hyphen_values = true)]
        pressure: f64,
        /// Total inflow magnitude
        #[arg(long)]
        q_in: f64,
        /// Outflow magnitude at this outlet
        #[arg(long)]
        q_out: f64,
        /// Current timestep
        #[arg(long)]
        timestep: u64,
    },
    /// Couple the controller to the case's synthetic network and run it
    Run {
        /// Path to the case YAML or JSON file
        case_path: PathBuf,
        /// Number of timesteps (defaults to the full case length)
        #[arg(long)]
        steps: Option<u64>,
        /// Print the flow-split table every N sampled steps
        #[arg(long, default_value_t = 0)]
        print_every: u64,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Update {
            area_ratio,
            pressure,
            q_in,
            q_out,
            timestep,
        } => cmd_update(area_ratio, pressure, q_in, q_out, timestep),
        Commands::Run {
            case_path,
            steps,
            print_every,
        } => cmd_run(&case_path, steps, print_every),
    }
}

fn cmd_validate(case_path: &Path) -> CliResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = af_project::load_case(case_path)?;
    let bank = setup::outlet_bank(&case)?;

    println!("✓ Case is valid: {}", case.name);
    println!(
        "  {} steps ({} per cycle), inlet {}",
        case.total_steps(),
        case.steps_per_cycle(),
        case.inlet.id
    );
    println!("  Initial pressure:");
    for outlet in bank.outlets() {
        println!(
            "    outlet {:>4}  ratio {:.4}  p0 {:.6}",
            outlet.id, outlet.area_ratio, outlet.pressure
        );
    }
    Ok(())
}

fn cmd_update(area_ratio: f64, pressure: f64, q_in: f64, q_out: f64, timestep: u64) -> CliResult<()> {
    let controller = DualPressureController::default();
    let state = OutletState::new(0, area_ratio, pressure)?;
    let update = controller.update(&state, &FlowMeasurement::new(q_in, q_out), timestep)?;

    println!("regime:   {}", update.regime.label());
    println!("law:      {:?}", update.law);
    println!(
        "split:    optimal {:.6} actual {:.6} (err {:.6}, M {:.6}, E {:.6})",
        update.split.r_optimal,
        update.split.r_actual,
        update.split.r_err,
        update.split.m_err,
        update.split.exponent
    );
    println!("pressure: {:.9} -> {:.9}", update.previous, update.pressure);
    Ok(())
}

fn cmd_run(case_path: &Path, steps: Option<u64>, print_every: u64) -> CliResult<()> {
    let case = af_project::load_case(case_path)?;
    let mut bank = setup::outlet_bank(&case)?;
    let coupling = setup::coupling(&case)?;
    let mut network = setup::synthetic_network(&case)?;
    let steps = steps.unwrap_or_else(|| case.total_steps());

    println!("Running {} for {} steps", case.name, steps);
    let record = run_coupled(&mut network, &mut bank, &coupling, steps)?;

    if print_every > 0 {
        for report in record.reports.iter().step_by(print_every as usize) {
            print!("{report}");
        }
    }

    match record.last() {
        Some(last) => {
            print!("{last}");
            println!(
                "✓ {} sampled steps, final max split error {:.3e}",
                record.reports.len(),
                last.max_split_error()
            );
        }
        None => println!("No sampled steps (run shorter than the warm-up)"),
    }
    Ok(())
}
