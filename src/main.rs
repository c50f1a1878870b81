//! Antenna designer dashboard: collect solver samples, train the geometry
//! regressor, synthesize dimensions for a target resonance frequency.
//!
//! With no subcommand the binary drops into an interactive menu; the
//! `generate` / `train` / `predict` subcommands expose the same operations
//! for scripted use.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing_subscriber::EnvFilter;

use patchsyn::config::{GeneratorConfig, TrainConfig, DEFAULT_DATASET, DEFAULT_MODEL};
use patchsyn::generator::{self, RunSummary};
use patchsyn::model::{self, TrainReport};
use patchsyn::sampler::BoundSpec;
use patchsyn::session::CommandSession;
use patchsyn::{Error, Result};

#[derive(Parser)]
#[command(
    name = "patchsyn",
    about = "U-slot patch antenna synthesis: sample an EM solver, train a regressor, predict geometries"
)]
struct Cli {
    /// Dataset CSV path
    #[arg(long, default_value = DEFAULT_DATASET)]
    data: PathBuf,

    /// Trained model artifact path
    #[arg(long, default_value = DEFAULT_MODEL)]
    model: PathBuf,

    /// Solver command; it is run once per sample with the params-file and
    /// curve-file paths appended to its arguments
    #[arg(long)]
    solver: Option<String>,

    /// Directory used to exchange files with the solver
    #[arg(long, default_value = "solver_exchange")]
    exchange: PathBuf,

    /// RNG seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the solver loop and append samples to the dataset
    Generate {
        #[arg(long, default_value_t = 10)]
        samples: usize,
        /// Loop iterations between dataset rewrites
        #[arg(long, default_value_t = 5)]
        checkpoint_every: usize,
    },
    /// Fit the geometry regressor on the collected dataset
    Train,
    /// Predict dimensions for a target resonance frequency (GHz)
    Predict { freq: f64 },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Some(Command::Generate {
            samples,
            checkpoint_every,
        }) => {
            let summary = generate_op(&cli, *samples, *checkpoint_every)?;
            print_summary(&summary);
        }
        Some(Command::Train) => {
            let report = model::train(&train_config(&cli))?;
            print_report(&report);
        }
        Some(Command::Predict { freq }) => predict_op(&cli, *freq)?,
        None => menu(&cli)?,
    }
    Ok(())
}

// ---------------------------------------------------------------------
// Operations shared by the menu and the subcommands
// ---------------------------------------------------------------------

fn generate_op(cli: &Cli, samples: usize, checkpoint_every: usize) -> Result<RunSummary> {
    let solver = cli
        .solver
        .as_deref()
        .ok_or_else(|| Error::Connect("pass --solver to run the generation loop".into()))?;
    let mut parts = solver.split_whitespace();
    let program = parts.next().unwrap_or_default();
    let args: Vec<String> = parts.map(str::to_owned).collect();

    // Session setup failures abort here, before any sampling.
    let mut session = CommandSession::connect(program, &args, &cli.exchange)?;

    let cfg = GeneratorConfig {
        samples,
        checkpoint_every,
        dataset_path: cli.data.clone(),
        bounds: BoundSpec::u_slot_patch(),
    };
    let mut rng = match cli.seed {
        Some(seed) => ChaCha20Rng::seed_from_u64(seed),
        None => ChaCha20Rng::from_entropy(),
    };
    generator::run(&cfg, &mut session, &mut rng)
}

fn train_config(cli: &Cli) -> TrainConfig {
    TrainConfig {
        dataset_path: cli.data.clone(),
        model_path: cli.model.clone(),
        ..TrainConfig::default()
    }
}

fn predict_op(cli: &Cli, freq: f64) -> Result<()> {
    let dims = model::predict_design(&cli.model, freq)?;
    println!();
    println!("========================================");
    println!("  synthesized design for {freq} GHz");
    println!("========================================");
    for (name, value) in &dims {
        println!("  {name:<4}: {value:>9.3} mm");
    }
    println!("========================================");
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    println!(
        "recorded {} of {} samples ({} skipped, {} checkpoints, {} rows on disk)",
        summary.recorded, summary.requested, summary.skipped, summary.checkpoints,
        summary.total_rows
    );
}

fn print_report(report: &TrainReport) {
    println!(
        "trained on {} usable rows of {} (held-out MAE {:.4} mm, R2 {:.4})",
        report.rows_usable, report.rows_total, report.mae, report.r2
    );
}

// ---------------------------------------------------------------------
// Interactive menu
// ---------------------------------------------------------------------

fn menu(cli: &Cli) -> anyhow::Result<()> {
    loop {
        println!();
        println!("==========================================");
        println!("        antenna designer dashboard        ");
        println!("==========================================");
        println!(" 1) generate   collect solver samples");
        println!(" 2) train      fit the geometry regressor");
        println!(" 3) predict    dimensions for a target frequency");
        println!(" 4) exit");

        let Some(choice) = prompt("select an option (1-4): ")? else {
            break;
        };
        match choice.trim() {
            "1" => {
                let Some(raw) = prompt("how many samples? (default 10): ")? else {
                    break;
                };
                // Anything non-numeric falls back to the default count.
                let samples = raw.trim().parse().unwrap_or(10);
                match generate_op(cli, samples, GeneratorConfig::default().checkpoint_every) {
                    Ok(summary) => print_summary(&summary),
                    Err(e) => println!("generation failed: {e}"),
                }
            }
            "2" => match model::train(&train_config(cli)) {
                Ok(report) => print_report(&report),
                Err(e) => println!("training failed: {e}"),
            },
            "3" => {
                let Some(raw) = prompt("target resonance frequency (GHz): ")? else {
                    break;
                };
                match raw.trim().parse::<f64>() {
                    Ok(freq) => {
                        if let Err(e) = predict_op(cli, freq) {
                            println!("prediction failed: {e}");
                        }
                    }
                    Err(_) => println!("invalid number: `{}`", raw.trim()),
                }
            }
            "4" | "q" | "quit" | "exit" => break,
            other => println!("unknown option: `{other}`"),
        }
    }
    Ok(())
}

fn prompt(msg: &str) -> io::Result<Option<String>> {
    print!("{msg}");
    io::stdout().flush()?;
    let mut line = String::new();
    let n = io::stdin().read_line(&mut line)?;
    if n == 0 {
        // stdin closed
        return Ok(None);
    }
    Ok(Some(line))
}
