use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use clap::Parser;
use log::info;
use plotters::prelude::*;
use thiserror::Error;

use hpfold_io::{ensure_parent_dir, project, FastaIterator, IoError};
use hpfold_lattice::{
    new_chain, ContactEnergy, EnergyTraceObserver, FoldingDriver, FoldingMover, LatticeError,
    SampleFrameObserver, SharedObserver, K_B,
};
use hpfold_montecarlo::MetropolisCriterion;
use hpfold_sim::{Energy, ObserversSet};

const DEFAULT_TEMPERATURE: f64 = 1.0;

/// Folds a single sequence on the 2D HP lattice model via Metropolis Monte Carlo.
#[derive(Parser, Debug)]
#[clap(name = "hpfold")]
#[clap(version = "0.1")]
#[clap(about = "2D HP lattice protein folding via Monte Carlo", long_about = None)]
struct Args {
    /// path to a FASTA file holding the sequence to fold
    fasta_input: String,
    /// number of Monte Carlo steps to run
    iterations: usize,
    /// initial conformation: "linear" or "random"
    init_method: String,
    /// save the first four accepted-move conformations as Frame_1..4.png
    #[clap(long)]
    sample: bool,
    /// plot the accepted-move energy trace to Results/energy.png and .tsv
    #[clap(long)]
    energy: bool,
    /// simulation temperature (energy units); must be > 0.0
    #[clap(long)]
    temp: Option<f64>,
    /// raise log verbosity to debug
    #[clap(short, long)]
    verbose: bool,
}

#[derive(Error, Debug)]
enum AppError {
    #[error("{0}")]
    InvalidArgument(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Fasta(#[from] IoError),
    #[error(transparent)]
    Lattice(#[from] LatticeError),
    #[error("rendering failed: {0}")]
    Render(String),
}

fn main() -> ExitCode {
    if std::env::var("RUST_LOG").is_err() {
        // SAFETY: single-threaded at this point in startup, before any other code reads the environment.
        unsafe { std::env::set_var("RUST_LOG", "info") };
    }
    env_logger::init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    if args.verbose {
        log::set_max_level(log::LevelFilter::Debug);
    }
    if args.iterations == 0 {
        return Err(AppError::InvalidArgument(format!(
            "iterations must be > 0, got {}",
            args.iterations
        )));
    }
    let temperature = args.temp.unwrap_or(DEFAULT_TEMPERATURE);
    if temperature <= 0.0 {
        return Err(AppError::InvalidArgument(format!("--temp must be > 0.0, got {temperature}")));
    }

    let file = File::open(&args.fasta_input)?;
    let mut records = FastaIterator::new(BufReader::new(file));
    let record = records
        .next()
        .ok_or_else(|| IoError::EmptyFasta { fname: args.fasta_input.clone() })?;
    let hp_sequence = project(&record.residues);
    info!("folding {} ({} residues, projected {})", record.id, record.residues.len(), hp_sequence);

    let mut chain = new_chain(&hp_sequence, &args.init_method)?;

    ensure_parent_dir("Results/Start.png")?;
    render("Results/Start.png", &chain)?;
    let start_energy = ContactEnergy.energy(&chain);
    println!("starting energy: {start_energy}");

    let mover = FoldingMover::new();
    let acceptance = Box::new(MetropolisCriterion::new(temperature * K_B));
    let mut driver = FoldingDriver::new(mover, acceptance);

    let mut observers: ObserversSet<hpfold_lattice::Chain> = ObserversSet::new();
    let energy_obs = if args.energy {
        let obs = EnergyTraceObserver::new("Results/energy.tsv")?;
        Some(obs)
    } else {
        None
    };
    if let Some(obs) = energy_obs {
        observers.add_observer(Box::new(obs), 1);
    }
    let sample_handle = if args.sample {
        let shared = SharedObserver::new(SampleFrameObserver::new(4));
        let handle = shared.handle();
        observers.add_observer(Box::new(shared), 1);
        Some(handle)
    } else {
        None
    };

    let cancel = Arc::new(AtomicBool::new(false));
    driver.run(&mut chain, args.iterations, &mut observers, &cancel)?;

    render("Results/End.png", &chain)?;
    let final_energy = ContactEnergy.energy(&chain);
    println!("final energy: {final_energy}");

    if let Some(handle) = sample_handle {
        for (i, frame) in handle.borrow().frames().iter().enumerate() {
            render(&format!("Results/Frame_{}.png", i + 1), frame)?;
        }
    }

    if args.energy {
        plot_energy_trace("Results/energy.tsv", "Results/energy.png")?;
    }

    Ok(())
}

fn render(path: &str, chain: &hpfold_lattice::Chain) -> Result<(), AppError> {
    hpfold_lattice::render_conformation(chain, path).map_err(|e| AppError::Render(e.to_string()))
}

fn plot_energy_trace(tsv_path: &str, png_path: &str) -> Result<(), AppError> {
    let contents = std::fs::read_to_string(tsv_path)?;
    let series: Vec<(f64, f64)> = contents
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let step: f64 = parts.next()?.parse().ok()?;
            let energy: f64 = parts.next()?.parse().ok()?;
            Some((step, energy))
        })
        .collect();
    if series.is_empty() {
        return Ok(());
    }
    let min_e = series.iter().map(|(_, e)| *e).fold(f64::INFINITY, f64::min);
    let max_e = series.iter().map(|(_, e)| *e).fold(f64::NEG_INFINITY, f64::max);
    let max_step = series.last().map(|(s, _)| *s).unwrap_or(1.0);

    let root = BitMapBackend::new(png_path, (800, 480)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| AppError::Render(e.to_string()))?;
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0.0..max_step.max(1.0), (min_e - 1.0)..(max_e + 1.0))
        .map_err(|e| AppError::Render(e.to_string()))?;
    chart.configure_mesh().draw().map_err(|e| AppError::Render(e.to_string()))?;
    chart
        .draw_series(LineSeries::new(series, &BLUE))
        .map_err(|e| AppError::Render(e.to_string()))?;
    root.present().map_err(|e| AppError::Render(e.to_string()))?;
    Ok(())
}
