//! m3di: compute the meromorphic 3D-index state integral of a triangulation.
//!
//! ```text
//! m3di integrate <file> <re_hbar> <im_hbar> <samples> [--threads T] [--stats]
//! m3di write     <file> <re_hbar> <im_hbar> <samples>
//! ```
//!
//! Results are printed to stdout as JSON. Logging goes to stderr and is
//! controlled by `RUST_LOG`.

use std::error::Error;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use num_complex::Complex64;

use m3di::integrator::check_nome;
use m3di::prelude::*;
use m3di::report::{format_hbar, IntegralReport, SampleReport};
use m3di::sampler::sample_integrand;

#[derive(Parser, Debug)]
#[command(name = "m3di", version)]
#[command(about = "Compute the meromorphic 3D-index of a triangulated 3-manifold")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the state integral by Riemann sums
    Integrate {
        #[command(flatten)]
        params: RunParams,

        /// Number of worker threads (default: chosen from the grid size)
        #[arg(short, long)]
        threads: Option<usize>,

        /// Include wall-clock statistics in the output
        #[arg(long)]
        stats: bool,
    },
    /// Write sampled integrand values instead of integrating
    Write {
        #[command(flatten)]
        params: RunParams,
    },
}

#[derive(Args, Debug)]
struct RunParams {
    /// JSON file with the triangulation data (keys "N", "L", "a")
    file: PathBuf,

    /// Real part of hbar; must be negative so that |q| < 1
    #[arg(allow_negative_numbers = true)]
    re_hbar: String,

    /// Imaginary part of hbar
    #[arg(allow_negative_numbers = true)]
    im_hbar: String,

    /// Sample points per nested integral; 5000 to 10000 usually suffices
    #[arg(allow_negative_numbers = true)]
    samples: i64,
}

impl RunParams {
    /// Parse and validate ħ and the sample count.
    fn validate(&self) -> Result<(Complex64, usize), Box<dyn Error>> {
        let re: f64 = self
            .re_hbar
            .parse()
            .map_err(|_| format!("invalid floating point number: '{}'", self.re_hbar))?;
        let im: f64 = self
            .im_hbar
            .parse()
            .map_err(|_| format!("invalid floating point number: '{}'", self.im_hbar))?;
        if self.samples < 1 {
            return Err("the number of samples must be a positive integer".into());
        }
        let hbar = Complex64::new(re, im);
        check_nome(hbar)?;
        Ok((hbar, self.samples as usize))
    }

    fn hbar_given(&self, hbar: Complex64) -> String {
        format_hbar(&self.re_hbar, &self.im_hbar, hbar.im)
    }
}

fn integrate(
    params: &RunParams,
    threads: Option<usize>,
    show_stats: bool,
) -> Result<(), Box<dyn Error>> {
    let mut stats = Stats::new();
    let (hbar, samples) = params.validate()?;
    let mut manifold = Triangulation::from_path(&params.file)?;

    stats.signal(Stage::BeginComputation);
    let mut integrator = match threads {
        Some(t) => Integrator::with_threads(&mut manifold, hbar, samples, t),
        None => Integrator::new(&mut manifold, hbar, samples),
    };
    let config = integrator.config().clone();
    stats.set_threads(config.threads);
    let value = integrator.compute_integral(&mut stats)?;

    let mut report = IntegralReport::new(params.hbar_given(hbar), config.samples, hbar, value);
    if show_stats {
        report = report.with_stats(stats.report());
    }
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn write(params: &RunParams) -> Result<(), Box<dyn Error>> {
    let (hbar, samples) = params.validate()?;
    let mut manifold = Triangulation::from_path(&params.file)?;
    let points = sample_integrand(&mut manifold, hbar, samples)?;

    let report = SampleReport {
        hbar_given: params.hbar_given(hbar),
        samples,
        hbar_real_part: hbar.re,
        hbar_imag_part: hbar.im,
        points,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Integrate {
            params,
            threads,
            stats,
        } => integrate(params, *threads, *stats),
        Command::Write { params } => write(params),
    }
}
