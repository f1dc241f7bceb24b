//! Command-line front end: stream a CSV through a confidence sequence.
//!
//! ```bash
//! # One-sample mean over a numeric column
//! peeksafe mean --config mean.yaml --output runs/
//!
//! # Two-sample lift over arm + value columns
//! peeksafe abtest --config abtest.yaml
//! ```
//!
//! Exit codes: 0 on success, 2 on configuration or schema errors, 3 when
//! an observation violates the declared assumptions in `error` clip mode.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use peeksafe::config::RunConfig;
use peeksafe::data::{read_arm_value_columns, read_value_column};
use peeksafe::output::{JsonlWriter, RunManifest};
use peeksafe::{
    recommend_ab, recommend_cs, ABSpec, AssumptionViolationError, BernoulliMixtureCS,
    ConfidenceSequence, ConfigError, EmpiricalBernsteinCS, GuaranteeTier, HoeffdingCS, Interval,
    Method, StreamSpec, TwoSampleEmpiricalBernsteinCS, TwoSampleHoeffdingCS,
};

const EXIT_CONFIG: u8 = 2;
const EXIT_ASSUMPTION: u8 = 3;

/// Peeking-safe streaming inference for online metrics and A/B tests.
#[derive(Parser, Debug)]
#[command(name = "peeksafe")]
#[command(about = "Anytime-valid confidence sequences over tabular streams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// One-sample confidence sequence for the mean of a numeric column.
    Mean {
        /// Path to the YAML run config.
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for JSONL results and the run manifest.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Two-sample confidence sequence for the lift between arms A and B.
    Abtest {
        /// Path to the YAML run config.
        #[arg(short, long)]
        config: PathBuf,
        /// Directory for JSONL results and the run manifest.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

enum CliError {
    Config(String),
    Assumption(AssumptionViolationError),
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

impl From<AssumptionViolationError> for CliError {
    fn from(e: AssumptionViolationError) -> Self {
        Self::Assumption(e)
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::Config(format!("io error: {e}"))
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Mean { config, output } => run_mean(&config, output.as_deref()),
        Command::Abtest { config, output } => run_abtest(&config, output.as_deref()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Config(msg)) => {
            eprintln!("error: {msg}");
            ExitCode::from(EXIT_CONFIG)
        }
        Err(CliError::Assumption(e)) => {
            eprintln!("assumption violation: {e}");
            ExitCode::from(EXIT_ASSUMPTION)
        }
    }
}

fn resolve_one_sample(cfg: &RunConfig, spec: &StreamSpec) -> Result<Method, CliError> {
    match cfg.method.as_str() {
        "auto" => {
            let rec = recommend_cs(spec, None);
            println!("using recommended method: {}", rec.reason);
            Ok(rec.method)
        }
        "hoeffding" => Ok(Method::HoeffdingCS),
        "empirical_bernstein" => Ok(Method::EmpiricalBernsteinCS),
        "bernoulli_mixture" => Ok(Method::BernoulliMixtureCS),
        other => Err(CliError::Config(format!("unknown method {other:?}"))),
    }
}

fn resolve_two_sample(cfg: &RunConfig, spec: &ABSpec) -> Result<Method, CliError> {
    match cfg.method.as_str() {
        "auto" => {
            let rec = recommend_ab(spec, None);
            println!("using recommended method: {}", rec.reason);
            Ok(rec.method)
        }
        "two_sample_hoeffding" => Ok(Method::TwoSampleHoeffdingCS),
        "two_sample_empirical_bernstein" => Ok(Method::TwoSampleEmpiricalBernsteinCS),
        other => Err(CliError::Config(format!("unknown method {other:?}"))),
    }
}

struct RunOutput {
    writer: Option<JsonlWriter>,
    tiers: Vec<GuaranteeTier>,
}

impl RunOutput {
    fn create(output: Option<&Path>) -> Result<Self, CliError> {
        let writer = match output {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                Some(JsonlWriter::create(&dir.join("results.jsonl"))?)
            }
            None => None,
        };
        Ok(Self {
            writer,
            tiers: Vec::new(),
        })
    }

    fn record(&mut self, iv: &Interval) -> Result<(), CliError> {
        self.tiers.push(iv.tier);
        if let Some(w) = self.writer.as_mut() {
            w.write(iv)?;
        }
        Ok(())
    }

    fn finish(
        mut self,
        output: Option<&Path>,
        manifest: RunManifest,
    ) -> Result<(), CliError> {
        if let Some(w) = self.writer.as_mut() {
            w.flush()?;
        }
        if let Some(dir) = output {
            let manifest = RunManifest {
                tiers: self.tiers,
                ..manifest
            }
            .stamped();
            manifest.write_to(dir)?;
            println!("results written to {}", dir.display());
        }
        Ok(())
    }
}

fn print_progress(iv: &Interval) {
    if iv.t > 0 && iv.t % 100 == 0 {
        println!(
            "t={}: estimate={:.4}, [{:.4}, {:.4}], tier={}",
            iv.t,
            iv.estimate,
            iv.lo,
            iv.hi,
            iv.tier.as_str()
        );
    }
}

fn print_final(iv: &Interval, alpha: f64) {
    println!("\nfinal result at t={}:", iv.t);
    println!("  estimate: {:.4}", iv.estimate);
    println!(
        "  {:.0}% CI: [{:.4}, {:.4}] (width {:.4})",
        (1.0 - alpha) * 100.0,
        iv.lo,
        iv.hi,
        iv.width()
    );
    println!("  tier: {}", iv.tier.as_str());
    let d = &iv.diagnostics;
    println!(
        "  diagnostics: missing={}, out_of_range={}, clipped={}, drift={}",
        d.missing_count, d.out_of_range_count, d.clipped_count, d.drift_detected
    );
    for note in &d.notes {
        println!("  note: {note}");
    }
}

fn run_mean(config: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let cfg = RunConfig::load(config)?;
    let spec = cfg.stream_spec()?;
    let method = resolve_one_sample(&cfg, &spec)?;

    let mut cs: Box<dyn ConfidenceSequence> = match method {
        Method::HoeffdingCS => Box::new(HoeffdingCS::new(spec.clone())?),
        Method::EmpiricalBernsteinCS => Box::new(EmpiricalBernsteinCS::new(spec.clone())?),
        Method::BernoulliMixtureCS => Box::new(BernoulliMixtureCS::new(spec.clone())?),
        other => {
            return Err(CliError::Config(format!(
                "{} is not a one-sample method",
                other.as_str()
            )))
        }
    };

    let values = read_value_column(&cfg.input, &cfg.column)
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut out = RunOutput::create(output)?;
    for x in values {
        cs.update(x)?;
        let iv = cs.interval();
        out.record(&iv)?;
        print_progress(&iv);
    }

    let iv = cs.interval();
    print_final(&iv, spec.alpha);
    out.finish(
        output,
        RunManifest {
            name: spec.name.clone(),
            method: method.as_str().to_string(),
            alpha: spec.alpha,
            kind: spec.kind,
            support: spec.support,
            clip_mode: spec.clip_mode,
            scenario: None,
            seed: None,
            tiers: Vec::new(),
            created_unix: 0,
        },
    )
}

fn run_abtest(config: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let cfg = RunConfig::load(config)?;
    let spec = cfg.ab_spec()?;
    let method = resolve_two_sample(&cfg, &spec)?;

    let rows = read_arm_value_columns(&cfg.input, &cfg.arm_column, &cfg.column)
        .map_err(|e| CliError::Config(e.to_string()))?;

    let mut out = RunOutput::create(output)?;
    let final_iv = match method {
        Method::TwoSampleHoeffdingCS => {
            let mut cs = TwoSampleHoeffdingCS::new(spec.clone())?;
            for (arm, x) in rows {
                cs.update(arm, x)?;
                let iv = cs.interval();
                out.record(&iv)?;
                print_progress(&iv);
            }
            cs.interval()
        }
        Method::TwoSampleEmpiricalBernsteinCS => {
            let mut cs = TwoSampleEmpiricalBernsteinCS::new(spec.clone())?;
            for (arm, x) in rows {
                cs.update(arm, x)?;
                let iv = cs.interval();
                out.record(&iv)?;
                print_progress(&iv);
            }
            cs.interval()
        }
        other => {
            return Err(CliError::Config(format!(
                "{} is not a two-sample method",
                other.as_str()
            )))
        }
    };

    print_final(&final_iv, spec.alpha);
    out.finish(
        output,
        RunManifest {
            name: spec.name.clone(),
            method: method.as_str().to_string(),
            alpha: spec.alpha,
            kind: spec.kind,
            support: spec.support,
            clip_mode: spec.clip_mode,
            scenario: None,
            seed: None,
            tiers: Vec::new(),
            created_unix: 0,
        },
    )
}
