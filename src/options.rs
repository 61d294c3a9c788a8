//! Command-line options for the certifying checker binary, following
//! `spec.md §6`'s core CLI contract.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;

use crate::quantifier::QuantifierCaps;

/// A certifying checker for model-checking witnesses expressed as
/// and-inverter graphs.
#[derive(Parser, Debug)]
#[command(name = "certifaiger", version, about)]
pub struct CliOptions {
    /// The model circuit, in AIGER ASCII (`.aag`) or binary (`.aig`) format.
    pub model: PathBuf,

    /// The witness circuit, in the same format conventions as `model`.
    pub witness: PathBuf,

    /// Output paths for the emitted obligations, in the default order
    /// (`reset`, `transition`, `property`, `base`, `step`, then one pair
    /// per justice property if the model declares any). Omitted trailing
    /// paths fall back to `spec.md §6`'s default filenames.
    pub checks: Vec<PathBuf>,

    /// Raises quantifier caps. Bare `--qbf` raises every obligation's cap
    /// to 2 (unbounded); `--qbf reset=1 property=2` raises only the named
    /// obligations.
    #[arg(long, num_args = 0.., value_name = "OBLIGATION=LEVEL")]
    pub qbf: Option<Vec<QuantifierCapArg>>,

    /// Minimum severity of log messages printed to standard error.
    #[arg(long, short = 't', default_value = "info")]
    pub trace: TraceLevel,
}

impl CliOptions {
    /// Resolves `--qbf` into the caps consumed by the quantifier planner.
    pub fn quantifier_caps(&self) -> QuantifierCaps {
        match &self.qbf {
            None => QuantifierCaps::default(),
            Some(args) if args.is_empty() => QuantifierCaps {
                reset: Some(2),
                transition: Some(2),
                property: Some(2),
                step: Some(2),
            },
            Some(args) => {
                let mut caps = QuantifierCaps::default();
                for arg in args {
                    match arg.obligation.as_str() {
                        "reset" => caps.reset = Some(arg.level),
                        "transition" => caps.transition = Some(arg.level),
                        "property" => caps.property = Some(arg.level),
                        "step" => caps.step = Some(arg.level),
                        other => {
                            log::warn!("ignoring unknown --qbf obligation '{other}'");
                        }
                    }
                }
                caps
            }
        }
    }
}

/// One `OBLIGATION=LEVEL` entry of `--qbf`.
#[derive(Debug, Clone)]
pub struct QuantifierCapArg {
    pub obligation: String,
    pub level: u8,
}

impl FromStr for QuantifierCapArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (obligation, level) = s
            .split_once('=')
            .ok_or_else(|| format!("expected OBLIGATION=LEVEL, got '{s}'"))?;
        let level: u8 = level
            .parse()
            .map_err(|_| format!("expected an integer quantifier level, got '{level}'"))?;
        Ok(Self {
            obligation: obligation.to_string(),
            level,
        })
    }
}

/// The trace verbosity selected by `--trace`/`-t`, feeding
/// [`log::LevelFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TraceLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TraceLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Off => log::LevelFilter::Off,
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}
