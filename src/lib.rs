//! Certifying checker library crate: verifies a model-checking witness
//! expressed as an and-inverter graph against its model, by emitting a set
//! of combinational proof obligations (`spec.md §1`).

pub mod accessor;
pub mod cone;
pub mod error;
pub mod litmap;
pub mod obligation;
pub mod options;
pub mod predicate;
pub mod quantifier;
pub mod shared;
pub mod stratify;
pub mod unroll;

use std::path::{Path, PathBuf};

use aiger::AigerMode;
use fs_err as fs;
use log::{debug, info};

use accessor::AigView;
use error::{CertError, Result};
use obligation::Obligation;
use quantifier::QuantifierCaps;

/// The default output filenames for the five safety obligations, in the
/// order `spec.md §6` specifies.
pub const DEFAULT_SAFETY_NAMES: [&str; 5] = ["reset", "transition", "property", "base", "step"];

/// Reads an AIG from `path`, detecting ASCII vs. binary from its magic
/// header, per `spec.md §6`.
fn read_aig(path: &Path) -> Result<aiger::Aig> {
    let file = fs::File::open(path).map_err(|e| CertError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    aiger::Aig::read(file).map_err(|e| CertError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Writes an obligation's check AIG to `path`, dispatching on extension
/// the same way [`read_aig`] does.
fn write_aig(path: &Path, aig: &aiger::Aig) -> Result<()> {
    let mode = if path.extension().is_some_and(|ext| ext == "aig") {
        AigerMode::Binary
    } else {
        AigerMode::Ascii
    };
    let mut file = fs::File::create(path).map_err(|e| CertError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    aig.write(&mut file, mode).map_err(|e| CertError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Resolves the output path for obligation index `i` (name `default_name`)
/// from the user-supplied `checks` list, falling back to `<default_name>.aag`.
fn output_path(checks: &[PathBuf], i: usize, default_name: &str) -> PathBuf {
    checks
        .get(i)
        .cloned()
        .unwrap_or_else(|| PathBuf::from(format!("{default_name}.aag")))
}

/// Runs the full core pipeline: reads and validates the model and witness,
/// resolves shared signals, plans quantifier levels, builds every
/// obligation, and writes each to its output path.
///
/// Returns the exit-code bitmask of `spec.md §6` on success.
pub fn run(
    model_path: &Path,
    witness_path: &Path,
    checks: &[PathBuf],
    caps: QuantifierCaps,
) -> Result<i32> {
    info!("reading model from {}", model_path.display());
    let model_aig = read_aig(model_path)?;
    info!("reading witness from {}", witness_path.display());
    let witness_aig = read_aig(witness_path)?;

    let model = AigView::validate(model_path, model_aig)?;
    let witness = AigView::validate(witness_path, witness_aig)?;

    let resolution = shared::resolve(&model.aig, &witness.aig)?;
    debug!(
        "resolved {} shared signals, {} extended, {} intervention pairs",
        resolution.shared.len(),
        resolution.extended.len(),
        resolution.intervention.len()
    );

    let oracle = witness.oracle_inputs();
    debug!("{} oracle inputs", oracle.len());

    let plan = quantifier::plan(&witness, &resolution.extended, &oracle, caps)?;
    debug!(
        "quantifier plan: reset={} transition={} property={} step={}",
        plan.reset, plan.transition, plan.property, plan.step
    );

    let obligations: Vec<Obligation> = obligation::build_all(&model, &witness, &resolution, &plan);

    for (i, obligation) in obligations.iter().enumerate() {
        let path = output_path(checks, i, &obligation.name);
        info!(
            "writing {} (quantifier level {}) to {}",
            obligation.name,
            obligation.quantifier_level,
            path.display()
        );
        write_aig(&path, &obligation.aig)?;
    }

    Ok(plan.exit_bitmask())
}
