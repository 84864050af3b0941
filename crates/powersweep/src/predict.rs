//! Modeling dispatch: import, split, fit, predict, export.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use powersweep_model::{fit_all, predict_all, split};
use powersweep_schemas::ToolSpec;
use powersweep_space::MetricSpace;
use powersweep_store::ResultStore;
use tracing::info;

pub fn run(
    config: &Path,
    input: &Path,
    training_percentage: u32,
    output: Option<PathBuf>,
) -> Result<()> {
    let spec = ToolSpec::load(config)
        .with_context(|| format!("loading tool description {}", config.display()))?;
    let space = MetricSpace::new(&spec.axes);
    let layout = spec.layout();

    let file = File::open(input)
        .with_context(|| format!("opening {}", input.display()))?;
    let store = ResultStore::read_from(&space, &layout, BufReader::new(file))
        .with_context(|| format!("importing {}", input.display()))?;
    info!(
        points = store.len(),
        repetitions = store.repetition_count(),
        "imported results"
    );

    // A fresh, unseeded partition per modeling run.
    let sets = split(&store, training_percentage, &mut rand::rng())?;
    info!(
        training = sets.training_count(),
        control = sets.control_count(),
        training_percentage,
        "split results"
    );

    let models = fit_all(&space, spec.encoding, &layout, &sets.training)?;
    info!(
        fitted = models.fitted_count(),
        failed = models.failed().count(),
        "trained per-metric models"
    );

    let predictions =
        predict_all(&space, spec.encoding, &models, &sets.control)?;

    // Lock stdout once up front rather than on each write call.
    let stdout = std::io::stdout();
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout.lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &predictions)
        .context("writing predictions")?;
    writeln!(writer)?;
    Ok(())
}
