//! Report dispatch: corridors from the store, predictions from JSON.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use powersweep_schemas::{PredictionSet, ToolSpec};
use powersweep_space::MetricSpace;
use powersweep_store::ResultStore;

pub fn run(
    config: &Path,
    input: &Path,
    predictions: &Path,
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

    let file = File::open(predictions)
        .with_context(|| format!("opening {}", predictions.display()))?;
    let predictions: PredictionSet = serde_json::from_reader(BufReader::new(file))
        .context("parsing predictions")?;

    let stdout = std::io::stdout();
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(&path)
                .with_context(|| format!("creating {}", path.display()))?,
        )),
        None => Box::new(stdout.lock()),
    };
    powersweep_report::write_report(&store, &predictions, &layout, writer)
        .context("writing report")?;
    Ok(())
}
