//! Sweep orchestration: enumerate, measure, persist.
//!
//! The driver enumerates the cartesian product of the tool's axis
//! domains and hands each rendered command to the sampler, strictly
//! sequentially, since overlapping runs would corrupt the shared energy
//! counters and side-channel files. An interrupt is honored between
//! repetitions and between sweep points: partial results are flushed to
//! the same output file a full sweep would produce, cleanup runs the
//! same way, and the process exits successfully because the operator
//! asked for the stop.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use powersweep_sampler::{EnergyProbe, Sampler};
use powersweep_schemas::ToolSpec;
use powersweep_space::MetricSpace;
use powersweep_store::ResultStore;
use tracing::{info, warn};

pub fn run(
    config: &std::path::Path,
    output: Option<PathBuf>,
    repetitions: Option<u32>,
    capture_dir: Option<PathBuf>,
) -> Result<()> {
    let spec = ToolSpec::load(config)
        .with_context(|| format!("loading tool description {}", config.display()))?;
    let repetitions = repetitions.unwrap_or(spec.repetitions);

    // Fatal precondition: the energy interface must be readable before
    // any measurement starts. This is a configuration error, not a
    // per-run retry target.
    let probe = EnergyProbe::open_default()
        .context("energy-counter interface unavailable")?;

    let cancel = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .context("installing interrupt handler")?;

    let mut sampler = Sampler::new(probe, spec.events.clone(), cancel.clone());
    if let Some(dir) = &capture_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating {}", dir.display()))?;
        sampler = sampler
            .with_capture(dir, &spec.name)
            .context("opening capture files")?;
    }

    let points = spec.sweep_points();
    info!(
        tool = spec.name,
        points = points.len(),
        repetitions,
        "starting sweep"
    );

    let mut store = ResultStore::new();
    let mut interrupted = false;
    for tuple in &points {
        if cancel.load(Ordering::SeqCst) {
            interrupted = true;
            break;
        }
        let command = spec.render_command(tuple);
        info!(point = %tuple, "sweeping");
        let outcome = sampler
            .run(&command, repetitions)
            .with_context(|| format!("measuring {tuple}"))?;
        for record in outcome.observations {
            store.append(tuple, record);
        }
        if outcome.interrupted {
            interrupted = true;
            break;
        }
    }

    let confidence = sampler.confidence();
    if confidence < 100.0 {
        warn!(
            confidence,
            "profiler multiplexed counters; counter metrics are extrapolated"
        );
    }

    let path = output.unwrap_or_else(|| PathBuf::from(format!("{}.res", spec.name)));
    let space = MetricSpace::new(&spec.axes);
    let file = File::create(&path)
        .with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    store
        .write_to(&space, &mut writer)
        .with_context(|| format!("writing {}", path.display()))?;

    if interrupted {
        info!(
            points = store.len(),
            "sweep interrupted; partial results flushed"
        );
    } else {
        info!(
            points = store.len(),
            repetitions = store.repetition_count(),
            output = %path.display(),
            "sweep complete"
        );
    }
    Ok(())
}
