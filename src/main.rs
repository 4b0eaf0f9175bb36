use anyhow::{Context, Result};
use std::{
    env,
    fs::{File, OpenOptions},
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};
use tripcheck::{
    config::Config,
    process::{FileAnomaly, Pipeline},
    validate::{Fanout, MemorySink, TracingSink, Validator},
};

/// stderr at `RUST_LOG` (default info), plus ERROR entries appended to
/// `log_file` when one is configured.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr = fmt::layer().with_writer(std::io::stderr).with_filter(env);

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("opening log file {:?}", path))?;
            Some(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(false)
                    .with_filter(LevelFilter::ERROR),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(stderr)
        .with(file_layer)
        .try_init()
        .context("installing tracing subscriber")
}

fn main() -> Result<()> {
    // ─── 1) config ───────────────────────────────────────────────────
    let config = Config::resolve(env::args().nth(1))?;

    // ─── 2) init logging ─────────────────────────────────────────────
    init_logging(config.log_file.as_deref())?;
    info!(
        categories = config.categories.len(),
        parallel = config.parallel,
        "startup"
    );

    // ─── 3) run every category ───────────────────────────────────────
    let collected = Arc::new(MemorySink::new());
    let sink = Fanout::new()
        .with(Arc::new(TracingSink))
        .with(collected.clone());
    let validator = Validator::new(Arc::new(sink)).with_null_fill(config.null_fill);
    let handoff = config.handoff();
    let summary_file = config.summary_file.clone();
    let mut summary = Pipeline::new(config, validator, handoff).run()?;
    summary.anomaly_log = collected
        .entries()
        .into_iter()
        .map(|(file, anomaly)| FileAnomaly { file, anomaly })
        .collect();

    // ─── 4) report ───────────────────────────────────────────────────
    for c in &summary.categories {
        match &c.skipped {
            Some(reason) => println!("{:<6} skipped: {}", c.category, reason),
            None => println!(
                "{:<6} files={:<4} validated={:<4} failed={:<4} anomalies={}",
                c.category, c.files_seen, c.validated, c.failed, c.anomalies
            ),
        }
    }
    if let Some(path) = summary_file {
        let file =
            File::create(&path).with_context(|| format!("creating summary file {:?}", path))?;
        serde_json::to_writer_pretty(file, &summary).context("writing run summary")?;
        info!("wrote summary to {}", path.display());
    }

    info!(
        failed = summary.files_failed(),
        anomalies = summary.anomalies(),
        "all done"
    );
    Ok(())
}
