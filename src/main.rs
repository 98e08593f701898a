use anyhow::Result;
use arrow::record_batch::RecordBatch;
use loansample::{
    combine::{concat_tables, write_csv},
    sample::{sample_csv, SampleConfig},
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

static ACCEPTED_CSV: &str = "raw_data/accepted_2007_to_2018Q4.csv";
static REJECTED_CSV: &str = "raw_data/rejected_2007_to_2018Q4.csv";
static COMBINED_CSV: &str = "data/accepted_rejected_loans.csv";

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    // ─── 2) sample each source independently ─────────────────────────
    let config = SampleConfig::default();
    let mut samples: Vec<RecordBatch> = Vec::new();
    for path in [ACCEPTED_CSV, REJECTED_CSV] {
        match sample_csv(path, &config)? {
            Some(batch) => {
                info!(path, rows = batch.num_rows(), "sampled");
                samples.push(batch);
            }
            // Missing source means no data for that side; skip it.
            None => warn!(path, "missing input, skipping"),
        }
    }

    if samples.is_empty() {
        error!("no input files could be sampled, nothing to write");
        return Ok(());
    }

    // ─── 3) combine and persist ──────────────────────────────────────
    let combined = concat_tables(&samples)?;
    info!(rows = combined.num_rows(), "combined table assembled");

    // A write failure leaves any prior output untouched and is not fatal.
    if let Err(e) = write_csv(&combined, COMBINED_CSV) {
        error!("failed to write {}: {:#}", COMBINED_CSV, e);
    } else {
        info!("process complete");
    }

    Ok(())
}
