use anyhow::{bail, Context, Result};
use arrow::{
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema, SchemaRef},
    record_batch::RecordBatch,
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor},
    path::Path,
    sync::Arc,
};
use tracing::{debug, warn};

/// Second pass: re-scan the file, keeping the header plus every data row
/// whose 1-based index is absent from `skip`, and parse the survivors
/// into an Arrow table.
///
/// `skip` must be ascending (as produced by `skip_indices`); membership
/// is a single cursor walk over it, not a per-row scan. Skipped lines
/// are dropped without decoding, so the buffered text stays proportional
/// to the sample size rather than the file size.
pub fn read_sampled<P: AsRef<Path>>(
    path: P,
    skip: &[u64],
    row_count: u64,
) -> Result<RecordBatch> {
    let path = path.as_ref();
    if let Some(&last) = skip.last() {
        if last > row_count {
            bail!(
                "skip index {} is out of range for {} data rows",
                last,
                row_count
            );
        }
    }

    let file = File::open(path)
        .with_context(|| format!("failed to reopen {} for the sampling pass", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut raw = Vec::new();
    let n = reader
        .read_until(b'\n', &mut raw)
        .with_context(|| format!("read error in {}", path.display()))?;
    if n == 0 {
        bail!("{} is empty, expected a header row", path.display());
    }

    let mut text = String::new();
    push_lossy_line(&mut text, &raw);

    let mut kept: u64 = 0;
    let mut row: u64 = 0;
    let mut cursor = 0usize;
    loop {
        raw.clear();
        let n = reader
            .read_until(b'\n', &mut raw)
            .with_context(|| format!("read error in {}", path.display()))?;
        if n == 0 {
            break;
        }
        row += 1;
        if cursor < skip.len() && skip[cursor] == row {
            cursor += 1;
            continue;
        }
        push_lossy_line(&mut text, &raw);
        kept += 1;
    }

    debug!(path = %path.display(), kept, skipped = skip.len(), "filtered rows");
    parse_table(&text, kept)
}

/// Append one raw record to the sample buffer, replacing malformed byte
/// sequences and normalizing the line ending. Same tolerance policy as
/// the counting pass, so both passes agree on row boundaries.
fn push_lossy_line(out: &mut String, raw: &[u8]) {
    let line = String::from_utf8_lossy(raw);
    out.push_str(line.trim_end_matches(|c| c == '\n' || c == '\r'));
    out.push('\n');
}

/// Parse the buffered sample into a typed batch. Column types are
/// inferred from content; if typed parsing fails, every column degrades
/// to text instead of aborting.
fn parse_table(csv_text: &str, data_rows: u64) -> Result<RecordBatch> {
    let format = Format::default().with_header(true);
    let schema = match format.infer_schema(Cursor::new(csv_text.as_bytes()), None) {
        Ok((schema, _)) => Arc::new(schema),
        Err(e) => {
            warn!(error = %e, "schema inference failed, treating all columns as text");
            text_schema(csv_text)
        }
    };

    match read_with_schema(csv_text, schema, data_rows) {
        Ok(batch) => Ok(batch),
        Err(e) => {
            warn!(error = %e, "typed parse failed, retrying all columns as text");
            read_with_schema(csv_text, text_schema(csv_text), data_rows)
        }
    }
}

fn read_with_schema(
    csv_text: &str,
    schema: SchemaRef,
    data_rows: u64,
) -> Result<RecordBatch> {
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(data_rows.max(1) as usize)
        .build(Cursor::new(csv_text.as_bytes()))
        .context("creating CSV reader")?;

    let batches = reader
        .collect::<Result<Vec<_>, _>>()
        .context("parsing sampled rows")?;
    if batches.is_empty() {
        return Ok(RecordBatch::new_empty(schema));
    }
    arrow::compute::concat_batches(&schema, &batches).context("assembling sample table")
}

/// All-Utf8 fallback schema built from the header line.
fn text_schema(csv_text: &str) -> SchemaRef {
    let header = csv_text.lines().next().unwrap_or_default();
    let fields: Vec<Field> = header
        .split(',')
        .map(|name| Field::new(clean_str(name), DataType::Utf8, true))
        .collect();
    Arc::new(Schema::new(fields))
}

/// Trim whitespace and strip outer quotes if present.
fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}
