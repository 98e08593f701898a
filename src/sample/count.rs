use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};
use tracing::debug;

/// Count the data rows in a delimited file (header excluded) by streaming
/// it once without materializing content.
///
/// Records are split on raw `b'\n'` bytes, so lines containing malformed
/// UTF-8 still count. A final line without a trailing newline counts too.
pub fn count_data_rows<P: AsRef<Path>>(path: P) -> Result<u64> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut total: u64 = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read error while counting {}", path.display()))?;
        if n == 0 {
            break;
        }
        total += 1;
    }

    debug!(path = %path.display(), total_lines = total, "counted lines");
    // First line is the header.
    Ok(total.saturating_sub(1))
}
