use anyhow::{bail, Result};
use rand::Rng;

/// Draw the 1-based data-row indices to exclude so that exactly
/// `n_samples` rows survive the second pass.
///
/// Returns an empty set when the file already fits within the sample
/// size. Indices are distinct, drawn uniformly without replacement from
/// `[1, row_count]`, and returned in ascending order so the reader can
/// apply them with a single cursor walk.
pub fn skip_indices<R: Rng + ?Sized>(
    row_count: u64,
    n_samples: usize,
    rng: &mut R,
) -> Result<Vec<u64>> {
    if n_samples == 0 {
        bail!("n_samples must be positive");
    }
    if row_count <= n_samples as u64 {
        return Ok(Vec::new());
    }

    let rows_to_skip = row_count - n_samples as u64;
    // Cannot happen given the branch above; invariant kept explicit.
    if rows_to_skip > row_count {
        bail!(
            "cannot skip {} distinct rows out of {}",
            rows_to_skip,
            row_count
        );
    }

    let mut indices: Vec<u64> = rand::seq::index::sample(rng, row_count as usize, rows_to_skip as usize)
        .into_iter()
        .map(|i| i as u64 + 1)
        .collect();
    indices.sort_unstable();
    Ok(indices)
}
