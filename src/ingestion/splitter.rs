use crate::error::{IngestError, Result};

/// Splits `ids` into consecutive chunks of `batch_size`; only the last chunk may be shorter.
///
/// Concatenating the chunks in order gives back `ids`.
pub fn split_batches(ids: &[u64], batch_size: usize) -> Result<Vec<Vec<u64>>> {
    if ids.is_empty() {
        return Err(IngestError::InvalidInput("ids must not be empty".to_string()));
    }
    if batch_size < 1 {
        return Err(IngestError::InvalidInput(
            "batch size must be at least 1".to_string(),
        ));
    }

    Ok(ids.chunks(batch_size).map(<[u64]>::to_vec).collect())
}
