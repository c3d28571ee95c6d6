/// Default window size, in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 2048;

/// Split `text` into consecutive, non-overlapping windows of `chunk_size`
/// characters. The last window may be shorter; empty text yields no windows.
///
/// Sizes count `char`s, so windows never split a multi-byte character.
/// `chunk_size` must be non-zero ([`crate::Config::validate`] enforces this);
/// a zero size is treated as 1.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<&str> {
    let chunk_size = chunk_size.max(1);
    let mut chunks = Vec::with_capacity(text.len() / chunk_size + 1);
    let mut start = 0;
    let mut count = 0;

    for (idx, _) in text.char_indices() {
        if count == chunk_size {
            chunks.push(&text[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if count > 0 {
        chunks.push(&text[start..]);
    }

    chunks
}
