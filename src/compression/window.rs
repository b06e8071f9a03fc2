//! Sliding-window match search used by the LZ77 and LZSS codecs.

/// A back reference into the search window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Match {
    /// Distance from the current position back to the start of the match.
    pub offset: usize,
    /// Number of matching bytes; zero when nothing matched.
    pub length: usize,
}

/// Finds the longest prefix of `input[pos..]` that occurs entirely inside the
/// `window_size` bytes preceding `pos`.
///
/// The match is bounded by `max_length` and by the end of the input. It never extends
/// into the lookahead itself. Among equally long candidates the rightmost (most recent)
/// one wins, which keeps offsets small.
pub(crate) fn longest_match(
    input: &[u8],
    pos: usize,
    window_size: usize,
    max_length: usize,
) -> Match {
    let search_start = pos.saturating_sub(window_size);
    let limit = max_length.min(input.len() - pos);
    let mut best = Match::default();

    // Scan from the most recent byte backwards so the first longest match found is
    // the rightmost one.
    for j in (search_start..pos).rev() {
        let mut length = 0;
        // Compare input[j..] with input[pos..] until mismatch, the end of the window
        // or the lookahead limit.
        while length < limit && j + length < pos && input[j + length] == input[pos + length] {
            length += 1;
        }
        if length > best.length {
            best = Match {
                offset: pos - j,
                length,
            };
            if length == limit {
                break;
            }
        }
    }
    best
}
