//! Fence-aware splitting of rendered text into bounded message segments.
//!
//! Surfaces cap message length (2000 chars on the default config). Rendered
//! frames routinely exceed that, so a frame is cut into segments at line
//! boundaries. A triple-backtick fence that would be left open at a segment
//! boundary is closed before the cut and reopened at the start of the next
//! segment, so every segment stays valid markdown on its own.

/// Markdown code-fence marker.
const FENCE: &str = "```";

/// Smallest workable ceiling: a closing and a reopening marker plus a
/// couple of content bytes. Below this the reopened fence alone would
/// overflow the segment.
const MIN_CEILING: usize = 2 * FENCE.len() + 2;

/// Whether `text` ends inside an open code fence.
///
/// Counts fence markers; an odd count means the last fence was opened and
/// never closed. Indented and inline fences are counted the same way, which
/// matches how the common surfaces themselves parse them.
#[must_use]
pub fn fence_open(text: &str) -> bool {
    !text.matches(FENCE).count().is_multiple_of(2)
}

/// Close the trailing fence of a segment if it was left open.
///
/// Segments produced mid-stream can end inside a code block that the model
/// has not finished yet; sealing keeps the posted message readable. The
/// splitter reserves room for this, so sealing never pushes a segment past
/// the ceiling it was split under.
#[must_use]
pub fn seal_fences(segment: &str) -> String {
    if fence_open(segment) {
        format!("{segment}{FENCE}")
    } else {
        segment.to_string()
    }
}

/// Split `text` into segments of at most `max_len` characters.
///
/// Cuts happen at line boundaries; the newline separating two segments is
/// consumed, so joining the segments with `"\n"` (after stripping the
/// inserted fence markers) reproduces the input. A single line longer than
/// the budget is hard-split at a char boundary as a last resort.
///
/// Whenever a segment would end inside an open fence, the marker width is
/// reserved out of its budget, so the closing marker always fits and no
/// segment exceeds `max_len` even after auto-closing. A `max_len` below
/// [`MIN_CEILING`] is raised to it; fence bookkeeping needs that much
/// headroom in every segment.
#[must_use]
pub fn split_message(text: &str, max_len: usize) -> Vec<String> {
    let max_len = max_len.max(MIN_CEILING);
    let mut segments: Vec<String> = Vec::new();
    let mut current = String::new();
    // Set right after a cut reopened a fence: the line that overflowed is
    // glued straight onto the reopening marker, without a newline.
    let mut just_reopened = false;

    for line in text.split('\n') {
        let mut rest = line;
        loop {
            let sep = usize::from(!current.is_empty() && !just_reopened);
            // Reserve closing-marker room based on the fence state the
            // segment would have after taking this line, so a line that
            // itself opens a fence is charged for its own close.
            let open_after = fence_open(&current) != fence_open(rest);
            let reserve = if open_after { FENCE.len() } else { 0 };

            if current.len() + sep + rest.len() + reserve <= max_len {
                if sep == 1 {
                    current.push('\n');
                }
                current.push_str(rest);
                just_reopened = false;
                break;
            }

            if current.is_empty() || just_reopened {
                // The line alone overflows a fresh segment: hard-split it.
                // A cut piece may end in any fence state, so the marker
                // width is always held back.
                let room = max_len
                    .saturating_sub(FENCE.len())
                    .saturating_sub(current.len());
                let mut cut = floor_char_boundary(rest, room);
                if cut == 0 {
                    cut = rest.chars().next().map_or(0, char::len_utf8);
                }
                if cut == 0 {
                    break;
                }
                current.push_str(&rest[..cut]);
                rest = &rest[cut..];
                just_reopened = flush(&mut segments, &mut current);
                continue;
            }

            just_reopened = flush(&mut segments, &mut current);
        }
    }

    segments.push(current);
    segments
}

/// Push `current` as a finished segment, closing an open fence first and
/// reopening it in the next segment. Returns whether a fence was reopened.
fn flush(segments: &mut Vec<String>, current: &mut String) -> bool {
    let reopen = fence_open(current);
    if reopen {
        current.push_str(FENCE);
    }
    segments.push(std::mem::take(current));
    if reopen {
        current.push_str(FENCE);
    }
    reopen
}

/// Largest byte index `<= index` that lands on a char boundary of `s`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    let mut i = index;
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}
