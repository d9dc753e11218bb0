use ropey::Rope;

/// Clamp a replacement span to a text of `len` chars. Missing bounds default
/// to the whole text; the end is clamped first so `start <= end` always holds.
pub fn clamp_span(start: Option<usize>, end: Option<usize>, len: usize) -> (usize, usize) {
    let end = end.unwrap_or(len).min(len);
    let start = start.unwrap_or(0).min(end);
    (start, end)
}

pub fn clamp_offset(offset: usize, rope: &Rope) -> usize {
    offset.min(rope.len_chars())
}

/// Char right after `offset`, if any.
pub fn char_at(rope: &Rope, offset: usize) -> Option<char> {
    rope.get_char(offset)
}

/// Chars that can belong to a single call chain such as `Object.Behavior::Name`.
fn is_node_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':')
}

/// Start of the call chain ending at `offset`: right after the last char
/// before `offset` that cannot be part of a chain, or 0 when there is none.
pub fn node_start_before(rope: &Rope, offset: usize) -> usize {
    let offset = clamp_offset(offset, rope);
    let mut chars = rope.chars_at(offset);
    let mut position = offset;
    while let Some(c) = chars.prev() {
        if !is_node_char(c) {
            return position;
        }
        position -= 1;
    }
    0
}
