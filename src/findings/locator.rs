//! Containment of an external finding's source range in a method span.

use crate::core::Position;

/// Whether a finding at `position` (1-based column pair) and `lines`
/// (1-based line pair) falls inside `span`.
///
/// A single-line finding is contained when its line lies strictly inside the
/// span, or sits on the span's first or last line with its column range
/// inside the span's column bounds. A multi-line finding is contained when
/// the span covers its whole line range; the boundary branch accepts equality
/// on either edge line but checks columns on the start edge only.
pub fn finding_within_method(
    position: (usize, usize),
    lines: (usize, usize),
    span: &Position,
) -> bool {
    let (col_start, col_end) = position;
    let (line_start, line_end) = lines;

    if line_start == line_end {
        if span.start_line < line_start && span.end_line > line_start {
            return true;
        }
        if (span.start_line == line_start || span.end_line == line_start)
            && span.start_column <= col_start
            && span.end_column >= col_end
        {
            return true;
        }
    } else {
        if span.start_line <= line_start && span.end_line >= line_end {
            return true;
        }
        if (span.start_line == line_start || span.end_line == line_end)
            && span.start_line == line_start
            && span.start_column <= col_start
        {
            return true;
        }
    }
    false
}
