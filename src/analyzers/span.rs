//! Brace-balancing span extraction.
//!
//! Given the raw lines of a source file and the 1-based position where a
//! declaration's signature begins, locates the matching closing brace by a
//! naive character scan and returns the captured body together with the end
//! position. The scan is not string- or comment-aware; a brace inside a
//! literal counts like any other.

use log::warn;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SpanError {
    #[error("no opening brace found after the declaration at line {line}")]
    NoBracesFound { line: usize },
    #[error("no closing brace found for the declaration at line {line}")]
    UnclosedBrace { line: usize },
}

/// The extracted body of a declaration.
///
/// `body` is `None` for bodiless declarations (abstract or interface
/// members ending in `;` before any `{`). The end line and column are
/// 1-based; for a bodiless declaration the end column is 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractedSpan {
    pub body: Option<Vec<String>>,
    pub end_line: usize,
    pub end_column: usize,
}

impl ExtractedSpan {
    pub fn code(&self) -> String {
        self.body
            .as_ref()
            .map(|lines| lines.join("\n"))
            .unwrap_or_default()
    }
}

fn brace_count(line: &str) -> usize {
    line.matches('{').count() + line.matches('}').count()
}

/// Extract the body of a declaration starting at `start_line:start_column`
/// (both 1-based).
///
/// The signature line is captured truncated at `start_column`; lines strictly
/// between the signature line and a later opening-brace line are not
/// captured; the final line is truncated just after the matching closing
/// brace. A declaration whose line carries a `;` before any `{` is bodiless
/// and yields `body: None` rather than an error.
pub fn extract_body(
    lines: &[&str],
    start_line: usize,
    start_column: usize,
) -> Result<ExtractedSpan, SpanError> {
    let start_idx = start_line - 1;
    if start_idx >= lines.len() {
        return Err(SpanError::NoBracesFound { line: start_line });
    }

    let signature: String = lines[start_idx].chars().skip(start_column - 1).collect();
    let line_at = |idx: usize| -> &str {
        if idx == start_idx {
            signature.as_str()
        } else {
            lines[idx]
        }
    };

    // Advance to the line containing the first brace; a `;` seen first means
    // the declaration has no body.
    let mut cur = start_idx;
    let mut total = brace_count(&signature);
    while total == 0 {
        if line_at(cur).contains(';') {
            warn!("declaration at line {start_line} has no body, skipping");
            return Ok(ExtractedSpan {
                body: None,
                end_line: cur + 1,
                end_column: 0,
            });
        }
        if cur + 1 < lines.len() {
            cur += 1;
        } else {
            break;
        }
        total = brace_count(line_at(cur));
    }

    if cur + 1 == lines.len() && total == 0 {
        return Err(SpanError::NoBracesFound { line: start_line });
    }

    let brace_line: Vec<char> = line_at(cur).chars().collect();
    let open_pos = match brace_line.iter().position(|&c| c == '{') {
        Some(pos) => pos,
        None => return Err(SpanError::NoBracesFound { line: start_line }),
    };

    // When the opening brace sits on a later line, the captured body starts
    // with the truncated signature line; intervening lines are skipped.
    let mut body: Vec<String> = if cur != start_idx {
        vec![signature.clone()]
    } else {
        Vec::new()
    };

    let mut depth = 1usize;
    let mut char_pos = open_pos + 1;
    loop {
        let chars: Vec<char> = line_at(cur).chars().collect();
        while char_pos < chars.len() {
            match chars[char_pos] {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        body.push(chars[..=char_pos].iter().collect());
                        return Ok(ExtractedSpan {
                            body: Some(body),
                            end_line: cur + 1,
                            end_column: char_pos + 1,
                        });
                    }
                }
                _ => {}
            }
            char_pos += 1;
        }
        body.push(line_at(cur).to_string());
        cur += 1;
        char_pos = 0;
        if cur >= lines.len() {
            return Err(SpanError::UnclosedBrace { line: start_line });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brace_on_signature_line() {
        let source = vec![
            "class Box {",
            "    int add(int a, int b) {",
            "        if (a > 0) { a += 1; }",
            "        return a + b;",
            "    }",
            "}",
        ];
        let span = extract_body(&source, 2, 5).unwrap();
        assert_eq!(
            span.body.as_deref().unwrap(),
            [
                "int add(int a, int b) {",
                "        if (a > 0) { a += 1; }",
                "        return a + b;",
                "    }",
            ]
        );
        assert_eq!((span.end_line, span.end_column), (5, 5));
    }

    #[test]
    fn bodiless_declaration_detected_by_semicolon() {
        let source = vec!["interface Shape {", "    int area();", "}"];
        let span = extract_body(&source, 2, 5).unwrap();
        assert_eq!(span.body, None);
        assert_eq!((span.end_line, span.end_column), (2, 0));
    }

    #[test]
    fn missing_open_brace_is_an_error() {
        let source = vec!["class Box", "    int add(int a, int b)"];
        assert_eq!(
            extract_body(&source, 2, 5),
            Err(SpanError::NoBracesFound { line: 2 })
        );
    }

    #[test]
    fn unclosed_body_is_an_error() {
        let source = vec!["int add(int a, int b) {", "    return a + b;"];
        assert_eq!(
            extract_body(&source, 1, 1),
            Err(SpanError::UnclosedBrace { line: 1 })
        );
    }
}
