//! Call-token extraction from method bodies.
//!
//! The default extractor is lexical: it scans each `;`-separated segment of a
//! body for identifiers followed by an opening parenthesis with a matching
//! close on the same line, excluding control-flow keywords. This
//! over-approximates real calls and counts constructor invocations as call
//! tokens.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref CALL_PATTERN: Regex = Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\s*\(").unwrap();
}

/// Keywords that read like calls but are not.
const CONTROL_FLOW_KEYWORDS: &[&str] = &["if", "for", "while", "switch", "try", "catch", "sealed"];

/// Strategy for extracting unqualified call-like tokens from a method body.
pub trait CallExtractor {
    fn extract_calls(&self, body: &str) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct LexicalCallExtractor;

impl LexicalCallExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl CallExtractor for LexicalCallExtractor {
    fn extract_calls(&self, body: &str) -> Vec<String> {
        let mut calls = Vec::new();
        for segment in body.split(';') {
            for caps in CALL_PATTERN.captures_iter(segment) {
                let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                    continue;
                };
                // The close paren must appear on the same line as the open.
                let after_open = &segment[whole.end()..];
                let line_tail = after_open.split('\n').next().unwrap_or("");
                if !line_tail.contains(')') {
                    continue;
                }
                if CONTROL_FLOW_KEYWORDS.contains(&name.as_str()) {
                    continue;
                }
                calls.push(name.as_str().to_string());
            }
        }
        calls
    }
}
