pub mod calls;
pub mod java;
pub mod span;

pub use calls::{CallExtractor, LexicalCallExtractor};
pub use java::{parse_java_file, parse_java_files};
pub use span::{extract_body, ExtractedSpan, SpanError};
