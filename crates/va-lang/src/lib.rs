//! Language Parsers: extract symbols, imports, and uses from source
//! files. What's contractual is the index shape and lookup semantics, not
//! the extraction technique, so TS/JS is parsed with a line-oriented
//! regex scanner rather than a full AST — the same textual-analysis
//! trade-off that keeps these scans lightweight.

mod python;
mod typescript;

use va_core::index::{Import, Language, Symbol, Use};

pub struct ParseOutput {
    pub symbols: Vec<Symbol>,
    pub imports: Vec<Import>,
    pub uses: Vec<Use>,
}

/// Parse `content` (the file at `path`) according to `language`. Unknown
/// languages and languages with no parser yield an empty result (the
/// scanner records a files-only summary for those).
pub fn parse(path: &str, language: Language, content: &str) -> ParseOutput {
    match language {
        Language::Typescript | Language::Javascript => typescript::parse(path, language, content),
        Language::Python => python::parse(path, content),
        Language::Unknown => ParseOutput {
            symbols: Vec::new(),
            imports: Vec::new(),
            uses: Vec::new(),
        },
    }
}
