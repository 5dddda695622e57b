//! TS/JS symbol/import/use extraction.

use std::collections::HashSet;

use regex::Regex;
use va_core::index::{Import, Language, Symbol, SymbolKind, Use};

use crate::ParseOutput;

fn declaration_regexes() -> Vec<(Regex, SymbolKind)> {
    vec![
        (
            Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:async\s+)?function\s*\*?\s+([A-Za-z_$][\w$]*)").unwrap(),
            SymbolKind::Function,
        ),
        (
            Regex::new(r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)").unwrap(),
            SymbolKind::Class,
        ),
        (
            Regex::new(r"^\s*(?:export\s+)?interface\s+([A-Za-z_$][\w$]*)").unwrap(),
            SymbolKind::Interface,
        ),
        (
            Regex::new(r"^\s*(?:export\s+)?type\s+([A-Za-z_$][\w$]*)").unwrap(),
            SymbolKind::Type,
        ),
        (
            Regex::new(r"^\s*(?:export\s+)?(?:const\s+)?enum\s+([A-Za-z_$][\w$]*)").unwrap(),
            SymbolKind::Enum,
        ),
    ]
}

fn variable_regex() -> Regex {
    Regex::new(r"^\s*(?:export\s+)?(const|let|var)\s+([A-Za-z_$][\w$]*)").unwrap()
}

fn import_regex() -> Regex {
    Regex::new(r#"^\s*import\s+(.+?)\s+from\s+['"]([^'"]+)['"]"#).unwrap()
}

fn side_effect_import_regex() -> Regex {
    Regex::new(r#"^\s*import\s+['"]([^'"]+)['"]"#).unwrap()
}

fn identifier_regex() -> Regex {
    Regex::new(r"[A-Za-z_$][\w$]*").unwrap()
}

pub fn parse(path: &str, language: Language, content: &str) -> ParseOutput {
    let decl_regexes = declaration_regexes();
    let var_re = variable_regex();
    let import_re = import_regex();
    let side_effect_re = side_effect_import_regex();
    let ident_re = identifier_regex();

    let mut symbols = Vec::new();
    let mut imports = Vec::new();
    let mut declared: HashSet<String> = HashSet::new();

    for (line_no, line) in content.lines().enumerate() {
        let line_number = line_no + 1;
        let exported = line.trim_start().starts_with("export");

        let mut matched_decl = false;
        for (re, kind) in &decl_regexes {
            if let Some(caps) = re.captures(line) {
                let name = caps[1].to_string();
                declared.insert(name.clone());
                symbols.push(Symbol {
                    name,
                    kind: *kind,
                    path: path.to_string(),
                    line: line_number,
                    language,
                    exported,
                });
                matched_decl = true;
                break;
            }
        }
        if matched_decl {
            continue;
        }

        if let Some(caps) = var_re.captures(line) {
            let name = caps[2].to_string();
            declared.insert(name.clone());
            symbols.push(Symbol {
                name,
                kind: SymbolKind::Variable,
                path: path.to_string(),
                line: line_number,
                language,
                exported,
            });
            continue;
        }

        if let Some(caps) = import_re.captures(line) {
            let clause = caps[1].trim();
            let source = caps[2].to_string();
            let imported = parse_import_clause(clause);
            for name in &imported {
                declared.insert(import_binding_name(name));
            }
            imports.push(Import {
                path: path.to_string(),
                line: line_number,
                language,
                source,
                imported,
            });
            continue;
        }

        if let Some(caps) = side_effect_re.captures(line) {
            imports.push(Import {
                path: path.to_string(),
                line: line_number,
                language,
                source: caps[1].to_string(),
                imported: Vec::new(),
            });
        }
    }

    // Second pass: uses are every identifier reference not equal to any
    // declared name node in this file, a deliberately generous index.
    let mut uses = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        let line_number = line_no + 1;
        for m in ident_re.find_iter(line) {
            let name = m.as_str();
            if declared.contains(name) || is_ts_keyword(name) {
                continue;
            }
            uses.push(Use {
                name: name.to_string(),
                path: path.to_string(),
                line: line_number,
                language,
            });
        }
    }

    ParseOutput {
        symbols,
        imports,
        uses,
    }
}

/// `{ bar, baz as qux }`, `* as NS`, or a bare default identifier.
fn parse_import_clause(clause: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = clause;

    if let Some(brace_start) = rest.find('{') {
        let (default_part, remainder) = rest.split_at(brace_start);
        for default_name in default_part.trim().trim_end_matches(',').split(',') {
            let default_name = default_name.trim();
            if !default_name.is_empty() {
                names.push(default_name.to_string());
            }
        }
        if let Some(brace_end) = remainder.find('}') {
            let inner = &remainder[1..brace_end];
            for part in inner.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    continue;
                }
                names.push(part.to_string());
            }
        }
        return names;
    }

    if let Some(star_pos) = rest.find('*') {
        let prefix = rest[..star_pos].trim().trim_end_matches(',').trim();
        if !prefix.is_empty() {
            names.push(prefix.to_string());
        }
        let remainder = rest[star_pos..].trim();
        names.push(remainder.to_string());
        return names;
    }

    rest = rest.trim();
    if !rest.is_empty() {
        names.push(rest.to_string());
    }
    names
}

/// Extract the binding identifier from an import specifier (handles
/// `baz as qux` -> `qux`, `* as NS` -> `NS`).
fn import_binding_name(spec: &str) -> String {
    if let Some(idx) = spec.rfind(" as ") {
        spec[idx + 4..].trim().to_string()
    } else {
        spec.trim_start_matches("* as ").trim().to_string()
    }
}

fn is_ts_keyword(word: &str) -> bool {
    matches!(
        word,
        "const"
            | "let"
            | "var"
            | "function"
            | "class"
            | "interface"
            | "type"
            | "enum"
            | "export"
            | "default"
            | "import"
            | "from"
            | "as"
            | "return"
            | "if"
            | "else"
            | "for"
            | "while"
            | "do"
            | "switch"
            | "case"
            | "break"
            | "continue"
            | "new"
            | "this"
            | "super"
            | "extends"
            | "implements"
            | "public"
            | "private"
            | "protected"
            | "static"
            | "readonly"
            | "async"
            | "await"
            | "try"
            | "catch"
            | "finally"
            | "throw"
            | "typeof"
            | "instanceof"
            | "in"
            | "of"
            | "void"
            | "null"
            | "undefined"
            | "true"
            | "false"
            | "abstract"
            | "namespace"
            | "declare"
    )
}
