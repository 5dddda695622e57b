//! Python symbol/import/use extraction: a deliberately simple
//! line-oriented regex parser.

use std::collections::HashSet;

use regex::Regex;
use va_core::index::{Import, Language, Symbol, SymbolKind, Use};

use crate::ParseOutput;

fn def_regex() -> Regex {
    Regex::new(r"^\s*def\s+([A-Za-z_]\w*)\s*\(").unwrap()
}

fn class_regex() -> Regex {
    Regex::new(r"^\s*class\s+([A-Za-z_]\w*)\s*[:(]").unwrap()
}

fn import_regex() -> Regex {
    Regex::new(r"^\s*import\s+(.+)$").unwrap()
}

fn from_import_regex() -> Regex {
    Regex::new(r"^\s*from\s+(\S+)\s+import\s+(.+)$").unwrap()
}

fn identifier_regex() -> Regex {
    Regex::new(r"[A-Za-z_]\w*").unwrap()
}

pub fn parse(path: &str, content: &str) -> ParseOutput {
    let def_re = def_regex();
    let class_re = class_regex();
    let import_re = import_regex();
    let from_import_re = from_import_regex();
    let ident_re = identifier_regex();

    let mut symbols = Vec::new();
    let mut imports = Vec::new();
    let mut uses = Vec::new();
    let mut declared: HashSet<String> = HashSet::new();

    for (line_no, line) in content.lines().enumerate() {
        let line_number = line_no + 1;

        if let Some(caps) = def_re.captures(line) {
            let name = caps[1].to_string();
            let exported = !name.starts_with('_');
            declared.insert(name.clone());
            symbols.push(Symbol {
                name,
                kind: SymbolKind::Function,
                path: path.to_string(),
                line: line_number,
                language: Language::Python,
                exported,
            });
            continue;
        }

        if let Some(caps) = class_re.captures(line) {
            let name = caps[1].to_string();
            let exported = !name.starts_with('_');
            declared.insert(name.clone());
            symbols.push(Symbol {
                name,
                kind: SymbolKind::Class,
                path: path.to_string(),
                line: line_number,
                language: Language::Python,
                exported,
            });
            continue;
        }

        if let Some(caps) = from_import_re.captures(line) {
            let source = caps[1].to_string();
            let imported = parse_name_list(&caps[2]);
            for name in &imported {
                declared.insert(name.clone());
            }
            imports.push(Import {
                path: path.to_string(),
                line: line_number,
                language: Language::Python,
                source,
                imported,
            });
            continue;
        }

        if let Some(caps) = import_re.captures(line) {
            let spec = &caps[1];
            let imported = parse_name_list(spec);
            for name in &imported {
                declared.insert(name.clone());
            }
            imports.push(Import {
                path: path.to_string(),
                line: line_number,
                language: Language::Python,
                source: spec.split(',').next().unwrap_or(spec).trim().to_string(),
                imported,
            });
            continue;
        }

        for m in ident_re.find_iter(line) {
            let name = m.as_str();
            if is_python_keyword(name) || declared.contains(name) {
                continue;
            }
            uses.push(Use {
                name: name.to_string(),
                path: path.to_string(),
                line: line_number,
                language: Language::Python,
            });
        }
    }

    ParseOutput {
        symbols,
        imports,
        uses,
    }
}

/// `a, b as c` -> `["a", "c"]` (the bound name, not the original).
fn parse_name_list(spec: &str) -> Vec<String> {
    spec.split(',')
        .filter_map(|part| {
            let part = part.trim();
            if part.is_empty() {
                return None;
            }
            if let Some(idx) = part.find(" as ") {
                Some(part[idx + 4..].trim().to_string())
            } else {
                Some(part.to_string())
            }
        })
        .collect()
}

fn is_python_keyword(word: &str) -> bool {
    matches!(
        word,
        "False"
            | "None"
            | "True"
            | "and"
            | "as"
            | "assert"
            | "async"
            | "await"
            | "break"
            | "class"
            | "continue"
            | "def"
            | "del"
            | "elif"
            | "else"
            | "except"
            | "finally"
            | "for"
            | "from"
            | "global"
            | "if"
            | "import"
            | "in"
            | "is"
            | "lambda"
            | "nonlocal"
            | "not"
            | "or"
            | "pass"
            | "raise"
            | "return"
            | "try"
            | "while"
            | "with"
            | "yield"
            | "self"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_public_function() {
        let out = parse("a.py", "def foo():\n    pass\n");
        assert_eq!(out.symbols[0].name, "foo");
        assert!(out.symbols[0].exported);
    }

    #[test]
    fn private_function_is_not_exported() {
        let out = parse("a.py", "def _helper():\n    pass\n");
        assert!(!out.symbols[0].exported);
    }

    #[test]
    fn extracts_class_with_colon_or_paren() {
        let out = parse("a.py", "class Foo:\n    pass\n\nclass Bar(Base):\n    pass\n");
        assert_eq!(out.symbols.len(), 2);
    }

    #[test]
    fn extracts_import_with_alias() {
        let out = parse("a.py", "import numpy as np\n");
        assert_eq!(out.imports[0].imported, vec!["np".to_string()]);
    }

    #[test]
    fn extracts_from_import_with_multiple_names() {
        let out = parse("a.py", "from collections import OrderedDict, defaultdict as dd\n");
        assert_eq!(out.imports[0].source, "collections");
        assert!(out.imports[0].imported.contains(&"OrderedDict".to_string()));
        assert!(out.imports[0].imported.contains(&"dd".to_string()));
    }

    #[test]
    fn uses_exclude_names_declared_earlier_but_not_later() {
        let out = parse("a.py", "print(later_name)\ndef later_name():\n    pass\n");
        // later_name is used before its def line, so it is not yet
        // "declared earlier in the file" at that point.
        assert!(out.uses.iter().any(|u| u.name == "later_name"));
    }

    #[test]
    fn uses_exclude_previously_declared_function_name() {
        let out = parse("a.py", "def foo():\n    pass\nfoo()\n");
        assert!(!out.uses.iter().any(|u| u.name == "foo"));
    }
}
