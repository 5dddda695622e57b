//! Stack-Trace Parser: extracts frames from combined
//! stderr+stdout in the Node and Python dialects, plus the first
//! exception-summary line.

use regex::Regex;
use va_core::index::Language;

const MAX_FRAMES: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub path: String,
    pub line: usize,
    pub column: Option<usize>,
    pub function: Option<String>,
    pub language: Language,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedTrace {
    pub frames: Vec<Frame>,
    pub exception_line: Option<String>,
}

fn node_frame_regex() -> Regex {
    Regex::new(
        r"(?:at\s+(?P<func>[^\s(]+)\s*\()?(?P<path>[^\s():]+\.(?:ts|tsx|js|jsx|mjs|cjs)):(?P<line>\d+):(?P<col>\d+)\)?",
    )
    .unwrap()
}

fn python_frame_regex() -> Regex {
    Regex::new(r#"^\s*File "(?P<path>[^"]+)", line (?P<line>\d+), in (?P<func>.+)$"#).unwrap()
}

/// Parse combined process output for stack frames, capped at
/// [`MAX_FRAMES`], plus the first line that looks like an exception
/// summary.
pub fn parse(combined_output: &str) -> ParsedTrace {
    let node_re = node_frame_regex();
    let python_re = python_frame_regex();

    let mut frames = Vec::new();
    let mut exception_line = None;

    for line in combined_output.lines() {
        if frames.len() < MAX_FRAMES {
            if let Some(caps) = python_re.captures(line) {
                let path = caps["path"].to_string();
                let line_no: usize = caps["line"].parse().unwrap_or(0);
                let function = Some(caps["func"].trim().to_string());
                let language = Language::detect(&path);
                frames.push(Frame {
                    path,
                    line: line_no,
                    column: None,
                    function,
                    language,
                });
            } else {
                for caps in node_re.captures_iter(line) {
                    if frames.len() >= MAX_FRAMES {
                        break;
                    }
                    let path = caps["path"].to_string();
                    let line_no: usize = caps["line"].parse().unwrap_or(0);
                    let col: usize = caps["col"].parse().unwrap_or(0);
                    let function = caps.name("func").map(|m| m.as_str().to_string());
                    let language = Language::detect(&path);
                    frames.push(Frame {
                        path,
                        line: line_no,
                        column: Some(col),
                        function,
                        language,
                    });
                }
            }
        }

        if exception_line.is_none()
            && (line.starts_with("Error:")
                || line.starts_with("Traceback")
                || line.contains("Exception"))
        {
            exception_line = Some(line.to_string());
        }
    }

    ParsedTrace {
        frames,
        exception_line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_style_frame_with_function() {
        let out = "    at renderApp (src/app.tsx:42:17)\n";
        let trace = parse(out);
        assert_eq!(trace.frames.len(), 1);
        assert_eq!(trace.frames[0].path, "src/app.tsx");
        assert_eq!(trace.frames[0].line, 42);
        assert_eq!(trace.frames[0].column, Some(17));
        assert_eq!(trace.frames[0].function.as_deref(), Some("renderApp"));
        assert_eq!(trace.frames[0].language, Language::Typescript);
    }

    #[test]
    fn parses_node_style_frame_without_function() {
        let out = "src/index.js:10:2\n";
        let trace = parse(out);
        assert_eq!(trace.frames[0].path, "src/index.js");
        assert!(trace.frames[0].function.is_none());
    }

    #[test]
    fn parses_python_style_frame() {
        let out = "  File \"app/main.py\", line 88, in run\n";
        let trace = parse(out);
        assert_eq!(trace.frames.len(), 1);
        assert_eq!(trace.frames[0].path, "app/main.py");
        assert_eq!(trace.frames[0].line, 88);
        assert_eq!(trace.frames[0].function.as_deref(), Some("run"));
        assert_eq!(trace.frames[0].language, Language::Python);
    }

    #[test]
    fn captures_first_exception_summary_line() {
        let out = "Traceback (most recent call last):\n  File \"a.py\", line 1, in <module>\nValueError: boom\n";
        let trace = parse(out);
        assert_eq!(trace.exception_line.as_deref(), Some("Traceback (most recent call last):"));
    }

    #[test]
    fn captures_error_colon_prefix() {
        let out = "Error: something broke\n    at main (a.js:1:1)\n";
        let trace = parse(out);
        assert_eq!(trace.exception_line.as_deref(), Some("Error: something broke"));
    }

    #[test]
    fn caps_at_twenty_frames() {
        let mut out = String::new();
        for i in 0..30 {
            out.push_str(&format!("    at f{i} (a.js:{i}:1)\n"));
        }
        let trace = parse(&out);
        assert_eq!(trace.frames.len(), MAX_FRAMES);
    }

    #[test]
    fn no_frames_or_exception_in_clean_output() {
        let trace = parse("all tests passed\n");
        assert!(trace.frames.is_empty());
        assert!(trace.exception_line.is_none());
    }
}
