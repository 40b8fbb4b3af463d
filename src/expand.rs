//! Diagnostic expansion: rewriting the failing source line with the values
//! that were captured when the fault was raised.
//!
//! ```text
//!     check!(total == expected, total, expected)?;
//!     check!(41 == 42, 41, 42)?;
//! ```
//!
//! Expansion is best-effort. Missing source, a line number past the end of
//! the file, or a line that cannot be tokenized all yield `None`; the fault
//! itself is always reported regardless.

use crate::fault::{Binding, Fault, Location};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// The original (dedented) line and its substituted counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub original: String,
    pub expanded: String,
}

impl Expansion {
    /// Worth printing only when something was substituted.
    pub fn is_informative(&self) -> bool {
        self.original != self.expanded
    }
}

/// Expands the line where `fault` was raised.
pub fn expand(fault: &Fault) -> Option<Expansion> {
    let location = fault.location()?;
    let line = source_line(location)?;
    expand_line(&line, fault.bindings())
}

/// Expands a single source line against `bindings`.
pub fn expand_line(line: &str, bindings: &[Binding]) -> Option<Expansion> {
    let original = line.trim().to_string();
    let tokens = tokenize(&original)?;

    let mut expanded = String::with_capacity(original.len());
    for (i, token) in tokens.iter().enumerate() {
        let substitute = match token.class {
            TokenClass::Ident if !is_invoked(&tokens, i) && !is_member(&tokens, i) => {
                bindings.iter().find(|b| b.name == token.text)
            }
            _ => None,
        };
        match substitute {
            Some(binding) => expanded.push_str(&binding.value),
            None => expanded.push_str(token.text),
        }
    }

    Some(Expansion { original, expanded })
}

// =============================================================================
// SOURCE RETRIEVAL
// =============================================================================

fn source_line(location: &Location) -> Option<String> {
    let path = resolve(&location.file)?;
    let text = fs::read_to_string(path).ok()?;
    let index = usize::try_from(location.line.checked_sub(1)?).ok()?;
    text.lines().nth(index).map(str::to_owned)
}

/// `file!()` paths are relative to the directory cargo compiled from, which
/// for a workspace member is the workspace root, not the member directory.
fn resolve(file: &str) -> Option<PathBuf> {
    let direct = Path::new(file);
    if direct.is_file() {
        return Some(direct.to_path_buf());
    }
    let manifest_dir = std::env::var_os("CARGO_MANIFEST_DIR")?;
    resolve_under(file, Path::new(&manifest_dir))
}

/// Joins `file` to `base` and each of its ancestors until one exists.
fn resolve_under(file: &str, base: &Path) -> Option<PathBuf> {
    base.ancestors()
        .map(|dir| dir.join(file))
        .find(|candidate| candidate.is_file())
}

// =============================================================================
// TOKENIZER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Space,
    Ident,
    Literal,
    Punct,
}

#[derive(Debug)]
struct Token<'a> {
    class: TokenClass,
    text: &'a str,
}

static TOKEN: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r#"(?x)^(?:
            (?P<space>\s+)
          | (?P<literal>
                b?r\#"(?:[^"]|"[^\#])*"\#
              | b?r"[^"]*"
              | b?"(?:[^"\\]|\\.)*"
              | b?'(?:[^'\\]|\\.)'
              | '[A-Za-z_][A-Za-z0-9_]*
              | [0-9][0-9A-Za-z_]*(?:\.[0-9][0-9A-Za-z_]*)?
            )
          | (?P<ident>[A-Za-z_][A-Za-z0-9_]*)
          | (?P<punct>::|->|=>|==|!=|<=|>=|&&|\|\||[^\sA-Za-z0-9_"'])
        )"#,
    )
    .ok()
});

/// Splits a line into tokens, keeping whitespace so the line can be rebuilt.
/// Returns `None` when some part of the line is not a token (for example an
/// unterminated string literal).
fn tokenize(line: &str) -> Option<Vec<Token<'_>>> {
    let pattern = TOKEN.as_ref()?;
    let mut tokens = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let caps = pattern.captures(rest)?;
        let (class, m) = if let Some(m) = caps.name("space") {
            (TokenClass::Space, m)
        } else if let Some(m) = caps.name("literal") {
            (TokenClass::Literal, m)
        } else if let Some(m) = caps.name("ident") {
            (TokenClass::Ident, m)
        } else {
            (TokenClass::Punct, caps.name("punct")?)
        };
        tokens.push(Token {
            class,
            text: m.as_str(),
        });
        rest = &rest[m.end()..];
    }
    Some(tokens)
}

fn neighbour<'t, 'a>(
    tokens: &'t [Token<'a>],
    mut indices: impl Iterator<Item = usize>,
) -> Option<&'t Token<'a>> {
    indices.find_map(|i| tokens.get(i).filter(|t| t.class != TokenClass::Space))
}

/// Followed by `(`, `!` or `::`: a call, a macro or a path, left as written.
fn is_invoked(tokens: &[Token<'_>], i: usize) -> bool {
    matches!(neighbour(tokens, i + 1..tokens.len()), Some(t) if t.text == "(" || t.text == "!" || t.text == "::")
}

/// Preceded by `.` or `::`: a field, method or path segment.
fn is_member(tokens: &[Token<'_>], i: usize) -> bool {
    matches!(neighbour(tokens, (0..i).rev()), Some(t) if t.text == "." || t.text == "::")
}
