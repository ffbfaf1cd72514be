//! Argument file expansion
//!
//! `-f <path>` pairs anywhere in the argument list are replaced by the
//! contents of the named file: shell-style words with `#` comments,
//! token-expanded, and recursively re-scanned for nested `-f`
//! references. Expansion happens before any other argument handling, so
//! a bad chain never reaches a subcommand.

use std::path::Path;
use std::sync::OnceLock;

use colored::Colorize;
use regex::{Captures, Regex};

use peakrdl_schema::paths;

use crate::error::{CliError, Result};

/// Token that expands to the directory of the argument file itself.
pub const THIS_DIR_VAR: &str = "THIS_DIR";

/// Expand every `-f <path>` reference in `argv`, recursively.
///
/// Cycle detection compares the literal path strings currently being
/// expanded, scoped to this call. The same file may be included twice
/// sequentially; including it while it is still open is fatal.
pub fn expand_argfiles(argv: Vec<String>) -> Result<Vec<String>> {
    let mut stack = Vec::new();
    expand(argv, &mut stack)
}

fn expand(argv: Vec<String>, stack: &mut Vec<String>) -> Result<Vec<String>> {
    let mut out = Vec::with_capacity(argv.len());
    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        if arg != "-f" {
            out.push(arg);
            continue;
        }
        let path = iter.next().ok_or(CliError::ArgfileMissingPath)?;
        if stack.contains(&path) {
            return Err(CliError::CircularArgfile { path });
        }
        stack.push(path.clone());
        let words = parse_argfile(&path)?;
        let nested = expand(words, stack)?;
        stack.pop();
        out.extend(nested);
    }
    Ok(out)
}

/// Read one argument file: existence check first, then shell-style word
/// splitting honoring `#` comments, then token expansion.
fn parse_argfile(path: &str) -> Result<Vec<String>> {
    let file = Path::new(path);
    if !file.exists() {
        return Err(CliError::ArgfileNotFound {
            path: path.to_string(),
        });
    }
    let text = std::fs::read_to_string(file).map_err(|e| CliError::Io {
        path: path.to_string(),
        source: e,
    })?;
    let words = shlex::split(&text).ok_or_else(|| CliError::ArgfileSyntax {
        path: path.to_string(),
    })?;
    Ok(expand_tokens(words, file))
}

/// Substitute `$THIS_DIR`, `$NAME` and `${NAME}` in words read from an
/// argument file.
///
/// `$THIS_DIR` takes priority over the environment and resolves to the
/// normalized directory containing `source`. Unset environment
/// variables substitute the empty string with a warning.
pub fn expand_tokens(words: Vec<String>, source: &Path) -> Vec<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\$(\w+|\{[^}]*\})").unwrap());

    let this_dir = paths::absolutize(source.parent().unwrap_or(Path::new(".")))
        .display()
        .to_string();

    words
        .into_iter()
        .map(|word| {
            re.replace_all(&word, |caps: &Captures<'_>| {
                let mut name = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                if let Some(inner) = name.strip_prefix('{').and_then(|n| n.strip_suffix('}')) {
                    name = inner;
                }
                if name == THIS_DIR_VAR {
                    return this_dir.clone();
                }
                match std::env::var(name) {
                    Ok(value) => value,
                    Err(_) => {
                        eprintln!(
                            "{}: environment variable '{name}' is not set",
                            "warning".yellow().bold()
                        );
                        String::new()
                    }
                }
            })
            .into_owned()
        })
        .collect()
}
