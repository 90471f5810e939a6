// src/ignore/pattern.rs

use std::fmt;

use globset::{Glob, GlobBuilder};

/// One parsed line of a gitignore-style file.
#[derive(Clone)]
pub struct IgnorePattern {
    original: String,
    glob: Glob,
    negated: bool,
    dir_only: bool,
    anchored: bool,
    /// Position in the owning rule set; later patterns win.
    order: usize,
    /// Where the line came from, e.g. `.gitignore:3`.
    source: String,
}

impl fmt::Debug for IgnorePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IgnorePattern")
            .field("original", &self.original)
            .field("glob", &self.glob.glob())
            .field("negated", &self.negated)
            .field("dir_only", &self.dir_only)
            .field("anchored", &self.anchored)
            .field("source", &self.source)
            .finish()
    }
}

impl IgnorePattern {
    /// Parse one line. Blank lines and comments yield `Ok(None)`.
    ///
    /// `order` is the declaration index, `source` a human-readable origin
    /// used only for diagnostics.
    pub fn parse(line: &str, order: usize, source: &str) -> Result<Option<Self>, globset::Error> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut body = trim_unescaped_trailing_spaces(line);

        let negated = body.starts_with('!');
        if negated {
            body = &body[1..];
        }

        let dir_only = body.ends_with('/');
        if dir_only {
            body = &body[..body.len() - 1];
        }

        if body.is_empty() {
            return Ok(None);
        }

        // A separator at the start or in the middle ties the pattern to the root.
        let anchored = body.contains('/');
        let body = body.strip_prefix('/').unwrap_or(body);
        if body.is_empty() {
            return Ok(None);
        }

        let body = escape_braces(&collapse_inner_double_stars(body));
        let glob_text = if anchored {
            body
        } else {
            format!("**/{body}")
        };

        let glob = GlobBuilder::new(&glob_text)
            .literal_separator(true)
            .backslash_escape(true)
            .build()?;

        Ok(Some(Self {
            original: line.to_string(),
            glob,
            negated,
            dir_only,
            anchored,
            order,
            source: source.to_string(),
        }))
    }

    pub fn original(&self) -> &str {
        &self.original
    }

    pub fn glob(&self) -> &Glob {
        &self.glob
    }

    pub fn is_negated(&self) -> bool {
        self.negated
    }

    pub fn is_dir_only(&self) -> bool {
        self.dir_only
    }

    pub fn is_anchored(&self) -> bool {
        self.anchored
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub(crate) fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Whether this pattern can apply to an entry of the given type.
    pub fn applies_to(&self, is_dir: bool) -> bool {
        is_dir || !self.dir_only
    }

    /// Match against a single root-relative path, ignoring precedence and
    /// ancestors. Mostly useful for diagnostics and tests.
    pub fn matches(&self, rel_path: &str, is_dir: bool) -> bool {
        self.applies_to(is_dir) && self.glob.compile_matcher().is_match(rel_path)
    }
}

/// Trailing spaces are dropped unless escaped with a backslash.
///
/// A space is escaped only by an odd run of backslashes; `foo\\ ` ends in
/// an escaped backslash followed by a plain space.
fn trim_unescaped_trailing_spaces(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        let backslashes = bytes[..end - 1]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 1 {
            break;
        }
        end -= 1;
    }
    &line[..end]
}

/// Git has no `{a,b}` alternation, so braces are plain characters. Escape
/// them for globset, leaving existing escapes and bracket classes alone.
fn escape_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                out.push(ch);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '[' if !in_class => {
                in_class = true;
                out.push(ch);
                // A leading `!`/`^` and a `]` right after the opener are literal.
                if let Some(&neg) = chars.peek() {
                    if neg == '!' || neg == '^' {
                        out.push(neg);
                        chars.next();
                    }
                }
                if chars.peek() == Some(&']') {
                    out.push(']');
                    chars.next();
                }
            }
            ']' if in_class => {
                in_class = false;
                out.push(ch);
            }
            '{' | '}' if !in_class => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}

/// `**` only has its recursive meaning as a whole path component; elsewhere
/// git treats it like a single `*`. globset rejects it outright, so fold it.
fn collapse_inner_double_stars(pattern: &str) -> String {
    pattern
        .split('/')
        .map(|component| {
            if component == "**" || !component.contains("**") {
                return component.to_string();
            }
            let mut out = String::with_capacity(component.len());
            let mut prev_star = false;
            for ch in component.chars() {
                if ch == '*' && prev_star {
                    continue;
                }
                prev_star = ch == '*';
                out.push(ch);
            }
            out
        })
        .collect::<Vec<_>>()
        .join("/")
}
