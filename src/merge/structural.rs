//! Structural merge strategies for source files with a recognizable skeleton
//!
//! `merge-routes` splices entries into the first top-level array literal of
//! the existing file (e.g. an exported route table); `merge-config` splices
//! key-value entries into the first top-level object literal (e.g. an
//! exported configuration object). The file around the skeleton is left
//! untouched, so imports, comments and trailing exports survive the merge.
//!
//! The scanner is bracket-and-string aware (single, double and backtick
//! quotes, line and block comments) but deliberately not a full parser: the
//! skeleton is located, entries are spliced in before the closing bracket,
//! and entries already present verbatim are skipped so repeated application
//! is stable.

use std::path::Path;

use crate::error::{Error, Result};

/// Splice incoming entries into the existing file's first top-level
/// array literal.
pub fn merge_array(path: &Path, existing: Option<&str>, incoming: &str) -> Result<String> {
    merge_skeleton(path, existing, incoming, '[', ']', "merge-routes", "array")
}

/// Splice incoming entries into the existing file's first top-level
/// object literal.
pub fn merge_object(path: &Path, existing: Option<&str>, incoming: &str) -> Result<String> {
    merge_skeleton(path, existing, incoming, '{', '}', "merge-config", "object")
}

fn merge_skeleton(
    path: &Path,
    existing: Option<&str>,
    incoming: &str,
    open: char,
    close: char,
    strategy: &str,
    kind: &str,
) -> Result<String> {
    let Some(existing) = existing else {
        // First contribution establishes the skeleton.
        return Ok(incoming.to_string());
    };

    let (body_start, body_end) = find_skeleton(existing, open, close).ok_or_else(|| {
        Error::Merge {
            path: path.to_path_buf(),
            strategy: strategy.to_string(),
            message: format!("no {} literal found to merge into", kind),
        }
    })?;

    // Entries come from the incoming file's own skeleton when it has one,
    // otherwise the whole incoming text is one entry.
    let entries: Vec<String> = match find_skeleton(incoming, open, close) {
        Some((start, end)) => split_entries(&incoming[start..end]),
        None => {
            let trimmed = incoming.trim();
            if trimmed.is_empty() {
                Vec::new()
            } else {
                vec![trimmed.to_string()]
            }
        }
    };

    let body = &existing[body_start..body_end];
    let present: Vec<String> = split_entries(body);
    let new_entries: Vec<&String> = entries
        .iter()
        .filter(|e| !present.iter().any(|p| p == *e))
        .collect();
    if new_entries.is_empty() {
        return Ok(existing.to_string());
    }

    let indent = entry_indent(existing, body_start, body_end);
    let mut spliced = String::with_capacity(existing.len() + incoming.len());
    spliced.push_str(&existing[..body_end]);
    while spliced.ends_with([' ', '\t', '\n', '\r']) {
        spliced.pop();
    }
    // Separate from the last existing entry.
    if !body.trim().is_empty() && !spliced.ends_with(',') {
        spliced.push(',');
    }
    for entry in new_entries {
        spliced.push('\n');
        spliced.push_str(&indent);
        spliced.push_str(entry);
        spliced.push(',');
    }
    spliced.push('\n');
    // Closing bracket back at its own indentation.
    let close_indent = line_indent(existing, body_end);
    spliced.push_str(&close_indent);
    spliced.push_str(&existing[body_end..]);
    Ok(spliced)
}

/// Locate the first top-level literal of the given bracket kind, returning
/// the span of its interior (exclusive of the brackets).
fn find_skeleton(source: &str, open: char, close: char) -> Option<(usize, usize)> {
    let mut scanner = Scanner::new(source);
    let start = loop {
        let (idx, ch) = scanner.next_code_char()?;
        if ch == open {
            break idx + ch.len_utf8();
        }
    };

    let mut depth = 1usize;
    loop {
        let (idx, ch) = scanner.next_code_char()?;
        if ch == open {
            depth += 1;
        } else if ch == close {
            depth -= 1;
            if depth == 0 {
                return Some((start, idx));
            }
        }
    }
}

/// Split a literal body into top-level entries, trimming whitespace and
/// dropping a trailing empty entry from a dangling comma.
fn split_entries(body: &str) -> Vec<String> {
    let mut entries = Vec::new();
    let mut current_start = 0usize;
    let mut depth = 0usize;
    let mut scanner = Scanner::new(body);

    while let Some((idx, ch)) = scanner.next_code_char() {
        match ch {
            '[' | '{' | '(' => depth += 1,
            ']' | '}' | ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                let entry = body[current_start..idx].trim();
                if !entry.is_empty() {
                    entries.push(entry.to_string());
                }
                current_start = idx + 1;
            }
            _ => {}
        }
    }
    let tail = body[current_start..].trim();
    if !tail.is_empty() {
        entries.push(tail.to_string());
    }
    entries
}

/// Indentation for spliced entries: taken from the first existing entry
/// line, falling back to the closing bracket's indent plus two spaces.
fn entry_indent(source: &str, body_start: usize, body_end: usize) -> String {
    for line in source[body_start..body_end].lines() {
        if !line.trim().is_empty() {
            let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            if !indent.is_empty() {
                return indent;
            }
        }
    }
    format!("{}  ", line_indent(source, body_end))
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(source: &str, pos: usize) -> String {
    let line_start = source[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0);
    source[line_start..pos]
        .chars()
        .take_while(|c| c.is_whitespace())
        .collect()
}

/// Character iterator that skips string literals and comments, yielding only
/// code characters with their byte offsets.
struct Scanner<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
}

impl<'a> Scanner<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
        }
    }

    fn next_code_char(&mut self) -> Option<(usize, char)> {
        loop {
            let (idx, ch) = self.chars.next()?;
            match ch {
                '"' | '\'' | '`' => {
                    self.skip_string(ch);
                }
                '/' => match self.chars.peek() {
                    Some((_, '/')) => {
                        self.chars.next();
                        self.skip_while(|c| c != '\n');
                    }
                    Some((_, '*')) => {
                        self.chars.next();
                        self.skip_block_comment();
                    }
                    _ => return Some((idx, ch)),
                },
                _ => return Some((idx, ch)),
            }
        }
    }

    fn skip_string(&mut self, quote: char) {
        while let Some((_, ch)) = self.chars.next() {
            match ch {
                '\\' => {
                    self.chars.next();
                }
                c if c == quote => return,
                _ => {}
            }
        }
    }

    fn skip_while(&mut self, keep_skipping: impl Fn(char) -> bool) {
        while let Some(&(_, ch)) = self.chars.peek() {
            if !keep_skipping(ch) {
                return;
            }
            self.chars.next();
        }
    }

    fn skip_block_comment(&mut self) {
        while let Some((_, ch)) = self.chars.next() {
            if ch == '*' {
                if let Some(&(_, '/')) = self.chars.peek() {
                    self.chars.next();
                    return;
                }
            }
        }
    }
}
