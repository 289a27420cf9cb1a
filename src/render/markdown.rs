// src/render/markdown.rs
// =============================================================================
// Small helpers that produce Markdown snippets.
//
// Each helper returns a String; the document builder pushes them into a Vec
// and joins everything with newlines at the end. Most snippets start with a
// "\n" so that joining them leaves a blank line in front of headers and
// rules.
// =============================================================================

/// A header. Levels 1 and 2 use the underlined (setext) style, deeper levels
/// use `#` marks. `link` adds an HTML anchor in front of the text.
pub fn header(text: &str, level: usize, link: Option<&str>) -> String {
    let anchor = match link {
        Some(name) => format!("<a name=\"{}\"></a>", name),
        None => String::new(),
    };

    // Underlines match the visible length of the text
    let width = text.chars().count();
    match level {
        1 => format!("\n{}{}\n{}", anchor, text, "=".repeat(width)),
        2 => format!("\n{}{}\n{}", anchor, text, "-".repeat(width)),
        _ => format!("\n{} {}{}", "#".repeat(level), anchor, text),
    }
}

/// Splits on every Unicode line boundary, not just `\n` and `\r\n`.
///
/// Bodies pasted from other tools can carry a lone `\r`, form feeds or
/// U+2028; each of those starts a new line too. A trailing break does not
/// produce an empty last line, the same as `str::lines`.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((index, c)) = chars.next() {
        if !is_line_break(c) {
            continue;
        }
        lines.push(&text[start..index]);
        start = index + c.len_utf8();

        // \r\n counts as one break
        if c == '\r' {
            if let Some(&(next, '\n')) = chars.peek() {
                chars.next();
                start = next + 1;
            }
        }
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// A paragraph: every line trimmed, with a trailing newline.
pub fn paragraph(text: &str) -> String {
    let mut out = split_lines(text).into_iter().map(str::trim).collect::<Vec<_>>().join("\n");
    out.push('\n');
    out
}

pub fn rule() -> String {
    "\n---".to_string()
}

/// Prefixes every (trimmed) line with `> `.
pub fn blockquote(text: &str) -> String {
    split_lines(text)
        .into_iter()
        .map(|line| format!("> {}", line.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}
