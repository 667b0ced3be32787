// Job trace cleanup.
// GitLab traces carry ANSI colours, collapsible section markers, and \r rewrites.

/// Turn a raw job trace into plain display text.
pub fn clean_trace(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let mut lines = Vec::new();

    for raw_line in text.split('\n') {
        let had_marker = find_marker(raw_line).is_some();
        // Progress output rewrites the line with \r; only the last rewrite is visible.
        let line = raw_line
            .trim_end_matches('\r')
            .rsplit('\r')
            .next()
            .unwrap_or_default();
        let line = strip_ansi(&strip_section_markers(line));
        if had_marker && line.trim().is_empty() {
            continue;
        }
        lines.push(line);
    }

    // A trailing newline leaves one empty element behind
    if lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Remove `section_start:<ts>:<name>` / `section_end:<ts>:<name>` markers.
fn strip_section_markers(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;

    while let Some(pos) = find_marker(rest) {
        out.push_str(&rest[..pos]);
        let marker = &rest[pos..];
        // marker runs up to the ANSI erase-line sequence that GitLab appends
        rest = match marker.find('\x1b') {
            Some(end) => &marker[end..],
            None => "",
        };
    }
    out.push_str(rest);
    out
}

fn find_marker(s: &str) -> Option<usize> {
    match (s.find("section_start:"), s.find("section_end:")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Drop ANSI CSI escape sequences (`ESC [ ... final-byte`).
fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '\x1b' {
            out.push(ch);
            continue;
        }
        if chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        }
    }
    out
}
