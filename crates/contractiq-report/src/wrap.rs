//! Greedy word wrapping to a fixed number of character columns.

/// Wrap `text` into lines of at most `columns` characters.
///
/// Each input line is wrapped independently; blank input lines are kept as
/// empty output lines. Words longer than a line are hard-broken. Runs of
/// whitespace collapse to one space. Leading and trailing blank lines are
/// dropped, so empty text yields no lines.
pub fn wrap_text(text: &str, columns: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut out = Vec::new();
    for paragraph in text.trim().lines() {
        if paragraph.trim().is_empty() {
            out.push(String::new());
            continue;
        }
        wrap_paragraph(paragraph, columns, &mut out);
    }
    out
}

fn wrap_paragraph(paragraph: &str, columns: usize, out: &mut Vec<String>) {
    let mut line = String::new();
    let mut line_len = 0usize;

    for word in paragraph.split_whitespace() {
        let word_len = word.chars().count();

        if line_len > 0 && line_len + 1 + word_len <= columns {
            line.push(' ');
            line.push_str(word);
            line_len += 1 + word_len;
            continue;
        }

        if line_len > 0 {
            out.push(std::mem::take(&mut line));
            line_len = 0;
        }

        if word_len <= columns {
            line.push_str(word);
            line_len = word_len;
            continue;
        }

        // Hard-break an over-long word; the tail stays open for more words.
        let chars: Vec<char> = word.chars().collect();
        let mut chunks = chars.chunks(columns).peekable();
        while let Some(chunk) = chunks.next() {
            let piece: String = chunk.iter().collect();
            if chunks.peek().is_some() {
                out.push(piece);
            } else {
                line_len = chunk.len();
                line = piece;
            }
        }
    }

    if line_len > 0 {
        out.push(line);
    }
}
