/// Normalizes one raw source line: strips the `;` comment, leading spaces,
/// redundant whitespace and non-printable characters. An empty result means
/// the line carries no token. Idempotent.
pub fn clean_line(raw: &str) -> String {
    let truncated = match raw.find(';') {
        Some(i) => &raw[..i],
        None => raw,
    };

    let mut buf: Vec<char> = truncated.chars().collect();
    let mut i = 0;
    while i < buf.len() {
        let c = buf[i];
        let prev = if i > 0 { Some(buf[i - 1]) } else { None };
        let next = buf.get(i + 1).copied();

        if i == 0 && c == ' ' {
            buf.remove(0);
            continue;
        }
        if c == ',' && next == Some(' ') {
            buf.remove(i + 1);
            continue;
        }
        if c == ' ' && prev == Some(' ') {
            buf.remove(i);
            continue;
        }
        if c == ' ' && (next == Some('=') || prev == Some('=')) {
            buf.remove(i);
            continue;
        }
        // penultimate position
        if c == ' ' && i + 2 == buf.len() {
            buf.remove(i);
            continue;
        }
        if !is_human_char(c) {
            buf.remove(i);
            continue;
        }
        i += 1;
    }

    // a truncated trailing comment can leave one final space behind
    while buf.last() == Some(&' ') {
        buf.pop();
    }

    buf.into_iter().collect()
}

fn is_human_char(c: char) -> bool {
    ('\u{20}'..='\u{82}').contains(&c)
}
