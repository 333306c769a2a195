//! C-style backslash unescaping for `input`/`--text`, grounded in the
//! Python prototype's `unescape()` (`examples/original_source/interminai.py`).

/// Expand `\n \r \t \a \b \f \v \\ \e \xHH` in `raw`. An unrecognized escape
/// keeps the backslash and the following character verbatim; a trailing lone
/// backslash is kept as-is.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('a') => out.push('\u{07}'),
            Some('b') => out.push('\u{08}'),
            Some('f') => out.push('\u{0C}'),
            Some('v') => out.push('\u{0B}'),
            Some('\\') => out.push('\\'),
            Some('e') => out.push('\u{1B}'),
            Some('x') => {
                let hi = chars.next();
                let lo = chars.next();
                match (hi, lo) {
                    (Some(h), Some(l)) => {
                        let mut byte = String::new();
                        byte.push(h);
                        byte.push(l);
                        match u8::from_str_radix(&byte, 16) {
                            Ok(b) => out.push(b as char),
                            Err(_) => {
                                out.push('\\');
                                out.push('x');
                                out.push(h);
                                out.push(l);
                            }
                        }
                    }
                    (Some(h), None) => {
                        out.push('\\');
                        out.push('x');
                        out.push(h);
                    }
                    (None, _) => {
                        out.push('\\');
                        out.push('x');
                    }
                }
            }
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_common_escapes() {
        assert_eq!(unescape(r"hi\n"), "hi\n");
        assert_eq!(unescape(r"a\tb\r\n"), "a\tb\r\n");
        assert_eq!(unescape(r"\e[2J"), "\u{1B}[2J");
    }

    #[test]
    fn expands_hex_escape() {
        assert_eq!(unescape(r"\x41\x42"), "AB");
    }

    #[test]
    fn leaves_unknown_escape_intact() {
        assert_eq!(unescape(r"\q"), r"\q");
    }

    #[test]
    fn trailing_backslash_is_preserved() {
        assert_eq!(unescape(r"abc\"), r"abc\");
    }

    #[test]
    fn incomplete_hex_escape_is_preserved() {
        assert_eq!(unescape(r"\x4"), r"\x4");
    }
}
