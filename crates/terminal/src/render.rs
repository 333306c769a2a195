//! Rendering a `Screen` into the two `OUTPUT` formats (spec.md §4.6.1).

use crate::attrs::Pen;
use crate::screen::Screen;

/// Plain-text rendering: rows joined by `\n`, full column width, untrimmed.
///
/// Scenario 1 in spec.md §8 pins this down: `printf 'hello\n'` at 80 columns
/// renders row 0 as `hello` followed by 75 spaces, not a trimmed `hello`.
pub fn render_ascii(screen: &Screen) -> String {
    screen
        .rows_iter()
        .map(|row| row.iter().map(|c| c.ch).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// SGR-annotated rendering: one `ESC[...m` at each run boundary, trailing
/// spaces trimmed per row, reset emitted only if the row ends non-default.
pub fn render_ansi(screen: &Screen) -> String {
    screen
        .rows_iter()
        .map(render_row_ansi)
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_row_ansi(row: &[crate::screen::Cell]) -> String {
    let end = row
        .iter()
        .rposition(|c| c.ch != ' ' || c.pen != Pen::default())
        .map(|i| i + 1)
        .unwrap_or(0);
    if end == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut current = Pen::default();
    let mut styled = false;
    for cell in &row[..end] {
        if cell.pen != current {
            out.push_str(&sgr_sequence(&cell.pen));
            current = cell.pen;
            styled = styled || cell.pen != Pen::default();
        }
        out.push(cell.ch);
    }
    if styled {
        out.push_str("\x1b[0m");
    }
    out
}

fn sgr_sequence(pen: &Pen) -> String {
    let mut codes = Vec::new();
    if pen.attrs.bold {
        codes.push(1);
    }
    if pen.attrs.italic {
        codes.push(3);
    }
    if pen.attrs.underline {
        codes.push(4);
    }
    if pen.attrs.blink {
        codes.push(5);
    }
    if pen.attrs.reverse {
        codes.push(7);
    }
    if pen.attrs.strikethrough {
        codes.push(9);
    }
    if let Some(fg) = pen.fg.sgr_fg() {
        codes.push(fg);
    }
    if let Some(bg) = pen.bg.sgr_bg() {
        codes.push(bg);
    }
    if codes.is_empty() {
        return "\x1b[0m".to_string();
    }
    format!(
        "\x1b[0;{}m",
        codes
            .into_iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(";")
    )
}
