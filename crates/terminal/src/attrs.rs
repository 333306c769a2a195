//! Cell styling: the extended model's colors and boolean attributes.
//!
//! The minimal model in spec.md treats SGR as a no-op; this crate always
//! tracks pen state (the spec permits this: "implementer MAY track
//! per-cell attributes") and `render::render_ascii` simply ignores it.

/// One of the 8 basic ANSI colors, the bright variants, or the default pen color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Color {
    #[default]
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    Indexed(u8),
}

impl Color {
    /// SGR parameter for this color as a foreground code, or `None` for default.
    pub fn sgr_fg(self) -> Option<u16> {
        sgr_code(self, 30, 90)
    }

    /// SGR parameter for this color as a background code, or `None` for default.
    pub fn sgr_bg(self) -> Option<u16> {
        sgr_code(self, 40, 100)
    }
}

fn sgr_code(c: Color, base: u16, bright_base: u16) -> Option<u16> {
    use Color::*;
    match c {
        Default => None,
        Black => Some(base),
        Red => Some(base + 1),
        Green => Some(base + 2),
        Yellow => Some(base + 3),
        Blue => Some(base + 4),
        Magenta => Some(base + 5),
        Cyan => Some(base + 6),
        White => Some(base + 7),
        BrightBlack => Some(bright_base),
        BrightRed => Some(bright_base + 1),
        BrightGreen => Some(bright_base + 2),
        BrightYellow => Some(bright_base + 3),
        BrightBlue => Some(bright_base + 4),
        BrightMagenta => Some(bright_base + 5),
        BrightCyan => Some(bright_base + 6),
        BrightWhite => Some(bright_base + 7),
        Indexed(_) => None, // 256-color palette is not round-tripped through basic SGR
    }
}

/// Boolean text attributes toggled by SGR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Attrs {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub reverse: bool,
    pub blink: bool,
}

/// The "current pen": style applied to the next printed character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attrs,
}

impl Pen {
    pub fn reset(&mut self) {
        *self = Pen::default();
    }

    /// Apply one SGR parameter (already split on `;`).
    pub fn apply_sgr_param(&mut self, param: u16) {
        match param {
            0 => self.reset(),
            1 => self.attrs.bold = true,
            3 => self.attrs.italic = true,
            4 => self.attrs.underline = true,
            5 | 6 => self.attrs.blink = true,
            7 => self.attrs.reverse = true,
            9 => self.attrs.strikethrough = true,
            22 => self.attrs.bold = false,
            23 => self.attrs.italic = false,
            24 => self.attrs.underline = false,
            25 => self.attrs.blink = false,
            27 => self.attrs.reverse = false,
            29 => self.attrs.strikethrough = false,
            30..=37 => self.fg = basic_color(param - 30),
            39 => self.fg = Color::Default,
            40..=47 => self.bg = basic_color(param - 40),
            49 => self.bg = Color::Default,
            90..=97 => self.fg = bright_color(param - 90),
            100..=107 => self.bg = bright_color(param - 100),
            _ => {} // 256-color / truecolor sub-sequences (38/48;5;n or ;2;r;g;b) are parsed
                    // as separate params by the caller's consumer and not specially handled here
        }
    }
}

fn basic_color(idx: u16) -> Color {
    use Color::*;
    [Black, Red, Green, Yellow, Blue, Magenta, Cyan, White][idx as usize % 8]
}

fn bright_color(idx: u16) -> Color {
    use Color::*;
    [
        BrightBlack,
        BrightRed,
        BrightGreen,
        BrightYellow,
        BrightBlue,
        BrightMagenta,
        BrightCyan,
        BrightWhite,
    ][idx as usize % 8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sgr_reset_clears_everything() {
        let mut pen = Pen::default();
        pen.apply_sgr_param(1);
        pen.apply_sgr_param(31);
        pen.apply_sgr_param(0);
        assert_eq!(pen, Pen::default());
    }

    #[test]
    fn fg_and_bg_are_independent() {
        let mut pen = Pen::default();
        pen.apply_sgr_param(32);
        pen.apply_sgr_param(44);
        assert_eq!(pen.fg, Color::Green);
        assert_eq!(pen.bg, Color::Blue);
    }
}
