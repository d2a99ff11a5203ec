//! Crossterm output backend.
//!
//! [`Driver`] is the [`RenderSink`] for a real terminal: each span becomes a
//! cursor move followed by SGR-styled text. Styles are only re-emitted when
//! they change between neighbouring cells. Colour strings are parsed here,
//! as named colours or `#rrggbb` / `#rgb` hex.

use std::io::{self, BufWriter, Stdout, Write};

use crossterm::{
    cursor, execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};

use super::renderer::RenderSink;
use super::strip::{CellStyle, StyledCell};

// ---------------------------------------------------------------------------
// Byte counting
// ---------------------------------------------------------------------------

struct Counted<W> {
    inner: W,
    bytes: usize,
}

impl<W: Write> Write for Counted<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Terminal sink over any writer.
///
/// Creating a driver does not touch the terminal mode; call
/// [`enter_alt_screen`](Driver::enter_alt_screen) explicitly.
pub struct Driver<W: Write = BufWriter<Stdout>> {
    writer: Counted<W>,
}

impl Driver {
    /// A driver writing to buffered stdout.
    pub fn stdout() -> Self {
        Self::new(BufWriter::new(io::stdout()))
    }

    /// Terminal size as (columns, rows).
    pub fn terminal_size() -> io::Result<(u16, u16)> {
        terminal::size()
    }
}

impl<W: Write> Driver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer: Counted { inner: writer, bytes: 0 } }
    }

    /// Total bytes written so far.
    pub fn bytes_written(&self) -> usize {
        self.writer.bytes
    }

    pub fn get_ref(&self) -> &W {
        &self.writer.inner
    }

    pub fn into_inner(self) -> W {
        self.writer.inner
    }

    /// Enter the alternate screen, enable raw mode and hide the cursor.
    pub fn enter_alt_screen(&mut self) -> io::Result<()> {
        execute!(self.writer, EnterAlternateScreen, cursor::Hide)?;
        terminal::enable_raw_mode()
    }

    pub fn set_title(&mut self, title: &str) -> io::Result<()> {
        execute!(self.writer, SetTitle(title))
    }

    /// Undo [`enter_alt_screen`](Driver::enter_alt_screen).
    pub fn leave_alt_screen(&mut self) -> io::Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.writer, cursor::Show, LeaveAlternateScreen)
    }

    fn apply_style(&mut self, style: &CellStyle) -> io::Result<()> {
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        if let Some(color) = style.fg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetForegroundColor(color))?;
        }
        if let Some(color) = style.bg.as_deref().and_then(parse_color) {
            queue!(self.writer, SetBackgroundColor(color))?;
        }
        let attributes = [
            (style.bold, Attribute::Bold),
            (style.dim, Attribute::Dim),
            (style.italic, Attribute::Italic),
            (style.underline, Attribute::Underlined),
            (style.strikethrough, Attribute::CrossedOut),
            (style.reverse, Attribute::Reverse),
        ];
        for (on, attribute) in attributes {
            if on {
                queue!(self.writer, SetAttribute(attribute))?;
            }
        }
        Ok(())
    }
}

impl<W: Write> RenderSink for Driver<W> {
    fn write_span(&mut self, x: u16, y: u16, cells: &[StyledCell]) -> io::Result<usize> {
        let before = self.writer.bytes;
        queue!(self.writer, cursor::MoveTo(x, y))?;
        let mut current: Option<&CellStyle> = None;
        for cell in cells.iter().filter(|cell| !cell.is_continuation()) {
            if current != Some(&cell.style) {
                self.apply_style(&cell.style)?;
                current = Some(&cell.style);
            }
            queue!(self.writer, Print(cell.ch))?;
        }
        queue!(self.writer, SetAttribute(Attribute::Reset), ResetColor)?;
        Ok(self.writer.bytes - before)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

// ---------------------------------------------------------------------------
// Colour parsing
// ---------------------------------------------------------------------------

/// Parse a colour name or hex string. Names are case-insensitive and accept
/// `dark_red` or `darkred` spellings.
pub fn parse_color(text: &str) -> Option<Color> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        return parse_hex(hex);
    }
    let name = text.to_ascii_lowercase().replace('_', "");
    let color = match name.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "grey" | "gray" => Color::Grey,
        "darkred" => Color::DarkRed,
        "darkgreen" => Color::DarkGreen,
        "darkyellow" => Color::DarkYellow,
        "darkblue" => Color::DarkBlue,
        "darkmagenta" => Color::DarkMagenta,
        "darkcyan" => Color::DarkCyan,
        "darkgrey" | "darkgray" => Color::DarkGrey,
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    let channel = |digits: &str| u8::from_str_radix(digits, 16).ok();
    match hex.len() {
        6 => Some(Color::Rgb { r: channel(&hex[0..2])?, g: channel(&hex[2..4])?, b: channel(&hex[4..6])? }),
        3 => {
            let short = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
            Some(Color::Rgb { r: short(0)?, g: short(1)?, b: short(2)? })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::strip::Strip;

    #[test]
    fn hex_colours() {
        assert_eq!(parse_color("#ff8800"), Some(Color::Rgb { r: 255, g: 136, b: 0 }));
        assert_eq!(parse_color("#FF8800"), Some(Color::Rgb { r: 255, g: 136, b: 0 }));
        assert_eq!(parse_color("#abc"), Some(Color::Rgb { r: 0xaa, g: 0xbb, b: 0xcc }));
        assert_eq!(parse_color("#ff00"), None);
        assert_eq!(parse_color("#gghhii"), None);
        assert_eq!(parse_color("#ééé"), None);
    }

    #[test]
    fn named_colours() {
        assert_eq!(parse_color("Red"), Some(Color::Red));
        assert_eq!(parse_color(" dark_grey "), Some(Color::DarkGrey));
        assert_eq!(parse_color("darkblue"), Some(Color::DarkBlue));
        assert_eq!(parse_color("gray"), Some(Color::Grey));
        assert_eq!(parse_color("rainbow"), None);
        assert_eq!(parse_color(""), None);
    }

    #[test]
    fn span_moves_the_cursor_and_prints_text() {
        let mut driver = Driver::new(Vec::new());
        let mut strip = Strip::new();
        strip.push_str("hi", CellStyle::default());
        let bytes = driver.write_span(3, 1, strip.cells()).expect("write");
        let output = String::from_utf8(driver.get_ref().clone()).expect("utf8");

        assert!(output.starts_with("\u{1b}[2;4H"));
        assert!(output.contains("hi"));
        assert_eq!(bytes, output.len());
        assert_eq!(driver.bytes_written(), bytes);
    }

    #[test]
    fn title_is_an_osc_sequence() {
        let mut driver = Driver::new(Vec::new());
        driver.set_title("demo").expect("title");
        let output = String::from_utf8(driver.into_inner()).expect("utf8");
        assert_eq!(output, "\u{1b}]0;demo\u{7}");
    }

    #[test]
    fn continuation_cells_are_not_printed() {
        let mut driver = Driver::new(Vec::new());
        let mut strip = Strip::new();
        strip.push_str("中a", CellStyle::default());
        driver.write_span(0, 0, strip.cells()).expect("write");
        let output = String::from_utf8(driver.into_inner()).expect("utf8");
        assert!(output.contains("中a"));
        assert!(!output.contains('\0'));
    }

    #[test]
    fn style_is_emitted_once_per_run() {
        let red = CellStyle { fg: Some("red".into()), ..CellStyle::default() };
        let mut strip = Strip::new();
        strip.push_str("aaa", red.clone());
        strip.push_str("b", CellStyle::default());
        let mut driver = Driver::new(Vec::new());
        driver.write_span(0, 0, strip.cells()).expect("write");
        let output = String::from_utf8(driver.into_inner()).expect("utf8");
        assert_eq!(output.matches("\u{1b}[38;").count(), 1);
        assert!(output.contains("aaa"));
    }
}
