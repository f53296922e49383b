/// Console formatting module - Pure rendering concerns
///
/// This module renders uploaded report tables as a bordered preview:
/// - Column widths sized to content and clamped to the terminal
/// - Text truncation and padding that respect wide Unicode characters
///
/// It writes to any `std::io::Write` destination, so the same code renders to
/// stdout or to a string buffer in tests.
use std::io::{self, Write};
use terminal_size::{Width, terminal_size};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Narrowest a column is squeezed to before the table simply overflows
pub const MIN_COLUMN_WIDTH: usize = 6;

/// Get terminal width or default to 120
pub fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() { w as usize } else { 120 }
}

/// Writer for preview tables
pub struct TableWriter<W: Write> {
    writer: W,
    terminal_width: usize,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W, terminal_width: usize) -> Self {
        Self { writer, terminal_width }
    }

    /// Write the header row plus up to `max_rows` data rows
    pub fn write_preview(&mut self, title: &str, rows: &[Vec<String>], max_rows: usize) -> io::Result<()> {
        let Some((header, data)) = rows.split_first() else {
            return Ok(());
        };
        let shown = &data[..data.len().min(max_rows)];
        let widths = column_widths(header, shown, self.terminal_width);

        writeln!(self.writer, "{} ({} rows)", title, data.len())?;
        self.write_border(&widths, '┌', '┬', '┐')?;
        self.write_row(header, &widths)?;
        self.write_border(&widths, '├', '┼', '┤')?;
        for row in shown {
            self.write_row(row, &widths)?;
        }
        self.write_border(&widths, '└', '┴', '┘')?;

        if shown.len() < data.len() {
            writeln!(self.writer, "... {} more rows", data.len() - shown.len())?;
        }
        Ok(())
    }

    fn write_border(&mut self, widths: &[usize], left: char, mid: char, right: char) -> io::Result<()> {
        let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
        let separator = mid.to_string();
        writeln!(self.writer, "{}{}{}", left, segments.join(separator.as_str()), right)
    }

    fn write_row(&mut self, row: &[String], widths: &[usize]) -> io::Result<()> {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(i, w)| truncate_with_padding(row.get(i).map_or("", |s| single_line(s)), *w))
            .collect();
        writeln!(self.writer, "│ {} │", cells.join(" │ "))
    }
}

/// First line of a cell; previews never wrap
fn single_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}

/// Per-column widths: content width, shrunk evenly when the table is wider than the terminal
pub fn column_widths(header: &[String], rows: &[Vec<String>], terminal_width: usize) -> Vec<usize> {
    let mut widths: Vec<usize> = header.iter().map(|h| display_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(widths.len()) {
            widths[i] = widths[i].max(display_width(single_line(cell)));
        }
    }

    // Each column costs its width plus "│ " and " " of borders
    let overhead = widths.len() * 3 + 1;
    let available = terminal_width.saturating_sub(overhead);
    let mut total: usize = widths.iter().sum();

    while total > available {
        let Some((widest, &width)) = widths.iter().enumerate().max_by_key(|(_, w)| **w) else {
            break;
        };
        if width <= MIN_COLUMN_WIDTH {
            break;
        }
        widths[widest] = width - 1;
        total -= 1;
    }

    widths
}

/// Print a preview to stdout
pub fn print_preview(title: &str, rows: &[Vec<String>], max_rows: usize) {
    let mut writer = TableWriter::new(io::stdout(), get_terminal_width());
    let _ = writer.write_preview(title, rows, max_rows);
}

//
// Text Formatting Utilities
//

/// Count the display width of a string, accounting for wide Unicode characters
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate or pad `s` to exactly `width` display columns
pub fn truncate_with_padding(s: &str, width: usize) -> String {
    let display_w = display_width(s);

    if display_w > width {
        let mut result = String::new();
        let mut current_width = 0;

        // Reserve space for "..."
        let target_width = if width >= 3 { width - 3 } else { width };

        for c in s.chars() {
            let c_width = UnicodeWidthChar::width(c).unwrap_or(1);
            if current_width + c_width > target_width {
                break;
            }
            result.push(c);
            current_width += c_width;
        }

        if width >= 3 {
            result.push_str("...");
            current_width += 3;
        }

        if current_width < width {
            result.push_str(&" ".repeat(width - current_width));
        }

        result
    } else {
        format!("{}{}", s, " ".repeat(width - display_w))
    }
}

#[cfg(test)]
#[path = "console_format_test.rs"]
mod console_format_test;
