use super::canvas::Canvas;
use crate::color::Rgba;
use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor};
use std::io::{self, Write};
use unicode_width::UnicodeWidthChar;

const UPPER_HALF_BLOCK: char = '▀';

/// A terminal cell: what is drawn plus its colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Cell {
    symbol: char,
    foreground: [u8; 4],
    background: [u8; 4],
}

/// Flushes canvases and text overlays to the terminal.
///
/// Every terminal cell shows two vertically stacked canvas pixels. Only cells that changed
/// since the previous frame are written.
pub(crate) struct Painter<W: Write> {
    output: W,
    columns: u16,
    rows: u16,
    current: Vec<Option<Cell>>,
}

impl<W: Write> Painter<W> {
    pub(crate) fn new(output: W, columns: u16, rows: u16) -> Self {
        Self { output, columns, rows, current: vec![None; columns as usize * rows as usize] }
    }

    /// The canvas size in pixels that fills the terminal.
    pub(crate) fn canvas_size(&self) -> (usize, usize) {
        (self.columns as usize, self.rows as usize * 2)
    }

    pub(crate) fn dimensions(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    pub(crate) fn resize(&mut self, columns: u16, rows: u16) {
        self.columns = columns;
        self.rows = rows;
        self.current = vec![None; columns as usize * rows as usize];
    }

    /// Forget what's on screen so the next frame is painted in full.
    pub(crate) fn invalidate(&mut self) {
        self.current.fill(None);
    }

    pub(crate) fn draw_canvas(&mut self, canvas: &Canvas) -> io::Result<()> {
        let columns = (self.columns as usize).min(canvas.width());
        let rows = (self.rows as usize).min(canvas.height() / 2);
        for row in 0..rows {
            for column in 0..columns {
                let cell = Cell {
                    symbol: UPPER_HALF_BLOCK,
                    foreground: canvas.pixel(column, row * 2).to_rgba8(),
                    background: canvas.pixel(column, row * 2 + 1).to_rgba8(),
                };
                self.put(column as u16, row as u16, cell)?;
            }
        }
        Ok(())
    }

    /// Write text starting at the given cell, clipped to the terminal width.
    pub(crate) fn draw_text(&mut self, column: u16, row: u16, text: &str, foreground: Rgba, background: Rgba) -> io::Result<()> {
        let mut column = column;
        for symbol in text.chars() {
            let width = symbol.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if column + width > self.columns {
                break;
            }
            let cell = Cell { symbol, foreground: foreground.to_rgba8(), background: background.to_rgba8() };
            self.put(column, row, cell)?;
            // The cell a wide character spills into must be repainted once it goes away.
            for spill in 1..width {
                self.forget(column + spill, row);
            }
            column += width;
        }
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> io::Result<()> {
        queue!(self.output, ResetColor)?;
        self.output.flush()
    }

    fn put(&mut self, column: u16, row: u16, cell: Cell) -> io::Result<()> {
        let Some(index) = self.index(column, row) else {
            return Ok(());
        };
        if self.current[index] == Some(cell) {
            return Ok(());
        }
        self.current[index] = Some(cell);
        queue!(
            self.output,
            MoveTo(column, row),
            SetForegroundColor(rgb(cell.foreground)),
            SetBackgroundColor(rgb(cell.background)),
            Print(cell.symbol)
        )
    }

    fn forget(&mut self, column: u16, row: u16) {
        if let Some(index) = self.index(column, row) {
            self.current[index] = None;
        }
    }

    fn index(&self, column: u16, row: u16) -> Option<usize> {
        (column < self.columns && row < self.rows).then(|| row as usize * self.columns as usize + column as usize)
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }
}

fn rgb([r, g, b, _]: [u8; 4]) -> Color {
    Color::Rgb { r, g, b }
}
