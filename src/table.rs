//! Fixed-width text tables.
//!
//! Cells are streamed into a [`Table`]; column widths are tracked as cells
//! arrive and the whole table is rendered once, after which it is empty again.
//!
//! ```text
//! ----------------
//! |  Name  | Age |
//! ----------------
//! | Alice  | 30  |
//! ----------------
//! ```
use crate::{
    colors::{Color, colorize, visible_width},
    constants::{TABLE_CELL_PADDING, TABLE_CELL_SEPARATOR, TABLE_RULE_CHAR},
};

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    text: String,
    header: bool,
    style: Option<Color>,
}

impl Cell {
    /// A left-aligned body cell.
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
            header: false,
            style: None,
        }
    }

    /// A centered header cell.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            header: true,
            ..Self::body(text)
        }
    }

    /// Paints the cell with `color` when rendered with styles.
    pub fn styled(mut self, color: Color) -> Self {
        self.style = Some(color);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_header(&self) -> bool {
        self.header
    }

    pub fn style(&self) -> Option<Color> {
        self.style
    }

    fn width(&self) -> usize {
        self.text.lines().map(visible_width).max().unwrap_or(0)
    }
}

impl From<&str> for Cell {
    fn from(text: &str) -> Self {
        Self::body(text)
    }
}

impl From<String> for Cell {
    fn from(text: String) -> Self {
        Self::body(text)
    }
}

/// Accumulates rows of cells and renders them as a bordered table.
///
/// The first row fixes the column count. Once a later row holds that many
/// cells, the next pushed cell starts a new row on its own, so cells can be
/// streamed without explicit row boundaries.
#[derive(Debug, Clone, Default)]
pub struct Table {
    rows: Vec<Vec<Cell>>,
    widths: Vec<usize>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards any rows and widths collected so far.
    pub fn start_table(&mut self) -> &mut Self {
        self.rows.clear();
        self.widths.clear();
        self
    }

    /// Starts a new, empty row; following cells are appended to it.
    pub fn start_row(&mut self) -> &mut Self {
        self.rows.push(Vec::new());
        self
    }

    /// Starts a new row holding `cells`.
    pub fn push_row<I, C>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.start_row();
        for cell in cells {
            self.push_cell(cell);
        }
        self
    }

    /// Appends a cell to the current row, starting a new row when the current
    /// one is already as wide as the first row.
    pub fn push_cell(&mut self, cell: impl Into<Cell>) -> &mut Self {
        let cell = cell.into();
        let columns = self.column_count();
        let needs_row = match self.rows.len() {
            0 => true,
            count => count > 1 && columns > 0 && self.rows[count - 1].len() >= columns,
        };
        if needs_row {
            self.start_row();
        }

        let row = self.rows.len() - 1;
        let column = self.rows[row].len();
        let width = cell.width();
        match self.widths.get_mut(column) {
            Some(current) if *current < width => *current = width,
            Some(_) => {}
            None => self.widths.push(width),
        }
        self.rows[row].push(cell);
        self
    }

    /// Number of columns, fixed by the first row.
    pub fn column_count(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    /// Widest visible line seen so far in each column.
    pub fn column_widths(&self) -> &[usize] {
        &self.widths
    }

    /// Rows collected so far.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Whether no cell has been pushed.
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }

    /// Total rendered width, including the outer separators.
    pub fn line_width(&self) -> usize {
        self.widths
            .iter()
            .map(|width| width + TABLE_CELL_PADDING + 1)
            .sum::<usize>()
            + 1
    }

    /// Renders the table without colors and clears it.
    pub fn render(&mut self) -> Vec<String> {
        self.render_lines(false)
    }

    /// Renders the table, painting styled cells, and clears it.
    ///
    /// Styles wrap the already padded cell text, so alignment matches
    /// [`render`](Self::render).
    pub fn render_styled(&mut self) -> Vec<String> {
        self.render_lines(true)
    }

    fn render_lines(&mut self, styled: bool) -> Vec<String> {
        if self.is_empty() {
            self.start_table();
            return Vec::new();
        }

        let rule = TABLE_RULE_CHAR.to_string().repeat(self.line_width());
        let mut lines = vec![rule.clone()];

        for row in self.rows.iter().filter(|row| !row.is_empty()) {
            let height = row
                .iter()
                .map(|cell| cell.text.lines().count().max(1))
                .max()
                .unwrap_or(1);

            for line_index in 0..height {
                let mut line = TABLE_CELL_SEPARATOR.to_string();
                for (column, width) in self.widths.iter().enumerate() {
                    let cell = row.get(column);
                    let text = cell
                        .and_then(|cell| cell.text.lines().nth(line_index))
                        .unwrap_or("");
                    let header = cell.is_some_and(Cell::is_header);
                    let padded = pad_cell(text, width + TABLE_CELL_PADDING, header);
                    let style = if styled { cell.and_then(Cell::style) } else { None };
                    line.push_str(&colorize(&padded, style));
                    line.push(TABLE_CELL_SEPARATOR);
                }
                lines.push(line);
            }
            lines.push(rule.clone());
        }

        self.start_table();
        lines
    }
}

/// Pads `text` to `width` visible characters.
///
/// Headers are centered with the odd space on the right; body text gets one
/// leading space and is left-aligned.
pub fn pad_cell(text: &str, width: usize, header: bool) -> String {
    let free = width.saturating_sub(visible_width(text));
    if header {
        center(text, free)
    } else {
        let right = free.saturating_sub(1);
        format!(" {text}{}", " ".repeat(right))
    }
}

/// Surrounds `text` with `free` spaces split evenly, extra space on the right.
pub fn center(text: &str, free: usize) -> String {
    let left = free / 2;
    let right = free - left;
    format!("{}{text}{}", " ".repeat(left), " ".repeat(right))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streamed_cells_wrap_at_first_row_width() {
        let mut table = Table::new();
        table.push_cell("x").push_cell("yy");
        table.start_row();
        table.push_cell("z").push_cell("w");

        assert_eq!(table.column_widths(), [1, 2]);
        assert_eq!(table.rows().len(), 2);

        table.push_cell("a");
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.rows()[2][0].text(), "a");
    }

    #[test]
    fn first_row_grows_until_a_second_row_exists() {
        let mut table = Table::new();
        table.push_row(["a", "b"]);
        table.push_cell("c");

        assert_eq!(table.column_count(), 3);
        assert_eq!(table.rows().len(), 1);
    }

    #[test]
    fn renders_borders_and_alignment() {
        let mut table = Table::new();
        table.push_row([Cell::header("Name"), Cell::header("Age")]);
        table.push_row(["Alice", "30"]);

        assert_eq!(
            table.render(),
            [
                "---------------",
                "| Name  | Age |",
                "---------------",
                "| Alice | 30  |",
                "---------------",
            ]
        );
    }

    #[test]
    fn header_odd_space_goes_right() {
        assert_eq!(pad_cell("ab", 5, true), " ab  ");
        assert_eq!(pad_cell("ab", 6, true), "  ab  ");
        assert_eq!(pad_cell("ab", 5, false), " ab  ");
    }

    #[test]
    fn width_is_tracked_across_rows_and_never_shrinks() {
        let mut table = Table::new();
        table.push_row(["long text", "b"]);
        table.push_row(["s", "bbbb"]);
        table.push_row(["", ""]);

        assert_eq!(table.column_widths(), [9, 4]);
        assert_eq!(table.line_width(), (9 + 3) + (4 + 3) + 1);
    }

    #[test]
    fn multi_line_cells_use_widest_line_and_span_lines() {
        let mut table = Table::new();
        table.push_row(["one\nthree", "x"]);

        assert_eq!(table.column_widths(), [5, 1]);
        assert_eq!(
            table.render(),
            [
                "-------------",
                "| one   | x |",
                "| three |   |",
                "-------------",
            ]
        );
    }

    #[test]
    fn render_clears_state() {
        let mut table = Table::new();
        table.push_row(["a", "b"]);
        assert!(!table.render().is_empty());

        assert!(table.is_empty());
        assert!(table.column_widths().is_empty());
        assert!(table.render().is_empty());
    }

    #[test]
    fn styled_render_keeps_alignment() {
        let mut plain = Table::new();
        plain.push_row([Cell::body("ok").styled(Color::Green), Cell::body("x")]);
        let mut styled = plain.clone();

        let plain_lines = plain.render();
        let styled_lines = styled.render_styled();

        assert_eq!(plain_lines.len(), styled_lines.len());
        assert!(styled_lines[1].contains("\x1b[0;32m ok \x1b[0m"));
        for (plain, styled) in plain_lines.iter().zip(&styled_lines) {
            assert_eq!(&crate::colors::strip_colors(styled), plain);
        }
    }

    #[test]
    fn colored_text_width_uses_visible_characters() {
        let mut table = Table::new();
        table.push_cell(Color::Red.paint("abc"));
        assert_eq!(table.column_widths(), [3]);
    }

    #[test]
    fn short_last_row_is_padded() {
        let mut table = Table::new();
        table.push_row(["a", "b"]);
        table.start_row().push_cell("c");

        let lines = table.render();
        assert_eq!(lines[3], "| c |   |");
    }

    #[test]
    fn cell_text_is_trimmed() {
        let cell = Cell::header("  padded  ");
        assert_eq!(cell.text(), "padded");
        assert!(cell.is_header());
        assert_eq!(cell.style(), None);
    }
}
