//! Report type definitions for the table model.
//!
//! Cells keep grade sentinels as variants; text only appears when a row is
//! rendered for a report store.

use crate::types::Learner;

/// Value of a grade column for one learner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradeCell {
    /// The learner's grade has no entry for this column: "Not Available"
    Unavailable,
    /// The entry exists but was never attempted: "Not Attempted"
    NotAttempted,
    /// A score or fraction
    Scored(f64),
}

impl GradeCell {
    pub fn as_text(&self) -> String {
        match self {
            GradeCell::Unavailable => "Not Available".to_string(),
            GradeCell::NotAttempted => "Not Attempted".to_string(),
            GradeCell::Scored(value) => format_number(*value),
        }
    }
}

/// One cell of a report row
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(u64),
    Number(f64),
    Grade(GradeCell),
    Empty,
}

impl Cell {
    /// Display text written to the report store
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Integer(n) => n.to_string(),
            Cell::Number(v) => format_number(*v),
            Cell::Grade(g) => g.as_text(),
            Cell::Empty => String::new(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<u64> for Cell {
    fn from(n: u64) -> Self {
        Cell::Integer(n)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<Option<f64>> for Cell {
    fn from(v: Option<f64>) -> Self {
        v.map_or(Cell::Empty, Cell::Number)
    }
}

impl From<GradeCell> for Cell {
    fn from(g: GradeCell) -> Self {
        Cell::Grade(g)
    }
}

/// Floats keep a decimal point ("1.0", "0.25") so whole scores stay recognizable
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// A success row, aligned with the report's success headers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cell: impl Into<Cell>) {
        self.cells.push(cell.into());
    }

    pub fn extend<I, C>(&mut self, cells: I)
    where
        I: IntoIterator<Item = C>,
        C: Into<Cell>,
    {
        self.cells.extend(cells.into_iter().map(Into::into));
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn render(&self) -> Vec<String> {
        self.cells.iter().map(Cell::render).collect()
    }
}

/// A learner who could not be graded
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorRow {
    pub learner: Learner,
    pub message: String,
}

/// Columns of an error table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLayout {
    /// Student ID, Username, Error
    IdUsername,
    /// Student ID, Email, Username, error_msg
    IdEmailUsername,
}

impl ErrorLayout {
    pub fn headers(&self) -> Vec<String> {
        let headers: &[&str] = match self {
            ErrorLayout::IdUsername => &["Student ID", "Username", "Error"],
            ErrorLayout::IdEmailUsername => &["Student ID", "Email", "Username", "error_msg"],
        };
        headers.iter().map(|h| h.to_string()).collect()
    }

    pub fn render(&self, row: &ErrorRow) -> Vec<String> {
        match self {
            ErrorLayout::IdUsername => vec![row.learner.id.to_string(), row.learner.username.clone(), row.message.clone()],
            ErrorLayout::IdEmailUsername => vec![
                row.learner.id.to_string(),
                row.learner.email.clone(),
                row.learner.username.clone(),
                row.message.clone(),
            ],
        }
    }
}

/// Output of the row compiler for one batch
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BatchRows {
    pub success: Vec<Row>,
    pub errors: Vec<ErrorRow>,
}

/// A header row plus rendered data rows
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header first, then data rows
    pub fn into_rows(self) -> Vec<Vec<String>> {
        let mut all = Vec::with_capacity(self.rows.len() + 1);
        all.push(self.headers);
        all.extend(self.rows);
        all
    }
}
