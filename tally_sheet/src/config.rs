// ********* Input data structures ***********

use chrono::NaiveDate;
use std::error::Error;
use std::fmt::Display;

/// A raw cell, as delivered by the workbook reader.
///
/// The first row of a sheet is the header, all the other rows are data rows.
#[derive(PartialEq, Debug, Clone)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    /// A cell that the workbook already typed as a date.
    Date(NaiveDate),
}

impl Cell {
    /// The trimmed textual form of the cell.
    ///
    /// Whole numbers are printed without a fractional part, so that a header
    /// `1.0` reads as `1`.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => "".to_string(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

// ******** Output data structures *********

/// The normalized key of a day column.
#[derive(Eq, PartialEq, Debug, Clone, Hash, PartialOrd, Ord)]
pub enum DayKey {
    Date(NaiveDate),
    /// The header could not be read as a date, it is kept verbatim.
    Label(String),
}

impl DayKey {
    /// The display label: `1-Dec` for dates, the header text otherwise.
    pub fn label(&self) -> String {
        match self {
            DayKey::Date(d) => d.format("%-d-%b").to_string(),
            DayKey::Label(s) => s.clone(),
        }
    }

    /// The day of the month, when the key carries one.
    pub fn day_of_month(&self) -> Option<u32> {
        use chrono::Datelike;
        match self {
            DayKey::Date(d) => Some(d.day()),
            DayKey::Label(s) => s.parse::<u32>().ok().filter(|d| (1..=31).contains(d)),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DayColumn {
    /// The header text, trimmed.
    pub header: String,
    pub key: DayKey,
}

impl DayColumn {
    pub fn label(&self) -> String {
        self.key.label()
    }
}

/// One participant of the sheet.
///
/// `counts` is aligned with the day columns of the sheet: there is exactly one
/// value per day column, missing cells being counted as zero.
#[derive(PartialEq, Debug, Clone)]
pub struct Participant {
    pub name: String,
    pub counts: Vec<f64>,
    pub declared_total: Option<f64>,
    pub declared_average: Option<f64>,
}

impl Participant {
    pub fn day_sum(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// The declared total if the sheet has one for this participant, the sum
    /// over the days otherwise.
    pub fn total(&self) -> f64 {
        self.declared_total.unwrap_or_else(|| self.day_sum())
    }

    /// The average per day (KPD).
    pub fn average(&self) -> f64 {
        match self.declared_average {
            Some(avg) => avg,
            None if self.counts.is_empty() => 0.0,
            None => self.total() / (self.counts.len() as f64),
        }
    }
}

/// The sheet-wide row labelled `Total`.
#[derive(PartialEq, Debug, Clone)]
pub struct TotalRow {
    pub counts: Vec<f64>,
    pub declared_total: Option<f64>,
    pub declared_average: Option<f64>,
}

/// A normalized sheet.
///
/// It is immutable once built. The total row is never part of the
/// participants.
#[derive(PartialEq, Debug, Clone)]
pub struct SheetTable {
    pub sheet_name: String,
    pub member_column: String,
    pub total_column: Option<String>,
    pub average_column: Option<String>,
    pub days: Vec<DayColumn>,
    pub participants: Vec<Participant>,
    pub total_row: Option<TotalRow>,
}

impl SheetTable {
    pub fn participant(&self, name: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.name == name)
    }

    pub fn participant_names(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.name.clone()).collect()
    }

    pub fn day_labels(&self) -> Vec<String> {
        self.days.iter().map(|d| d.label()).collect()
    }
}

/// A discrepancy between a declared total and the computed one.
#[derive(PartialEq, Debug, Clone)]
pub enum TotalMismatch {
    Participant {
        name: String,
        declared: f64,
        computed: f64,
    },
    TotalRow {
        declared: f64,
        computed: f64,
    },
}

/// Errors that prevent a sheet from being normalized or queried.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum SheetErrors {
    /// The sheet has no header row.
    EmptySheet,
    DuplicateParticipant(String),
    UnknownParticipant(String),
}

impl Error for SheetErrors {}

impl Display for SheetErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetErrors::EmptySheet => write!(f, "the sheet has no header row"),
            SheetErrors::DuplicateParticipant(name) => {
                write!(f, "participant {:?} appears more than once", name)
            }
            SheetErrors::UnknownParticipant(name) => {
                write!(f, "unknown participant {:?}", name)
            }
        }
    }
}

// ********* Configuration **********

/// The role of a column, decided from its header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ColumnRole {
    Member,
    Total,
    Average,
    Day,
    /// Columns with an empty header.
    Ignored,
}

/// The accepted header labels for the special columns.
///
/// Labels are compared after lowercasing and removing all the whitespaces,
/// on both sides.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LabelSets {
    pub member: Vec<String>,
    pub total: Vec<String>,
    pub average: Vec<String>,
}

fn to_strings(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

impl Default for LabelSets {
    fn default() -> Self {
        LabelSets {
            member: to_strings(&[
                "miembro",
                "member",
                "nombre",
                "name",
                "participante",
                "participant",
            ]),
            total: to_strings(&[
                "#kgds",
                "kgds",
                "total",
                "total de cagadas",
                "total kgds",
                "totals",
            ]),
            average: to_strings(&[
                "kpd",
                "cagadas diarias",
                "promedio",
                "promedio diario",
                "average",
                "avg",
                "per day",
                "daily average",
            ]),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct LoadOptions {
    pub labels: LabelSets,
    /// The year used for headers such as `1-Dec` that do not carry one.
    /// When not provided, the sheet name is used if it is a year.
    pub year_hint: Option<i32>,
}
