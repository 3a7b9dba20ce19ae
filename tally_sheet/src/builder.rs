pub use crate::config::*;

/// A builder for assembling a sheet by hand.
///
/// The rows go through the same normalization as a sheet read from a
/// workbook.
///
/// ```
/// pub use tally_sheet::builder::Builder;
/// # use tally_sheet::SheetErrors;
///
/// let table = Builder::new("2025")
///     .days(&["1-Dec".to_string(), "2-Dec".to_string()])
///     .participant("Ana", &[1.0, 3.0])
///     .participant("Beto", &[2.0, 0.0])
///     .total_row(&[3.0, 3.0])
///     .build()?;
///
/// assert_eq!(table.participant_names(), vec!["Ana", "Beto"]);
/// assert_eq!(table.day_labels(), vec!["1-Dec", "2-Dec"]);
///
/// # Ok::<(), SheetErrors>(())
/// ```
pub struct Builder {
    pub(crate) _sheet_name: String,
    pub(crate) _days: Vec<String>,
    pub(crate) _rows: Vec<(String, Vec<f64>)>,
    pub(crate) _total_row: Option<Vec<f64>>,
    pub(crate) _options: LoadOptions,
}

impl Builder {
    pub fn new(sheet_name: &str) -> Builder {
        Builder {
            _sheet_name: sheet_name.to_string(),
            _days: Vec::new(),
            _rows: Vec::new(),
            _total_row: None,
            _options: LoadOptions::default(),
        }
    }

    /// The headers of the day columns.
    pub fn days(self, headers: &[String]) -> Builder {
        Builder {
            _days: headers.to_vec(),
            ..self
        }
    }

    pub fn options(self, options: &LoadOptions) -> Builder {
        Builder {
            _options: options.clone(),
            ..self
        }
    }

    /// Adds a participant with one count per day column.
    pub fn participant(mut self, name: &str, counts: &[f64]) -> Builder {
        self._rows.push((name.to_string(), counts.to_vec()));
        self
    }

    pub fn total_row(self, counts: &[f64]) -> Builder {
        Builder {
            _total_row: Some(counts.to_vec()),
            ..self
        }
    }

    /// The raw rows, header first, as a workbook reader would deliver them.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        let to_row = |name: &str, counts: &[f64]| -> Vec<Cell> {
            let mut row = vec![Cell::Text(name.to_string())];
            row.extend(counts.iter().map(|x| Cell::Number(*x)));
            row
        };
        let mut header = vec![Cell::Text("Member".to_string())];
        header.extend(self._days.iter().map(|d| Cell::Text(d.clone())));
        let mut res = vec![header];
        for (name, counts) in self._rows.iter() {
            res.push(to_row(name, counts));
        }
        if let Some(counts) = self._total_row.as_deref() {
            res.push(to_row("Total", counts));
        }
        res
    }

    pub fn build(&self) -> Result<SheetTable, SheetErrors> {
        crate::normalize_sheet(&self._sheet_name, &self.rows(), &self._options)
    }
}
