use calamine::{open_workbook, Data, Reader, Xlsx};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::rc::Rc;

use crate::dash::*;

/// Where the sheets come from.
pub trait SheetSource {
    /// The location of the workbook, used as part of the cache key.
    fn path(&self) -> String;
    fn sheet_names(&self) -> Vec<String>;
    /// The raw rows of a sheet, header first.
    fn read_rows(&mut self, sheet: &str) -> DashResult<Vec<Vec<Cell>>>;
}

pub struct XlsxSource {
    path: String,
    workbook: Xlsx<BufReader<File>>,
}

impl XlsxSource {
    pub fn open(path: &str) -> DashResult<XlsxSource> {
        info!("Opening workbook {:?}", path);
        let workbook: Xlsx<_> = open_workbook(path).context(OpeningWorkbookSnafu { path })?;
        Ok(XlsxSource {
            path: path.to_string(),
            workbook,
        })
    }
}

impl SheetSource for XlsxSource {
    fn path(&self) -> String {
        self.path.clone()
    }

    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names()
    }

    fn read_rows(&mut self, sheet: &str) -> DashResult<Vec<Vec<Cell>>> {
        let names = self.sheet_names();
        if !names.iter().any(|n| n == sheet) {
            return MissingSheetSnafu {
                sheet,
                path: self.path.clone(),
                available: names.join(", "),
            }
            .fail();
        }
        let wrange = self
            .workbook
            .worksheet_range(sheet)
            .context(ReadingSheetSnafu {
                path: self.path.clone(),
                sheet,
            })?;
        debug!(
            "read_rows: {:?}: {} rows x {} columns",
            sheet,
            wrange.height(),
            wrange.width()
        );
        Ok(wrange
            .rows()
            .map(|row| row.iter().map(read_cell).collect())
            .collect())
    }
}

pub fn read_cell(cell: &Data) -> Cell {
    match cell {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(x) => Cell::Date(x.date()),
            None => Cell::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => {
            warn!("read_cell: cell error {:?}, read as empty", e);
            Cell::Empty
        }
    }
}

/// The sheets already loaded, by workbook and sheet name.
///
/// A sheet is normalized once; later requests for the same pair return the
/// same table.
pub struct SheetCache {
    options: LoadOptions,
    tables: HashMap<(String, String), Rc<SheetTable>>,
}

impl SheetCache {
    pub fn new(options: &LoadOptions) -> SheetCache {
        SheetCache {
            options: options.clone(),
            tables: HashMap::new(),
        }
    }

    pub fn load<S: SheetSource>(&mut self, source: &mut S, sheet: &str) -> DashResult<Rc<SheetTable>> {
        let key = (source.path(), sheet.to_string());
        if let Some(table) = self.tables.get(&key) {
            debug!("SheetCache: hit for {:?}", key);
            return Ok(table.clone());
        }
        let rows = source.read_rows(sheet)?;
        let table = normalize_sheet(sheet, &rows, &self.options)
            .context(InvalidSheetSnafu { sheet })?;
        let table = Rc::new(table);
        self.tables.insert(key, table.clone());
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn cells() {
        assert_eq!(read_cell(&Data::Empty), Cell::Empty);
        assert_eq!(read_cell(&Data::Int(3)), Cell::Number(3.0));
        assert_eq!(read_cell(&Data::Float(2.5)), Cell::Number(2.5));
        assert_eq!(
            read_cell(&Data::String(" Ana ".to_string())),
            Cell::Text(" Ana ".to_string())
        );
        assert_eq!(
            read_cell(&Data::DateTimeIso("2025-12-01T00:00:00".to_string())),
            Cell::Text("2025-12-01T00:00:00".to_string())
        );
        assert_eq!(read_cell(&Data::Bool(true)), Cell::Text("true".to_string()));
    }

    #[test]
    fn date_cells() {
        // 45992 is 2025-12-01 in the 1900 date system.
        let dt = ExcelDateTime::new(45992.0, ExcelDateTimeType::DateTime, false);
        let cell = read_cell(&Data::DateTime(dt));
        assert!(matches!(cell, Cell::Date(_)));
        assert_eq!(cell.to_text(), "2025-12-01");
    }

    #[test]
    fn missing_workbook_is_fatal() {
        let res = XlsxSource::open("/nonexistent/tallydash.xlsx");
        assert!(matches!(res, Err(DashError::OpeningWorkbook { .. })));
    }
}
