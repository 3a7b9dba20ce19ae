mod config;
use log::{debug, info, warn};

use std::collections::HashSet;

pub use crate::config::*;

pub mod builder;
pub mod dates;
pub mod manual;
pub mod stats;

// **** Column classification ****

/// Lowercases and drops all the whitespaces.
pub fn normalize_label(s: &str) -> String {
    s.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

fn matches_any(header: &str, accepted: &[String]) -> bool {
    let n = normalize_label(header);
    accepted.iter().any(|l| normalize_label(l) == n)
}

/// Assigns a role to each of the (stringified) headers.
///
/// The member column is looked up first, then the total column and then the
/// average column. Only the first match is used for each role. If no member
/// column is recognized, the first column is used.
pub fn classify_columns(headers: &[String], labels: &LabelSets) -> Vec<ColumnRole> {
    let mut roles: Vec<ColumnRole> = headers
        .iter()
        .map(|h| {
            if h.is_empty() {
                ColumnRole::Ignored
            } else {
                ColumnRole::Day
            }
        })
        .collect();
    if headers.is_empty() {
        return roles;
    }

    let member_idx = headers
        .iter()
        .position(|h| matches_any(h, &labels.member))
        .unwrap_or(0);
    roles[member_idx] = ColumnRole::Member;

    let lookup = |accepted: &[String], roles: &[ColumnRole]| -> Option<usize> {
        headers
            .iter()
            .enumerate()
            .find(|(idx, h)| roles[*idx] == ColumnRole::Day && matches_any(h, accepted))
            .map(|(idx, _)| idx)
    };
    if let Some(idx) = lookup(labels.total.as_slice(), roles.as_slice()) {
        roles[idx] = ColumnRole::Total;
    }
    if let Some(idx) = lookup(labels.average.as_slice(), roles.as_slice()) {
        roles[idx] = ColumnRole::Average;
    }
    roles
}

// **** Cell reading ****

fn read_count(cell: Option<&Cell>, sheet_name: &str, row_name: &str) -> Option<f64> {
    match cell {
        Some(Cell::Number(n)) if n.is_finite() => Some(*n),
        Some(Cell::Number(n)) => {
            warn!(
                "read_count: sheet {:?}, row {:?}: {} is not a count, counted as zero",
                sheet_name, row_name, n
            );
            None
        }
        Some(Cell::Text(s)) if s.trim().is_empty() => None,
        Some(Cell::Text(s)) => match s.trim().parse::<f64>() {
            // NaN and infinities are not counts.
            Ok(x) if x.is_finite() => Some(x),
            _ => {
                warn!(
                    "read_count: sheet {:?}, row {:?}: {:?} is not a number, counted as zero",
                    sheet_name, row_name, s
                );
                None
            }
        },
        Some(Cell::Date(d)) => {
            warn!(
                "read_count: sheet {:?}, row {:?}: unexpected date {}, counted as zero",
                sheet_name, row_name, d
            );
            None
        }
        Some(Cell::Empty) | None => None,
    }
}

/// Builds the normalized table of a sheet.
///
/// Arguments:
/// * `sheet_name` the name of the sheet, kept in the table and used as a year
/// hint for the day headers when it looks like a year
/// * `rows` the raw rows of the sheet. The first row is the header.
/// * `options` the accepted labels for the special columns
pub fn normalize_sheet(
    sheet_name: &str,
    rows: &[Vec<Cell>],
    options: &LoadOptions,
) -> Result<SheetTable, SheetErrors> {
    let header_cells = rows.first().ok_or(SheetErrors::EmptySheet)?;
    if header_cells.is_empty() {
        return Err(SheetErrors::EmptySheet);
    }
    let headers: Vec<String> = header_cells.iter().map(|c| c.to_text()).collect();
    debug!("normalize_sheet: {:?}: headers: {:?}", sheet_name, headers);

    let roles = classify_columns(&headers, &options.labels);
    debug!("normalize_sheet: {:?}: roles: {:?}", sheet_name, roles);

    let year_hint = options
        .year_hint
        .or_else(|| dates::year_from_sheet_name(sheet_name));

    let position = |role: ColumnRole| roles.iter().position(|r| *r == role);
    // There is always a member column when the header is not empty.
    let member_idx = position(ColumnRole::Member).unwrap_or(0);
    let total_idx = position(ColumnRole::Total);
    let average_idx = position(ColumnRole::Average);

    let day_indexes: Vec<usize> = roles
        .iter()
        .enumerate()
        .filter(|(_, r)| **r == ColumnRole::Day)
        .map(|(idx, _)| idx)
        .collect();
    let days: Vec<DayColumn> = day_indexes
        .iter()
        .map(|idx| DayColumn {
            header: headers[*idx].clone(),
            key: dates::day_key(&header_cells[*idx], year_hint),
        })
        .collect();

    let mut participants: Vec<Participant> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut total_row: Option<TotalRow> = None;

    for (lineno, row) in rows.iter().enumerate().skip(1) {
        let name = row.get(member_idx).map(|c| c.to_text()).unwrap_or_default();
        if name.is_empty() {
            debug!("normalize_sheet: line {}: no identifier, skipping", lineno + 1);
            continue;
        }
        let counts: Vec<f64> = day_indexes
            .iter()
            .map(|idx| read_count(row.get(*idx), sheet_name, &name).unwrap_or(0.0))
            .collect();
        let declared_total = total_idx.and_then(|idx| read_count(row.get(idx), sheet_name, &name));
        let declared_average =
            average_idx.and_then(|idx| read_count(row.get(idx), sheet_name, &name));

        if name.to_lowercase() == "total" {
            if total_row.is_some() {
                warn!(
                    "normalize_sheet: {:?}: line {}: second total row ignored",
                    sheet_name,
                    lineno + 1
                );
            } else {
                total_row = Some(TotalRow {
                    counts,
                    declared_total,
                    declared_average,
                });
            }
            continue;
        }

        if !seen.insert(name.clone()) {
            return Err(SheetErrors::DuplicateParticipant(name));
        }
        participants.push(Participant {
            name,
            counts,
            declared_total,
            declared_average,
        });
    }

    info!(
        "normalize_sheet: {:?}: {} participants, {} days, total column: {:?}, average column: {:?}, total row: {}",
        sheet_name,
        participants.len(),
        days.len(),
        total_idx.map(|idx| &headers[idx]),
        average_idx.map(|idx| &headers[idx]),
        total_row.is_some()
    );

    Ok(SheetTable {
        sheet_name: sheet_name.to_string(),
        member_column: headers[member_idx].clone(),
        total_column: total_idx.map(|idx| headers[idx].clone()),
        average_column: average_idx.map(|idx| headers[idx].clone()),
        days,
        participants,
        total_row,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn t(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn n(x: f64) -> Cell {
        Cell::Number(x)
    }

    fn headers(hs: &[&str]) -> Vec<String> {
        hs.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn label_normalization() {
        assert_eq!(normalize_label("  Total  KGDs "), "totalkgds");
        assert_eq!(normalize_label("Miembro"), "miembro");
    }

    #[test]
    fn classify_by_labels() {
        let roles = classify_columns(
            &headers(&["Día", "Nombre", "1-Dec", "Total de cagadas", "Promedio diario"]),
            &LabelSets::default(),
        );
        assert_eq!(
            roles,
            vec![
                ColumnRole::Day,
                ColumnRole::Member,
                ColumnRole::Day,
                ColumnRole::Total,
                ColumnRole::Average
            ]
        );
    }

    #[test]
    fn classify_falls_back_to_first_column() {
        let roles = classify_columns(
            &headers(&["Quién", "1-Dec", "", "KPD"]),
            &LabelSets::default(),
        );
        assert_eq!(
            roles,
            vec![
                ColumnRole::Member,
                ColumnRole::Day,
                ColumnRole::Ignored,
                ColumnRole::Average
            ]
        );
    }

    #[test]
    fn classify_first_match_wins() {
        let roles = classify_columns(
            &headers(&["Member", "#KGDs", "Total"]),
            &LabelSets::default(),
        );
        assert_eq!(
            roles,
            vec![ColumnRole::Member, ColumnRole::Total, ColumnRole::Day]
        );
    }

    #[test]
    fn normalize_noisy_sheet() {
        init();
        let rows = vec![
            vec![
                t("  Miembro "),
                t("2025-12-01 00:00:00"),
                Cell::Date(NaiveDate::from_ymd_opt(2025, 12, 2).unwrap()),
                t("Extra"),
                t("#KGDs"),
                t("KPD"),
            ],
            vec![t(" Ana "), n(1.0), n(2.0), Cell::Empty, n(3.0), n(1.5)],
            vec![t("Beto"), n(0.0), t("4"), n(1.0), n(5.0), n(2.5)],
            vec![Cell::Empty, Cell::Empty],
            vec![t("TOTAL"), n(1.0), n(6.0), n(1.0), n(8.0), n(4.0)],
        ];
        let table = normalize_sheet("2025", &rows, &LoadOptions::default()).unwrap();
        assert_eq!(table.member_column, "Miembro");
        assert_eq!(table.total_column, Some("#KGDs".to_string()));
        assert_eq!(table.average_column, Some("KPD".to_string()));
        assert_eq!(table.day_labels(), vec!["1-Dec", "2-Dec", "Extra"]);
        assert_eq!(table.participant_names(), vec!["Ana", "Beto"]);
        let ana = table.participant("Ana").unwrap();
        assert_eq!(ana.counts, vec![1.0, 2.0, 0.0]);
        assert_eq!(ana.declared_total, Some(3.0));
        assert_eq!(ana.average(), 1.5);
        let total_row = table.total_row.unwrap();
        assert_eq!(total_row.declared_total, Some(8.0));
    }

    #[test]
    fn total_row_is_never_a_participant() {
        let rows = vec![
            vec![t("Name"), t("d1")],
            vec![t("total"), n(3.0)],
            vec![t("A"), n(1.0)],
            vec![t("Total"), n(3.0)],
            vec![t("B"), n(2.0)],
        ];
        let table = normalize_sheet("Hoja1", &rows, &LoadOptions::default()).unwrap();
        assert_eq!(table.participant_names(), vec!["A", "B"]);
        assert!(table
            .participants
            .iter()
            .all(|p| p.name.to_lowercase() != "total"));
        assert!(table.total_row.is_some());
    }

    #[test]
    fn missing_cells_are_zero() {
        let rows = vec![vec![t("Name"), t("d1"), t("d2"), t("d3")], vec![t("A"), n(2.0)]];
        let table = normalize_sheet("s", &rows, &LoadOptions::default()).unwrap();
        let a = table.participant("A").unwrap();
        assert_eq!(a.counts, vec![2.0, 0.0, 0.0]);
        assert_eq!(a.total(), 2.0);
        assert!((a.average() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn non_finite_text_counts_as_zero() {
        init();
        let rows = vec![
            vec![t("Member"), t("d1"), t("d2")],
            vec![t("A"), t("NaN"), n(1.0)],
            vec![t("B"), t("inf"), n(1.0)],
            vec![t("C"), t("-inf"), t(" 2 ")],
        ];
        let table = normalize_sheet("s", &rows, &LoadOptions::default()).unwrap();
        assert_eq!(table.participant("A").unwrap().counts, vec![0.0, 1.0]);
        assert_eq!(table.participant("B").unwrap().counts, vec![0.0, 1.0]);
        assert_eq!(table.participant("C").unwrap().counts, vec![0.0, 2.0]);
        let all = stats::select_all(&table);
        assert_eq!(stats::daily_sums(&table, &all), vec![0.0, 4.0]);
        let rank = stats::ranking(&all);
        assert_eq!(
            rank.iter()
                .map(|r| (r.name.as_str(), r.total))
                .collect::<Vec<_>>(),
            vec![("C", 2.0), ("A", 1.0), ("B", 1.0)]
        );
    }

    #[test]
    fn duplicate_participant_is_an_error() {
        let rows = vec![
            vec![t("Name"), t("d1")],
            vec![t("A"), n(1.0)],
            vec![t(" A"), n(2.0)],
        ];
        assert_eq!(
            normalize_sheet("s", &rows, &LoadOptions::default()),
            Err(SheetErrors::DuplicateParticipant("A".to_string()))
        );
    }

    #[test]
    fn empty_sheet_is_an_error() {
        assert_eq!(
            normalize_sheet("s", &[], &LoadOptions::default()),
            Err(SheetErrors::EmptySheet)
        );
    }

    #[test]
    fn custom_labels() {
        let options = LoadOptions {
            labels: LabelSets {
                member: vec!["Runner".to_string()],
                total: vec!["Sum".to_string()],
                average: vec![],
            },
            year_hint: Some(2023),
        };
        let rows = vec![
            vec![t("Sum"), t("Runner"), t("3-Jan")],
            vec![n(4.0), t("Z"), n(4.0)],
        ];
        let table = normalize_sheet("Sheet", &rows, &options).unwrap();
        assert_eq!(table.member_column, "Runner");
        assert_eq!(table.total_column, Some("Sum".to_string()));
        assert_eq!(
            table.days[0].key,
            DayKey::Date(NaiveDate::from_ymd_opt(2023, 1, 3).unwrap())
        );
    }
}
