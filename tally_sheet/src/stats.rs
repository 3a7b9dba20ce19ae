//! Aggregates over a normalized sheet.
//!
//! All the functions are pure: they take the table and a selection of
//! participants and recompute everything.

use log::debug;
use std::collections::HashSet;

use crate::config::*;

/// The participants whose names are in `names`, in the order of the sheet.
pub fn select<'a>(
    table: &'a SheetTable,
    names: &[String],
) -> Result<Vec<&'a Participant>, SheetErrors> {
    let wanted: HashSet<&str> = names.iter().map(|s| s.trim()).collect();
    for name in wanted.iter() {
        if table.participant(name).is_none() {
            return Err(SheetErrors::UnknownParticipant(name.to_string()));
        }
    }
    let res: Vec<&Participant> = table
        .participants
        .iter()
        .filter(|p| wanted.contains(p.name.as_str()))
        .collect();
    debug!("select: {:?} -> {} participants", names, res.len());
    Ok(res)
}

pub fn select_all(table: &SheetTable) -> Vec<&Participant> {
    table.participants.iter().collect()
}

/// The sum of the totals of the selection.
pub fn sum_totals(selection: &[&Participant]) -> f64 {
    selection.iter().map(|p| p.total()).sum()
}

/// The sum of each day across the selection, in day order.
pub fn daily_sums(table: &SheetTable, selection: &[&Participant]) -> Vec<f64> {
    let mut sums = vec![0.0; table.days.len()];
    for p in selection {
        for (acc, x) in sums.iter_mut().zip(p.counts.iter()) {
            *acc += x;
        }
    }
    sums
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankEntry {
    pub name: String,
    pub total: f64,
    pub average: f64,
}

/// Sorts the selection by total, highest first.
///
/// Ties keep the order of the sheet.
pub fn ranking(selection: &[&Participant]) -> Vec<RankEntry> {
    let mut res: Vec<RankEntry> = selection
        .iter()
        .map(|p| RankEntry {
            name: p.name.clone(),
            total: p.total(),
            average: p.average(),
        })
        .collect();
    // sort_by is stable.
    res.sort_by(|a, b| b.total.total_cmp(&a.total));
    res
}

#[derive(PartialEq, Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

/// Two participants side by side, one point per day column.
#[derive(PartialEq, Debug, Clone)]
pub struct Rivalry {
    pub days: Vec<String>,
    pub first: Series,
    pub second: Series,
}

pub fn rivalry(table: &SheetTable, first: &str, second: &str) -> Result<Rivalry, SheetErrors> {
    let series = |name: &str| -> Result<Series, SheetErrors> {
        let p = table
            .participant(name.trim())
            .ok_or_else(|| SheetErrors::UnknownParticipant(name.to_string()))?;
        Ok(Series {
            name: p.name.clone(),
            values: p.counts.clone(),
        })
    };
    Ok(Rivalry {
        days: table.day_labels(),
        first: series(first)?,
        second: series(second)?,
    })
}

/// The first two participants, or the first one against itself when the sheet
/// has only one.
pub fn default_rivals(table: &SheetTable) -> Option<(String, String)> {
    let first = table.participants.first()?;
    let second = table.participants.get(1).unwrap_or(first);
    Some((first.name.clone(), second.name.clone()))
}

#[derive(PartialEq, Debug, Clone)]
pub struct Metrics {
    pub selection_total: f64,
    pub average_per_day: f64,
    pub average_per_person: f64,
    /// Only known when the sheet has a total row.
    pub sheet_total: Option<f64>,
}

pub fn metrics(table: &SheetTable, selection: &[&Participant]) -> Metrics {
    let selection_total = sum_totals(selection);
    let num_days = table.days.len();
    let average_per_day = if num_days > 0 {
        selection_total / (num_days as f64)
    } else {
        0.0
    };
    let average_per_person = if selection.is_empty() {
        0.0
    } else {
        selection_total / (selection.len() as f64)
    };
    let sheet_total = table.total_row.as_ref().map(|tr| {
        tr.declared_total
            .unwrap_or_else(|| table.participants.iter().map(|p| p.day_sum()).sum())
    });
    Metrics {
        selection_total,
        average_per_day,
        average_per_person,
        sheet_total,
    }
}

/// A participant by day matrix.
#[derive(PartialEq, Debug, Clone)]
pub struct Heatmap {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<f64>>,
    pub max: f64,
}

pub fn heatmap(table: &SheetTable, selection: &[&Participant]) -> Heatmap {
    let values: Vec<Vec<f64>> = selection.iter().map(|p| p.counts.clone()).collect();
    let max = values.iter().flatten().cloned().fold(0.0, f64::max);
    Heatmap {
        rows: selection.iter().map(|p| p.name.clone()).collect(),
        columns: table.day_labels(),
        values,
        max,
    }
}

/// Compares the declared totals with the counts of the days.
///
/// A participant is reported when its declared total differs from the sum of
/// its days, the total row when its declared total differs from the sum of
/// the participant totals.
pub fn check_totals(table: &SheetTable, tolerance: f64) -> Vec<TotalMismatch> {
    let mut res: Vec<TotalMismatch> = Vec::new();
    for p in table.participants.iter() {
        if let Some(declared) = p.declared_total {
            let computed = p.day_sum();
            if (declared - computed).abs() > tolerance {
                res.push(TotalMismatch::Participant {
                    name: p.name.clone(),
                    declared,
                    computed,
                });
            }
        }
    }
    if let Some(declared) = table.total_row.as_ref().and_then(|tr| tr.declared_total) {
        let computed: f64 = table.participants.iter().map(|p| p.total()).sum();
        if (declared - computed).abs() > tolerance {
            res.push(TotalMismatch::TotalRow { declared, computed });
        }
    }
    res
}
