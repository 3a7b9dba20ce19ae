use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use tally_sheet::stats::{self, Heatmap, Metrics, RankEntry, Rivalry};
use tally_sheet::*;

use crate::args::Args;
use crate::dash::config_reader::*;
use crate::dash::io_xlsx::*;

pub mod config_reader;
pub mod io_xlsx;
pub mod render;
pub mod session;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening workbook {path}: {source}"))]
    OpeningWorkbook {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Error reading sheet {sheet:?} of {path}: {source}"))]
    ReadingSheet {
        source: calamine::XlsxError,
        path: String,
        sheet: String,
    },
    #[snafu(display("Sheet {sheet:?} not found in {path} (available sheets: {available})"))]
    MissingSheet {
        sheet: String,
        path: String,
        available: String,
    },
    #[snafu(display("The workbook {path} has no sheets"))]
    EmptyWorkbook { path: String },
    #[snafu(display("Invalid sheet {sheet:?}: {source}"))]
    InvalidSheet { source: SheetErrors, sheet: String },
    #[snafu(display("{source}"))]
    Selection { source: SheetErrors },
    #[snafu(display("Error opening file {path}: {source}"))]
    OpeningJson { source: io::Error, path: String },
    #[snafu(display("Error parsing JSON: {source}"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing to {path}: {source}"))]
    WritingOutput { source: io::Error, path: String },
    #[snafu(display("Error reading the commands: {source}"))]
    ReadingInput { source: io::Error },
    #[snafu(display(
        "Unknown view {view:?}, expected one of summary, daily, ranking, heatmap, rivalry, all"
    ))]
    UnknownView { view: String },
    #[snafu(display("No workbook provided, use --input or a configuration file"))]
    MissingInput {},
    #[snafu(display("Cannot find the directory of the configuration file {path}"))]
    MissingParentDir { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashError>;

/// The parts of the dashboard to display.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum View {
    Summary,
    Daily,
    Ranking,
    Heatmap,
    Rivalry,
    All,
}

impl View {
    pub fn parse(s: &str) -> DashResult<View> {
        match s.trim().to_lowercase().as_str() {
            "summary" | "metrics" => Ok(View::Summary),
            "daily" => Ok(View::Daily),
            "ranking" => Ok(View::Ranking),
            "heatmap" => Ok(View::Heatmap),
            "rivalry" => Ok(View::Rivalry),
            "all" => Ok(View::All),
            x => UnknownViewSnafu { view: x }.fail(),
        }
    }

    pub fn shows(&self, part: View) -> bool {
        *self == View::All || *self == part
    }
}

/// The choices of the user, independent of the sheet.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Selection {
    /// None selects everybody.
    pub participants: Option<Vec<String>>,
    /// Missing rivals default to the first two participants.
    pub rivals: (Option<String>, Option<String>),
}

/// All the derived values of one sheet for one selection.
#[derive(PartialEq, Debug, Clone)]
pub struct Dashboard {
    pub sheet: String,
    pub days: Vec<String>,
    /// The day of the month of each day column, when it has one.
    pub day_numbers: Vec<Option<u32>>,
    pub metrics: Metrics,
    pub daily: Vec<f64>,
    pub ranking: Vec<RankEntry>,
    pub heatmap: Heatmap,
    /// None when the sheet has no participant.
    pub rivalry: Option<Rivalry>,
}

pub fn build_dashboard(table: &SheetTable, selection: &Selection) -> DashResult<Dashboard> {
    let selected = match &selection.participants {
        Some(names) => stats::select(table, names).context(SelectionSnafu {})?,
        None => stats::select_all(table),
    };
    debug!(
        "build_dashboard: {:?}: {} participants selected",
        table.sheet_name,
        selected.len()
    );

    let rivalry = match stats::default_rivals(table) {
        Some((a, b)) => {
            let first = selection.rivals.0.clone().unwrap_or(a);
            let second = selection.rivals.1.clone().unwrap_or(b);
            Some(stats::rivalry(table, &first, &second).context(SelectionSnafu {})?)
        }
        None => {
            warn!("build_dashboard: {:?} has no participant", table.sheet_name);
            None
        }
    };

    Ok(Dashboard {
        sheet: table.sheet_name.clone(),
        days: table.day_labels(),
        day_numbers: table.days.iter().map(|d| d.key.day_of_month()).collect(),
        metrics: stats::metrics(table, &selected),
        daily: stats::daily_sums(table, &selected),
        ranking: stats::ranking(&selected),
        heatmap: stats::heatmap(table, &selected),
        rivalry,
    })
}

// Counts are displayed as integers, averages with one decimal.
pub fn fmt_count(x: f64) -> String {
    format!("{}", x.round() as i64)
}

pub fn fmt_average(x: f64) -> String {
    format!("{:.1}", x)
}

pub fn build_summary_js(dash: &Dashboard) -> JSValue {
    let m = &dash.metrics;
    let daily: Vec<JSValue> = dash
        .days
        .iter()
        .zip(dash.day_numbers.iter())
        .zip(dash.daily.iter())
        .map(|((day, num), value)| json!({"day": day, "dayOfMonth": num, "value": value}))
        .collect();
    let ranking: Vec<JSValue> = dash
        .ranking
        .iter()
        .map(|r| json!({"member": r.name, "total": r.total, "kpd": r.average}))
        .collect();
    let rivalry = match &dash.rivalry {
        Some(r) => json!({
            "days": r.days,
            "series": [
                {"member": r.first.name, "values": r.first.values},
                {"member": r.second.name, "values": r.second.values},
            ]
        }),
        None => JSValue::Null,
    };
    json!({
        "sheet": dash.sheet,
        "days": dash.days,
        "metrics": {
            "selectionTotal": fmt_count(m.selection_total),
            "averagePerDay": fmt_average(m.average_per_day),
            "averagePerPerson": fmt_average(m.average_per_person),
            "sheetTotal": m.sheet_total.map(fmt_count),
        },
        "daily": daily,
        "ranking": ranking,
        "heatmap": {
            "members": dash.heatmap.rows,
            "days": dash.heatmap.columns,
            "values": dash.heatmap.values,
        },
        "rivalry": rivalry,
    })
}

/// The sheet to display: the requested one, or the last one of the workbook.
pub fn pick_sheet<S: SheetSource>(source: &S, requested: &Option<String>) -> DashResult<String> {
    let names = source.sheet_names();
    match requested {
        Some(s) if names.contains(s) => Ok(s.clone()),
        Some(s) => MissingSheetSnafu {
            sheet: s.clone(),
            path: source.path(),
            available: names.join(", "),
        }
        .fail(),
        None => names
            .last()
            .cloned()
            .context(EmptyWorkbookSnafu { path: source.path() }),
    }
}

fn write_output(path: &str, content: &str) -> DashResult<()> {
    if path == "stdout" {
        println!("{}", content);
        Ok(())
    } else {
        info!("Writing dashboard to {}", path);
        fs::write(path, content).context(WritingOutputSnafu { path })
    }
}

/// Compares the dashboard with a reference dashboard in JSON format.
pub fn check_reference(reference_path: &str, computed: &JSValue) -> DashResult<()> {
    let contents =
        fs::read_to_string(reference_path).context(OpeningJsonSnafu { path: reference_path })?;
    let reference: JSValue = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    let pretty_ref = serde_json::to_string_pretty(&reference).context(ParsingJsonSnafu {})?;
    let pretty_computed = serde_json::to_string_pretty(computed).context(ParsingJsonSnafu {})?;
    if pretty_ref != pretty_computed {
        warn!("Found differences with the reference dashboard");
        print_diff(pretty_ref.as_str(), pretty_computed.as_str(), "\n");
        whatever!(
            "Difference detected between the computed dashboard and the reference {}",
            reference_path
        )
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> DashResult<()> {
    let config = match &args.config {
        Some(p) => Some((p.clone(), read_config(p)?)),
        None => None,
    };
    let settings = resolve_settings(args, config.as_ref().map(|(p, c)| (p.as_str(), c)))?;

    let mut source = XlsxSource::open(&settings.workbook_path)?;

    if args.list_sheets {
        for name in source.sheet_names() {
            println!("{}", name);
        }
        return Ok(());
    }

    let sheet = pick_sheet(&source, &settings.sheet)?;
    let mut cache = SheetCache::new(&settings.options);

    if args.interactive {
        let mut s = session::Session::new(
            source,
            cache,
            &sheet,
            settings.selection.clone(),
            settings.view,
        );
        let stdin = io::stdin();
        let mut stdout = io::stdout();
        return s.run(stdin.lock(), &mut stdout);
    }

    let table = cache.load(&mut source, &sheet)?;
    for mismatch in stats::check_totals(&table, 0.5) {
        warn!("{:?}: declared total mismatch: {:?}", sheet, mismatch);
    }
    let dash = build_dashboard(&table, &settings.selection)?;
    println!("{}", render::render(&dash, settings.view));

    let summary_js = build_summary_js(&dash);
    if let Some(out) = &settings.out {
        let pretty = serde_json::to_string_pretty(&summary_js).context(ParsingJsonSnafu {})?;
        write_output(out, &pretty)?;
    }
    if let Some(reference) = &settings.reference {
        check_reference(reference, &summary_js)?;
    }
    Ok(())
}
