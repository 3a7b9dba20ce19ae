use std::io::{BufRead, Write};

use crate::dash::io_xlsx::{SheetCache, SheetSource};
use crate::dash::*;

const HELP: &str = "Commands:
  sheets                 list the sheets of the workbook
  sheet <name>           display another sheet
  select <a, b, ...>     restrict the dashboard to some participants
  select all             select all the participants
  rivals <a>, <b>        choose the two participants of the rivalry view
  view <name>            summary, daily, ranking, heatmap, rivalry or all
  show                   display the dashboard again
  check                  compare the declared totals with the daily counts
  help                   this message
  quit                   leave the session";

#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Command {
    Sheets,
    Sheet(String),
    /// None selects everybody.
    Select(Option<Vec<String>>),
    Rivals(String, String),
    View(View),
    Show,
    Check,
    Help,
    Quit,
}

fn split_names(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parses one line of input. Empty lines give None.
pub fn parse_command(line: &str) -> DashResult<Option<Command>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((v, r)) => (v, r.trim()),
        None => (line, ""),
    };
    let cmd = match (verb.to_lowercase().as_str(), rest) {
        ("sheets", "") => Command::Sheets,
        ("sheet", name) if !name.is_empty() => Command::Sheet(name.to_string()),
        ("select", "all") | ("select", "") => Command::Select(None),
        ("select", names) => Command::Select(Some(split_names(names))),
        ("rivals", names) => match split_names(names).as_slice() {
            [a] => Command::Rivals(a.clone(), a.clone()),
            [a, b] => Command::Rivals(a.clone(), b.clone()),
            _ => whatever!("rivals expects one or two comma-separated names, got {:?}", names),
        },
        ("view", name) => Command::View(View::parse(name)?),
        ("show", "") => Command::Show,
        ("check", "") => Command::Check,
        ("help", _) | ("?", _) => Command::Help,
        ("quit", "") | ("exit", "") | ("q", "") => Command::Quit,
        _ => whatever!("Unknown command {:?}, type help for the list of commands", line),
    };
    Ok(Some(cmd))
}

/// An interactive session over one workbook.
///
/// Every command recomputes the dashboard from the cached sheet.
pub struct Session<S: SheetSource> {
    source: S,
    cache: SheetCache,
    sheet: String,
    selection: Selection,
    view: View,
}

impl<S: SheetSource> Session<S> {
    pub fn new(
        source: S,
        cache: SheetCache,
        sheet: &str,
        selection: Selection,
        view: View,
    ) -> Session<S> {
        Session {
            source,
            cache,
            sheet: sheet.to_string(),
            selection,
            view,
        }
    }

    fn show(&mut self) -> DashResult<String> {
        let table = self.cache.load(&mut self.source, &self.sheet)?;
        let dash = build_dashboard(&table, &self.selection)?;
        Ok(render::render(&dash, self.view))
    }

    /// Applies a command and returns what should be displayed.
    pub fn execute(&mut self, cmd: &Command) -> DashResult<String> {
        debug!("execute: {:?}", cmd);
        match cmd {
            Command::Sheets => Ok(self.source.sheet_names().join("\n")),
            Command::Sheet(name) => {
                let sheet = pick_sheet(&self.source, &Some(name.clone()))?;
                // Names may not exist in another period.
                self.cache.load(&mut self.source, &sheet)?;
                info!("Switching to sheet {:?}", sheet);
                self.sheet = sheet;
                self.selection = Selection::default();
                self.show()
            }
            Command::Select(names) => {
                let table = self.cache.load(&mut self.source, &self.sheet)?;
                if let Some(ns) = names {
                    stats::select(&table, ns).context(SelectionSnafu {})?;
                }
                self.selection.participants = names.clone();
                self.show()
            }
            Command::Rivals(a, b) => {
                let table = self.cache.load(&mut self.source, &self.sheet)?;
                stats::rivalry(&table, a, b).context(SelectionSnafu {})?;
                self.selection.rivals = (Some(a.clone()), Some(b.clone()));
                self.show()
            }
            Command::View(v) => {
                self.view = *v;
                self.show()
            }
            Command::Show => self.show(),
            Command::Check => {
                let table = self.cache.load(&mut self.source, &self.sheet)?;
                let mismatches = stats::check_totals(&table, 0.5);
                if mismatches.is_empty() {
                    Ok("The declared totals match the daily counts.".to_string())
                } else {
                    Ok(mismatches
                        .iter()
                        .map(|m| match m {
                            TotalMismatch::Participant {
                                name,
                                declared,
                                computed,
                            } => format!(
                                "{}: declared {}, counted {}",
                                name,
                                fmt_count(*declared),
                                fmt_count(*computed)
                            ),
                            TotalMismatch::TotalRow { declared, computed } => format!(
                                "Total row: declared {}, counted {}",
                                fmt_count(*declared),
                                fmt_count(*computed)
                            ),
                        })
                        .collect::<Vec<String>>()
                        .join("\n"))
                }
            }
            Command::Help => Ok(HELP.to_string()),
            Command::Quit => Ok("".to_string()),
        }
    }

    /// Reads commands until the end of the input or `quit`.
    ///
    /// A failing command is reported and the session goes on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> DashResult<()> {
        let first = self.show()?;
        writeln!(out, "{}\n\nType help for the list of commands.", first)
            .context(WritingOutputSnafu { path: "session" })?;
        for line in input.lines() {
            let line = line.context(ReadingInputSnafu {})?;
            let text = match parse_command(&line) {
                Ok(None) => continue,
                Ok(Some(Command::Quit)) => break,
                Ok(Some(cmd)) => self.execute(&cmd),
                Err(e) => Err(e),
            };
            let written = match text {
                Ok(t) => writeln!(out, "{}", t),
                Err(e) => {
                    warn!("Command {:?} failed: {:?}", line, e);
                    writeln!(out, "error: {}", e)
                }
            };
            written.context(WritingOutputSnafu { path: "session" })?;
        }
        Ok(())
    }

    pub fn sheet(&self) -> &str {
        &self.sheet
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}
