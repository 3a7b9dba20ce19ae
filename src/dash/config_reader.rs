use crate::args::Args;
use crate::dash::*;

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelConfig {
    pub member: Option<Vec<String>>,
    pub total: Option<Vec<String>>,
    pub average: Option<Vec<String>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashConfig {
    #[serde(rename = "workbookPath")]
    pub workbook_path: Option<String>,
    #[serde(rename = "sheetName")]
    pub sheet_name: Option<String>,
    pub participants: Option<Vec<String>>,
    pub rivals: Option<Vec<String>>,
    pub view: Option<String>,
    #[serde(rename = "outputPath")]
    pub output_path: Option<String>,
    #[serde(rename = "yearHint")]
    pub year_hint: Option<i32>,
    pub labels: Option<LabelConfig>,
}

/// Everything needed to run the dashboard, after merging the command line and
/// the configuration file.
#[derive(PartialEq, Debug, Clone)]
pub struct Settings {
    pub workbook_path: String,
    /// None selects the last sheet of the workbook.
    pub sheet: Option<String>,
    pub selection: Selection,
    pub view: View,
    pub out: Option<String>,
    pub reference: Option<String>,
    pub options: LoadOptions,
}

pub fn read_config(path: &str) -> DashResult<DashConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashConfig = serde_json::from_str(&contents).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

impl LabelConfig {
    /// Replaces the default label sets with the ones provided.
    pub fn apply(&self, labels: &LabelSets) -> LabelSets {
        LabelSets {
            member: self.member.clone().unwrap_or_else(|| labels.member.clone()),
            total: self.total.clone().unwrap_or_else(|| labels.total.clone()),
            average: self.average.clone().unwrap_or_else(|| labels.average.clone()),
        }
    }
}

fn clean_names(names: &[String]) -> Vec<String> {
    names
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Merges the command line arguments with the configuration file, if any.
///
/// A relative workbook path in the configuration is resolved against the
/// directory of the configuration file.
pub fn resolve_settings(args: &Args, config: Option<(&str, &DashConfig)>) -> DashResult<Settings> {
    let default_config = DashConfig::default();
    let (config_path, config) = match config {
        Some((p, c)) => (Some(p), c),
        None => (None, &default_config),
    };

    let workbook_path = match (&args.input, &config.workbook_path, config_path) {
        (Some(p), _, _) => p.clone(),
        (None, Some(p), Some(cp)) if Path::new(p).is_relative() => {
            let root = Path::new(cp)
                .parent()
                .context(MissingParentDirSnafu { path: cp })?;
            let full: PathBuf = root.join(p);
            full.display().to_string()
        }
        (None, Some(p), _) => p.clone(),
        (None, None, _) => return MissingInputSnafu {}.fail(),
    };

    let participants = args
        .participants
        .as_ref()
        .or(config.participants.as_ref())
        .map(|ps| clean_names(ps))
        .filter(|ps| !ps.is_empty());

    let config_rivals = config.rivals.clone().unwrap_or_default();
    let rivals = (
        args.rival_a.clone().or_else(|| config_rivals.first().cloned()),
        args.rival_b.clone().or_else(|| config_rivals.get(1).cloned()),
    );

    let view = match args.view.as_ref().or(config.view.as_ref()) {
        Some(v) => View::parse(v)?,
        None => View::All,
    };

    let labels = config
        .labels
        .as_ref()
        .map(|l| l.apply(&LabelSets::default()))
        .unwrap_or_default();

    let res = Settings {
        workbook_path,
        sheet: args.sheet.clone().or_else(|| config.sheet_name.clone()),
        selection: Selection {
            participants,
            rivals,
        },
        view,
        out: args.out.clone().or_else(|| config.output_path.clone()),
        reference: args.reference.clone(),
        options: LoadOptions {
            labels,
            year_hint: config.year_hint,
        },
    };
    info!("resolve_settings: {:?}", res);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn args(xs: &[&str]) -> Args {
        let mut v = vec!["tallydash"];
        v.extend_from_slice(xs);
        Args::parse_from(v)
    }

    #[test]
    fn command_line_only() {
        let a = args(&["-i", "book.xlsx", "-p", "Ana, Beto", "--view", "ranking"]);
        let s = resolve_settings(&a, None).unwrap();
        assert_eq!(s.workbook_path, "book.xlsx");
        assert_eq!(s.sheet, None);
        assert_eq!(
            s.selection.participants,
            Some(vec!["Ana".to_string(), "Beto".to_string()])
        );
        assert_eq!(s.selection.rivals, (None, None));
        assert_eq!(s.view, View::Ranking);
        assert_eq!(s.options, LoadOptions::default());
    }

    #[test]
    fn missing_workbook() {
        let res = resolve_settings(&args(&[]), None);
        assert!(matches!(res, Err(DashError::MissingInput {})));
    }

    #[test]
    fn unknown_view() {
        let res = resolve_settings(&args(&["-i", "b.xlsx", "--view", "pie"]), None);
        assert!(matches!(res, Err(DashError::UnknownView { .. })));
    }

    #[test]
    fn config_file_is_merged() {
        let js = r#"{
            "workbookPath": "data/book.xlsx",
            "sheetName": "2024",
            "participants": ["Ana"],
            "rivals": ["Ana", "Beto"],
            "view": "heatmap",
            "labels": {"member": ["runner"]}
        }"#;
        let config: DashConfig = serde_json::from_str(js).unwrap();
        let s = resolve_settings(
            &args(&["--rival-b", "Carla", "--sheet", "2025"]),
            Some(("/srv/dash/config.json", &config)),
        )
        .unwrap();
        assert_eq!(s.workbook_path, "/srv/dash/data/book.xlsx");
        assert_eq!(s.sheet, Some("2025".to_string()));
        assert_eq!(s.selection.participants, Some(vec!["Ana".to_string()]));
        assert_eq!(
            s.selection.rivals,
            (Some("Ana".to_string()), Some("Carla".to_string()))
        );
        assert_eq!(s.view, View::Heatmap);
        assert_eq!(s.options.labels.member, vec!["runner".to_string()]);
        assert_eq!(s.options.labels.total, LabelSets::default().total);
    }

    #[test]
    fn absolute_workbook_path_is_kept() {
        let config = DashConfig {
            workbook_path: Some("/data/book.xlsx".to_string()),
            ..DashConfig::default()
        };
        let s = resolve_settings(&args(&[]), Some(("conf/c.json", &config))).unwrap();
        assert_eq!(s.workbook_path, "/data/book.xlsx");
    }

    #[test]
    fn missing_config_file() {
        assert!(matches!(
            read_config("/nonexistent/tallydash.json"),
            Err(DashError::OpeningJson { .. })
        ));
    }
}
