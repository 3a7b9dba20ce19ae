use clap::Parser;

/// A dashboard for spreadsheets of daily tallied counts.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. The command line options take
    /// precedence over the content of this file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The workbook (.xlsx) with one sheet per period. Setting this option overrides
    /// the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default: the last sheet) The name of the sheet to display.
    #[clap(short, long, value_parser)]
    pub sheet: Option<String>,

    /// (list of comma-separated names or not specified) The participants to include in the
    /// metrics, the daily chart, the ranking and the heatmap. All of them by default.
    #[clap(short, long, value_parser, value_delimiter = ',')]
    pub participants: Option<Vec<String>>,

    /// The first participant of the rivalry view.
    #[clap(long, value_parser)]
    pub rival_a: Option<String>,

    /// The second participant of the rivalry view.
    #[clap(long, value_parser)]
    pub rival_b: Option<String>,

    /// (default all) One of summary, daily, ranking, heatmap, rivalry, all.
    #[clap(long, value_parser)]
    pub view: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the whole dashboard will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing a dashboard in JSON format. If provided, tallydash
    /// will check that the computed dashboard matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// Lists the sheets of the workbook and exits.
    #[clap(long, takes_value = false)]
    pub list_sheets: bool,

    /// Starts an interactive session reading commands from the standard input.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
