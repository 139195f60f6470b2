use clap::{Parser, Subcommand};

/// This is a tabulation and reporting program for the core-competency survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. For more information about the file format,
    /// read the manual of the competency_core crate.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) Where the dashboard state is stored. Setting this option overrides the
    /// storageDirectory value that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub state_dir: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Reads a survey export (csv, xlsx, xls, ods or a zip of those) and replaces the current data.
    Upload {
        /// (file path) The survey responses.
        #[clap(value_parser)]
        input: String,

        /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in
        /// JSON format to the given location.
        #[clap(short, long, value_parser)]
        out: Option<String>,

        /// (file path) A reference file containing a summary in JSON format. If provided, compdash
        /// will check that the computed summary matches the reference.
        #[clap(short, long, value_parser)]
        reference: Option<String>,
    },
    /// Prints the current data: the university, a category or a department.
    Show {
        #[clap(long, value_parser)]
        dept: Option<String>,

        #[clap(long, value_parser)]
        category: Option<String>,
    },
    /// Writes an analysis report for a department.
    Report {
        #[clap(value_parser)]
        dept: String,

        /// (optional) Additional instructions for the report.
        #[clap(long, value_parser)]
        instruction: Option<String>,
    },
    /// Asks a free-form question about the whole survey.
    Chat {
        #[clap(value_parser)]
        message: String,
    },
    /// Replaces the current data with the sample data.
    Reset,
    /// Writes the current data in JSON format to a file or a directory.
    Export {
        #[clap(value_parser)]
        path: String,
    },
    /// Writes an empty CSV upload template.
    Template {
        #[clap(value_parser)]
        path: String,
    },
}
