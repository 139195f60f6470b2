use log::{debug, info, warn};

use competency_core::builder::Builder;
use competency_core::sample::sample_state;
use competency_core::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::{Args, Command};
use crate::dash::config_reader::*;
use crate::dash::io_common::read_rows;
use crate::dash::report::{GeminiReporter, ReportGenerator};
use crate::dash::store::StateStore;

mod config_reader;
mod io_common;
mod io_csv;
mod io_excel;
mod io_zip;
mod report;
mod store;
mod template;

#[derive(Debug, Snafu)]
pub enum DashError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::Error,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Error parsing CSV file {path}"))]
    CsvParse { source: csv::Error, path: String },
    #[snafu(display("Error reading archive {path}"))]
    ZipOpen {
        source: zip::result::ZipError,
        path: String,
    },
    #[snafu(display("Error reading entry {entry} of archive {path}"))]
    ZipEntry {
        source: std::io::Error,
        path: String,
        entry: String,
    },
    #[snafu(display("Unsupported input {path}: expected csv, xlsx, xlsm, xls, ods or zip"))]
    UnsupportedInput { path: String },
    #[snafu(display("No survey responses found in {path}"))]
    NoRows { path: String },
    #[snafu(display("Error opening JSON file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error writing {path}"))]
    WritingFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error writing CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },
    #[snafu(display("The state lock was poisoned"))]
    PoisonedLock {},
    #[snafu(display("Unknown department {name}"))]
    UnknownDepartment { name: String },
    #[snafu(display("Unknown category {name}"))]
    UnknownCategory { name: String },
    #[snafu(display("Request to the report service failed"))]
    HttpRequest { source: reqwest::Error },
    #[snafu(display("The report service returned status {status}: {body}"))]
    HttpStatus { status: u16, body: String },
    #[snafu(display("The report service returned no text"))]
    EmptyReport {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, Box<DashError>>;

fn today() -> String {
    chrono::Utc::now().format("%Y-%m-%d").to_string()
}

fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// The summary printed after an upload. The mapping and the timestamp of the
/// state are left out.
fn build_summary_js(state: &AppState) -> DashResult<JSValue> {
    Ok(json!({
        "university": serde_json::to_value(&state.university).context(ParsingJsonSnafu {})?,
        "categories": serde_json::to_value(&state.categories).context(ParsingJsonSnafu {})?,
        "departments": serde_json::to_value(&state.departments).context(ParsingJsonSnafu {})?,
    }))
}

fn write_output(out: &str, contents: &str) -> DashResult<()> {
    if out == "stdout" {
        println!("{}", contents);
    } else {
        fs::write(out, contents).context(WritingFileSnafu { path: out })?;
        info!("write_output: summary written to {:?}", out);
    }
    Ok(())
}

fn check_reference(reference_path: &str, summary: &JSValue) -> Result<(), DashError> {
    let summary_ref = read_summary(reference_path).map_err(|e| *e)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&without_dates(summary)).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(
            pretty_js_summary_ref.as_str(),
            pretty_js_stats.as_ref(),
            "\n",
        );
        whatever!("Difference detected between calculated summary and reference summary")
    }
    info!("check_reference: summary matches {:?}", reference_path);
    Ok(())
}

pub fn run_upload(
    store: &StateStore,
    input: &str,
    out: Option<&str>,
    reference: Option<&str>,
) -> DashResult<AppState> {
    let raw_rows = read_rows(input)?;
    info!("upload: read {} rows from {:?}", raw_rows.len(), input);

    let mut builder = Builder::new(&today());
    for r in raw_rows.iter() {
        builder.add_raw_row(r);
    }
    let state = AppState::from_rollup(builder.rollup(), &now_timestamp());

    let summary = build_summary_js(&state)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;
    write_output(out.unwrap_or("stdout"), &pretty_js_stats)?;

    // The reference summary, if provided for comparison. A mismatch leaves
    // the stored state untouched.
    if let Some(reference_path) = reference {
        check_reference(reference_path, &summary)?;
    }
    store.replace_state(state.clone())?;
    Ok(state)
}

fn run_show(store: &StateStore, dept: Option<&str>, category: Option<&str>) -> DashResult<()> {
    let state = store.get_state()?;
    let js = match (dept, category) {
        (Some(name), _) => {
            let d = state
                .department(name)
                .context(UnknownDepartmentSnafu { name })?;
            serde_json::to_value(d).context(ParsingJsonSnafu {})?
        }
        (None, Some(name)) => {
            let c = state
                .category(name)
                .context(UnknownCategorySnafu { name })?;
            let depts: Vec<&str> = state
                .departments_in(name)
                .iter()
                .map(|d| d.dept_name.as_str())
                .collect();
            json!({
                "category": serde_json::to_value(c).context(ParsingJsonSnafu {})?,
                "departments": depts,
            })
        }
        (None, None) => json!({
            "lastUpdated": state.last_updated,
            "university": serde_json::to_value(&state.university).context(ParsingJsonSnafu {})?,
            "categories": state
                .categories
                .iter()
                .map(|c| json!({"categoryName": c.category_name, "deptCount": c.dept_count, "n": c.summary.n}))
                .collect::<Vec<JSValue>>(),
        }),
    };
    let pretty = serde_json::to_string_pretty(&js).context(ParsingJsonSnafu {})?;
    println!("{}", pretty);
    Ok(())
}

fn run_report(
    store: &StateStore,
    reporter: &dyn ReportGenerator,
    dept: &str,
    instruction: Option<&str>,
) -> DashResult<()> {
    let state = store.get_state()?;
    let d = state
        .department(dept)
        .context(UnknownDepartmentSnafu { name: dept })?;
    println!("{}", reporter.dept_report(d, &state.university, instruction));
    Ok(())
}

/// Writes the state to `path`, or to a dated file inside `path` when it is a
/// directory. Returns the file written.
pub fn export_state(state: &AppState, path: &Path) -> DashResult<PathBuf> {
    let target = if path.is_dir() {
        path.join(format!("KYU_Competency_Data_{}.json", today()))
    } else {
        path.to_path_buf()
    };
    let pretty = serde_json::to_string_pretty(state).context(ParsingJsonSnafu {})?;
    fs::write(&target, pretty).context(WritingFileSnafu {
        path: target.display().to_string(),
    })?;
    info!("export_state: state written to {:?}", target);
    Ok(target)
}

pub fn run(args: &Args) -> DashResult<()> {
    let mut config = match args.config.as_deref() {
        Some(p) => read_config(p)?,
        None => DashConfig::default(),
    };
    if let Some(dir) = args.state_dir.clone() {
        config.storage_directory = dir;
    }
    debug!("run: config: {:?}", config);

    // Only the commands that read or replace the state open the store.
    let open_store =
        || StateStore::open(Path::new(&config.storage_directory), &config.storage_key);

    match &args.command {
        Command::Upload {
            input,
            out,
            reference,
        } => {
            run_upload(&open_store()?, input, out.as_deref(), reference.as_deref())?;
        }
        Command::Show { dept, category } => {
            run_show(&open_store()?, dept.as_deref(), category.as_deref())?;
        }
        Command::Report { dept, instruction } => {
            let reporter = GeminiReporter::new(&config.report);
            run_report(&open_store()?, &reporter, dept, instruction.as_deref())?;
        }
        Command::Chat { message } => {
            let reporter = GeminiReporter::new(&config.report);
            let state = open_store()?.get_state()?;
            println!("{}", reporter.chat(message, &state));
        }
        Command::Reset => {
            open_store()?.replace_state(sample_state(&now_timestamp()))?;
            info!("run: state reset to the sample data");
        }
        Command::Export { path } => {
            let state = open_store()?.get_state()?;
            let target = export_state(&state, Path::new(path))?;
            println!("{}", target.display());
        }
        Command::Template { path } => {
            template::write_template(path)?;
        }
    }
    Ok(())
}
