// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use serde::Serialize;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use trackseg_bbmm::{BbmmConfig, BbmmOutcome, Penalty};
use trackseg_cli::{CriterionSpec, SegmentReport, SegmentRequest, Table, run_bbmm, run_segment};
use trackseg_core::{ExecutionContext, SegError};
use trackseg_segment::{CombineMode, MonotoneSegmentationConfig};

struct Cli {
    command: Command,
}

enum Command {
    Segment(SegmentArgs),
    Bbmm(BbmmArgs),
}

#[derive(Debug)]
struct SegmentArgs {
    column: usize,
    criteria: Vec<String>,
    thresholds: Vec<f64>,
    combine: CombineMode,
    min_segment_len: Option<usize>,
    input: PathBuf,
    output: Option<PathBuf>,
}

impl Default for SegmentArgs {
    fn default() -> Self {
        Self {
            column: 0,
            criteria: vec![],
            thresholds: vec![],
            combine: CombineMode::All,
            min_segment_len: None,
            input: PathBuf::new(),
            output: None,
        }
    }
}

#[derive(Debug, Default)]
struct BbmmArgs {
    candidates: Option<usize>,
    penalty: Option<Penalty>,
    window: Option<usize>,
    input: PathBuf,
    output: Option<PathBuf>,
}

#[derive(Debug)]
enum CliError {
    Seg(SegError),
    Io {
        context: String,
        source: std::io::Error,
    },
    Csv(String),
    Json {
        context: String,
        source: serde_json::Error,
    },
    InvalidInput(String),
    NotSupported(String),
}

impl CliError {
    fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    fn not_supported(msg: impl Into<String>) -> Self {
        Self::NotSupported(msg.into())
    }

    fn csv(msg: impl Into<String>) -> Self {
        Self::Csv(msg.into())
    }

    fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            context: context.into(),
            source,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            Self::Seg(err) => err.code(),
            Self::InvalidInput(_) => "invalid_input",
            Self::NotSupported(_) => "not_supported",
            Self::Io { .. } => "io_error",
            Self::Csv(_) => "csv_error",
            Self::Json { .. } => "json_error",
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Seg(err) => write!(f, "{err}"),
            Self::Io { context, source } => write!(f, "{context}: {source}"),
            Self::Json { context, source } => write!(f, "{context}: {source}"),
            Self::Csv(msg) | Self::InvalidInput(msg) | Self::NotSupported(msg) => {
                write!(f, "{msg}")
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Seg(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::Csv(_) | Self::InvalidInput(_) | Self::NotSupported(_) => None,
        }
    }
}

impl From<SegError> for CliError {
    fn from(value: SegError) -> Self {
        Self::Seg(value)
    }
}

#[derive(Debug, Serialize)]
struct InputSummary {
    path: String,
    rows: usize,
    cols: usize,
}

#[derive(Debug, Serialize)]
struct CriterionConfig {
    criterion: &'static str,
    threshold: f64,
}

#[derive(Debug, Serialize)]
struct SegmentConfigSummary {
    column: usize,
    combine: &'static str,
    criteria: Vec<CriterionConfig>,
    monotone: MonotoneSegmentationConfig,
}

#[derive(Debug, Serialize)]
struct SegmentOutput {
    command: &'static str,
    input: InputSummary,
    config: SegmentConfigSummary,
    result: SegmentReport,
}

#[derive(Debug, Serialize)]
struct BbmmOutput {
    command: &'static str,
    input: InputSummary,
    config: BbmmConfig,
    segment_variances: Vec<f64>,
    result: BbmmOutcome,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let Some(cli) = parse_cli(&args)? else {
        return Ok(());
    };

    match cli.command {
        Command::Segment(args) => handle_segment(args),
        Command::Bbmm(args) => handle_bbmm(args),
    }
}

fn parse_cli(args: &[String]) -> Result<Option<Cli>, CliError> {
    let Some((command_name, rest)) = args.split_first() else {
        print_root_help();
        return Ok(None);
    };

    if matches!(command_name.as_str(), "-h" | "--help") {
        print_root_help();
        return Ok(None);
    }
    if matches!(command_name.as_str(), "-V" | "--version") {
        print_version();
        return Ok(None);
    }

    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-h" | "--help"))
    {
        print_command_help(command_name.as_str())?;
        return Ok(None);
    }
    if rest
        .iter()
        .any(|arg| matches!(arg.as_str(), "-V" | "--version"))
    {
        print_version();
        return Ok(None);
    }

    let command = match command_name.as_str() {
        "segment" => Command::Segment(parse_segment_args(rest)?),
        "bbmm" => Command::Bbmm(parse_bbmm_args(rest)?),
        _ => {
            return Err(CliError::invalid_input(format!(
                "unknown command '{command_name}'; expected one of: segment, bbmm"
            )));
        }
    };

    Ok(Some(Cli { command }))
}

fn parse_segment_args(tokens: &[String]) -> Result<SegmentArgs, CliError> {
    let mut args = SegmentArgs::default();
    let mut flags = FlagReader::new("segment", tokens);
    while let Some(flag) = flags.next_flag()? {
        match flag {
            "--column" => args.column = flags.parse_value(flag, "a non-negative integer")?,
            "--criterion" => args.criteria.push(flags.value(flag)?.to_string()),
            "--threshold" => args.thresholds.push(flags.parse_value(flag, "a number")?),
            "--combine" => args.combine = CombineMode::parse(flags.value(flag)?)?,
            "--min-segment-len" => {
                args.min_segment_len = Some(flags.parse_value(flag, "a non-negative integer")?);
            }
            "--input" => args.input = PathBuf::from(flags.value(flag)?),
            "--output" => args.output = Some(PathBuf::from(flags.value(flag)?)),
            other => return Err(flags.unknown(other)),
        }
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("segment requires --input <path>"));
    }
    if args.criteria.is_empty() {
        return Err(CliError::invalid_input(
            "segment requires at least one --criterion",
        ));
    }
    if args.criteria.len() != args.thresholds.len() {
        return Err(CliError::invalid_input(format!(
            "every --criterion needs a matching --threshold; got {} criteria and {} thresholds",
            args.criteria.len(),
            args.thresholds.len()
        )));
    }

    Ok(args)
}

fn parse_bbmm_args(tokens: &[String]) -> Result<BbmmArgs, CliError> {
    let mut args = BbmmArgs::default();
    let mut flags = FlagReader::new("bbmm", tokens);
    while let Some(flag) = flags.next_flag()? {
        match flag {
            "--candidates" => {
                args.candidates = Some(flags.parse_value(flag, "a non-negative integer")?);
            }
            "--penalty" => args.penalty = Some(Penalty::parse(flags.value(flag)?)?),
            "--window" => args.window = Some(flags.parse_value(flag, "a non-negative integer")?),
            "--input" => args.input = PathBuf::from(flags.value(flag)?),
            "--output" => args.output = Some(PathBuf::from(flags.value(flag)?)),
            other => return Err(flags.unknown(other)),
        }
    }

    if args.input.as_os_str().is_empty() {
        return Err(CliError::invalid_input("bbmm requires --input <path>"));
    }

    Ok(args)
}

/// Walks `--flag value` and `--flag=value` tokens of one subcommand.
struct FlagReader<'a> {
    command: &'static str,
    tokens: &'a [String],
    idx: usize,
    inline: Option<&'a str>,
}

impl<'a> FlagReader<'a> {
    fn new(command: &'static str, tokens: &'a [String]) -> Self {
        Self {
            command,
            tokens,
            idx: 0,
            inline: None,
        }
    }

    fn next_flag(&mut self) -> Result<Option<&'a str>, CliError> {
        let Some(token) = self.tokens.get(self.idx) else {
            return Ok(None);
        };
        self.idx += 1;
        if !token.starts_with("--") {
            return Err(CliError::invalid_input(format!(
                "unexpected positional argument '{token}'; expected --flag value"
            )));
        }
        let (flag, inline) = match token.split_once('=') {
            Some((flag, value)) => (flag, Some(value)),
            None => (token.as_str(), None),
        };
        self.inline = inline;
        Ok(Some(flag))
    }

    fn value(&mut self, flag: &str) -> Result<&'a str, CliError> {
        if let Some(value) = self.inline.take() {
            return Ok(value);
        }
        let value = self
            .tokens
            .get(self.idx)
            .ok_or_else(|| CliError::invalid_input(format!("{flag} requires a value")))?;
        if value.starts_with("--") {
            return Err(CliError::invalid_input(format!(
                "{flag} requires a value, but got option '{value}'"
            )));
        }
        self.idx += 1;
        Ok(value)
    }

    fn parse_value<T: FromStr>(&mut self, flag: &str, expected: &str) -> Result<T, CliError> {
        let raw = self.value(flag)?;
        raw.parse::<T>()
            .map_err(|_| CliError::invalid_input(format!("{flag} expects {expected}, got '{raw}'")))
    }

    fn unknown(&self, flag: &str) -> CliError {
        CliError::invalid_input(format!("unknown {} option '{flag}'", self.command))
    }
}

fn print_version() {
    println!("trackseg {}", env!("CARGO_PKG_VERSION"));
}

fn print_root_help() {
    println!(
        "trackseg {}\n\nUSAGE:\n  trackseg <COMMAND> [OPTIONS]\n\nCOMMANDS:\n  segment   Criteria-based segmentation of one CSV column\n  bbmm      Brownian-bridge segmentation of lat,lon,time fixes\n\nGLOBAL OPTIONS:\n  -h, --help      Show help\n  -V, --version   Show version\n\nRun 'trackseg <COMMAND> --help' for subcommand options.\nSet RUST_LOG=debug for driver logs on stderr.",
        env!("CARGO_PKG_VERSION")
    );
}

fn print_command_help(command: &str) -> Result<(), CliError> {
    match command {
        "segment" => {
            println!(
                "USAGE:\n  trackseg segment --input <csv> --criterion <name> --threshold <float> [OPTIONS]\n\nOPTIONS:\n  --column <usize>                         Default: 0 (meb reads this column and the next as x,y)\n  --criterion <difference|ratio|range|meb> Repeatable, paired with --threshold in order\n  --threshold <float>                      Repeatable\n  --combine <and|or>                       Default: and\n  --min-segment-len <usize>                Default: 2\n  --input <path>                           Required .csv\n  --output <path>                          Write JSON output to file"
            );
            Ok(())
        }
        "bbmm" => {
            println!(
                "USAGE:\n  trackseg bbmm --input <csv> [OPTIONS]\n\nOPTIONS:\n  --candidates <usize>     Default: 5\n  --penalty <bic|float>    Default: bic\n  --window <usize>         Default: 1\n  --input <path>           Required .csv with lat,lon,time columns\n  --output <path>          Write JSON output to file"
            );
            Ok(())
        }
        _ => Err(CliError::invalid_input(format!(
            "unknown command '{command}'; expected one of: segment, bbmm"
        ))),
    }
}

fn build_segment_request(args: &SegmentArgs) -> Result<SegmentRequest, CliError> {
    let criteria = args
        .criteria
        .iter()
        .zip(&args.thresholds)
        .map(|(name, &threshold)| CriterionSpec::parse(name, threshold))
        .collect::<Result<Vec<_>, _>>()?;
    let mut config = MonotoneSegmentationConfig::default();
    if let Some(min_segment_len) = args.min_segment_len {
        config.min_segment_len = min_segment_len;
    }
    Ok(SegmentRequest {
        column: args.column,
        criteria,
        mode: args.combine,
        config,
    })
}

fn build_bbmm_config(args: &BbmmArgs) -> BbmmConfig {
    let mut config = BbmmConfig::default();
    if let Some(candidates) = args.candidates {
        config.candidate_count = candidates;
    }
    if let Some(penalty) = args.penalty {
        config.penalty = penalty;
    }
    if let Some(window) = args.window {
        config.window = window;
    }
    config
}

fn handle_segment(args: SegmentArgs) -> Result<(), CliError> {
    let table = load_table(args.input.as_path())?;
    let request = build_segment_request(&args)?;
    let report = run_segment(&table, &request, &ExecutionContext::new())?;

    write_json_output(
        &SegmentOutput {
            command: "segment",
            input: summarize(args.input.as_path(), &table),
            config: SegmentConfigSummary {
                column: request.column,
                combine: request.mode.as_str(),
                criteria: request
                    .criteria
                    .iter()
                    .map(|spec| CriterionConfig {
                        criterion: spec.name(),
                        threshold: spec.threshold(),
                    })
                    .collect(),
                monotone: request.config,
            },
            result: report,
        },
        args.output.as_deref(),
    )
}

fn handle_bbmm(args: BbmmArgs) -> Result<(), CliError> {
    let table = load_table(args.input.as_path())?;
    let fixes = table.fixes()?;
    let config = build_bbmm_config(&args);
    let outcome = run_bbmm(&fixes, config.clone(), &ExecutionContext::new())?;

    write_json_output(
        &BbmmOutput {
            command: "bbmm",
            input: summarize(args.input.as_path(), &table),
            config,
            segment_variances: outcome.segment_variances(),
            result: outcome,
        },
        args.output.as_deref(),
    )
}

fn summarize(path: &Path, table: &Table) -> InputSummary {
    InputSummary {
        path: path.display().to_string(),
        rows: table.rows,
        cols: table.cols,
    }
}

fn load_table(path: &Path) -> Result<Table, CliError> {
    let extension = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| {
            CliError::not_supported(format!(
                "unable to infer input format for '{}'; expected .csv",
                path.display()
            ))
        })?;
    if extension != "csv" {
        return Err(CliError::not_supported(format!(
            "unsupported input format '{extension}'; expected .csv"
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|source| CliError::io(format!("failed to read '{}'", path.display()), source))?;
    parse_csv_table(raw.as_str())
}

/// Reads a comma-separated numeric table. A first row made only of
/// non-numeric cells is taken as a header and skipped.
fn parse_csv_table(raw: &str) -> Result<Table, CliError> {
    let mut rows = raw
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
        .peekable();

    if let Some((_, first)) = rows.peek()
        && first.split(',').all(|cell| {
            let cell = cell.trim();
            !cell.is_empty() && cell.parse::<f64>().is_err()
        })
    {
        rows.next();
    }

    let mut values = Vec::new();
    let mut cols: Option<usize> = None;
    let mut row_count = 0usize;
    for (line_no, line) in rows {
        let before = values.len();
        for (col_idx, cell) in line.split(',').map(str::trim).enumerate() {
            if cell.is_empty() {
                return Err(CliError::csv(format!(
                    "CSV line {line_no} column {} is empty",
                    col_idx + 1
                )));
            }
            let value = cell.parse::<f64>().map_err(|_| {
                CliError::csv(format!(
                    "CSV line {line_no} column {} is not a valid float: '{cell}'",
                    col_idx + 1
                ))
            })?;
            values.push(value);
        }
        let width = values.len() - before;
        match cols {
            Some(expected) if expected != width => {
                return Err(CliError::csv(format!(
                    "CSV line {line_no} has {width} columns but expected {expected}"
                )));
            }
            Some(_) => {}
            None => cols = Some(width),
        }
        row_count += 1;
    }

    let cols = cols.ok_or_else(|| CliError::csv("CSV input has no data rows"))?;
    Ok(Table::new(values, row_count, cols)?)
}

fn write_json_output<T: Serialize>(
    payload: &T,
    output_path: Option<&Path>,
) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn emit_structured_error(err: &CliError) {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    match serde_json::to_string_pretty(&envelope) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        ),
    }
}
