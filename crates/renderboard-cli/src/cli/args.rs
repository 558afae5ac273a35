use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use renderboard_charts::StackMode;
use renderboard_core::{JobQuery, TaskBucket, TaskType};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "renderboard",
    version,
    about = "Usage, cost and quality reports for generation jobs"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Config file; defaults apply when the default file does not exist
    #[arg(long, global = true, default_value = "renderboard.yaml")]
    pub config: PathBuf,

    /// Reject unknown config keys
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// SQLite database (overrides store.path)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Collection inside the database (overrides store.collection)
    #[arg(long, global = true)]
    pub collection: Option<String>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write a sample config file
    Init(InitArgs),
    /// Load job documents (JSON lines or a JSON array) into the store
    Import(ImportArgs),
    /// Requests and cost per task bucket
    Overview(OverviewArgs),
    /// Model comparison within one task type
    Breakdown(BreakdownArgs),
    /// Title → color assignment
    Palette(PaletteArgs),
    /// Dump enriched rows
    Enrich(EnrichArgs),
    /// Store contents and per-bucket totals
    Stats(StatsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Store-side filter.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Only jobs of these model ids (repeatable)
    #[arg(long = "model-id")]
    pub model_ids: Vec<String>,

    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub limit: Option<u32>,
}

impl QueryArgs {
    pub fn to_query(&self) -> JobQuery {
        JobQuery {
            model_ids: (!self.model_ids.is_empty()).then(|| self.model_ids.clone()),
            status: self.status.clone(),
            limit: self.limit,
        }
    }
}

/// Inclusive creation-date range (YYYY-MM-DD).
#[derive(Args, Debug, Clone, Default)]
pub struct DateArgs {
    #[arg(long)]
    pub from: Option<NaiveDate>,

    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModeArg {
    #[default]
    Absolute,
    Percent,
}

impl From<ModeArg> for StackMode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Absolute => StackMode::Absolute,
            ModeArg::Percent => StackMode::Percent,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct OverviewArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub dates: DateArgs,

    /// Only these buckets (repeatable); all when omitted
    #[arg(long = "bucket")]
    pub buckets: Vec<TaskBucket>,

    #[arg(long, value_enum, default_value_t = ModeArg::Absolute)]
    pub mode: ModeArg,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Args, Debug, Clone)]
pub struct BreakdownArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub dates: DateArgs,

    /// Task type; defaults to charts.default_task
    #[arg(long)]
    pub task: Option<TaskType>,

    /// Titles kept before folding into "Other"; defaults to charts.top_n
    #[arg(long)]
    pub top_n: Option<usize>,

    #[arg(long, value_enum, default_value_t = ModeArg::Absolute)]
    pub mode: ModeArg,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

#[derive(Args, Debug, Clone)]
pub struct PaletteArgs {
    /// Titles to color; when omitted, every title in the store weighted by total cost
    pub titles: Vec<String>,

    /// TITLE=WEIGHT (repeatable)
    #[arg(long = "weight", value_parser = parse_weight)]
    pub weights: Vec<(String, f64)>,

    #[command(flatten)]
    pub query: QueryArgs,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}

fn parse_weight(s: &str) -> Result<(String, f64), String> {
    let (title, weight) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected TITLE=WEIGHT, got '{s}'"))?;
    let weight: f64 = weight
        .trim()
        .parse()
        .map_err(|_| format!("weight for '{title}' is not a number: '{weight}'"))?;
    if !weight.is_finite() {
        return Err(format!("weight for '{title}' must be finite, got '{weight}'"));
    }
    Ok((title.to_string(), weight))
}

#[derive(Args, Debug, Clone)]
pub struct EnrichArgs {
    #[command(flatten)]
    pub query: QueryArgs,

    #[command(flatten)]
    pub dates: DateArgs,

    /// Write JSON lines here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,
}
