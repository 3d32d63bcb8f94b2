use super::toml_config::QueryConfig;
use super::{
    DatasetKind, FetchMode, FetchSettings, MatchSettings, MergeSettings, DEFAULT_COMPANIES_CSV,
    DEFAULT_FINANCIAL_CSV, DEFAULT_MATCHED_CSV, DEFAULT_MERGED_CSV,
};
use crate::core::matching::{MatchColumns, MatcherOptions};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "company-etl")]
#[command(about = "Fetch, merge and fuzzy-match company datasets")]
pub struct CliConfig {
    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value = "text")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Page through the search API and export the results to CSV
    Fetch(FetchArgs),
    /// Left-join financial data onto the company list
    Merge(MergeArgs),
    /// Fuzzy-match company names against a master list
    Match(MatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    #[arg(long, value_enum, default_value = "companies")]
    pub dataset: DatasetKind,

    #[arg(long, value_enum, default_value = "all")]
    pub mode: FetchMode,

    /// Existing companies CSV (used by --mode existing)
    #[arg(long, default_value = DEFAULT_COMPANIES_CSV)]
    pub input_csv: String,

    /// Defaults to companies_2024.csv or companies_financial_2024.csv
    #[arg(long)]
    pub output_csv: Option<String>,

    /// Override the search endpoint (the API key is appended as user_key)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// TOML file with the date range, facets, page limit and delay
    #[arg(long)]
    pub query_config: Option<String>,
}

impl FetchArgs {
    pub fn into_settings(self) -> Result<FetchSettings> {
        let query = match &self.query_config {
            Some(path) => QueryConfig::from_file(path)?,
            None => QueryConfig::default(),
        };

        let mut settings = FetchSettings::new(self.dataset, query);
        settings.mode = self.mode;
        settings.input_csv = self.input_csv;
        if let Some(output) = self.output_csv {
            settings.output_csv = output;
        }
        if let Some(endpoint) = self.endpoint {
            settings.endpoint = endpoint;
        }
        Ok(settings)
    }
}

#[derive(Debug, Clone, Args)]
pub struct MergeArgs {
    #[arg(long, default_value = DEFAULT_COMPANIES_CSV)]
    pub companies: String,

    #[arg(long, default_value = DEFAULT_FINANCIAL_CSV)]
    pub financial: String,

    #[arg(long, default_value = DEFAULT_MERGED_CSV)]
    pub output: String,
}

impl From<MergeArgs> for MergeSettings {
    fn from(args: MergeArgs) -> Self {
        Self {
            companies_csv: args.companies,
            financial_csv: args.financial,
            output_csv: args.output,
        }
    }
}

#[derive(Debug, Clone, Args)]
pub struct MatchArgs {
    /// Master list matched against in full
    #[arg(long, default_value = "samplecrunchbase3.csv")]
    pub master: String,

    /// Names to match; only the first --sample-size rows are used
    #[arg(long, default_value = "samplepitchbook3.csv")]
    pub queries: String,

    #[arg(long, default_value = DEFAULT_MATCHED_CSV)]
    pub output: String,

    #[arg(long, default_value = "100")]
    pub sample_size: usize,

    #[arg(long, default_value = "co1")]
    pub master_column: String,

    #[arg(long, default_value = "co2")]
    pub query_column: String,

    #[arg(long, default_value = "idp")]
    pub id_column: String,

    #[arg(long, default_value = "10")]
    pub top_n: usize,
}

impl From<MatchArgs> for MatchSettings {
    fn from(args: MatchArgs) -> Self {
        Self {
            master_csv: args.master,
            queries_csv: args.queries,
            output_csv: args.output,
            sample_size: args.sample_size,
            columns: MatchColumns {
                master_name: args.master_column,
                query_name: args.query_column,
                query_id: args.id_column,
            },
            matcher: MatcherOptions {
                top_n: args.top_n,
                ..MatcherOptions::default()
            },
        }
    }
}
