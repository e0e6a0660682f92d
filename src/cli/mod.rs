use std::{path::PathBuf, sync::Arc};

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::run_http_server;
use crate::core::{AllocationError, AllocationInput, calculate, parse_amount, render_summary};
use crate::settings::{
    DefaultsError, JsonFileStore, Settings, SettingsError, SettingsStore, reset_defaults,
    save_defaults,
};

#[derive(Parser, Debug)]
#[command(
    name = "profit-first",
    about = "Profit First + sales tax deposit allocation calculator"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Settings file to use instead of the per-user default"
    )]
    pub settings_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the calculator form on http://127.0.0.1:<port>/
    Serve {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
    /// Allocate a deposit and print the summary
    Calc(CalcArgs),
    /// Inspect or change the saved defaults
    #[command(subcommand)]
    Defaults(DefaultsCommand),
}

#[derive(Subcommand, Debug)]
pub enum DefaultsCommand {
    /// Print the saved defaults as JSON
    Show,
    /// Print the settings file location
    Path,
    /// Save new defaults; omitted values keep their saved value
    Save(SettingsOverrides),
    /// Restore the starter defaults (5/50/15/30)
    Reset,
}

#[derive(Args, Debug)]
pub struct CalcArgs {
    #[arg(
        long,
        default_value = "0",
        value_parser = amount_arg,
        allow_hyphen_values = true,
        help = "Amount that hit the bank, e.g. 1,250.00"
    )]
    pub deposit: f64,
    #[arg(
        long,
        default_value = "0",
        value_parser = amount_arg,
        allow_hyphen_values = true,
        help = "Processing fees"
    )]
    pub fees: f64,
    #[arg(long, help = "Print the breakdown as JSON instead of the text summary")]
    pub json: bool,
    #[command(flatten)]
    pub overrides: SettingsOverrides,
}

#[derive(Args, Debug, Default, Clone)]
pub struct SettingsOverrides {
    #[arg(
        long = "sales-tax",
        value_parser = amount_arg,
        allow_hyphen_values = true,
        help = "Sales tax amount from your report; defaults to the saved amount"
    )]
    pub sales_tax_amount: Option<f64>,
    #[arg(long, value_parser = amount_arg, allow_hyphen_values = true)]
    pub profit_percent: Option<f64>,
    #[arg(long, value_parser = amount_arg, allow_hyphen_values = true)]
    pub owner_pay_percent: Option<f64>,
    #[arg(long, value_parser = amount_arg, allow_hyphen_values = true)]
    pub income_tax_percent: Option<f64>,
    #[arg(long, value_parser = amount_arg, allow_hyphen_values = true)]
    pub opex_percent: Option<f64>,
    #[arg(long, help = "Back out processing fees before the PF base (true/false)")]
    pub back_out_fees: Option<bool>,
    #[arg(long, help = "Back out the sales tax amount before allocating (true/false)")]
    pub back_out_sales_tax: Option<bool>,
}

impl SettingsOverrides {
    pub fn apply(&self, base: Settings) -> Settings {
        Settings {
            profit_percent: self.profit_percent.unwrap_or(base.profit_percent),
            owner_pay_percent: self.owner_pay_percent.unwrap_or(base.owner_pay_percent),
            income_tax_percent: self.income_tax_percent.unwrap_or(base.income_tax_percent),
            opex_percent: self.opex_percent.unwrap_or(base.opex_percent),
            back_out_processing_fees: self.back_out_fees.unwrap_or(base.back_out_processing_fees),
            back_out_sales_tax_before_pf: self
                .back_out_sales_tax
                .unwrap_or(base.back_out_sales_tax_before_pf),
            sales_tax_amount: self.sales_tax_amount.unwrap_or(base.sales_tax_amount),
        }
    }
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),
    #[error(transparent)]
    Defaults(#[from] DefaultsError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("could not render JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

fn amount_arg(raw: &str) -> Result<f64, String> {
    parse_amount(raw).map_err(|e| e.to_string())
}

pub fn settings_store(cli: &Cli) -> JsonFileStore {
    match &cli.settings_file {
        Some(path) => JsonFileStore::new(path.clone()),
        None => JsonFileStore::at_default_location(),
    }
}

pub async fn run(cli: Cli) -> Result<(), CliError> {
    let store = settings_store(&cli);
    tracing::debug!(path = %store.path().display(), "using settings file");

    match cli.command {
        Command::Serve { port } => run_http_server(port, Arc::new(store)).await?,
        Command::Calc(args) => println!("{}", calc_output(&store, &args)?),
        Command::Defaults(command) => println!("{}", defaults_output(&store, &command)?),
    }
    Ok(())
}

/// Allocates a deposit using the saved defaults overlaid with any flags.
pub fn calc_output(store: &dyn SettingsStore, args: &CalcArgs) -> Result<String, CliError> {
    let settings = args.overrides.apply(store.load());
    let allocation = calculate(&AllocationInput {
        deposit: args.deposit,
        fees: args.fees,
        sales_tax_hold: settings.sales_tax_amount,
        percentages: settings.percentages(),
        back_out_fees: settings.back_out_processing_fees,
        back_out_sales_tax: settings.back_out_sales_tax_before_pf,
    })?;

    if args.json {
        Ok(serde_json::to_string_pretty(&allocation)?)
    } else {
        Ok(render_summary(&allocation))
    }
}

pub fn defaults_output(
    store: &dyn SettingsStore,
    command: &DefaultsCommand,
) -> Result<String, CliError> {
    match command {
        DefaultsCommand::Show => Ok(serde_json::to_string_pretty(&store.load())?),
        DefaultsCommand::Path => Ok(store.location()),
        DefaultsCommand::Save(overrides) => {
            save_defaults(store, overrides.apply(store.load()))?;
            Ok(format!("New defaults saved to:\n{}", store.location()))
        }
        DefaultsCommand::Reset => {
            reset_defaults(store)?;
            Ok("Starter defaults restored and saved.".to_string())
        }
    }
}
