//! The command-line front end for pocketbook.
//!
//! Owns everything the library deliberately does not: validating fresh
//! user input, asking for confirmation before destructive actions, and
//! rendering transactions and totals.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use time::format_description::well_known::Rfc3339;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use pocketbook::{
    EXPORT_FILE_NAME, TransactionKind, TransactionStore, compute_totals,
    storage::JsonFileGateway,
};

/// A personal expense and income tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the transaction file. Defaults to the platform
    /// data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new income or expense.
    Add {
        /// A display label for the transaction.
        name: String,
        /// The amount of money moved, e.g. 12.50. Must be positive; the
        /// direction is given by KIND.
        amount: Decimal,
        /// Whether money was earned or spent: 'income' or 'expense'.
        kind: TransactionKind,
    },
    /// List all transactions, newest first.
    List,
    /// Show the income, expense, and balance totals.
    Totals,
    /// Delete the transaction with the given id.
    Remove {
        /// The id shown by 'tracker list'.
        id: String,
    },
    /// Delete all transactions.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
    /// Write the transaction list as pretty-printed JSON.
    Export {
        /// Where to write the export. Defaults to ./transactions.json.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    let data_dir = args.data_dir.unwrap_or_else(default_data_dir);
    let gateway = JsonFileGateway::new(&data_dir);
    let mut store = TransactionStore::load(gateway).map_err(|error| error.to_string())?;

    match args.command {
        Command::Add { name, amount, kind } => {
            let name = name.trim();
            if name.is_empty() {
                return Err("the transaction name must not be empty".to_owned());
            }
            if amount <= Decimal::ZERO {
                return Err("the amount must be greater than zero".to_owned());
            }

            let transaction = store
                .add(name, amount, kind)
                .map_err(|error| error.to_string())?;
            println!(
                "Recorded {kind} '{name}' ({id})",
                id = transaction.id()
            );
        }
        Command::List => {
            if store.list().is_empty() {
                println!("No transactions yet. Add an income or expense with 'tracker add'.");
            }

            for transaction in store.list() {
                let sign = match transaction.kind() {
                    TransactionKind::Income => '+',
                    TransactionKind::Expense => '-',
                };
                let timestamp = transaction
                    .timestamp()
                    .format(&Rfc3339)
                    .unwrap_or_else(|_| "?".to_owned());

                println!(
                    "{sign} {amount:>12}  {timestamp}  {name}  [{id}]",
                    amount = format_amount(transaction.amount()),
                    name = transaction.name(),
                    id = transaction.id(),
                );
            }
        }
        Command::Totals => {
            let totals = compute_totals(store.list());

            println!("income:  {:>12}", format_amount(totals.income));
            println!("expense: {:>12}", format_amount(totals.expense));
            println!("balance: {:>12}", format_amount(totals.balance));
        }
        Command::Remove { id } => {
            let removed = store.remove(&id).map_err(|error| error.to_string())?;

            if removed {
                println!("Deleted transaction {id}.");
            } else {
                println!("No transaction with id {id}; nothing deleted.");
            }
        }
        Command::Clear { yes } => {
            let count = store.list().len();
            if count == 0 {
                println!("No transactions to delete.");
                return Ok(());
            }

            if !yes && !confirm_clear(count) {
                println!("Aborted.");
                return Ok(());
            }

            store.clear().map_err(|error| error.to_string())?;
            println!("Deleted all {count} transactions.");
        }
        Command::Export { output } => {
            let path = output.unwrap_or_else(|| PathBuf::from(EXPORT_FILE_NAME));
            let json = store.export_json().map_err(|error| error.to_string())?;

            fs::write(&path, json)
                .map_err(|error| format!("could not write {}: {error}", path.display()))?;
            println!(
                "Exported {count} transactions to {path}.",
                count = store.list().len(),
                path = path.display(),
            );
        }
    }

    Ok(())
}

fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_filter(env_filter),
        )
        .init();
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pocketbook")
}

/// Format an amount with exactly two decimal places. The direction of a
/// transaction is rendered as a separate sign, so amounts are shown as
/// stored.
fn format_amount(amount: Decimal) -> String {
    format!("{amount:.2}")
}

fn confirm_clear(count: usize) -> bool {
    print!("Delete all {count} transactions? This cannot be undone. [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut answer = String::new();
    if io::stdin().read_line(&mut answer).is_err() {
        return false;
    }

    matches!(answer.trim(), "y" | "Y" | "yes")
}
