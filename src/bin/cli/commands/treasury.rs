use chrono::{Datelike, NaiveDate, Utc};
use clap::Subcommand;
use committee_portal::dto::{CreateTransactionDto, TransactionQueryDto, UpdateTransactionDto};
use committee_portal::models::{TransactionKind, TransactionStatus};

use super::{field_change, parse_amount};
use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// Treasury commands
#[derive(Subcommand, Debug)]
pub enum TreasuryCommands {
    /// List transactions
    List {
        #[clap(long)]
        year: Option<i32>,
        /// income or expense
        #[clap(long)]
        kind: Option<TransactionKind>,
        /// pending or complete
        #[clap(long)]
        status: Option<TransactionStatus>,
        #[clap(long)]
        category: Option<String>,
    },
    /// Show a transaction
    Get {
        /// The transaction ID
        id: String,
    },
    /// Record a transaction
    Create {
        /// income or expense
        #[clap(long)]
        kind: TransactionKind,
        /// Amount, e.g. 12.50
        #[clap(long, value_parser = parse_amount)]
        amount: i64,
        #[clap(long)]
        description: String,
        #[clap(long)]
        category: Option<String>,
        /// Booking date (YYYY-MM-DD), defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
        /// pending or complete (default)
        #[clap(long)]
        status: Option<TransactionStatus>,
    },
    /// Update a transaction
    Update {
        /// The transaction ID
        id: String,
        #[clap(long)]
        kind: Option<TransactionKind>,
        #[clap(long, value_parser = parse_amount)]
        amount: Option<i64>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[clap(long)]
        date: Option<NaiveDate>,
        #[clap(long)]
        status: Option<TransactionStatus>,
        /// Remove the category
        #[clap(long)]
        clear_category: bool,
    },
    /// Delete a transaction
    Delete {
        /// The transaction ID
        id: String,
    },
    /// List the inventory items bought in a transaction
    Items {
        /// The transaction ID
        id: String,
    },
    /// Show income and expenses per category for a year
    Summary {
        /// Defaults to the current year
        #[clap(long)]
        year: Option<i32>,
    },
    /// List the years that have transactions
    Years,
}

/// Executes a treasury command
pub async fn execute(
    client: &PortalClient,
    cmd: TreasuryCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        TreasuryCommands::List { year, kind, status, category } => {
            let query = TransactionQueryDto { year, kind, status, category };
            let transactions = client.list_transactions(&query).await?;
            output::print_transactions(&transactions, config);
        }
        TreasuryCommands::Get { id } => {
            let transaction = client.get_transaction(&id).await?;
            output::print_transaction(&transaction, config);
        }
        TreasuryCommands::Create { kind, amount, description, category, date, status } => {
            let dto = CreateTransactionDto {
                kind,
                amount_cents: amount,
                description,
                category,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                status,
            };
            let transaction = client.create_transaction(&dto).await?;
            output::print_transaction(&transaction, config);
        }
        TreasuryCommands::Update { id, kind, amount, description, category, date, status, clear_category } => {
            let dto = UpdateTransactionDto {
                kind,
                amount_cents: amount,
                description,
                category: field_change(category, clear_category),
                date,
                status,
            };
            let transaction = client.update_transaction(&id, &dto).await?;
            output::print_transaction(&transaction, config);
        }
        TreasuryCommands::Delete { id } => {
            client.delete_transaction(&id).await?;
            output::print_success(&format!("Deleted transaction {}", id), config);
        }
        TreasuryCommands::Items { id } => {
            let items = client.list_transaction_items(&id).await?;
            output::print_linked_items(&items, config);
        }
        TreasuryCommands::Summary { year } => {
            let year = year.unwrap_or_else(|| Utc::now().year());
            let summary = client.get_treasury_summary(year).await?;
            output::print_summary(&summary, config);
        }
        TreasuryCommands::Years => {
            let years = client.list_transaction_years().await?;
            output::print_years(&years, config);
        }
    }
    Ok(())
}
