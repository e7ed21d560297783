use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use committee_portal::dto::{CreatePurchaseDto, CreateReceiptDto, UpdatePurchaseDto};
use committee_portal::models::PurchaseStatus;

use super::{field_change, parse_amount};
use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// Reimbursement commands
#[derive(Subcommand, Debug)]
pub enum PurchaseCommands {
    /// List reimbursement requests
    List {
        /// pending, requested, reimbursed or rejected
        #[clap(long)]
        status: Option<PurchaseStatus>,
    },
    /// Show a request with its transaction and receipts
    Get {
        /// The purchase ID
        id: String,
    },
    /// File a reimbursement request
    Create {
        /// Who paid
        #[clap(long)]
        purchaser: String,
        /// Account the money goes back to
        #[clap(long)]
        bank_account: String,
        #[clap(long)]
        description: String,
        /// Amount, e.g. 12.50
        #[clap(long, value_parser = parse_amount)]
        amount: i64,
        /// Purchase date (YYYY-MM-DD), defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
        #[clap(long)]
        category: Option<String>,
        /// Meeting minutes approving the purchase
        #[clap(long)]
        minutes_ref: Option<String>,
        #[clap(long)]
        notes: Option<String>,
        /// Receipt to attach (repeatable)
        #[clap(long = "receipt")]
        receipts: Vec<String>,
    },
    /// Edit the details of a request
    Update {
        /// The purchase ID
        id: String,
        #[clap(long)]
        purchaser: Option<String>,
        #[clap(long)]
        bank_account: Option<String>,
        #[clap(long)]
        description: Option<String>,
        #[clap(long, conflicts_with = "clear_minutes_ref")]
        minutes_ref: Option<String>,
        #[clap(long, conflicts_with = "clear_notes")]
        notes: Option<String>,
        /// Remove the minutes reference
        #[clap(long)]
        clear_minutes_ref: bool,
        /// Remove the notes
        #[clap(long)]
        clear_notes: bool,
    },
    /// Move a request to another status
    Status {
        /// The purchase ID
        id: String,
        status: PurchaseStatus,
    },
    /// Delete a pending or rejected request
    Delete {
        /// The purchase ID
        id: String,
    },
    /// Register an uploaded receipt
    AddReceipt {
        #[clap(long)]
        name: String,
        #[clap(long)]
        url: String,
        #[clap(long)]
        description: Option<String>,
    },
    /// List receipts
    Receipts {
        /// Only receipts not attached to a request
        #[clap(long)]
        unattached: bool,
    },
    /// Delete an unattached receipt
    DeleteReceipt {
        /// The receipt ID
        id: String,
    },
}

/// Executes a reimbursement command
pub async fn execute(
    client: &PortalClient,
    cmd: PurchaseCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PurchaseCommands::List { status } => {
            let purchases = client.list_purchases(status).await?;
            output::print_purchases(&purchases, config);
        }
        PurchaseCommands::Get { id } => {
            let details = client.get_purchase(&id).await?;
            output::print_purchase_details(&details, config);
        }
        PurchaseCommands::Create {
            purchaser,
            bank_account,
            description,
            amount,
            date,
            category,
            minutes_ref,
            notes,
            receipts,
        } => {
            let dto = CreatePurchaseDto {
                purchaser_name: purchaser,
                bank_account,
                description,
                amount_cents: amount,
                date: date.unwrap_or_else(|| Utc::now().date_naive()),
                category,
                minutes_ref,
                notes,
                receipt_ids: receipts,
            };
            let details = client.create_purchase(&dto).await?;
            output::print_purchase_details(&details, config);
        }
        PurchaseCommands::Update {
            id,
            purchaser,
            bank_account,
            description,
            minutes_ref,
            notes,
            clear_minutes_ref,
            clear_notes,
        } => {
            let dto = UpdatePurchaseDto {
                purchaser_name: purchaser,
                bank_account,
                description,
                minutes_ref: field_change(minutes_ref, clear_minutes_ref),
                notes: field_change(notes, clear_notes),
            };
            let purchase = client.update_purchase(&id, &dto).await?;
            output::print_purchase(&purchase, config);
        }
        PurchaseCommands::Status { id, status } => {
            let details = client.set_purchase_status(&id, status).await?;
            output::print_purchase_details(&details, config);
        }
        PurchaseCommands::Delete { id } => {
            client.delete_purchase(&id).await?;
            output::print_success(&format!("Deleted purchase {}", id), config);
        }
        PurchaseCommands::AddReceipt { name, url, description } => {
            let receipt = client.create_receipt(&CreateReceiptDto { name, url, description }).await?;
            output::print_receipt(&receipt, config);
        }
        PurchaseCommands::Receipts { unattached } => {
            let receipts = client.list_receipts(unattached).await?;
            output::print_receipts(&receipts, config);
        }
        PurchaseCommands::DeleteReceipt { id } => {
            client.delete_receipt(&id).await?;
            output::print_success(&format!("Deleted receipt {}", id), config);
        }
    }
    Ok(())
}
