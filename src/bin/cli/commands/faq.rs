use clap::Subcommand;
use committee_portal::dto::{CreateFaqDto, UpdateFaqDto};

use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// FAQ management commands
#[derive(Subcommand, Debug)]
pub enum FaqCommands {
    /// List FAQ entries in display order
    List,
    /// Show an entry
    Get {
        /// The entry ID
        id: String,
    },
    /// Add an entry
    Create {
        #[clap(long)]
        question: String,
        #[clap(long)]
        answer: String,
        /// Position in the list, defaults to last
        #[clap(long)]
        sort_order: Option<i32>,
    },
    /// Update an entry
    Update {
        /// The entry ID
        id: String,
        #[clap(long)]
        question: Option<String>,
        #[clap(long)]
        answer: Option<String>,
        #[clap(long)]
        sort_order: Option<i32>,
    },
    /// Delete an entry
    Delete {
        /// The entry ID
        id: String,
    },
}

/// Executes an FAQ command
pub async fn execute(
    client: &PortalClient,
    cmd: FaqCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        FaqCommands::List => {
            let faqs = client.list_faqs().await?;
            output::print_faqs(&faqs, config);
        }
        FaqCommands::Get { id } => {
            let faq = client.get_faq(&id).await?;
            output::print_faq(&faq, config);
        }
        FaqCommands::Create { question, answer, sort_order } => {
            let faq = client.create_faq(&CreateFaqDto { question, answer, sort_order }).await?;
            output::print_faq(&faq, config);
        }
        FaqCommands::Update { id, question, answer, sort_order } => {
            let faq = client.update_faq(&id, &UpdateFaqDto { question, answer, sort_order }).await?;
            output::print_faq(&faq, config);
        }
        FaqCommands::Delete { id } => {
            client.delete_faq(&id).await?;
            output::print_success(&format!("Deleted FAQ entry {}", id), config);
        }
    }
    Ok(())
}
