use chrono::{DateTime, Utc};
use clap::Subcommand;
use committee_portal::dto::CreatePollDto;
use committee_portal::models::PollStatus;

use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// Poll commands
#[derive(Subcommand, Debug)]
pub enum PollCommands {
    /// List polls
    List {
        /// draft, open or closed
        #[clap(long)]
        status: Option<PollStatus>,
    },
    /// Show a poll and its options
    Get {
        /// The poll ID
        id: String,
    },
    /// Create a draft poll
    Create {
        #[clap(long)]
        title: String,
        #[clap(long)]
        description: Option<String>,
        /// Let voters pick more than one option
        #[clap(long)]
        multiple: bool,
        /// Voting closes at this moment (RFC 3339)
        #[clap(long)]
        deadline: Option<DateTime<Utc>>,
        /// Option label (repeat for each option)
        #[clap(long = "option", required = true)]
        options: Vec<String>,
    },
    /// Open a draft poll for voting
    Open {
        /// The poll ID
        id: String,
    },
    /// Close an open poll
    Close {
        /// The poll ID
        id: String,
    },
    /// Delete a poll and its votes
    Delete {
        /// The poll ID
        id: String,
    },
    /// Vote as the user given with --user-id
    Vote {
        /// The poll ID
        id: String,
        /// Option IDs to vote for
        #[clap(required = true)]
        option_ids: Vec<String>,
    },
    /// Show the vote counts
    Results {
        /// The poll ID
        id: String,
    },
}

/// Executes a poll command
pub async fn execute(
    client: &PortalClient,
    cmd: PollCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        PollCommands::List { status } => {
            let polls = client.list_polls(status).await?;
            output::print_polls(&polls, config);
        }
        PollCommands::Get { id } => {
            let details = client.get_poll(&id).await?;
            output::print_poll(&details, config);
        }
        PollCommands::Create { title, description, multiple, deadline, options } => {
            let dto = CreatePollDto {
                title,
                description,
                allow_multiple: multiple,
                deadline,
                options,
            };
            let details = client.create_poll(&dto).await?;
            output::print_poll(&details, config);
        }
        PollCommands::Open { id } => {
            let poll = client.open_poll(&id).await?;
            output::print_poll_state(&poll, config);
        }
        PollCommands::Close { id } => {
            let poll = client.close_poll(&id).await?;
            output::print_poll_state(&poll, config);
        }
        PollCommands::Delete { id } => {
            client.delete_poll(&id).await?;
            output::print_success(&format!("Deleted poll {}", id), config);
        }
        PollCommands::Vote { id, option_ids } => {
            let votes = client.vote(&id, option_ids).await?;
            output::print_success(&format!("Recorded {} vote(s)", votes.len()), config);
        }
        PollCommands::Results { id } => {
            let results = client.get_poll_results(&id).await?;
            output::print_results(&results, config);
        }
    }
    Ok(())
}
