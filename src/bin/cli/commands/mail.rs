use clap::Subcommand;
use committee_portal::dto::{CreateDraftDto, UpdateDraftDto};

use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// Mailbox commands
#[derive(Subcommand, Debug)]
pub enum MailCommands {
    /// List conversations, most recent activity first
    Threads,
    /// Show the messages of a conversation
    Thread {
        /// The thread ID
        thread_id: String,
    },
    /// Show a message
    Read {
        /// The message ID
        id: String,
        /// Leave the message marked unread
        #[clap(long)]
        keep_unread: bool,
    },
    /// Mark a message unread
    Unread {
        /// The message ID
        id: String,
    },
    /// List drafts
    Drafts,
    /// Show a draft
    Draft {
        /// The draft ID
        id: String,
    },
    /// Start a draft, optionally as a reply
    Compose {
        /// Recipient (repeatable)
        #[clap(long)]
        to: Vec<String>,
        /// Copy recipient (repeatable)
        #[clap(long)]
        cc: Vec<String>,
        #[clap(long, default_value = "")]
        subject: String,
        #[clap(long, default_value = "")]
        body: String,
        /// Message to reply to
        #[clap(long)]
        reply_to: Option<String>,
    },
    /// Edit a draft
    Edit {
        /// The draft ID
        id: String,
        /// Replaces the recipients (repeatable)
        #[clap(long)]
        to: Vec<String>,
        /// Replaces the copy recipients (repeatable)
        #[clap(long)]
        cc: Vec<String>,
        #[clap(long)]
        subject: Option<String>,
        #[clap(long)]
        body: Option<String>,
    },
    /// Discard a draft
    Discard {
        /// The draft ID
        id: String,
    },
    /// Send a draft
    Send {
        /// The draft ID
        id: String,
        /// Committee address to send from
        #[clap(long, env = "PORTAL_MAIL_FROM")]
        from: String,
    },
}

/// Executes a mail command
pub async fn execute(
    client: &PortalClient,
    cmd: MailCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        MailCommands::Threads => {
            let threads = client.list_threads().await?;
            output::print_threads(&threads, config);
        }
        MailCommands::Thread { thread_id } => {
            let messages = client.get_thread(&thread_id).await?;
            output::print_messages(&messages, config);
        }
        MailCommands::Read { id, keep_unread } => {
            let message = if keep_unread {
                client.get_message(&id).await?
            } else {
                client.set_message_read(&id, true).await?
            };
            output::print_message(&message, config);
        }
        MailCommands::Unread { id } => {
            client.set_message_read(&id, false).await?;
            output::print_success(&format!("Marked message {} unread", id), config);
        }
        MailCommands::Drafts => {
            let drafts = client.list_drafts().await?;
            output::print_drafts(&drafts, config);
        }
        MailCommands::Draft { id } => {
            let draft = client.get_draft(&id).await?;
            output::print_draft(&draft, config);
        }
        MailCommands::Compose { to, cc, subject, body, reply_to } => {
            let dto = CreateDraftDto {
                to,
                cc,
                subject,
                body_text: body,
                reply_to_message_id: reply_to,
            };
            let draft = client.create_draft(&dto).await?;
            output::print_draft(&draft, config);
        }
        MailCommands::Edit { id, to, cc, subject, body } => {
            let dto = UpdateDraftDto {
                to: (!to.is_empty()).then_some(to),
                cc: (!cc.is_empty()).then_some(cc),
                subject,
                body_text: body,
            };
            let draft = client.update_draft(&id, &dto).await?;
            output::print_draft(&draft, config);
        }
        MailCommands::Discard { id } => {
            client.delete_draft(&id).await?;
            output::print_success(&format!("Discarded draft {}", id), config);
        }
        MailCommands::Send { id, from } => {
            let message = client.send_draft(&id, from).await?;
            output::print_success(&format!("Sent <{}>", message.get_message_id()), config);
        }
    }
    Ok(())
}
