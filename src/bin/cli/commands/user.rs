use clap::Subcommand;
use committee_portal::dto::CreateUserDto;
use committee_portal::models::Role;

use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// User management commands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List users
    List,
    /// Show a user
    Get {
        /// The user ID
        id: String,
    },
    /// Register a user
    Create {
        #[clap(long)]
        name: String,
        #[clap(long)]
        email: String,
        /// admin, board, member or guest
        #[clap(long)]
        role: Role,
    },
    /// List the permissions a user's role grants
    Permissions {
        /// The user ID
        id: String,
    },
}

/// Executes a user command
pub async fn execute(
    client: &PortalClient,
    cmd: UserCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        UserCommands::List => {
            let users = client.list_users().await?;
            output::print_users(&users, config);
        }
        UserCommands::Get { id } => {
            let user = client.get_user(&id).await?;
            output::print_user(&user, config);
        }
        UserCommands::Create { name, email, role } => {
            let user = client.create_user(&CreateUserDto { name, email, role }).await?;
            output::print_user(&user, config);
        }
        UserCommands::Permissions { id } => {
            let permissions = client.get_user_permissions(&id).await?;
            output::print_permissions(&permissions, config);
        }
    }
    Ok(())
}
