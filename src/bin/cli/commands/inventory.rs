use clap::Subcommand;
use committee_portal::dto::{CreateInventoryItemDto, InventoryQueryDto, UpdateInventoryItemDto};
use committee_portal::models::ItemStatus;

use super::{field_change, parse_amount};
use crate::client::PortalClient;
use crate::output::{self, OutputConfig};

/// Inventory management commands
#[derive(Subcommand, Debug)]
pub enum InventoryCommands {
    /// List inventory items
    List {
        /// Only items in this category (repeatable)
        #[clap(long)]
        category: Vec<String>,
        /// Only items stored here
        #[clap(long)]
        location: Option<String>,
        /// Include removed items
        #[clap(long)]
        include_removed: bool,
        /// Only items with units of unknown origin
        #[clap(long)]
        unknown_only: bool,
    },
    /// Show an item with its quantity breakdown
    Get {
        /// The item ID
        id: String,
    },
    /// Add an item
    Create {
        #[clap(long)]
        name: String,
        #[clap(long)]
        quantity: i32,
        #[clap(long)]
        location: String,
        #[clap(long)]
        category: Option<String>,
        #[clap(long)]
        description: Option<String>,
        /// Value of one unit, e.g. 12.50
        #[clap(long, value_parser = parse_amount)]
        unit_value: Option<i64>,
        /// Link the whole quantity to this transaction
        #[clap(long, conflicts_with = "manual")]
        transaction_id: Option<String>,
        /// Mark the whole quantity as acquired without a transaction
        #[clap(long)]
        manual: bool,
    },
    /// Update an item
    Update {
        /// The item ID
        id: String,
        #[clap(long)]
        name: Option<String>,
        #[clap(long)]
        quantity: Option<i32>,
        #[clap(long)]
        location: Option<String>,
        #[clap(long, conflicts_with = "clear_category")]
        category: Option<String>,
        #[clap(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[clap(long, value_parser = parse_amount, conflicts_with = "clear_unit_value")]
        unit_value: Option<i64>,
        /// active or removed
        #[clap(long)]
        status: Option<ItemStatus>,
        /// Remove the category
        #[clap(long)]
        clear_category: bool,
        /// Remove the description
        #[clap(long)]
        clear_description: bool,
        /// Remove the unit value
        #[clap(long)]
        clear_unit_value: bool,
    },
    /// Delete an item
    Delete {
        /// The item ID
        id: String,
    },
    /// Show the transactions an item's units come from
    Ledger {
        /// The item ID
        id: String,
    },
    /// Link units of an item to a transaction
    Link {
        /// The item ID
        id: String,
        /// The transaction ID
        transaction_id: String,
        /// Number of units bought in the transaction
        #[clap(long)]
        quantity: i32,
    },
    /// Remove the link between an item and a transaction
    Unlink {
        /// The item ID
        id: String,
        /// The transaction ID
        transaction_id: String,
    },
    /// Set the number of units acquired without a transaction
    Manual {
        /// The item ID
        id: String,
        count: i32,
    },
    /// Mark every unit of unknown origin as manual
    Absorb {
        /// The item ID
        id: String,
    },
    /// List the categories in use
    Categories,
    /// List the storage locations in use
    Locations,
}

/// Executes an inventory command
pub async fn execute(
    client: &PortalClient,
    cmd: InventoryCommands,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    match cmd {
        InventoryCommands::List { category, location, include_removed, unknown_only } => {
            let query = InventoryQueryDto { category, location, include_removed, unknown_only };
            let items = client.list_inventory(&query).await?;
            output::print_inventory_items(&items, config);
        }
        InventoryCommands::Get { id } => {
            let item = client.get_inventory_item(&id).await?;
            output::print_inventory_item(&item, config);
        }
        InventoryCommands::Create {
            name,
            quantity,
            location,
            category,
            description,
            unit_value,
            transaction_id,
            manual,
        } => {
            let dto = CreateInventoryItemDto {
                name,
                quantity,
                location,
                category,
                description,
                unit_value_cents: unit_value,
                transaction_id,
                mark_manual: manual,
            };
            let item = client.create_inventory_item(&dto).await?;
            // Show the breakdown, which the create response does not carry
            let view = client.get_inventory_item(&item.get_id()).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Update {
            id,
            name,
            quantity,
            location,
            category,
            description,
            unit_value,
            status,
            clear_category,
            clear_description,
            clear_unit_value,
        } => {
            let dto = UpdateInventoryItemDto {
                name,
                quantity,
                location,
                category: field_change(category, clear_category),
                description: field_change(description, clear_description),
                unit_value_cents: field_change(unit_value, clear_unit_value),
                status,
            };
            client.update_inventory_item(&id, &dto).await?;
            let view = client.get_inventory_item(&id).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Delete { id } => {
            client.delete_inventory_item(&id).await?;
            output::print_success(&format!("Deleted inventory item {}", id), config);
        }
        InventoryCommands::Ledger { id } => {
            let ledger = client.get_item_ledger(&id).await?;
            output::print_item_ledger(&ledger, config);
        }
        InventoryCommands::Link { id, transaction_id, quantity } => {
            let view = client.link_transaction(&id, &transaction_id, quantity).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Unlink { id, transaction_id } => {
            let view = client.unlink_transaction(&id, &transaction_id).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Manual { id, count } => {
            let view = client.set_manual_count(&id, count).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Absorb { id } => {
            let view = client.absorb_unknown(&id).await?;
            output::print_inventory_item(&view, config);
        }
        InventoryCommands::Categories => {
            let categories = client.list_inventory_categories().await?;
            output::print_values(&categories, config);
        }
        InventoryCommands::Locations => {
            let locations = client.list_inventory_locations().await?;
            output::print_values(&locations, config);
        }
    }
    Ok(())
}
