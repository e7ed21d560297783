use clap::ValueEnum;
use committee_portal::dto::{
    InventoryItemView, ItemLedger, LinkedItem, PollDetails, PollResults, PurchaseDetails,
    ThreadSummary, TreasurySummary,
};
use committee_portal::models::{
    Faq, MailDraft, MailMessage, Permission, Poll, Purchase, Receipt, Transaction, User,
};
use serde::Serialize;

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

/// Bundled output configuration passed to all print functions
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    /// The output format
    pub format: OutputFormat,
    /// When true, print minimal output (just IDs or counts)
    pub quiet: bool,
}

/// Formats an amount in cents as `12.34`, with a leading minus when negative
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(err) => eprintln!("Failed to encode output: {}", err),
    }
}

/// Prints rows as left-aligned columns under a header line
fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| {
        let padded: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        println!("{}", padded.join("  ").trim_end());
    };

    line(headers.to_vec());
    for row in rows {
        line(row.iter().map(String::as_str).collect());
    }
}

/// Prints a list: a table for humans, ids when quiet, JSON otherwise
fn print_list<T: Serialize>(
    items: &[T],
    config: &OutputConfig,
    empty: &str,
    headers: &[&str],
    id: impl Fn(&T) -> String,
    row: impl Fn(&T) -> Vec<String>,
) {
    match config.format {
        OutputFormat::Human => {
            if items.is_empty() {
                if !config.quiet {
                    println!("{}", empty);
                }
                return;
            }
            if config.quiet {
                for item in items {
                    println!("{}", id(item));
                }
                return;
            }
            let rows: Vec<Vec<String>> = items.iter().map(row).collect();
            print_table(headers, &rows);
        }
        OutputFormat::Json => print_json(items),
    }
}

/// Prints a single record: labelled fields for humans, the id when quiet
fn print_record<T: Serialize>(value: &T, config: &OutputConfig, id: String, fields: Vec<(&str, String)>) {
    match config.format {
        OutputFormat::Human => {
            if config.quiet {
                println!("{}", id);
                return;
            }
            let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
            for (label, value) in fields {
                println!("{:<width$} {}", format!("{}:", label), value, width = width);
            }
        }
        OutputFormat::Json => print_json(value),
    }
}

fn or_dash(value: Option<String>) -> String {
    value.unwrap_or_else(|| "-".to_string())
}

// ── Inventory ────────────────────────────────────────────────────────

pub fn print_inventory_items(items: &[InventoryItemView], config: &OutputConfig) {
    print_list(
        items,
        config,
        "No inventory items found.",
        &["ID", "NAME", "LOCATION", "TOTAL", "LINKED", "MANUAL", "UNKNOWN"],
        |view| view.item.get_id(),
        |view| {
            vec![
                view.item.get_id(),
                view.item.get_name(),
                view.item.get_location(),
                view.ledger.total.to_string(),
                view.ledger.linked.to_string(),
                view.ledger.manual.to_string(),
                view.ledger.unknown.to_string(),
            ]
        },
    );
}

pub fn print_inventory_item(view: &InventoryItemView, config: &OutputConfig) {
    let item = &view.item;
    print_record(
        view,
        config,
        item.get_id(),
        vec![
            ("ID", item.get_id()),
            ("Name", item.get_name()),
            ("Location", item.get_location()),
            ("Category", or_dash(item.get_category())),
            ("Status", item.get_status().to_string()),
            ("Unit value", or_dash(item.get_unit_value_cents().map(format_cents))),
            ("Quantity", view.ledger.total.to_string()),
            ("Linked", view.ledger.linked.to_string()),
            ("Manual", view.ledger.manual.to_string()),
            ("Unknown", view.ledger.unknown.to_string()),
            ("Updated", item.get_updated_at().to_string()),
        ],
    );
}

pub fn print_item_ledger(ledger: &ItemLedger, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if !config.quiet => {
            println!(
                "{}: {} total, {} linked, {} manual, {} unknown",
                ledger.item.get_name(),
                ledger.ledger.total,
                ledger.ledger.linked,
                ledger.ledger.manual,
                ledger.ledger.unknown
            );
            if ledger.transactions.is_empty() {
                return;
            }
            println!();
            let rows: Vec<Vec<String>> = ledger
                .transactions
                .iter()
                .map(|linked| {
                    vec![
                        linked.transaction.get_id(),
                        linked.transaction.get_date().to_string(),
                        linked.transaction.get_description(),
                        linked.quantity.to_string(),
                    ]
                })
                .collect();
            print_table(&["TRANSACTION", "DATE", "DESCRIPTION", "UNITS"], &rows);
        }
        OutputFormat::Human => println!("{}", ledger.ledger.unknown),
        OutputFormat::Json => print_json(ledger),
    }
}

pub fn print_linked_items(items: &[LinkedItem], config: &OutputConfig) {
    print_list(
        items,
        config,
        "No items linked.",
        &["ID", "NAME", "UNITS"],
        |linked| linked.item.get_id(),
        |linked| vec![linked.item.get_id(), linked.item.get_name(), linked.quantity.to_string()],
    );
}

/// Prints plain strings one per line
pub fn print_values(values: &[String], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for value in values {
                println!("{}", value);
            }
        }
        OutputFormat::Json => print_json(values),
    }
}

// ── Treasury ─────────────────────────────────────────────────────────

pub fn print_transactions(transactions: &[Transaction], config: &OutputConfig) {
    print_list(
        transactions,
        config,
        "No transactions found.",
        &["ID", "DATE", "AMOUNT", "STATUS", "CATEGORY", "DESCRIPTION"],
        |t| t.get_id(),
        |t| {
            vec![
                t.get_id(),
                t.get_date().to_string(),
                format_cents(t.signed_amount_cents()),
                t.get_status().to_string(),
                or_dash(t.get_category()),
                t.get_description(),
            ]
        },
    );
}

pub fn print_transaction(transaction: &Transaction, config: &OutputConfig) {
    print_record(
        transaction,
        config,
        transaction.get_id(),
        vec![
            ("ID", transaction.get_id()),
            ("Kind", transaction.get_kind().to_string()),
            ("Amount", format_cents(transaction.get_amount_cents())),
            ("Description", transaction.get_description()),
            ("Category", or_dash(transaction.get_category())),
            ("Date", transaction.get_date().to_string()),
            ("Status", transaction.get_status().to_string()),
        ],
    );
}

pub fn print_summary(summary: &TreasurySummary, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if !config.quiet => {
            let mut rows: Vec<Vec<String>> = summary
                .categories
                .iter()
                .map(|c| {
                    vec![
                        c.category.clone().unwrap_or_else(|| "(none)".to_string()),
                        format_cents(c.income_cents),
                        format_cents(c.expense_cents),
                        format_cents(c.balance_cents),
                    ]
                })
                .collect();
            rows.push(vec![
                "TOTAL".to_string(),
                format_cents(summary.income_cents),
                format_cents(summary.expense_cents),
                format_cents(summary.balance_cents),
            ]);
            println!("Treasury {}", summary.year);
            print_table(&["CATEGORY", "INCOME", "EXPENSE", "BALANCE"], &rows);
        }
        OutputFormat::Human => println!("{}", format_cents(summary.balance_cents)),
        OutputFormat::Json => print_json(summary),
    }
}

pub fn print_years(years: &[i32], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for year in years {
                println!("{}", year);
            }
        }
        OutputFormat::Json => print_json(years),
    }
}

// ── Reimbursements ───────────────────────────────────────────────────

pub fn print_receipts(receipts: &[Receipt], config: &OutputConfig) {
    print_list(
        receipts,
        config,
        "No receipts found.",
        &["ID", "NAME", "PURCHASE", "URL"],
        |r| r.get_id(),
        |r| vec![r.get_id(), r.get_name(), or_dash(r.get_purchase_id()), r.get_url()],
    );
}

pub fn print_receipt(receipt: &Receipt, config: &OutputConfig) {
    print_record(
        receipt,
        config,
        receipt.get_id(),
        vec![
            ("ID", receipt.get_id()),
            ("Name", receipt.get_name()),
            ("URL", receipt.get_url()),
        ],
    );
}

pub fn print_purchases(purchases: &[Purchase], config: &OutputConfig) {
    print_list(
        purchases,
        config,
        "No purchases found.",
        &["ID", "STATUS", "AMOUNT", "PURCHASER", "DESCRIPTION"],
        |p| p.get_id(),
        |p| {
            vec![
                p.get_id(),
                p.get_status().to_string(),
                format_cents(p.get_amount_cents()),
                p.get_purchaser_name(),
                p.get_description(),
            ]
        },
    );
}

pub fn print_purchase_details(details: &PurchaseDetails, config: &OutputConfig) {
    let purchase = &details.purchase;
    let receipts: Vec<String> = details.receipts.iter().map(|r| r.get_name()).collect();
    print_record(
        details,
        config,
        purchase.get_id(),
        vec![
            ("ID", purchase.get_id()),
            ("Status", purchase.get_status().to_string()),
            ("Purchaser", purchase.get_purchaser_name()),
            ("Account", purchase.get_bank_account()),
            ("Description", purchase.get_description()),
            ("Amount", format_cents(purchase.get_amount_cents())),
            ("Minutes", or_dash(purchase.get_minutes_ref())),
            ("Transaction", format!("{} ({})", details.transaction.get_id(), details.transaction.get_status())),
            ("Receipts", if receipts.is_empty() { "-".to_string() } else { receipts.join(", ") }),
        ],
    );
}

pub fn print_purchase(purchase: &Purchase, config: &OutputConfig) {
    print_record(
        purchase,
        config,
        purchase.get_id(),
        vec![
            ("ID", purchase.get_id()),
            ("Status", purchase.get_status().to_string()),
            ("Description", purchase.get_description()),
            ("Minutes", or_dash(purchase.get_minutes_ref())),
            ("Notes", or_dash(purchase.get_notes())),
        ],
    );
}

// ── Mail ─────────────────────────────────────────────────────────────

pub fn print_threads(threads: &[ThreadSummary], config: &OutputConfig) {
    print_list(
        threads,
        config,
        "No threads found.",
        &["THREAD", "LAST", "MESSAGES", "UNREAD", "SUBJECT"],
        |t| t.thread_id.clone(),
        |t| {
            vec![
                t.thread_id.clone(),
                t.last_message_at.format("%Y-%m-%d %H:%M").to_string(),
                t.message_count.to_string(),
                t.unread_count.to_string(),
                t.subject.clone(),
            ]
        },
    );
}

pub fn print_messages(messages: &[MailMessage], config: &OutputConfig) {
    print_list(
        messages,
        config,
        "No messages found.",
        &["ID", "SENT", "DIR", "READ", "FROM", "SUBJECT"],
        |m| m.get_id(),
        |m| {
            vec![
                m.get_id(),
                m.get_sent_at().format("%Y-%m-%d %H:%M").to_string(),
                m.get_direction().to_string(),
                if m.get_is_read() { "yes" } else { "no" }.to_string(),
                m.get_from_address(),
                m.get_subject(),
            ]
        },
    );
}

pub fn print_message(message: &MailMessage, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if !config.quiet => {
            println!("Message-ID: <{}>", message.get_message_id());
            println!("From:       {}", message.get_from_address());
            println!("To:         {}", message.get_to_addresses().join(", "));
            if !message.get_cc_addresses().is_empty() {
                println!("Cc:         {}", message.get_cc_addresses().join(", "));
            }
            println!("Date:       {}", message.get_sent_at());
            println!("Subject:    {}", message.get_subject());
            println!();
            println!("{}", message.get_body_text());
        }
        OutputFormat::Human => println!("{}", message.get_id()),
        OutputFormat::Json => print_json(message),
    }
}

pub fn print_drafts(drafts: &[MailDraft], config: &OutputConfig) {
    print_list(
        drafts,
        config,
        "No drafts found.",
        &["ID", "UPDATED", "TO", "SUBJECT"],
        |d| d.get_id(),
        |d| {
            vec![
                d.get_id(),
                d.get_updated_at().format("%Y-%m-%d %H:%M").to_string(),
                d.get_to_addresses().join(", "),
                d.get_subject(),
            ]
        },
    );
}

pub fn print_draft(draft: &MailDraft, config: &OutputConfig) {
    print_record(
        draft,
        config,
        draft.get_id(),
        vec![
            ("ID", draft.get_id()),
            ("To", draft.get_to_addresses().join(", ")),
            ("Cc", draft.get_cc_addresses().join(", ")),
            ("Subject", draft.get_subject()),
            ("Thread", or_dash(draft.get_thread_id())),
            ("Body", draft.get_body_text()),
        ],
    );
}

// ── FAQ ──────────────────────────────────────────────────────────────

pub fn print_faqs(faqs: &[Faq], config: &OutputConfig) {
    print_list(
        faqs,
        config,
        "No FAQ entries found.",
        &["ID", "ORDER", "QUESTION"],
        |f| f.get_id(),
        |f| vec![f.get_id(), f.get_sort_order().to_string(), f.get_question()],
    );
}

pub fn print_faq(faq: &Faq, config: &OutputConfig) {
    print_record(
        faq,
        config,
        faq.get_id(),
        vec![
            ("ID", faq.get_id()),
            ("Order", faq.get_sort_order().to_string()),
            ("Question", faq.get_question()),
            ("Answer", faq.get_answer()),
        ],
    );
}

// ── Users ────────────────────────────────────────────────────────────

pub fn print_users(users: &[User], config: &OutputConfig) {
    print_list(
        users,
        config,
        "No users found.",
        &["ID", "ROLE", "NAME", "EMAIL"],
        |u| u.get_id(),
        |u| vec![u.get_id(), u.get_role().to_string(), u.get_name(), u.get_email()],
    );
}

pub fn print_user(user: &User, config: &OutputConfig) {
    print_record(
        user,
        config,
        user.get_id(),
        vec![
            ("ID", user.get_id()),
            ("Name", user.get_name()),
            ("Email", user.get_email()),
            ("Role", user.get_role().to_string()),
        ],
    );
}

pub fn print_permissions(permissions: &[Permission], config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            for permission in permissions {
                println!("{}", permission);
            }
        }
        OutputFormat::Json => print_json(permissions),
    }
}

// ── Polls ────────────────────────────────────────────────────────────

pub fn print_polls(polls: &[Poll], config: &OutputConfig) {
    print_list(
        polls,
        config,
        "No polls found.",
        &["ID", "STATUS", "DEADLINE", "TITLE"],
        |p| p.get_id(),
        |p| {
            vec![
                p.get_id(),
                p.get_status().to_string(),
                or_dash(p.get_deadline().map(|d| d.format("%Y-%m-%d %H:%M").to_string())),
                p.get_title(),
            ]
        },
    );
}

pub fn print_poll(details: &PollDetails, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if !config.quiet => {
            let poll = &details.poll;
            println!("{} [{}]", poll.get_title(), poll.get_status());
            if let Some(description) = poll.get_description() {
                println!("{}", description);
            }
            if poll.get_allow_multiple() {
                println!("Multiple choices allowed");
            }
            println!();
            let rows: Vec<Vec<String>> = details
                .options
                .iter()
                .map(|o| vec![o.get_id(), o.get_label()])
                .collect();
            print_table(&["OPTION", "LABEL"], &rows);
        }
        OutputFormat::Human => println!("{}", details.poll.get_id()),
        OutputFormat::Json => print_json(details),
    }
}

pub fn print_poll_state(poll: &Poll, config: &OutputConfig) {
    print_record(
        poll,
        config,
        poll.get_id(),
        vec![
            ("ID", poll.get_id()),
            ("Title", poll.get_title()),
            ("Status", poll.get_status().to_string()),
        ],
    );
}

pub fn print_results(results: &PollResults, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human if !config.quiet => {
            let rows: Vec<Vec<String>> = results
                .options
                .iter()
                .map(|o| vec![o.label.clone(), o.votes.to_string()])
                .collect();
            print_table(&["OPTION", "VOTES"], &rows);
            println!("{} voters", results.total_voters);
        }
        OutputFormat::Human => println!("{}", results.total_voters),
        OutputFormat::Json => print_json(results),
    }
}

/// Prints a success message in the specified format
pub fn print_success(message: &str, config: &OutputConfig) {
    match config.format {
        OutputFormat::Human => {
            if !config.quiet {
                println!("{}", message);
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({ "success": true, "message": message })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(1234), "12.34");
        assert_eq!(format_cents(-5), "-0.05");
        assert_eq!(format_cents(100_000), "1000.00");
    }
}
