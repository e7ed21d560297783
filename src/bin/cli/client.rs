use committee_portal::dto::{
    CreateDraftDto, CreateFaqDto, CreateInventoryItemDto, CreatePollDto, CreatePurchaseDto,
    CreateReceiptDto, CreateTransactionDto, CreateUserDto, InventoryItemView, InventoryQueryDto,
    ItemLedger, LinkQuantityDto, LinkedItem, ManualCountDto, MarkReadDto, PollDetails, PollResults,
    PurchaseDetails, SendDraftDto, ThreadSummary, TransactionQueryDto, TreasurySummary,
    UpdateDraftDto, UpdateFaqDto, UpdateInventoryItemDto, UpdatePurchaseDto,
    UpdatePurchaseStatusDto, UpdateTransactionDto, VoteDto,
};
use committee_portal::handlers::USER_ID_HEADER;
use committee_portal::models::{
    Faq, InventoryItem, MailDraft, MailMessage, Permission, Poll, PollStatus, PollVote, Purchase,
    PurchaseStatus, Receipt, Transaction, User,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Error type for CLI client operations
#[derive(Error, Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    #[error("Server error ({}): {message}", .status.as_u16())]
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    #[error(transparent)]
    Request(#[from] reqwest::Error),
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// Builds query parameters for the inventory list
///
/// `category` is repeated once per value, which the server reads as a list.
fn inventory_query_params(query: &InventoryQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    for category in &query.category {
        params.push(("category", category.clone()));
    }
    if let Some(ref location) = query.location {
        params.push(("location", location.clone()));
    }
    if query.include_removed {
        params.push(("include_removed", "true".to_string()));
    }
    if query.unknown_only {
        params.push(("unknown_only", "true".to_string()));
    }

    params
}

fn transaction_query_params(query: &TransactionQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(year) = query.year {
        params.push(("year", year.to_string()));
    }
    if let Some(kind) = query.kind {
        params.push(("kind", kind.to_string()));
    }
    if let Some(status) = query.status {
        params.push(("status", status.to_string()));
    }
    if let Some(ref category) = query.category {
        params.push(("category", category.clone()));
    }

    params
}

/// HTTP client wrapper for communicating with the portal server
pub struct PortalClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// Sent as `X-User-Id` on every request when set
    user_id: Option<String>,
    /// The underlying HTTP client
    client: Client,
}

impl PortalClient {
    /// Creates a new PortalClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the portal server
    /// * `user_id` - The acting user, required for voting
    pub fn new(base_url: String, user_id: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
            client: Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let request = match &self.user_id {
            Some(user_id) => request.header(USER_ID_HEADER, user_id),
            None => request,
        };
        let response = request.send().await?.check().await?;
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send(self.client.get(self.url(path))).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.client.post(self.url(path)).json(body)).await
    }

    async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ClientError> {
        self.send(self.client.put(self.url(path)).json(body)).await
    }

    async fn delete(&self, path: &str) -> Result<(), ClientError> {
        self.send::<serde_json::Value>(self.client.delete(self.url(path))).await?;
        Ok(())
    }

    // ── Inventory endpoints ──────────────────────────────────────────

    /// Lists inventory items with optional filters
    pub async fn list_inventory(&self, query: &InventoryQueryDto) -> Result<Vec<InventoryItemView>, ClientError> {
        let request = self.client.get(self.url("/inventory")).query(&inventory_query_params(query));
        self.send(request).await
    }

    pub async fn get_inventory_item(&self, id: &str) -> Result<InventoryItemView, ClientError> {
        self.get(&format!("/inventory/{}", id)).await
    }

    pub async fn create_inventory_item(&self, dto: &CreateInventoryItemDto) -> Result<InventoryItem, ClientError> {
        self.post("/inventory", dto).await
    }

    pub async fn update_inventory_item(&self, id: &str, dto: &UpdateInventoryItemDto) -> Result<InventoryItem, ClientError> {
        self.put(&format!("/inventory/{}", id), dto).await
    }

    pub async fn delete_inventory_item(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/inventory/{}", id)).await
    }

    /// Gets an item with its breakdown and linked transactions
    pub async fn get_item_ledger(&self, id: &str) -> Result<ItemLedger, ClientError> {
        self.get(&format!("/inventory/{}/ledger", id)).await
    }

    /// Links `quantity` units of an item to a transaction
    pub async fn link_transaction(&self, id: &str, transaction_id: &str, quantity: i32) -> Result<InventoryItemView, ClientError> {
        let path = format!("/inventory/{}/transactions/{}", id, transaction_id);
        self.put(&path, &LinkQuantityDto { quantity }).await
    }

    pub async fn unlink_transaction(&self, id: &str, transaction_id: &str) -> Result<InventoryItemView, ClientError> {
        let path = format!("/inventory/{}/transactions/{}", id, transaction_id);
        self.send(self.client.delete(self.url(&path))).await
    }

    pub async fn set_manual_count(&self, id: &str, manual_count: i32) -> Result<InventoryItemView, ClientError> {
        self.put(&format!("/inventory/{}/manual", id), &ManualCountDto { manual_count }).await
    }

    /// Marks every unknown unit of an item as manual
    pub async fn absorb_unknown(&self, id: &str) -> Result<InventoryItemView, ClientError> {
        self.post(&format!("/inventory/{}/manual/absorb", id), &()).await
    }

    pub async fn list_inventory_categories(&self) -> Result<Vec<String>, ClientError> {
        self.get("/inventory/categories").await
    }

    pub async fn list_inventory_locations(&self) -> Result<Vec<String>, ClientError> {
        self.get("/inventory/locations").await
    }

    // ── Treasury endpoints ───────────────────────────────────────────

    pub async fn list_transactions(&self, query: &TransactionQueryDto) -> Result<Vec<Transaction>, ClientError> {
        let request = self.client.get(self.url("/transactions")).query(&transaction_query_params(query));
        self.send(request).await
    }

    pub async fn get_transaction(&self, id: &str) -> Result<Transaction, ClientError> {
        self.get(&format!("/transactions/{}", id)).await
    }

    pub async fn create_transaction(&self, dto: &CreateTransactionDto) -> Result<Transaction, ClientError> {
        self.post("/transactions", dto).await
    }

    pub async fn update_transaction(&self, id: &str, dto: &UpdateTransactionDto) -> Result<Transaction, ClientError> {
        self.put(&format!("/transactions/{}", id), dto).await
    }

    pub async fn delete_transaction(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/transactions/{}", id)).await
    }

    /// Lists the items linked to a transaction
    pub async fn list_transaction_items(&self, id: &str) -> Result<Vec<LinkedItem>, ClientError> {
        self.get(&format!("/transactions/{}/inventory", id)).await
    }

    /// Gets the income and expense totals of a year
    pub async fn get_treasury_summary(&self, year: i32) -> Result<TreasurySummary, ClientError> {
        let request = self.client.get(self.url("/transactions/summary")).query(&[("year", year)]);
        self.send(request).await
    }

    pub async fn list_transaction_years(&self) -> Result<Vec<i32>, ClientError> {
        self.get("/transactions/years").await
    }

    // ── Reimbursement endpoints ──────────────────────────────────────

    pub async fn create_receipt(&self, dto: &CreateReceiptDto) -> Result<Receipt, ClientError> {
        self.post("/receipts", dto).await
    }

    pub async fn list_receipts(&self, unattached: bool) -> Result<Vec<Receipt>, ClientError> {
        let request = self.client.get(self.url("/receipts")).query(&[("unattached", unattached)]);
        self.send(request).await
    }

    pub async fn delete_receipt(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/receipts/{}", id)).await
    }

    pub async fn create_purchase(&self, dto: &CreatePurchaseDto) -> Result<PurchaseDetails, ClientError> {
        self.post("/purchases", dto).await
    }

    pub async fn list_purchases(&self, status: Option<PurchaseStatus>) -> Result<Vec<Purchase>, ClientError> {
        let mut request = self.client.get(self.url("/purchases"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.send(request).await
    }

    pub async fn get_purchase(&self, id: &str) -> Result<PurchaseDetails, ClientError> {
        self.get(&format!("/purchases/{}", id)).await
    }

    pub async fn update_purchase(&self, id: &str, dto: &UpdatePurchaseDto) -> Result<Purchase, ClientError> {
        self.put(&format!("/purchases/{}", id), dto).await
    }

    /// Moves a purchase to another status
    pub async fn set_purchase_status(&self, id: &str, status: PurchaseStatus) -> Result<PurchaseDetails, ClientError> {
        self.put(&format!("/purchases/{}/status", id), &UpdatePurchaseStatusDto { status }).await
    }

    pub async fn delete_purchase(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/purchases/{}", id)).await
    }

    // ── Mail endpoints ───────────────────────────────────────────────

    pub async fn list_threads(&self) -> Result<Vec<ThreadSummary>, ClientError> {
        self.get("/mail/threads").await
    }

    pub async fn get_thread(&self, thread_id: &str) -> Result<Vec<MailMessage>, ClientError> {
        self.get(&format!("/mail/threads/{}", thread_id)).await
    }

    pub async fn get_message(&self, id: &str) -> Result<MailMessage, ClientError> {
        self.get(&format!("/mail/messages/{}", id)).await
    }

    pub async fn set_message_read(&self, id: &str, is_read: bool) -> Result<MailMessage, ClientError> {
        self.put(&format!("/mail/messages/{}/read", id), &MarkReadDto { is_read }).await
    }

    pub async fn list_drafts(&self) -> Result<Vec<MailDraft>, ClientError> {
        self.get("/mail/drafts").await
    }

    pub async fn get_draft(&self, id: &str) -> Result<MailDraft, ClientError> {
        self.get(&format!("/mail/drafts/{}", id)).await
    }

    pub async fn create_draft(&self, dto: &CreateDraftDto) -> Result<MailDraft, ClientError> {
        self.post("/mail/drafts", dto).await
    }

    pub async fn update_draft(&self, id: &str, dto: &UpdateDraftDto) -> Result<MailDraft, ClientError> {
        self.put(&format!("/mail/drafts/{}", id), dto).await
    }

    pub async fn delete_draft(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/mail/drafts/{}", id)).await
    }

    /// Sends a draft from the given committee address
    pub async fn send_draft(&self, id: &str, from: String) -> Result<MailMessage, ClientError> {
        self.post(&format!("/mail/drafts/{}/send", id), &SendDraftDto { from }).await
    }

    // ── FAQ endpoints ────────────────────────────────────────────────

    pub async fn list_faqs(&self) -> Result<Vec<Faq>, ClientError> {
        self.get("/faqs").await
    }

    pub async fn get_faq(&self, id: &str) -> Result<Faq, ClientError> {
        self.get(&format!("/faqs/{}", id)).await
    }

    pub async fn create_faq(&self, dto: &CreateFaqDto) -> Result<Faq, ClientError> {
        self.post("/faqs", dto).await
    }

    pub async fn update_faq(&self, id: &str, dto: &UpdateFaqDto) -> Result<Faq, ClientError> {
        self.put(&format!("/faqs/{}", id), dto).await
    }

    pub async fn delete_faq(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/faqs/{}", id)).await
    }

    // ── User endpoints ───────────────────────────────────────────────

    pub async fn list_users(&self) -> Result<Vec<User>, ClientError> {
        self.get("/users").await
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        self.get(&format!("/users/{}", id)).await
    }

    pub async fn create_user(&self, dto: &CreateUserDto) -> Result<User, ClientError> {
        self.post("/users", dto).await
    }

    pub async fn get_user_permissions(&self, id: &str) -> Result<Vec<Permission>, ClientError> {
        self.get(&format!("/users/{}/permissions", id)).await
    }

    // ── Poll endpoints ───────────────────────────────────────────────

    pub async fn list_polls(&self, status: Option<PollStatus>) -> Result<Vec<Poll>, ClientError> {
        let mut request = self.client.get(self.url("/polls"));
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        self.send(request).await
    }

    pub async fn get_poll(&self, id: &str) -> Result<PollDetails, ClientError> {
        self.get(&format!("/polls/{}", id)).await
    }

    pub async fn create_poll(&self, dto: &CreatePollDto) -> Result<PollDetails, ClientError> {
        self.post("/polls", dto).await
    }

    pub async fn open_poll(&self, id: &str) -> Result<Poll, ClientError> {
        self.post(&format!("/polls/{}/open", id), &()).await
    }

    pub async fn close_poll(&self, id: &str) -> Result<Poll, ClientError> {
        self.post(&format!("/polls/{}/close", id), &()).await
    }

    pub async fn delete_poll(&self, id: &str) -> Result<(), ClientError> {
        self.delete(&format!("/polls/{}", id)).await
    }

    /// Casts a ballot as the configured user
    pub async fn vote(&self, id: &str, option_ids: Vec<String>) -> Result<Vec<PollVote>, ClientError> {
        self.post(&format!("/polls/{}/votes", id), &VoteDto { option_ids }).await
    }

    pub async fn get_poll_results(&self, id: &str) -> Result<PollResults, ClientError> {
        self.get(&format!("/polls/{}/results", id)).await
    }
}
