use std::path::Path;

use reqwest::{Url, multipart};
use serde::{Deserialize, de::DeserializeOwned};

use api_types::{
    account::{Account, AccountCreated, AccountNew},
    budget::BudgetEntry,
    debt::Debt,
    goal::Goal,
    parameters::TransactionType,
    receipt::ReceiptCreated,
    transaction::{TransactionCreated, TransactionUpsert, TransactionView},
};
use chrono::NaiveDate;

use crate::error::{AppError, Result};

#[derive(Debug)]
pub enum ClientError {
    Unauthorized,
    NotFound,
    Conflict(String),
    Validation(String),
    Server(String),
    Transport(reqwest::Error),
    /// The response did not match the expected schema.
    Decode(String),
    /// A local file could not be read for upload.
    File(String),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    http: reqwest::Client,
}

impl Client {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|err| AppError::Terminal(format!("invalid base_url: {err}")))?;
        Ok(Self {
            base_url,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self, path: &str) -> ClientResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ClientError::Server(format!("invalid base_url: {err}")))
    }

    /// Parses a successful response strictly; shape mismatches are typed
    /// decode errors, never silently-trusted payloads.
    async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> ClientResult<T> {
        if !res.status().is_success() {
            return Err(Self::error_for(res).await);
        }
        let body = res.bytes().await.map_err(ClientError::Transport)?;
        serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }

    async fn accept(res: reqwest::Response) -> ClientResult<()> {
        if res.status().is_success() {
            return Ok(());
        }
        Err(Self::error_for(res).await)
    }

    async fn error_for(res: reqwest::Response) -> ClientError {
        let status = res.status();
        let body = res
            .json::<ErrorResponse>()
            .await
            .map(|err| err.error)
            .unwrap_or_else(|_| "unknown error".to_string());

        match status.as_u16() {
            401 | 403 => ClientError::Unauthorized,
            404 => ClientError::NotFound,
            409 => ClientError::Conflict(body),
            422 => ClientError::Validation(body),
            _ => ClientError::Server(body),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let res = self
            .http
            .get(self.endpoint(path)?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::decode(res).await
    }

    pub async fn accounts(&self) -> ClientResult<Vec<Account>> {
        self.get_json("accounts").await
    }

    pub async fn transaction_types(&self) -> ClientResult<Vec<TransactionType>> {
        self.get_json("parameters/transaction-types").await
    }

    /// Category labels scoped to one transaction type.
    pub async fn categories(&self, type_id: i64) -> ClientResult<Vec<String>> {
        self.get_json(&format!("parameters/categories/{type_id}"))
            .await
    }

    pub async fn goals(&self) -> ClientResult<Vec<Goal>> {
        self.get_json("goals").await
    }

    pub async fn debts(&self) -> ClientResult<Vec<Debt>> {
        self.get_json("debts").await
    }

    pub async fn budget_active(&self, reference_date: NaiveDate) -> ClientResult<Vec<BudgetEntry>> {
        let reference_date = reference_date.to_string();
        let res = self
            .http
            .get(self.endpoint("budget")?)
            .query(&[
                ("status", "active"),
                ("reference_date", reference_date.as_str()),
            ])
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::decode(res).await
    }

    pub async fn tags(&self) -> ClientResult<Vec<String>> {
        self.get_json("tags").await
    }

    pub async fn transactions(&self) -> ClientResult<Vec<TransactionView>> {
        self.get_json("transactions").await
    }

    pub async fn create_transaction(
        &self,
        body: &TransactionUpsert,
    ) -> ClientResult<TransactionCreated> {
        let res = self
            .http
            .post(self.endpoint("transactions")?)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::decode(res).await
    }

    pub async fn update_transaction(&self, id: i64, body: &TransactionUpsert) -> ClientResult<()> {
        let res = self
            .http
            .put(self.endpoint(&format!("transactions/{id}"))?)
            .json(body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::accept(res).await
    }

    /// Creates an account inline from the form; the returned id becomes the
    /// form's selected account.
    pub async fn create_account(&self, name: &str) -> ClientResult<AccountCreated> {
        let body = AccountNew {
            name: name.to_string(),
        };
        let res = self
            .http
            .post(self.endpoint("accounts")?)
            .json(&body)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::decode(res).await
    }

    /// Multipart upload of a staged receipt, after the transaction write.
    pub async fn upload_receipt(
        &self,
        transaction_id: i64,
        path: &Path,
        filename: &str,
    ) -> ClientResult<ReceiptCreated> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|err| ClientError::File(format!("{}: {err}", path.display())))?;
        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new()
            .part("file", part)
            .text("transaction_id", transaction_id.to_string());

        let res = self
            .http
            .post(self.endpoint("receipts")?)
            .multipart(form)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::decode(res).await
    }

    pub async fn delete_receipt(&self, id: i64) -> ClientResult<()> {
        let res = self
            .http
            .delete(self.endpoint(&format!("receipts/{id}"))?)
            .send()
            .await
            .map_err(ClientError::Transport)?;
        Self::accept(res).await
    }
}
