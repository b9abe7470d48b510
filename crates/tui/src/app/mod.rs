use std::time::Duration;

use chrono::{DateTime, Local};
use crossterm::event::{self, Event, KeyEvent};
use tokio::{sync::mpsc, task::JoinSet};
use uuid::Uuid;

use api_types::transaction::{self as wire, TransactionView};
use engine::{
    BudgetEntry, CatalogItem, CatalogSnapshot, ExistingTransaction, MoneyCents, PendingReceipt,
    PortfolioDirection, ReceiptRef, SplitPart, TransactionDraft, TypeChange, install_categories,
};

use crate::{
    client::{Client, ClientError},
    config::AppConfig,
    error::{AppError, Result},
    local_state::LocalState,
    ui,
};

mod form;

pub use form::{FormEffect, FormField, FormModal, FormMode, SplitColumn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug)]
pub struct ToastState {
    pub level: ToastLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct TransactionsState {
    pub items: Vec<TransactionView>,
    pub selected: usize,
    pub error: Option<String>,
}

impl TransactionsState {
    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
    }
}

/// The application-state store: initialized at start, mutated only by the
/// [`App`] event handlers, rendered read-only.
#[derive(Debug)]
pub struct AppState {
    pub transactions: TransactionsState,
    pub form: Option<FormModal>,
    pub toast: Option<ToastState>,
    pub base_url: String,
    pub last_refresh: Option<DateTime<Local>>,
}

/// Completions of background work that may outlive the form.
///
/// Each message carries the liveness token it was spawned with; the form
/// drops completions whose token no longer matches (closed or superseded).
#[derive(Debug)]
pub enum AppEvent {
    CategoriesLoaded {
        token: u64,
        result: std::result::Result<Vec<String>, String>,
    },
}

pub struct App {
    config: AppConfig,
    client: Client,
    local: LocalState,
    pub state: AppState,
    events: mpsc::UnboundedReceiver<AppEvent>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    next_fetch_token: u64,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::new(&config.base_url)?;
        let local = LocalState::load(&config.state_path).unwrap_or_else(|err| {
            tracing::warn!("failed to load local state: {err}");
            LocalState::default()
        });
        let (events_tx, events) = mpsc::unbounded_channel();
        let state = AppState {
            transactions: TransactionsState::default(),
            form: None,
            toast: None,
            base_url: config.base_url.clone(),
            last_refresh: None,
        };

        Ok(Self {
            config,
            client,
            local,
            state,
            events,
            events_tx,
            next_fetch_token: 0,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        self.refresh_transactions().await;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            while let Ok(app_event) = self.events.try_recv() {
                self.handle_app_event(app_event);
            }

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) => self.handle_key(key).await?,
                    Event::Resize(_, _) => {}
                    _ => {}
                }
            }
        }

        Ok(())
    }

    async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        let action = ui::keymap::map_key(key);

        if action == ui::keymap::AppAction::Quit {
            self.should_quit = true;
            return Ok(());
        }

        if self.state.form.is_some() {
            return self.handle_form_action(action).await;
        }

        match action {
            ui::keymap::AppAction::Cancel => {
                self.state.toast = None;
            }
            ui::keymap::AppAction::Up => self.state.transactions.select_prev(),
            ui::keymap::AppAction::Down => self.state.transactions.select_next(),
            ui::keymap::AppAction::Submit => self.open_selected_for_edit().await?,
            ui::keymap::AppAction::Input(ch) => match ch {
                'q' | 'Q' => self.should_quit = true,
                'a' | 'A' => self.open_form(None).await?,
                'e' | 'E' => self.open_selected_for_edit().await?,
                'r' | 'R' => {
                    self.refresh_transactions().await;
                    if self.state.transactions.error.is_none() {
                        self.toast(ToastLevel::Info, "Movimientos actualizados.");
                    }
                }
                'j' | 'J' => self.state.transactions.select_next(),
                'k' | 'K' => self.state.transactions.select_prev(),
                _ => {}
            },
            _ => {}
        }

        Ok(())
    }

    async fn handle_form_action(&mut self, action: ui::keymap::AppAction) -> Result<()> {
        let effect = match self.state.form.as_mut() {
            Some(modal) => modal.handle(action),
            None => return Ok(()),
        };

        match effect {
            FormEffect::None => {}
            FormEffect::TypeChanged(change) => self.apply_type_change(change),
            FormEffect::CreateAccount(name) => self.create_account_inline(name).await,
            FormEffect::Submit => self.submit_form().await,
            FormEffect::Close => {
                self.state.form = None;
            }
        }

        Ok(())
    }

    fn handle_app_event(&mut self, app_event: AppEvent) {
        match app_event {
            AppEvent::CategoriesLoaded { token, result } => {
                // Form closed, or a newer fetch superseded this one.
                let Some(modal) = self.state.form.as_mut() else {
                    return;
                };
                if modal.pending_fetch != Some(token) {
                    return;
                }
                modal.pending_fetch = None;
                match result {
                    Ok(list) => {
                        let override_label = modal.pending_override.take();
                        install_categories(&mut modal.catalogs, list, override_label.as_deref());
                    }
                    Err(message) => {
                        tracing::warn!("category fetch failed: {message}");
                        modal.catalogs.categories.clear();
                        modal.pending_override = None;
                        if modal.form.split.is_none() && !modal.form.is_transfer {
                            modal.form.category = None;
                            modal.form.category_from_budget = false;
                        }
                        modal.advisory =
                            Some(format!("No se pudieron cargar las categorías: {message}"));
                    }
                }
            }
        }
    }

    /// Executes a [`TypeChange`] directive from the engine: surfaces the
    /// advisory, invalidates the category list, and spawns the scoped
    /// category fetch tagged with a fresh liveness token.
    fn apply_type_change(&mut self, change: TypeChange) {
        let Some(modal) = self.state.form.as_mut() else {
            return;
        };
        modal.advisory = change.advisory;
        if change.clear_categories {
            modal.catalogs.categories.clear();
            modal.pending_fetch = None;
            modal.pending_override = None;
        }
        if let Some(type_id) = change.fetch_categories {
            self.next_fetch_token += 1;
            let token = self.next_fetch_token;
            modal.pending_fetch = Some(token);
            modal.pending_override = change.category_override;

            let client = self.client.clone();
            let events = self.events_tx.clone();
            tokio::spawn(async move {
                let result = client
                    .categories(type_id)
                    .await
                    .map_err(|err| message_for(&err));
                let _ = events.send(AppEvent::CategoriesLoaded { token, result });
            });
        }
    }

    async fn refresh_transactions(&mut self) {
        match self.client.transactions().await {
            Ok(items) => {
                let len = items.len();
                self.state.transactions.items = items;
                self.state.transactions.selected =
                    self.state.transactions.selected.min(len.saturating_sub(1));
                self.state.transactions.error = None;
                self.state.last_refresh = Some(Local::now());
            }
            Err(err) => {
                self.state.transactions.error = Some(message_for(&err));
            }
        }
    }

    async fn open_selected_for_edit(&mut self) -> Result<()> {
        let view = self
            .state
            .transactions
            .items
            .get(self.state.transactions.selected)
            .cloned();
        if let Some(view) = view {
            self.open_form(Some(view)).await?;
        }
        Ok(())
    }

    /// Opens the form modal: joins all catalog fetches, builds the engine
    /// state (blank or from the selected transaction) and, in edit mode,
    /// kicks off the category fetch for the loaded type.
    async fn open_form(&mut self, existing: Option<TransactionView>) -> Result<()> {
        let (catalogs, notice) = match self.load_catalogs().await {
            Ok(loaded) => loaded,
            Err(message) => {
                self.toast(ToastLevel::Error, message);
                return Ok(());
            }
        };

        let today = Local::now().date_naive();
        let mut modal = match existing {
            Some(view) => {
                let id = view.id;
                let loaded = to_existing(&view, &catalogs);
                FormModal::edit(id, loaded, catalogs, today)
            }
            None => FormModal::create(catalogs, today),
        };

        if modal.mode == FormMode::Create {
            if let Some(account_id) = self.local.default_account(&self.state.base_url) {
                if modal.catalogs.accounts.iter().any(|a| a.id == account_id) {
                    modal.form.account_id = Some(account_id);
                }
            }
        }

        let profile = modal.form.profile(&modal.catalogs);
        let fetch_type = if profile.is_transfer {
            None
        } else {
            modal.form.type_id
        };
        let keep_category = modal
            .form
            .category
            .clone()
            .filter(|label| label.as_str() != engine::SPLIT_CATEGORY);

        self.state.form = Some(modal);

        if let Some(type_id) = fetch_type {
            self.apply_type_change(TypeChange {
                fetch_categories: Some(type_id),
                category_override: keep_category,
                clear_categories: false,
                advisory: None,
            });
        }
        if let Some(notice) = notice {
            if let Some(modal) = self.state.form.as_mut() {
                modal.advisory = Some(notice);
            }
        }

        Ok(())
    }

    /// Joins every catalog fetch the form needs. Accounts, transaction types
    /// and budget entries are required; goals, debts and tags degrade to
    /// empty lists with a notice.
    async fn load_catalogs(
        &self,
    ) -> std::result::Result<(CatalogSnapshot, Option<String>), String> {
        let today = Local::now().date_naive();
        let (accounts, types, budget, goals, debts, tags) = tokio::join!(
            self.client.accounts(),
            self.client.transaction_types(),
            self.client.budget_active(today),
            self.client.goals(),
            self.client.debts(),
            self.client.tags(),
        );

        let accounts = accounts
            .map_err(|err| format!("No se pudieron cargar las cuentas: {}", message_for(&err)))?;
        let types = types.map_err(|err| {
            format!(
                "No se pudieron cargar los tipos de transacción: {}",
                message_for(&err)
            )
        })?;
        let budget = budget
            .map_err(|err| format!("No se pudo cargar el presupuesto: {}", message_for(&err)))?;

        let mut degraded: Vec<&str> = Vec::new();
        let goals = goals.unwrap_or_else(|err| {
            tracing::warn!("goals catalog unavailable: {}", message_for(&err));
            degraded.push("metas");
            Vec::new()
        });
        let debts = debts.unwrap_or_else(|err| {
            tracing::warn!("debts catalog unavailable: {}", message_for(&err));
            degraded.push("deudas");
            Vec::new()
        });
        let tags = tags.unwrap_or_else(|err| {
            tracing::warn!("tags catalog unavailable: {}", message_for(&err));
            degraded.push("etiquetas");
            Vec::new()
        });

        let catalogs = CatalogSnapshot {
            accounts: accounts
                .into_iter()
                .map(|account| CatalogItem::new(account.id, account.name))
                .collect(),
            types: types
                .into_iter()
                .map(|ty| CatalogItem::new(ty.id, ty.name))
                .collect(),
            categories: Vec::new(),
            goals: goals
                .into_iter()
                .map(|goal| CatalogItem::new(goal.id, goal.name))
                .collect(),
            debts: debts
                .into_iter()
                .map(|debt| CatalogItem::new(debt.id, debt.name))
                .collect(),
            budget_entries: budget.into_iter().map(map_budget_entry).collect(),
            known_tags: tags,
        };

        let notice = (!degraded.is_empty())
            .then(|| format!("Catálogos no disponibles: {}.", degraded.join(", ")));

        Ok((catalogs, notice))
    }

    async fn create_account_inline(&mut self, name: String) {
        match self.client.create_account(&name).await {
            Ok(created) => {
                let refreshed = self.client.accounts().await;
                if let Some(modal) = self.state.form.as_mut() {
                    match refreshed {
                        Ok(accounts) => {
                            modal.catalogs.accounts = accounts
                                .into_iter()
                                .map(|account| CatalogItem::new(account.id, account.name))
                                .collect();
                        }
                        Err(err) => {
                            tracing::warn!("account refresh failed: {}", message_for(&err));
                        }
                    }
                    if !modal.catalogs.accounts.iter().any(|a| a.id == created.id) {
                        modal
                            .catalogs
                            .accounts
                            .push(CatalogItem::new(created.id, name.clone()));
                    }
                    modal.form.account_id = Some(created.id);
                    modal.account_prompt = None;
                }
                self.toast(ToastLevel::Success, format!("Cuenta \"{name}\" creada."));
            }
            Err(err) => {
                if let Some(modal) = self.state.form.as_mut() {
                    modal.error =
                        Some(format!("No se pudo crear la cuenta: {}", message_for(&err)));
                }
            }
        }
    }

    /// Runs the engine validation, submits the payload and, only after the
    /// write succeeds, syncs the staged receipt batch. A validation or
    /// network failure leaves the form open and populated.
    async fn submit_form(&mut self) {
        let (draft, mode, deletes, uploads) = {
            let Some(modal) = self.state.form.as_mut() else {
                return;
            };
            modal.form.commit_tag_input();
            if !modal.receipt_input.trim().is_empty() {
                let path = std::mem::take(&mut modal.receipt_input);
                modal.form.receipts.queue_upload(path.trim());
            }
            match modal.form.build_submission(&modal.catalogs) {
                Ok(draft) => {
                    modal.error = None;
                    (
                        draft,
                        modal.mode,
                        modal.form.receipts.staged_deletes().to_vec(),
                        modal.form.receipts.pending().to_vec(),
                    )
                }
                Err(err) => {
                    modal.error = Some(err.to_string());
                    return;
                }
            }
        };

        let body = match mode {
            FormMode::Create => to_upsert(&draft, Some(Uuid::new_v4().to_string())),
            FormMode::Edit(_) => to_upsert(&draft, None),
        };

        let saved = match mode {
            FormMode::Create => self
                .client
                .create_transaction(&body)
                .await
                .map(|created| created.id),
            FormMode::Edit(id) => self.client.update_transaction(id, &body).await.map(|_| id),
        };

        let transaction_id = match saved {
            Ok(id) => id,
            Err(err) => {
                if let Some(modal) = self.state.form.as_mut() {
                    modal.error = Some(format!("No se pudo guardar: {}", message_for(&err)));
                }
                return;
            }
        };

        let warning = self.sync_receipts(transaction_id, deletes, uploads).await;

        self.local
            .set_default_account(&self.state.base_url, draft.account_id);
        if let Err(err) = self.local.save(&self.config.state_path) {
            tracing::warn!("failed to persist local defaults: {err}");
        }

        self.state.form = None;
        self.refresh_transactions().await;

        match warning {
            Some(message) => self.toast(ToastLevel::Error, message),
            None => self.toast(ToastLevel::Success, "Transacción guardada."),
        }
    }

    /// Best-effort concurrent receipt batch. Individual failures flip the
    /// warning without aborting the others; the saved transaction is never
    /// rolled back.
    async fn sync_receipts(
        &self,
        transaction_id: i64,
        deletes: Vec<i64>,
        uploads: Vec<PendingReceipt>,
    ) -> Option<String> {
        if deletes.is_empty() && uploads.is_empty() {
            return None;
        }

        let mut batch: JoinSet<std::result::Result<(), String>> = JoinSet::new();
        for id in deletes {
            let client = self.client.clone();
            batch.spawn(async move {
                client
                    .delete_receipt(id)
                    .await
                    .map_err(|err| format!("recibo {id}: {}", message_for(&err)))
            });
        }
        for pending in uploads {
            let client = self.client.clone();
            batch.spawn(async move {
                client
                    .upload_receipt(transaction_id, &pending.path, &pending.filename)
                    .await
                    .map(|_| ())
                    .map_err(|err| format!("{}: {}", pending.filename, message_for(&err)))
            });
        }

        let mut failures = Vec::new();
        while let Some(joined) = batch.join_next().await {
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(message)) => failures.push(message),
                Err(err) => failures.push(err.to_string()),
            }
        }

        if failures.is_empty() {
            None
        } else {
            tracing::warn!("receipt sync incomplete: {}", failures.join("; "));
            Some(format!(
                "Transacción guardada, pero falló la sincronización de recibos: {}",
                failures.join("; ")
            ))
        }
    }

    fn toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.state.toast = Some(ToastState {
            level,
            message: message.into(),
        });
    }
}

fn message_for(err: &ClientError) -> String {
    match err {
        ClientError::Unauthorized => "Sesión no autorizada.".to_string(),
        ClientError::NotFound => "Recurso no encontrado.".to_string(),
        ClientError::Conflict(message) => format!("Conflicto: {message}"),
        ClientError::Validation(message) => format!("Error de validación: {message}"),
        ClientError::Server(message) => format!("Error del servidor: {message}"),
        ClientError::Transport(err) => format!("Servidor no disponible: {err}"),
        ClientError::Decode(message) => format!("Respuesta inesperada del servidor: {message}"),
        ClientError::File(message) => format!("No se pudo leer el archivo: {message}"),
    }
}

fn map_budget_entry(entry: api_types::budget::BudgetEntry) -> BudgetEntry {
    BudgetEntry {
        id: entry.id,
        category: entry.category,
        type_label: entry.kind,
        goal_id: entry.goal_id,
        debt_id: entry.debt_id,
        planned: MoneyCents::from_decimal(entry.planned_amount),
        actual: MoneyCents::from_decimal(entry.actual_amount),
        remaining: MoneyCents::from_decimal(entry.remaining_amount),
        frequency: entry.frequency,
    }
}

fn direction_from_wire(direction: wire::PortfolioDirection) -> PortfolioDirection {
    match direction {
        wire::PortfolioDirection::Compra => PortfolioDirection::Compra,
        wire::PortfolioDirection::Venta => PortfolioDirection::Venta,
    }
}

fn direction_to_wire(direction: PortfolioDirection) -> wire::PortfolioDirection {
    match direction {
        PortfolioDirection::Compra => wire::PortfolioDirection::Compra,
        PortfolioDirection::Venta => wire::PortfolioDirection::Venta,
    }
}

/// Maps a wire view into the engine's edit input, resolving the type label
/// back to its catalog id.
fn to_existing(view: &TransactionView, catalogs: &CatalogSnapshot) -> ExistingTransaction {
    ExistingTransaction {
        description: view.description.clone(),
        amount: MoneyCents::from_decimal(view.amount),
        date: view.date,
        type_id: catalogs.type_by_label(&view.kind).map(|ty| ty.id),
        category: Some(view.category.clone()),
        account_id: Some(view.account_id),
        goal_id: view.goal_id,
        debt_id: view.debt_id,
        budget_entry_id: view.budget_entry_id,
        is_transfer: view.is_transfer,
        transfer_account_id: view.transfer_account_id,
        portfolio_direction: view.portfolio_direction.map(direction_from_wire),
        splits: view
            .splits
            .iter()
            .map(|split| SplitPart {
                category: split.category.clone(),
                amount: MoneyCents::from_decimal(split.amount),
            })
            .collect(),
        tags: view.tags.clone(),
        receipts: view
            .receipts
            .iter()
            .map(|receipt| ReceiptRef {
                id: receipt.id,
                filename: receipt.filename.clone(),
                url: receipt.url.clone(),
                size_bytes: receipt.size_bytes,
                uploaded_at: receipt.uploaded_at,
            })
            .collect(),
    }
}

fn to_upsert(draft: &TransactionDraft, idempotency_key: Option<String>) -> wire::TransactionUpsert {
    wire::TransactionUpsert {
        description: draft.description.clone(),
        amount: draft.amount.to_decimal(),
        date: draft.date,
        account_id: draft.account_id,
        kind: draft.type_label.clone(),
        category: draft.category.clone(),
        goal_id: draft.goal_id,
        debt_id: draft.debt_id,
        budget_entry_id: draft.budget_entry_id,
        is_transfer: draft.is_transfer,
        transfer_account_id: draft.transfer_account_id,
        splits: draft
            .splits
            .iter()
            .map(|part| wire::Split {
                category: part.category.clone(),
                amount: part.amount.to_decimal(),
            })
            .collect(),
        tags: draft.tags.clone(),
        portfolio_direction: draft.portfolio_direction.map(direction_to_wire),
        idempotency_key,
    }
}
