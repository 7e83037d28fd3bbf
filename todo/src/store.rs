//! The todo store facade
//!
//! [`TodoStore`] wraps the runtime [`Store`] and exposes each operation as an
//! async method that waits for the service's answer. A mounted store holds
//! up to three open channels; they are released by [`TodoStore::unmount`]
//! or, at the latest, when the facade is dropped.

use crate::api::TodoApi;
use crate::error::{Result, TodoError};
use crate::reducer::{SyncOptions, TodoEnvironment, TodoReducer};
use crate::types::{Channel, Operation, Todo, TodoAction, TodoId, TodoState};
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::time::Duration;
use tasksync_runtime::{Store, StoreError};
use tokio::sync::broadcast::error::RecvError;

/// Runtime store specialised for todos
pub type TodoRuntime<A> = Store<TodoState, TodoAction, TodoEnvironment<A>, TodoReducer<A>>;

/// How long operations wait for the service unless configured otherwise
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Todo screen state bound to a remote todo service
pub struct TodoStore<A: TodoApi> {
    store: TodoRuntime<A>,
    options: SyncOptions,
    response_timeout: Duration,
}

impl<A: TodoApi> TodoStore<A> {
    /// Create an unmounted store; form and dialog defaults are dated today
    #[must_use]
    pub fn new(env: TodoEnvironment<A>, options: SyncOptions) -> Self {
        let state = TodoState::new(env.clock.today());
        Self {
            store: Store::new(state, TodoReducer::new(options), env),
            options,
            response_timeout: DEFAULT_RESPONSE_TIMEOUT,
        }
    }

    /// Bound how long operations wait for the service's answer
    ///
    /// The remote call itself keeps running past the timeout.
    #[must_use]
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> SyncOptions {
        self.options
    }

    /// The underlying runtime store
    #[must_use]
    pub const fn runtime(&self) -> &TodoRuntime<A> {
        &self.store
    }

    // ========== Lifecycle ==========

    /// Fetch the collection and open the channels
    ///
    /// The two run concurrently; events may arrive before the fetch lands.
    ///
    /// # Errors
    ///
    /// Returns the first failure of either step.
    #[tracing::instrument(skip(self))]
    pub async fn mount(&self) -> Result<()> {
        let (fetched, subscribed) = tokio::join!(self.get_todos(), self.subscribe());
        fetched?;
        subscribed
    }

    /// Release the channels
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn unmount(&self) -> Result<()> {
        self.unsubscribe().await
    }

    // ========== Remote operations ==========

    /// Replace the collection with the service's
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Api`] if the service call fails.
    pub async fn get_todos(&self) -> Result<()> {
        self.request(TodoAction::GetTodos, Operation::List, |action| {
            matches!(action, TodoAction::TodosLoaded { .. })
        })
        .await
    }

    /// Submit the creation form
    ///
    /// Does nothing for an empty body. The new todo shows up once its
    /// creation event arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Api`] if the service call fails.
    pub async fn add_todo(&self) -> Result<()> {
        if !self.store.state(|s| s.input_todo.is_submittable()).await {
            tracing::debug!("Empty draft, nothing to create");
            return Ok(());
        }
        self.request(TodoAction::AddTodo, Operation::Create, |action| {
            matches!(action, TodoAction::TodoAdded { .. })
        })
        .await
    }

    /// Delete a todo
    ///
    /// With confirmation enabled this only parks the deletion; see
    /// [`TodoStore::confirm_deletion`] and [`TodoStore::cancel_deletion`].
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Api`] if the service call fails.
    #[tracing::instrument(skip(self))]
    pub async fn eliminate(&self, id: TodoId) -> Result<()> {
        if self.options.confirm_deletion {
            return self.dispatch(TodoAction::Eliminate { id }).await;
        }
        self.request(TodoAction::Eliminate { id }, Operation::Delete, |action| {
            matches!(action, TodoAction::TodoEliminated { .. })
        })
        .await
    }

    /// Carry out the parked deletion, if any
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Api`] if the service call fails.
    pub async fn confirm_deletion(&self) -> Result<()> {
        if self.store.state(|s| s.pending_deletion.is_none()).await {
            return Ok(());
        }
        self.request(TodoAction::ConfirmDeletion, Operation::Delete, |action| {
            matches!(action, TodoAction::TodoEliminated { .. })
        })
        .await
    }

    /// Drop the parked deletion and leave a notice
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn cancel_deletion(&self) -> Result<()> {
        self.dispatch(TodoAction::CancelDeletion).await
    }

    /// Push edits of a persisted todo
    ///
    /// Local state changes only when the update event arrives.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::MissingId`] for a todo that was never created,
    /// [`TodoError::Api`] if the service call fails.
    #[tracing::instrument(skip(self, todo), fields(id = ?todo.id))]
    pub async fn update(&self, todo: &Todo) -> Result<()> {
        if todo.id.is_none() {
            return Err(TodoError::MissingId);
        }
        self.request(TodoAction::Update { todo: todo.clone() }, Operation::Update, |action| {
            matches!(action, TodoAction::TodoUpdated { .. })
        })
        .await
    }

    /// Open the configured channels and wait until they listen
    ///
    /// Channels that are already open are left alone. Channels another
    /// caller is still connecting are waited for as well.
    ///
    /// # Errors
    ///
    /// Returns [`TodoError::Api`] for the first channel that failed to open,
    /// [`TodoError::Store`] if no answer came in time.
    pub async fn subscribe(&self) -> Result<()> {
        // Observe before reading state so no ChannelOpened slips between the two
        let mut actions = self.store.subscribe_actions();
        let mut pending: BTreeSet<Channel> = self
            .store
            .state(|s| {
                self.options
                    .channels()
                    .into_iter()
                    .filter(|channel| !s.channels.contains(channel) || s.connecting.contains(channel))
                    .collect()
            })
            .await;
        if pending.is_empty() {
            return Ok(());
        }

        self.store.send(TodoAction::Subscribe).await?;

        let outcome = tokio::time::timeout(self.response_timeout, async {
            let mut failure = None;
            while !pending.is_empty() {
                match actions.recv().await {
                    Ok(TodoAction::ChannelOpened { channel }) => {
                        pending.remove(&channel);
                    },
                    Ok(TodoAction::RequestFailed {
                        operation: operation @ Operation::Subscribe(channel),
                        error,
                    }) => {
                        pending.remove(&channel);
                        failure.get_or_insert(TodoError::Api { operation, message: error });
                    },
                    Ok(_) => {},
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Action observer lagged");
                    },
                    Err(RecvError::Closed) => return Err(TodoError::Store(StoreError::ChannelClosed)),
                }
            }
            failure.map_or(Ok(()), Err)
        })
        .await;

        outcome.map_err(|_| TodoError::Store(StoreError::Timeout))?
    }

    /// Close every open channel
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn unsubscribe(&self) -> Result<()> {
        self.dispatch(TodoAction::Unsubscribe).await
    }

    // ========== Dialogs and form ==========

    /// Open the calendar dialog on a copy of `todo`
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn show_calendar_dialog(&self, todo: &Todo) -> Result<()> {
        self.dispatch(TodoAction::ShowCalendarDialog { todo: todo.clone() }).await
    }

    /// Open the delete confirmation dialog on a copy of `todo`
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn show_check_delete_dialog(&self, todo: &Todo) -> Result<()> {
        self.dispatch(TodoAction::ShowCheckDeleteDialog { todo: todo.clone() }).await
    }

    /// Show or hide the calendar dialog
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_calendar_dialog(&self, visible: bool) -> Result<()> {
        self.dispatch(TodoAction::SetCalendarDialog { visible }).await
    }

    /// Show or hide the delete confirmation dialog
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_check_delete_dialog(&self, visible: bool) -> Result<()> {
        self.dispatch(TodoAction::SetCheckDeleteDialog { visible }).await
    }

    /// Edit the dialog copy
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn edit_dialog_todo(&self, body: impl Into<String>, status: bool, deadline: NaiveDate) -> Result<()> {
        self.dispatch(TodoAction::EditDialogTodo {
            body: body.into(),
            status,
            deadline,
        })
        .await
    }

    /// Form input: text
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_draft_body(&self, body: impl Into<String>) -> Result<()> {
        self.dispatch(TodoAction::SetDraftBody { body: body.into() }).await
    }

    /// Form input: done flag
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_draft_status(&self, status: bool) -> Result<()> {
        self.dispatch(TodoAction::SetDraftStatus { status }).await
    }

    /// Form input: due date
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_draft_deadline(&self, deadline: NaiveDate) -> Result<()> {
        self.dispatch(TodoAction::SetDraftDeadline { deadline }).await
    }

    /// Choose the sort direction
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn set_descending(&self, descending: bool) -> Result<()> {
        self.dispatch(TodoAction::SetDescending { descending }).await
    }

    /// Flip the sort direction
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn toggle_sort(&self) -> Result<()> {
        self.dispatch(TodoAction::ToggleSort).await
    }

    /// Clear the notice
    ///
    /// # Errors
    ///
    /// Returns error if the store is shutting down.
    pub async fn dismiss_notification(&self) -> Result<()> {
        self.dispatch(TodoAction::DismissNotification).await
    }

    // ========== Views ==========

    /// The collection ordered by deadline
    pub async fn sorted_todos(&self) -> Vec<Todo> {
        self.store.state(TodoState::sorted_todos).await
    }

    /// Percentage of done todos (NaN when there are none)
    pub async fn progress(&self) -> f64 {
        self.store.state(TodoState::progress).await
    }

    /// Copy of the whole state
    pub async fn snapshot(&self) -> TodoState {
        self.store.state(Clone::clone).await
    }

    // ========== Internals ==========

    async fn dispatch(&self, action: TodoAction) -> Result<()> {
        self.store.send(action).await?;
        Ok(())
    }

    /// Send `action` and wait for either its result or its failure
    ///
    /// Results are matched by kind, so two concurrent requests of the same
    /// kind may each observe the other's outcome.
    async fn request<F>(&self, action: TodoAction, operation: Operation, done: F) -> Result<()>
    where
        F: Fn(&TodoAction) -> bool,
    {
        let outcome = self
            .store
            .send_and_wait_for(
                action,
                |result| {
                    done(result)
                        || matches!(result, TodoAction::RequestFailed { operation: failed, .. } if *failed == operation)
                },
                self.response_timeout,
            )
            .await?;

        match outcome {
            TodoAction::RequestFailed { operation, error } => Err(TodoError::Api {
                operation,
                message: error,
            }),
            _ => Ok(()),
        }
    }
}

impl<A: TodoApi> Drop for TodoStore<A> {
    fn drop(&mut self) {
        let released: usize = Channel::ALL
            .iter()
            .map(|channel| self.store.cancel(&channel.effect_id()))
            .sum();
        if released > 0 {
            tracing::debug!(released, "Released channels on drop");
        }
    }
}
