//! Reducer logic for the todo store.
//!
//! Commands that need the service return effects; their results come back
//! as actions. The collection itself only changes on a full fetch or on a
//! push event, never on a local command.

use crate::api::{CreateTodoInput, DeleteTodoInput, TodoApi, UpdateTodoInput};
use crate::types::{Channel, DELETION_CANCELLED, Operation, Todo, TodoAction, TodoDraft, TodoId, TodoState};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;
use tasksync_core::{SmallVec, effect::Effect, environment::Clock, reducer::Reducer, smallvec};

/// Behavior switches for the todo store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// Listen for `onUpdateTodo` events
    pub include_update_channel: bool,
    /// Park deletions until the user confirms them
    pub confirm_deletion: bool,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            include_update_channel: true,
            confirm_deletion: false,
        }
    }
}

impl SyncOptions {
    /// Channels opened on subscribe
    #[must_use]
    pub fn channels(&self) -> Vec<Channel> {
        Channel::ALL
            .into_iter()
            .filter(|channel| *channel != Channel::Updated || self.include_update_channel)
            .collect()
    }
}

/// Environment dependencies for the todo reducer
pub struct TodoEnvironment<A> {
    /// Remote todo service
    pub api: Arc<A>,
    /// Clock for "today"
    pub clock: Arc<dyn Clock>,
}

impl<A> TodoEnvironment<A> {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(api: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self { api, clock }
    }
}

impl<A> Clone for TodoEnvironment<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            clock: Arc::clone(&self.clock),
        }
    }
}

/// Reducer for the todo store
pub struct TodoReducer<A> {
    options: SyncOptions,
    _api: PhantomData<fn() -> A>,
}

impl<A> TodoReducer<A> {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new(options: SyncOptions) -> Self {
        Self {
            options,
            _api: PhantomData,
        }
    }

    /// Active options
    #[must_use]
    pub const fn options(&self) -> SyncOptions {
        self.options
    }
}

impl<A> Clone for TodoReducer<A> {
    fn clone(&self) -> Self {
        Self::new(self.options)
    }
}

impl<A> std::fmt::Debug for TodoReducer<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TodoReducer").field("options", &self.options).finish()
    }
}

impl<A> Default for TodoReducer<A> {
    fn default() -> Self {
        Self::new(SyncOptions::default())
    }
}

impl<A: TodoApi> TodoReducer<A> {
    fn list(api: Arc<A>) -> Effect<TodoAction> {
        Effect::future(async move {
            Some(match api.list_todos().await {
                Ok(todos) => TodoAction::TodosLoaded { todos },
                Err(error) => failed(Operation::List, &error),
            })
        })
    }

    fn create(api: Arc<A>, input: CreateTodoInput) -> Effect<TodoAction> {
        Effect::future(async move {
            Some(match api.create_todo(input).await {
                Ok(todo) => TodoAction::TodoAdded { todo },
                Err(error) => failed(Operation::Create, &error),
            })
        })
    }

    fn update(api: Arc<A>, input: UpdateTodoInput) -> Effect<TodoAction> {
        Effect::future(async move {
            Some(match api.update_todo(input).await {
                Ok(todo) => TodoAction::TodoUpdated { todo },
                Err(error) => failed(Operation::Update, &error),
            })
        })
    }

    fn delete(api: Arc<A>, id: TodoId) -> Effect<TodoAction> {
        Effect::future(async move {
            Some(match api.delete_todo(DeleteTodoInput { id }).await {
                Ok(todo) => TodoAction::TodoEliminated { todo },
                Err(error) => failed(Operation::Delete, &error),
            })
        })
    }

    /// Long-lived listener for one channel, registered under its effect id
    fn listen(api: Arc<A>, channel: Channel) -> Effect<TodoAction> {
        Effect::stream(async_stream::stream! {
            match api.subscribe(channel).await {
                Ok(mut events) => {
                    yield TodoAction::ChannelOpened { channel };
                    while let Some(event) = events.next().await {
                        match event {
                            Ok(todo) => yield channel.event(todo),
                            Err(error) => yield TodoAction::ChannelError {
                                channel,
                                error: error.to_string(),
                            },
                        }
                    }
                    yield TodoAction::ChannelClosed { channel };
                },
                Err(error) => yield failed(Operation::Subscribe(channel), &error),
            }
        })
        .cancellable(channel.effect_id())
    }
}

fn failed(operation: Operation, error: &impl std::fmt::Display) -> TodoAction {
    TodoAction::RequestFailed {
        operation,
        error: error.to_string(),
    }
}

/// Apply a push event to the collection
fn apply_remote(state: &mut TodoState, channel: Channel, todo: Todo) {
    let Some(id) = todo.id.clone() else {
        tracing::warn!(%channel, "Ignoring event for a todo without id");
        return;
    };

    match channel {
        Channel::Created => {
            if state.contains(&id) {
                tracing::debug!(%id, "Todo already known");
            } else {
                state.output_todos.push(todo);
            }
        },
        Channel::Updated => {
            if let Some(existing) = state
                .output_todos
                .iter_mut()
                .find(|t| t.id.as_ref() == Some(&id))
            {
                *existing = todo;
            }
        },
        Channel::Deleted => {
            state.output_todos.retain(|t| t.id.as_ref() != Some(&id));
        },
    }
}

impl<A: TodoApi> Reducer for TodoReducer<A> {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment<A>;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            // ========== Remote commands ==========
            TodoAction::GetTodos => smallvec![Self::list(Arc::clone(&env.api))],

            TodoAction::AddTodo => {
                if !state.input_todo.is_submittable() {
                    return SmallVec::new();
                }
                let input = CreateTodoInput::from(&state.input_todo);
                smallvec![Self::create(Arc::clone(&env.api), input)]
            },

            TodoAction::Eliminate { id } => {
                if self.options.confirm_deletion {
                    if let Some(todo) = state.get(&id).cloned() {
                        state.dialog_todo = todo;
                    }
                    state.pending_deletion = Some(id);
                    state.check_delete_dialog = true;
                    return SmallVec::new();
                }
                smallvec![Self::delete(Arc::clone(&env.api), id)]
            },

            TodoAction::ConfirmDeletion => {
                state.check_delete_dialog = false;
                match state.pending_deletion.take() {
                    Some(id) => smallvec![Self::delete(Arc::clone(&env.api), id)],
                    None => SmallVec::new(),
                }
            },

            TodoAction::CancelDeletion => {
                state.check_delete_dialog = false;
                if state.pending_deletion.take().is_some() {
                    state.notification = Some(DELETION_CANCELLED.to_string());
                }
                SmallVec::new()
            },

            TodoAction::Update { todo } => match UpdateTodoInput::from_todo(&todo) {
                Some(input) => smallvec![Self::update(Arc::clone(&env.api), input)],
                None => {
                    state.last_error = Some("Cannot update a todo that has not been created".to_string());
                    SmallVec::new()
                },
            },

            TodoAction::Subscribe => {
                let effects: Vec<_> = self
                    .options
                    .channels()
                    .into_iter()
                    .filter(|channel| state.channels.insert(*channel))
                    .inspect(|channel| {
                        state.connecting.insert(*channel);
                    })
                    .map(|channel| Self::listen(Arc::clone(&env.api), channel))
                    .collect();
                if effects.is_empty() {
                    SmallVec::new()
                } else {
                    smallvec![Effect::merge(effects)]
                }
            },

            TodoAction::Unsubscribe => {
                state.connecting.clear();
                std::mem::take(&mut state.channels)
                    .into_iter()
                    .map(|channel| Effect::Cancel(channel.effect_id()))
                    .collect()
            },

            // ========== Dialogs and form ==========
            TodoAction::ShowCalendarDialog { todo } => {
                state.dialog_todo = todo;
                state.calendar_dialog = true;
                SmallVec::new()
            },

            TodoAction::ShowCheckDeleteDialog { todo } => {
                state.dialog_todo = todo;
                state.check_delete_dialog = true;
                SmallVec::new()
            },

            TodoAction::SetCalendarDialog { visible } => {
                state.calendar_dialog = visible;
                SmallVec::new()
            },

            TodoAction::SetCheckDeleteDialog { visible } => {
                state.check_delete_dialog = visible;
                SmallVec::new()
            },

            TodoAction::EditDialogTodo { body, status, deadline } => {
                state.dialog_todo.body = body;
                state.dialog_todo.status = status;
                state.dialog_todo.deadline = deadline;
                SmallVec::new()
            },

            TodoAction::SetDraftBody { body } => {
                state.input_todo.body = body;
                SmallVec::new()
            },

            TodoAction::SetDraftStatus { status } => {
                state.input_todo.status = status;
                SmallVec::new()
            },

            TodoAction::SetDraftDeadline { deadline } => {
                state.input_todo.deadline = deadline;
                SmallVec::new()
            },

            TodoAction::SetDescending { descending } => {
                state.descending = descending;
                SmallVec::new()
            },

            TodoAction::ToggleSort => {
                state.descending = !state.descending;
                SmallVec::new()
            },

            TodoAction::DismissNotification => {
                state.notification = None;
                SmallVec::new()
            },

            // ========== Results ==========
            TodoAction::TodosLoaded { todos } => {
                tracing::debug!(count = todos.len(), "Todos loaded");
                state.output_todos = todos;
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::TodoAdded { todo } => {
                tracing::debug!(id = ?todo.id, "Todo created");
                state.input_todo = TodoDraft::new(env.clock.today());
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::TodoUpdated { todo } => {
                tracing::debug!(id = ?todo.id, "Todo updated");
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::TodoEliminated { todo } => {
                tracing::debug!(id = ?todo.id, "Todo deleted");
                state.last_error = None;
                SmallVec::new()
            },

            TodoAction::RequestFailed { operation, error } => {
                tracing::warn!(%operation, %error, "Remote call failed");
                if let Operation::Subscribe(channel) = operation {
                    state.channels.remove(&channel);
                    state.connecting.remove(&channel);
                }
                state.last_error = Some(format!("{operation} failed: {error}"));
                SmallVec::new()
            },

            // ========== Remote events ==========
            TodoAction::ChannelOpened { channel } => {
                tracing::info!(%channel, "Channel open");
                state.connecting.remove(&channel);
                SmallVec::new()
            },

            TodoAction::ChannelClosed { channel } => {
                tracing::info!(%channel, "Channel closed");
                state.channels.remove(&channel);
                state.connecting.remove(&channel);
                SmallVec::new()
            },

            TodoAction::ChannelError { channel, error } => {
                tracing::warn!(%channel, %error, "Channel delivered an error");
                state.last_error = Some(format!("{channel}: {error}"));
                SmallVec::new()
            },

            TodoAction::RemoteCreated { todo } => {
                apply_remote(state, Channel::Created, todo);
                SmallVec::new()
            },

            TodoAction::RemoteUpdated { todo } => {
                apply_remote(state, Channel::Updated, todo);
                SmallVec::new()
            },

            TodoAction::RemoteDeleted { todo } => {
                apply_remote(state, Channel::Deleted, todo);
                SmallVec::new()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::InMemoryTodoApi;
    use chrono::NaiveDate;
    use tasksync_testing::{FixedClock, ReducerTest, assertions};

    type Test = ReducerTest<TodoReducer<InMemoryTodoApi>, TodoState, TodoAction, TodoEnvironment<InMemoryTodoApi>>;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn today() -> NaiveDate {
        date("2024-03-10")
    }

    fn env() -> TodoEnvironment<InMemoryTodoApi> {
        TodoEnvironment::new(Arc::new(InMemoryTodoApi::new()), Arc::new(FixedClock::on(today())))
    }

    fn test(options: SyncOptions) -> Test {
        ReducerTest::new(TodoReducer::new(options)).with_env(env())
    }

    fn todo(id: &str, deadline: &str) -> Todo {
        Todo::new(id, format!("todo {id}"), false, date(deadline))
    }

    fn state_with(todos: Vec<Todo>) -> TodoState {
        let mut state = TodoState::new(today());
        state.output_todos = todos;
        state
    }

    fn ids(state: &TodoState) -> Vec<String> {
        state
            .output_todos
            .iter()
            .filter_map(|t| t.id.as_ref().map(ToString::to_string))
            .collect()
    }

    #[test]
    fn get_todos_issues_a_request() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::GetTodos)
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn todos_loaded_replaces_collection() {
        test(SyncOptions::default())
            .given_state(state_with(vec![todo("stale", "2024-01-01")]))
            .when_action(TodoAction::TodosLoaded {
                todos: vec![todo("1", "2024-01-05"), todo("2", "2024-01-01")],
            })
            .then_state(|state| assert_eq!(ids(state), vec!["1", "2"]))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_todo_with_empty_body_is_a_no_op() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::AddTodo)
            .then_state(|state| {
                assert_eq!(state.input_todo, TodoDraft::new(today()));
                assert!(state.output_todos.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn add_todo_does_not_insert_locally() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::SetDraftBody { body: "Buy milk".to_string() })
            .when_action(TodoAction::AddTodo)
            .then_state(|state| {
                assert!(state.output_todos.is_empty());
                assert_eq!(state.input_todo.body, "Buy milk");
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn todo_added_resets_draft_to_today() {
        let mut state = TodoState::new(date("2023-12-01"));
        state.input_todo.body = "Buy milk".to_string();
        state.input_todo.status = true;

        test(SyncOptions::default())
            .given_state(state)
            .when_action(TodoAction::TodoAdded { todo: todo("1", "2023-12-01") })
            .then_state(|state| {
                assert_eq!(state.input_todo, TodoDraft::new(today()));
                // The created todo arrives through its event, not here
                assert!(state.output_todos.is_empty());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn eliminate_deletes_immediately_by_default() {
        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::Eliminate { id: TodoId::new("1") })
            .then_state(|state| {
                assert_eq!(ids(state), vec!["1"]);
                assert!(state.pending_deletion.is_none());
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn gated_eliminate_waits_for_confirmation() {
        let options = SyncOptions { confirm_deletion: true, ..SyncOptions::default() };

        test(options)
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::Eliminate { id: TodoId::new("1") })
            .then_state(|state| {
                assert_eq!(state.pending_deletion, Some(TodoId::new("1")));
                assert!(state.check_delete_dialog);
                assert_eq!(state.dialog_todo, todo("1", "2024-01-01"));
            })
            .then_effects(assertions::assert_no_effects)
            .run();

        test(options)
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::Eliminate { id: TodoId::new("1") })
            .when_action(TodoAction::ConfirmDeletion)
            .then_state(|state| {
                assert!(state.pending_deletion.is_none());
                assert!(!state.check_delete_dialog);
            })
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn cancelled_deletion_issues_nothing_and_notifies() {
        let options = SyncOptions { confirm_deletion: true, ..SyncOptions::default() };

        test(options)
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::Eliminate { id: TodoId::new("1") })
            .when_action(TodoAction::CancelDeletion)
            .then_state(|state| {
                assert!(state.pending_deletion.is_none());
                assert!(!state.check_delete_dialog);
                assert_eq!(state.notification.as_deref(), Some(DELETION_CANCELLED));
                assert_eq!(ids(state), vec!["1"]);
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn confirm_without_pending_deletion_does_nothing() {
        test(SyncOptions { confirm_deletion: true, ..SyncOptions::default() })
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::ConfirmDeletion)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn update_without_id_is_rejected() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Update { todo: Todo::blank(today()) })
            .then_state(|state| assert!(state.last_error.is_some()))
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn update_leaves_collection_alone() {
        let mut edited = todo("1", "2024-01-01");
        edited.body = "edited".to_string();

        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::Update { todo: edited })
            .then_state(|state| assert_eq!(state.output_todos[0].body, "todo 1"))
            .then_effects(assertions::assert_has_future_effect)
            .run();
    }

    #[test]
    fn subscribe_opens_three_channels() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .then_state(|state| assert_eq!(state.channels.len(), 3))
            .then_effects(|effects| {
                let ids: Vec<_> = assertions::cancellable_ids(effects)
                    .iter()
                    .map(|id| id.as_str().to_string())
                    .collect();
                assert_eq!(ids, vec!["todo.on_create", "todo.on_update", "todo.on_delete"]);
            })
            .run();
    }

    #[test]
    fn subscribe_skips_update_channel_when_disabled() {
        test(SyncOptions { include_update_channel: false, ..SyncOptions::default() })
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .then_state(|state| assert!(!state.channels.contains(&Channel::Updated)))
            .then_effects(|effects| {
                let ids = assertions::cancellable_ids(effects);
                assert_eq!(ids.len(), 2);
                assert!(!ids.contains(&Channel::Updated.effect_id()));
            })
            .run();
    }

    #[test]
    fn subscribe_twice_does_not_duplicate_listeners() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::Subscribe)
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn unsubscribe_cancels_open_channels() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::Unsubscribe)
            .then_state(|state| assert!(state.channels.is_empty()))
            .then_effects(|effects| {
                assert_eq!(assertions::cancelled_ids(effects).len(), 3);
            })
            .run();
    }

    #[test]
    fn closed_channel_can_be_reopened() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::ChannelClosed { channel: Channel::Deleted })
            .when_action(TodoAction::Subscribe)
            .then_effects(|effects| {
                assert_eq!(assertions::cancellable_ids(effects), vec![Channel::Deleted.effect_id()]);
            })
            .run();
    }

    #[test]
    fn channel_error_is_recorded_and_channel_keeps_listening() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::ChannelError {
                channel: Channel::Created,
                error: "bad payload".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.last_error.as_deref(), Some("onCreateTodo: bad payload"));
                assert_eq!(state.channels, Channel::ALL.into_iter().collect());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn channel_that_failed_to_open_can_be_reopened() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::RequestFailed {
                operation: Operation::Subscribe(Channel::Created),
                error: "refused".to_string(),
            })
            .then_state(|state| {
                assert!(!state.channels.contains(&Channel::Created));
                assert!(!state.connecting.contains(&Channel::Created));
                assert_eq!(state.channels.len(), 2);
            })
            .run();

        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::RequestFailed {
                operation: Operation::Subscribe(Channel::Created),
                error: "refused".to_string(),
            })
            .when_action(TodoAction::Subscribe)
            .then_effects(|effects| {
                assert_eq!(assertions::cancellable_ids(effects), vec![Channel::Created.effect_id()]);
            })
            .run();
    }

    #[test]
    fn channels_stay_connecting_until_opened() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .then_state(|state| assert_eq!(state.connecting.len(), 3))
            .run();

        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::ChannelOpened { channel: Channel::Updated })
            .then_state(|state| {
                assert_eq!(state.channels.len(), 3);
                assert_eq!(
                    state.connecting,
                    [Channel::Created, Channel::Deleted].into_iter().collect()
                );
            })
            .run();

        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::Subscribe)
            .when_action(TodoAction::Unsubscribe)
            .then_state(|state| assert!(state.connecting.is_empty()))
            .run();
    }

    #[test]
    fn duplicate_create_event_does_not_duplicate() {
        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01")]))
            .when_action(TodoAction::RemoteCreated { todo: todo("1", "2024-01-01") })
            .when_action(TodoAction::RemoteCreated { todo: todo("2", "2024-01-02") })
            .when_action(TodoAction::RemoteCreated { todo: todo("2", "2024-01-02") })
            .then_state(|state| assert_eq!(ids(state), vec!["1", "2"]))
            .run();
    }

    #[test]
    fn update_event_replaces_only_matching_item() {
        let mut changed = todo("2", "2024-02-02");
        changed.status = true;

        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01"), todo("2", "2024-01-02")]))
            .when_action(TodoAction::RemoteUpdated { todo: changed.clone() })
            .when_action(TodoAction::RemoteUpdated { todo: todo("9", "2024-01-09") })
            .then_state(move |state| {
                assert_eq!(state.output_todos, vec![todo("1", "2024-01-01"), changed.clone()]);
            })
            .run();
    }

    #[test]
    fn delete_event_for_absent_id_is_a_no_op() {
        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01"), todo("2", "2024-01-02")]))
            .when_action(TodoAction::RemoteDeleted { todo: todo("9", "2024-01-09") })
            .then_state(|state| assert_eq!(ids(state), vec!["1", "2"]))
            .then_effects(assertions::assert_no_effects)
            .run();

        test(SyncOptions::default())
            .given_state(state_with(vec![todo("1", "2024-01-01"), todo("2", "2024-01-02")]))
            .when_action(TodoAction::RemoteDeleted { todo: todo("1", "2024-01-01") })
            .then_state(|state| assert_eq!(ids(state), vec!["2"]))
            .run();
    }

    #[test]
    fn dialogs_copy_the_todo() {
        let target = todo("1", "2024-01-01");

        test(SyncOptions::default())
            .given_state(state_with(vec![target.clone()]))
            .when_action(TodoAction::ShowCalendarDialog { todo: target.clone() })
            .when_action(TodoAction::EditDialogTodo {
                body: "changed".to_string(),
                status: true,
                deadline: date("2024-05-05"),
            })
            .then_state(move |state| {
                assert!(state.calendar_dialog);
                assert!(!state.check_delete_dialog);
                assert_eq!(state.dialog_todo.id, target.id);
                assert_eq!(state.dialog_todo.body, "changed");
                // The collection keeps the original
                assert_eq!(state.output_todos[0], target);
            })
            .run();
    }

    #[test]
    fn dialog_visibility_is_toggled_externally() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::ShowCheckDeleteDialog { todo: todo("1", "2024-01-01") })
            .when_action(TodoAction::SetCheckDeleteDialog { visible: false })
            .when_action(TodoAction::SetCalendarDialog { visible: true })
            .then_state(|state| {
                assert!(!state.check_delete_dialog);
                assert!(state.calendar_dialog);
            })
            .run();
    }

    #[test]
    fn sort_direction_setters() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::ToggleSort)
            .then_state(|state| assert!(state.descending))
            .run();

        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::SetDescending { descending: true })
            .when_action(TodoAction::ToggleSort)
            .then_state(|state| assert!(!state.descending))
            .run();
    }

    #[test]
    fn request_failure_is_recorded() {
        test(SyncOptions::default())
            .given_state(TodoState::new(today()))
            .when_action(TodoAction::RequestFailed {
                operation: Operation::Create,
                error: "Service unavailable: down".to_string(),
            })
            .then_state(|state| {
                assert_eq!(
                    state.last_error.as_deref(),
                    Some("createTodo failed: Service unavailable: down")
                );
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }
}
