//! Domain types for the todo store.
//!
//! The store keeps a local mirror of the remote todo collection plus the
//! transient form and dialog state a todo screen needs. Nothing in here talks
//! to the network; see [`crate::reducer`] for how actions turn into remote
//! calls.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use tasksync_core::effect::EffectId;

/// Identifier of a persisted todo, assigned by the remote service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wrap a service-assigned id
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A single todo
///
/// `id` is `None` until the remote service has persisted the todo.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Service-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TodoId>,
    /// User-entered text
    pub body: String,
    /// Done / not done
    pub status: bool,
    /// Due date (`YYYY-MM-DD` on the wire)
    pub deadline: NaiveDate,
}

impl Todo {
    /// A persisted todo
    #[must_use]
    pub fn new(id: impl Into<TodoId>, body: impl Into<String>, status: bool, deadline: NaiveDate) -> Self {
        Self {
            id: Some(id.into()),
            body: body.into(),
            status,
            deadline,
        }
    }

    /// An empty, unpersisted todo due `today`
    #[must_use]
    pub const fn blank(today: NaiveDate) -> Self {
        Self {
            id: None,
            body: String::new(),
            status: false,
            deadline: today,
        }
    }
}

/// The creation form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoDraft {
    /// Text typed so far
    pub body: String,
    /// Initial done flag
    pub status: bool,
    /// Due date
    pub deadline: NaiveDate,
}

impl TodoDraft {
    /// The default draft: empty body, not done, due `today`
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            body: String::new(),
            status: false,
            deadline: today,
        }
    }

    /// Only drafts with a non-empty body may be submitted
    #[must_use]
    pub fn is_submittable(&self) -> bool {
        !self.body.is_empty()
    }
}

/// One of the three push channels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// `onCreateTodo`
    Created,
    /// `onUpdateTodo`
    Updated,
    /// `onDeleteTodo`
    Deleted,
}

impl Channel {
    /// Every channel, in subscription order
    pub const ALL: [Self; 3] = [Self::Created, Self::Updated, Self::Deleted];

    /// Key under which the channel's listener is registered
    #[must_use]
    pub const fn effect_id(self) -> EffectId {
        match self {
            Self::Created => EffectId::new("todo.on_create"),
            Self::Updated => EffectId::new("todo.on_update"),
            Self::Deleted => EffectId::new("todo.on_delete"),
        }
    }

    /// GraphQL subscription field name
    #[must_use]
    pub const fn field_name(self) -> &'static str {
        match self {
            Self::Created => "onCreateTodo",
            Self::Updated => "onUpdateTodo",
            Self::Deleted => "onDeleteTodo",
        }
    }

    /// The action an event on this channel becomes
    #[must_use]
    pub fn event(self, todo: Todo) -> TodoAction {
        match self {
            Self::Created => TodoAction::RemoteCreated { todo },
            Self::Updated => TodoAction::RemoteUpdated { todo },
            Self::Deleted => TodoAction::RemoteDeleted { todo },
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Remote operation, used to label failures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    /// `listTodos`
    List,
    /// `createTodo`
    Create,
    /// `updateTodo`
    Update,
    /// `deleteTodo`
    Delete,
    /// Opening a push channel
    Subscribe(Channel),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::List => f.write_str("listTodos"),
            Self::Create => f.write_str("createTodo"),
            Self::Update => f.write_str("updateTodo"),
            Self::Delete => f.write_str("deleteTodo"),
            Self::Subscribe(channel) => write!(f, "subscribe {channel}"),
        }
    }
}

/// Notice shown when a gated deletion is declined
pub const DELETION_CANCELLED: &str = "Deletion cancelled";

/// State of the todo screen
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TodoState {
    /// Known collection, unique by id
    pub output_todos: Vec<Todo>,
    /// Creation form
    pub input_todo: TodoDraft,
    /// Copy of the todo targeted by the open dialog
    pub dialog_todo: Todo,
    /// Sort by deadline, latest first
    pub descending: bool,
    /// Calendar dialog visibility
    pub calendar_dialog: bool,
    /// Delete confirmation dialog visibility
    pub check_delete_dialog: bool,
    /// Deletion waiting for the user's confirmation
    pub pending_deletion: Option<TodoId>,
    /// Last user-facing notice
    pub notification: Option<String>,
    /// Last remote failure
    pub last_error: Option<String>,
    /// Channels with a live (or connecting) listener
    pub channels: BTreeSet<Channel>,
    /// Channels whose listener has not opened yet
    pub connecting: BTreeSet<Channel>,
}

impl TodoState {
    /// Fresh state with default form and dialog contents dated `today`
    #[must_use]
    pub const fn new(today: NaiveDate) -> Self {
        Self {
            output_todos: Vec::new(),
            input_todo: TodoDraft::new(today),
            dialog_todo: Todo::blank(today),
            descending: false,
            calendar_dialog: false,
            check_delete_dialog: false,
            pending_deletion: None,
            notification: None,
            last_error: None,
            channels: BTreeSet::new(),
            connecting: BTreeSet::new(),
        }
    }

    /// The collection ordered by deadline
    ///
    /// Ascending unless `descending` is set. The sort is stable, so todos
    /// sharing a deadline keep their collection order.
    #[must_use]
    pub fn sorted_todos(&self) -> Vec<Todo> {
        let mut todos = self.output_todos.clone();
        if self.descending {
            todos.sort_by(|a, b| b.deadline.cmp(&a.deadline));
        } else {
            todos.sort_by(|a, b| a.deadline.cmp(&b.deadline));
        }
        todos
    }

    /// Percentage of done todos
    ///
    /// NaN for an empty collection.
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Collection sizes are far below 2^52
    pub fn progress(&self) -> f64 {
        self.completed_count() as f64 / self.count() as f64 * 100.0
    }

    /// Number of known todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.output_todos.len()
    }

    /// Number of done todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.output_todos.iter().filter(|t| t.status).count()
    }

    /// A todo by id
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.output_todos.iter().find(|t| t.id.as_ref() == Some(id))
    }

    /// Whether a todo with `id` is known
    #[must_use]
    pub fn contains(&self, id: &TodoId) -> bool {
        self.get(id).is_some()
    }
}

/// Actions for the todo store
///
/// Commands come from the user (or the screen); results and remote events
/// come back from effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TodoAction {
    // ========== Commands ==========
    /// Fetch the whole collection
    GetTodos,
    /// Submit the creation form
    AddTodo,
    /// Delete a todo (gated behind confirmation when configured)
    Eliminate {
        /// Todo to delete
        id: TodoId,
    },
    /// Go ahead with the parked deletion
    ConfirmDeletion,
    /// Drop the parked deletion
    CancelDeletion,
    /// Push edits of a todo to the service
    Update {
        /// Edited todo
        todo: Todo,
    },
    /// Open the push channels
    Subscribe,
    /// Release the push channels
    Unsubscribe,
    /// Open the calendar dialog for a todo
    ShowCalendarDialog {
        /// Targeted todo
        todo: Todo,
    },
    /// Open the delete confirmation dialog for a todo
    ShowCheckDeleteDialog {
        /// Targeted todo
        todo: Todo,
    },
    /// Show or hide the calendar dialog
    SetCalendarDialog {
        /// New visibility
        visible: bool,
    },
    /// Show or hide the delete confirmation dialog
    SetCheckDeleteDialog {
        /// New visibility
        visible: bool,
    },
    /// Edit the dialog copy (the collection is untouched)
    EditDialogTodo {
        /// New text
        body: String,
        /// New done flag
        status: bool,
        /// New due date
        deadline: NaiveDate,
    },
    /// Form input: text
    SetDraftBody {
        /// Text
        body: String,
    },
    /// Form input: done flag
    SetDraftStatus {
        /// Done flag
        status: bool,
    },
    /// Form input: due date
    SetDraftDeadline {
        /// Due date
        deadline: NaiveDate,
    },
    /// Choose the sort direction
    SetDescending {
        /// Latest deadline first
        descending: bool,
    },
    /// Flip the sort direction
    ToggleSort,
    /// Clear the notice
    DismissNotification,

    // ========== Results ==========
    /// `listTodos` succeeded
    TodosLoaded {
        /// Full collection
        todos: Vec<Todo>,
    },
    /// `createTodo` succeeded
    TodoAdded {
        /// Created todo as returned by the service
        todo: Todo,
    },
    /// `updateTodo` succeeded
    TodoUpdated {
        /// Updated todo as returned by the service
        todo: Todo,
    },
    /// `deleteTodo` succeeded
    TodoEliminated {
        /// Deleted todo as returned by the service
        todo: Todo,
    },
    /// A remote operation failed
    RequestFailed {
        /// Which operation
        operation: Operation,
        /// Error message
        error: String,
    },

    // ========== Remote events ==========
    /// A channel is listening
    ChannelOpened {
        /// Channel
        channel: Channel,
    },
    /// A channel stopped delivering events
    ChannelClosed {
        /// Channel
        channel: Channel,
    },
    /// A channel delivered an undecodable or failed event
    ChannelError {
        /// Channel
        channel: Channel,
        /// Error message
        error: String,
    },
    /// Someone created a todo
    RemoteCreated {
        /// Created todo
        todo: Todo,
    },
    /// Someone updated a todo
    RemoteUpdated {
        /// Updated todo
        todo: Todo,
    },
    /// Someone deleted a todo
    RemoteDeleted {
        /// Deleted todo
        todo: Todo,
    },
}
