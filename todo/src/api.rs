//! The remote todo service seam
//!
//! The reducer only ever talks to a [`TodoApi`]. Production code uses
//! [`crate::remote::GraphQlTodoApi`]; tests use
//! [`crate::mocks::InMemoryTodoApi`].

use crate::types::{Channel, Todo, TodoDraft, TodoId};
use chrono::NaiveDate;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use tasksync_graphql::GraphQLError;
use thiserror::Error;

/// Errors from the remote todo service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport or GraphQL-level failure
    #[error(transparent)]
    GraphQL(#[from] GraphQLError),

    /// No todo with this id
    #[error("Todo {0} not found")]
    NotFound(TodoId),

    /// Service refused the request
    #[error("Service unavailable: {0}")]
    Unavailable(String),
}

/// Events delivered by one push channel
pub type TodoEventStream = Pin<Box<dyn Stream<Item = Result<Todo, ApiError>> + Send>>;

/// `createTodo` input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTodoInput {
    /// Text
    pub body: String,
    /// Done flag
    pub status: bool,
    /// Due date
    pub deadline: NaiveDate,
}

impl From<&TodoDraft> for CreateTodoInput {
    fn from(draft: &TodoDraft) -> Self {
        Self {
            body: draft.body.clone(),
            status: draft.status,
            deadline: draft.deadline,
        }
    }
}

/// `updateTodo` input
///
/// Carries exactly the mutable fields plus the id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTodoInput {
    /// Target
    pub id: TodoId,
    /// Text
    pub body: String,
    /// Done flag
    pub status: bool,
    /// Due date
    pub deadline: NaiveDate,
}

impl UpdateTodoInput {
    /// Strip a todo down to its update input; `None` if it was never persisted
    #[must_use]
    pub fn from_todo(todo: &Todo) -> Option<Self> {
        todo.id.as_ref().map(|id| Self {
            id: id.clone(),
            body: todo.body.clone(),
            status: todo.status,
            deadline: todo.deadline,
        })
    }
}

/// `deleteTodo` input
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteTodoInput {
    /// Target
    pub id: TodoId,
}

/// Remote todo service
///
/// Mutations return the todo as the service stored it. None of them touch
/// local state; changes come back through the push channels.
pub trait TodoApi: Send + Sync + 'static {
    /// Create a todo
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request or cannot be reached.
    fn create_todo(
        &self,
        input: CreateTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// Fetch the whole collection
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request or cannot be reached.
    fn list_todos(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send;

    /// Update a todo
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request or cannot be reached.
    fn update_todo(
        &self,
        input: UpdateTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// Delete a todo
    ///
    /// # Errors
    ///
    /// Returns error if the service rejects the request or cannot be reached.
    fn delete_todo(
        &self,
        input: DeleteTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send;

    /// Open a push channel
    ///
    /// Resolves once the channel is listening. Dropping the stream closes it.
    ///
    /// # Errors
    ///
    /// Returns error if the channel cannot be opened.
    fn subscribe(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<TodoEventStream, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_input_strips_to_mutable_fields() {
        let deadline = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let todo = Todo::new("t-1", "Buy milk", true, deadline);

        let input = UpdateTodoInput::from_todo(&todo).unwrap();
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            serde_json::json!({
                "id": "t-1",
                "body": "Buy milk",
                "status": true,
                "deadline": "2024-01-05"
            })
        );

        assert!(UpdateTodoInput::from_todo(&Todo::blank(deadline)).is_none());
    }

    #[test]
    fn create_input_copies_draft() {
        let deadline = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut draft = TodoDraft::new(deadline);
        draft.body = "Walk dog".to_string();

        let input = CreateTodoInput::from(&draft);
        assert_eq!(input.body, "Walk dog");
        assert!(!input.status);
        assert_eq!(input.deadline, deadline);
    }
}
