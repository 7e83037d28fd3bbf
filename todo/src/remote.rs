//! [`TodoApi`] over GraphQL

use crate::api::{ApiError, CreateTodoInput, DeleteTodoInput, TodoApi, TodoEventStream, UpdateTodoInput};
use crate::types::{Channel, Todo};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tasksync_graphql::{GraphQLClient, GraphQLError};

const TODO_FIELDS: &str = "id body status deadline";

/// GraphQL documents for the todo service
pub mod documents {
    /// `createTodo` mutation
    pub const CREATE_TODO: &str = "mutation CreateTodo($input: CreateTodoInput!) { \
        createTodo(input: $input) { id body status deadline } }";

    /// `listTodos` query, one page
    pub const LIST_TODOS: &str = "query ListTodos($nextToken: String) { \
        listTodos(nextToken: $nextToken) { items { id body status deadline } nextToken } }";

    /// `updateTodo` mutation
    pub const UPDATE_TODO: &str = "mutation UpdateTodo($input: UpdateTodoInput!) { \
        updateTodo(input: $input) { id body status deadline } }";

    /// `deleteTodo` mutation
    pub const DELETE_TODO: &str = "mutation DeleteTodo($input: DeleteTodoInput!) { \
        deleteTodo(input: $input) { id body status deadline } }";
}

#[derive(Serialize)]
struct InputVariables<T> {
    input: T,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PageVariables {
    next_token: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListTodosData {
    list_todos: TodoConnection,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoConnection {
    items: Vec<Todo>,
    #[serde(default)]
    next_token: Option<String>,
}

/// Payload of every single-todo operation, whichever field name it uses
///
/// The field is null when the operation failed; the response's `errors`
/// say why.
#[derive(Deserialize)]
struct TodoPayload {
    #[serde(
        alias = "createTodo",
        alias = "updateTodo",
        alias = "deleteTodo",
        alias = "onCreateTodo",
        alias = "onUpdateTodo",
        alias = "onDeleteTodo"
    )]
    todo: Option<Todo>,
}

impl TodoPayload {
    fn into_todo(self) -> Result<Todo, ApiError> {
        self.todo.ok_or(ApiError::GraphQL(GraphQLError::MissingData))
    }
}

/// Subscription document for `channel`
fn subscription_document(channel: Channel) -> String {
    let operation = match channel {
        Channel::Created => "OnCreateTodo",
        Channel::Updated => "OnUpdateTodo",
        Channel::Deleted => "OnDeleteTodo",
    };
    format!(
        "subscription {operation} {{ {field} {{ {TODO_FIELDS} }} }}",
        field = channel.field_name()
    )
}

/// Todo service reached through a [`GraphQLClient`]
#[derive(Clone, Debug)]
pub struct GraphQlTodoApi {
    client: GraphQLClient,
}

impl GraphQlTodoApi {
    /// Wrap a configured client
    #[must_use]
    pub const fn new(client: GraphQLClient) -> Self {
        Self { client }
    }

    async fn mutate<I: Serialize>(&self, document: &str, input: I) -> Result<Todo, ApiError> {
        let payload: TodoPayload = self
            .client
            .execute(document, Some(InputVariables { input }))
            .await?;
        payload.into_todo()
    }
}

impl TodoApi for GraphQlTodoApi {
    async fn create_todo(&self, input: CreateTodoInput) -> Result<Todo, ApiError> {
        self.mutate(documents::CREATE_TODO, input).await
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let mut todos = Vec::new();
        let mut next_token = None;
        loop {
            let data: ListTodosData = self
                .client
                .execute(documents::LIST_TODOS, Some(PageVariables { next_token }))
                .await?;
            todos.extend(data.list_todos.items);
            match data.list_todos.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }
        tracing::debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    async fn update_todo(&self, input: UpdateTodoInput) -> Result<Todo, ApiError> {
        self.mutate(documents::UPDATE_TODO, input).await
    }

    async fn delete_todo(&self, input: DeleteTodoInput) -> Result<Todo, ApiError> {
        self.mutate(documents::DELETE_TODO, input).await
    }

    async fn subscribe(&self, channel: Channel) -> Result<TodoEventStream, ApiError> {
        let document = subscription_document(channel);
        let events = self
            .client
            .subscribe::<(), TodoPayload>(&document, None)
            .await?;
        Ok(Box::pin(events.map(|event| event.map_err(ApiError::from)?.into_todo())))
    }
}
