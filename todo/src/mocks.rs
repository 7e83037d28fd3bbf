//! In-memory todo service for tests and the `--mock` demo.

use crate::api::{ApiError, CreateTodoInput, DeleteTodoInput, TodoApi, TodoEventStream, UpdateTodoInput};
use crate::types::{Channel, Todo, TodoId};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// A call received by [`InMemoryTodoApi`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ApiCall {
    /// `createTodo`
    Create(CreateTodoInput),
    /// `listTodos`
    List,
    /// `updateTodo`
    Update(UpdateTodoInput),
    /// `deleteTodo`
    Delete(DeleteTodoInput),
    /// Channel opened
    Subscribe(Channel),
}

/// Mock todo service.
///
/// Keeps the collection in memory, assigns ids, and pushes an event on the
/// matching channel after every successful mutation, the way the real
/// service echoes writes to all subscribers (including the writer).
#[derive(Debug, Clone)]
pub struct InMemoryTodoApi {
    todos: Arc<Mutex<Vec<Todo>>>,
    calls: Arc<Mutex<Vec<ApiCall>>>,
    failure: Arc<Mutex<Option<String>>>,
    next_id: Arc<AtomicU64>,
    events: broadcast::Sender<(Channel, Todo)>,
}

impl InMemoryTodoApi {
    /// Empty service
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            todos: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            failure: Arc::new(Mutex::new(None)),
            next_id: Arc::new(AtomicU64::new(1)),
            events,
        }
    }

    /// Service already holding `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let api = Self::new();
        if let Ok(mut stored) = api.todos.lock() {
            *stored = todos;
        }
        api
    }

    /// Make the next call fail with [`ApiError::Unavailable`]
    pub fn fail_next(&self, message: impl Into<String>) {
        if let Ok(mut failure) = self.failure.lock() {
            *failure = Some(message.into());
        }
    }

    /// Calls received so far
    #[must_use]
    pub fn calls(&self) -> Vec<ApiCall> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    /// Stored collection
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.todos.lock().map(|todos| todos.clone()).unwrap_or_default()
    }

    /// Push an event as if another client had made a change
    ///
    /// Returns the number of listeners it reached.
    pub fn emit(&self, channel: Channel, todo: Todo) -> usize {
        self.events.send((channel, todo)).unwrap_or(0)
    }

    /// Number of open channels
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn record(&self, call: ApiCall) -> Result<(), ApiError> {
        tracing::trace!(?call, "Mock todo service call");
        self.calls
            .lock()
            .map_err(|_| ApiError::Unavailable("call log poisoned".to_string()))?
            .push(call);
        match self.failure.lock() {
            Ok(mut failure) => failure.take().map_or(Ok(()), |message| Err(ApiError::Unavailable(message))),
            Err(_) => Err(ApiError::Unavailable("failure flag poisoned".to_string())),
        }
    }

    fn lock_todos(&self) -> Result<std::sync::MutexGuard<'_, Vec<Todo>>, ApiError> {
        self.todos
            .lock()
            .map_err(|_| ApiError::Unavailable("collection poisoned".to_string()))
    }
}

impl Default for InMemoryTodoApi {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoApi for InMemoryTodoApi {
    fn create_todo(
        &self,
        input: CreateTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send {
        let result = self.record(ApiCall::Create(input.clone())).and_then(|()| {
            let id = TodoId::new(format!("todo-{}", self.next_id.fetch_add(1, Ordering::Relaxed)));
            let todo = Todo {
                id: Some(id),
                body: input.body,
                status: input.status,
                deadline: input.deadline,
            };
            self.lock_todos()?.push(todo.clone());
            self.emit(Channel::Created, todo.clone());
            Ok(todo)
        });

        async move { result }
    }

    fn list_todos(&self) -> impl Future<Output = Result<Vec<Todo>, ApiError>> + Send {
        let result = self
            .record(ApiCall::List)
            .and_then(|()| Ok(self.lock_todos()?.clone()));

        async move { result }
    }

    fn update_todo(
        &self,
        input: UpdateTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send {
        let result = self.record(ApiCall::Update(input.clone())).and_then(|()| {
            let updated = {
                let mut todos = self.lock_todos()?;
                let todo = todos
                    .iter_mut()
                    .find(|t| t.id.as_ref() == Some(&input.id))
                    .ok_or_else(|| ApiError::NotFound(input.id.clone()))?;
                todo.body = input.body;
                todo.status = input.status;
                todo.deadline = input.deadline;
                todo.clone()
            };
            self.emit(Channel::Updated, updated.clone());
            Ok(updated)
        });

        async move { result }
    }

    fn delete_todo(
        &self,
        input: DeleteTodoInput,
    ) -> impl Future<Output = Result<Todo, ApiError>> + Send {
        let result = self.record(ApiCall::Delete(input.clone())).and_then(|()| {
            let deleted = {
                let mut todos = self.lock_todos()?;
                let index = todos
                    .iter()
                    .position(|t| t.id.as_ref() == Some(&input.id))
                    .ok_or_else(|| ApiError::NotFound(input.id.clone()))?;
                todos.remove(index)
            };
            self.emit(Channel::Deleted, deleted.clone());
            Ok(deleted)
        });

        async move { result }
    }

    fn subscribe(
        &self,
        channel: Channel,
    ) -> impl Future<Output = Result<TodoEventStream, ApiError>> + Send {
        let result = self.record(ApiCall::Subscribe(channel)).map(|()| {
            let mut events = self.events.subscribe();
            let stream = async_stream::stream! {
                loop {
                    match events.recv().await {
                        Ok((event_channel, todo)) if event_channel == channel => yield Ok(todo),
                        Ok(_) => {},
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(%channel, skipped, "Mock channel lagged");
                        },
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            };
            Box::pin(stream) as TodoEventStream
        });

        async move { result }
    }
}
