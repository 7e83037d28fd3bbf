//! Todo list store kept in sync with a remote GraphQL todo service.
//!
//! The store mirrors the service's collection locally and keeps it current
//! through three push channels (created, updated, deleted). Local commands
//! never edit the collection directly: a created todo appears when its
//! creation event comes back, a deleted one disappears with its deletion
//! event.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasksync_core::environment::SystemClock;
//! use todo::mocks::InMemoryTodoApi;
//! use todo::{SyncOptions, TodoEnvironment, TodoStore};
//!
//! # async fn example() -> Result<(), todo::TodoError> {
//! let env = TodoEnvironment::new(Arc::new(InMemoryTodoApi::new()), Arc::new(SystemClock));
//! let todos = TodoStore::new(env, SyncOptions::default());
//!
//! todos.mount().await?;
//! todos.set_draft_body("Buy milk").await?;
//! todos.add_todo().await?;
//!
//! for todo in todos.sorted_todos().await {
//!     println!("{} {}", todo.deadline, todo.body);
//! }
//! println!("Done: {:.0}%", todos.progress().await);
//!
//! todos.unmount().await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod mocks;
pub mod reducer;
pub mod remote;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use api::{ApiError, TodoApi};
pub use config::TodoConfig;
pub use error::TodoError;
pub use reducer::{SyncOptions, TodoEnvironment, TodoReducer};
pub use remote::GraphQlTodoApi;
pub use store::TodoStore;
pub use types::{Channel, Operation, Todo, TodoAction, TodoDraft, TodoId, TodoState};
