//! Property tests for the derived views and the event rules

#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use proptest::prelude::*;
use std::sync::Arc;
use tasksync_core::reducer::Reducer;
use tasksync_testing::FixedClock;
use todo::mocks::InMemoryTodoApi;
use todo::{SyncOptions, Todo, TodoAction, TodoEnvironment, TodoId, TodoReducer, TodoState};

fn day(offset: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Days::new(u64::from(offset))
}

fn todos() -> impl Strategy<Value = Vec<Todo>> {
    prop::collection::vec((0u32..400, any::<bool>()), 0..40).prop_map(|entries| {
        entries
            .into_iter()
            .enumerate()
            .map(|(i, (offset, status))| Todo::new(format!("{i}"), format!("todo {i}"), status, day(offset)))
            .collect()
    })
}

fn state_with(todos: Vec<Todo>) -> TodoState {
    let mut state = TodoState::new(day(0));
    state.output_todos = todos;
    state
}

proptest! {
    #[test]
    fn ascending_sort_is_non_decreasing(todos in todos()) {
        let sorted = state_with(todos.clone()).sorted_todos();
        prop_assert_eq!(sorted.len(), todos.len());
        prop_assert!(sorted.windows(2).all(|w| w[0].deadline <= w[1].deadline));
    }

    #[test]
    fn descending_sort_is_non_increasing(todos in todos()) {
        let mut state = state_with(todos);
        state.descending = true;
        let sorted = state.sorted_todos();
        prop_assert!(sorted.windows(2).all(|w| w[0].deadline >= w[1].deadline));
    }

    #[test]
    fn sort_keeps_collection_order_for_equal_deadlines(todos in todos()) {
        let sorted = state_with(todos).sorted_todos();
        for pair in sorted.windows(2) {
            if pair[0].deadline == pair[1].deadline {
                let a: usize = pair[0].id.as_ref().unwrap().as_str().parse().unwrap();
                let b: usize = pair[1].id.as_ref().unwrap().as_str().parse().unwrap();
                prop_assert!(a < b);
            }
        }
    }

    #[test]
    fn progress_is_done_share(todos in todos()) {
        let state = state_with(todos.clone());
        if todos.is_empty() {
            prop_assert!(state.progress().is_nan());
        } else {
            #[allow(clippy::cast_precision_loss)]
            let expected = todos.iter().filter(|t| t.status).count() as f64 / todos.len() as f64 * 100.0;
            prop_assert!((state.progress() - expected).abs() < 1e-9);
            prop_assert!((0.0..=100.0).contains(&state.progress()));
        }
    }

    #[test]
    fn replayed_create_events_never_duplicate(todos in todos(), replays in 1usize..4) {
        let reducer: TodoReducer<InMemoryTodoApi> = TodoReducer::new(SyncOptions::default());
        let env = TodoEnvironment::new(Arc::new(InMemoryTodoApi::new()), Arc::new(FixedClock::on(day(0))));
        let mut state = TodoState::new(day(0));

        for _ in 0..replays {
            for todo in &todos {
                let _ = reducer.reduce(&mut state, TodoAction::RemoteCreated { todo: todo.clone() }, &env);
            }
        }

        prop_assert_eq!(&state.output_todos, &todos);
    }

    #[test]
    fn delete_events_remove_exactly_their_id(todos in todos(), target in 0usize..60) {
        let reducer: TodoReducer<InMemoryTodoApi> = TodoReducer::new(SyncOptions::default());
        let env = TodoEnvironment::new(Arc::new(InMemoryTodoApi::new()), Arc::new(FixedClock::on(day(0))));
        let mut state = state_with(todos.clone());
        let id = TodoId::new(target.to_string());

        let _ = reducer.reduce(
            &mut state,
            TodoAction::RemoteDeleted { todo: Todo::new(id.clone(), "", false, day(0)) },
            &env,
        );

        let expected: Vec<_> = todos.into_iter().filter(|t| t.id.as_ref() != Some(&id)).collect();
        prop_assert_eq!(state.output_todos, expected);
    }
}
