//! Application state container
//!
//! All state lives behind one lock and changes only through
//! [`Store::dispatch`]. Async work happens in the thunks of each slice;
//! the reducers themselves are synchronous.

pub mod action;
pub mod export_slice;
pub mod middleware;
pub mod service_slice;
pub mod ui_slice;

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

pub use action::{Action, AsyncPhase, ExportAction, Rejection, ServiceAction, UiAction};
pub use export_slice::ExportState;
pub use middleware::{ErrorNotificationMiddleware, LoggingMiddleware, Middleware};
pub use service_slice::ServiceState;
pub use ui_slice::UiState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub export: ExportState,
    pub services: ServiceState,
    pub ui: UiState,
}

fn reduce(state: &mut AppState, action: &Action) {
    match action {
        Action::Export(action) => export_slice::reduce(&mut state.export, action),
        Action::Service(action) => service_slice::reduce(&mut state.services, action),
        Action::Ui(action) => ui_slice::reduce(&mut state.ui, action),
    }
}

/// Cloneable handle; clones share the same state
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<AppState>>,
    middleware: Arc<Vec<Box<dyn Middleware>>>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

impl Store {
    /// Store without middleware
    pub fn new() -> Self {
        Self::with_middleware(Vec::new())
    }

    pub fn with_middleware(middleware: Vec<Box<dyn Middleware>>) -> Self {
        Self {
            state: Arc::new(Mutex::new(AppState::default())),
            middleware: Arc::new(middleware),
        }
    }

    /// Logging plus error notifications
    pub fn with_default_middleware() -> Self {
        Self::with_middleware(vec![
            Box::new(LoggingMiddleware),
            Box::new(ErrorNotificationMiddleware),
        ])
    }

    /// Run middleware, reduce, then handle follow-up actions in order
    pub fn dispatch(&self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for middleware in self.middleware.iter() {
                queue.extend(middleware.on_action(&action));
            }
            reduce(&mut *self.state.lock(), &action);
        }
    }

    pub fn select<R>(&self, selector: impl FnOnce(&AppState) -> R) -> R {
        selector(&*self.state.lock())
    }
}
