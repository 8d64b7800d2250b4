//! Notifications waiting to be shown

use crate::store::action::{Action, UiAction};
use crate::store::Store;
use crate::types::Notification;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UiState {
    pub notifications: Vec<Notification>,
}

pub fn reduce(state: &mut UiState, action: &UiAction) {
    match action {
        UiAction::AddNotification(notification) => state.notifications.push(notification.clone()),
        UiAction::RemoveNotification(id) => state.notifications.retain(|n| n.id != *id),
        UiAction::ClearNotifications => state.notifications.clear(),
    }
}

/// Take every pending notification, oldest first
pub fn drain_notifications(store: &Store) -> Vec<Notification> {
    let pending = store.select(|s| s.ui.notifications.clone());
    if !pending.is_empty() {
        store.dispatch(Action::Ui(UiAction::ClearNotifications));
    }
    pending
}
