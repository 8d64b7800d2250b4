//! Service slice: the paged service list, the service being edited and
//! the CRUD thunks that keep them in sync with the server.
//!
//! The list only changes after the server confirms a mutation.

use tracing::{info, warn};

use crate::error::ApiError;
use crate::services::service_client::ServiceApi;
use crate::store::action::{Action, AsyncPhase, Rejection, ServiceAction};
use crate::store::Store;
use crate::types::{
    BulkDeleteOutcome, ServiceDetail, ServiceFilters, ServiceListItem, ServiceListParams,
    ServiceListResponse, ServiceUpsertRequest,
};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceState {
    pub list: Vec<ServiceListItem>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub current_service: Option<ServiceDetail>,
    pub is_loading: bool,
    pub is_loading_detail: bool,
    pub is_saving: bool,
    pub error: Option<String>,
    pub filters: ServiceFilters,
    pub last_bulk_delete: Option<BulkDeleteOutcome>,
}

impl Default for ServiceState {
    fn default() -> Self {
        Self {
            list: Vec::new(),
            total_count: 0,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_pages: 0,
            current_service: None,
            is_loading: false,
            is_loading_detail: false,
            is_saving: false,
            error: None,
            filters: ServiceFilters::default(),
            last_bulk_delete: None,
        }
    }
}

impl ServiceState {
    /// Query for the page currently selected
    pub fn list_params(&self) -> ServiceListParams {
        ServiceListParams {
            page: Some(self.page),
            page_size: Some(self.page_size),
            filters: self.filters.clone(),
        }
    }

    fn recount_pages(&mut self) {
        self.total_pages = if self.page_size == 0 {
            0
        } else {
            self.total_count.div_ceil(self.page_size as u64) as u32
        };
    }

    fn patch_list_entry(&mut self, detail: &ServiceDetail) {
        if let Some(item) = self.list.iter_mut().find(|i| i.service_id == detail.service_id) {
            item.service_code = detail.service_code.clone();
            item.service_name = detail.service_name.clone();
            item.version = detail.version.clone();
            item.category_id = detail.category_id;
            item.description = detail.description.clone();
            item.is_active = detail.is_active;
            item.is_published = detail.is_published;
        }
    }
}

pub fn reduce(state: &mut ServiceState, action: &ServiceAction) {
    match action {
        ServiceAction::FetchList(AsyncPhase::Pending) => {
            state.is_loading = true;
            state.error = None;
        }
        ServiceAction::FetchList(AsyncPhase::Fulfilled(response)) => {
            state.is_loading = false;
            state.list = response.items.clone();
            state.total_count = response.total_count;
            state.page = response.page;
            state.page_size = response.page_size;
            state.total_pages = response.total_pages;
        }
        ServiceAction::FetchList(AsyncPhase::Rejected(rejection)) => {
            state.is_loading = false;
            state.error = Some(rejection.message.clone());
        }

        ServiceAction::FetchById(AsyncPhase::Pending) => {
            state.is_loading_detail = true;
            state.error = None;
        }
        ServiceAction::FetchById(AsyncPhase::Fulfilled(detail)) => {
            state.is_loading_detail = false;
            state.current_service = Some(detail.clone());
        }
        ServiceAction::FetchById(AsyncPhase::Rejected(rejection)) => {
            state.is_loading_detail = false;
            state.error = Some(rejection.message.clone());
        }

        ServiceAction::Create(AsyncPhase::Pending)
        | ServiceAction::Update(AsyncPhase::Pending)
        | ServiceAction::Delete(AsyncPhase::Pending)
        | ServiceAction::Duplicate(AsyncPhase::Pending)
        | ServiceAction::BulkDelete(AsyncPhase::Pending) => {
            state.is_saving = true;
            state.error = None;
        }
        ServiceAction::Create(AsyncPhase::Rejected(rejection))
        | ServiceAction::Update(AsyncPhase::Rejected(rejection))
        | ServiceAction::Delete(AsyncPhase::Rejected(rejection))
        | ServiceAction::Duplicate(AsyncPhase::Rejected(rejection))
        | ServiceAction::BulkDelete(AsyncPhase::Rejected(rejection)) => {
            state.is_saving = false;
            state.error = Some(rejection.message.clone());
        }

        // The new record shows up in the list on the next fetch
        ServiceAction::Create(AsyncPhase::Fulfilled(detail))
        | ServiceAction::Duplicate(AsyncPhase::Fulfilled(detail)) => {
            state.is_saving = false;
            state.current_service = Some(detail.clone());
        }
        ServiceAction::Update(AsyncPhase::Fulfilled(detail)) => {
            state.is_saving = false;
            state.patch_list_entry(detail);
            if state
                .current_service
                .as_ref()
                .map_or(false, |s| s.service_id == detail.service_id)
            {
                state.current_service = Some(detail.clone());
            }
        }
        ServiceAction::Delete(AsyncPhase::Fulfilled(id)) => {
            state.is_saving = false;
            state.list.retain(|item| item.service_id != *id);
            state.total_count = state.total_count.saturating_sub(1);
            if state.current_service.as_ref().map_or(false, |s| s.service_id == *id) {
                state.current_service = None;
            }
            state.recount_pages();
        }
        ServiceAction::BulkDelete(AsyncPhase::Fulfilled(outcome)) => {
            state.is_saving = false;
            state
                .list
                .retain(|item| !outcome.requested_ids.contains(&item.service_id));
            // Server count, not the request size: some ids may already be gone
            state.total_count = state.total_count.saturating_sub(outcome.response.deleted_count);
            if let Some(current) = &state.current_service {
                if outcome.requested_ids.contains(&current.service_id)
                    && !outcome.response.failed_ids.contains(&current.service_id)
                {
                    state.current_service = None;
                }
            }
            state.last_bulk_delete = Some(outcome.clone());
            state.recount_pages();
        }

        ServiceAction::SetFilters(filters) => {
            state.filters.merge(filters.clone());
            state.page = 1;
        }
        ServiceAction::ClearFilters => {
            state.filters = ServiceFilters::default();
            state.page = 1;
        }
        ServiceAction::SetPage(page) => {
            state.page = (*page).max(1);
        }
        ServiceAction::SetPageSize(size) => {
            state.page_size = (*size).max(1);
            state.page = 1;
        }
        ServiceAction::ClearCurrentService => {
            state.current_service = None;
        }
        ServiceAction::ClearError => {
            state.error = None;
        }
    }
}

fn dispatch(store: &Store, action: ServiceAction) {
    store.dispatch(Action::Service(action));
}

fn rejected<T>(store: &Store, err: ApiError, wrap: fn(AsyncPhase<T>) -> ServiceAction) -> Rejection {
    let rejection = Rejection::from(err);
    dispatch(store, wrap(AsyncPhase::Rejected(rejection.clone())));
    rejection
}

// ==========================================================================
// Thunks
// ==========================================================================

/// Fetch the page selected by the current page, page size and filters
pub async fn fetch_services(store: &Store, api: &dyn ServiceApi) -> Result<ServiceListResponse, Rejection> {
    let params = store.select(|s| s.services.list_params());
    dispatch(store, ServiceAction::FetchList(AsyncPhase::Pending));
    match api.list(&params).await {
        Ok(response) => {
            dispatch(store, ServiceAction::FetchList(AsyncPhase::Fulfilled(response.clone())));
            Ok(response)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::FetchList)),
    }
}

pub async fn fetch_service_by_id(store: &Store, api: &dyn ServiceApi, id: i64) -> Result<ServiceDetail, Rejection> {
    dispatch(store, ServiceAction::FetchById(AsyncPhase::Pending));
    match api.get(id).await {
        Ok(detail) => {
            dispatch(store, ServiceAction::FetchById(AsyncPhase::Fulfilled(detail.clone())));
            Ok(detail)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::FetchById)),
    }
}

pub async fn create_service(
    store: &Store,
    api: &dyn ServiceApi,
    request: &ServiceUpsertRequest,
) -> Result<ServiceDetail, Rejection> {
    dispatch(store, ServiceAction::Create(AsyncPhase::Pending));
    match api.create(request).await {
        Ok(detail) => {
            info!("Created service {} ({})", detail.service_code, detail.service_id);
            dispatch(store, ServiceAction::Create(AsyncPhase::Fulfilled(detail.clone())));
            Ok(detail)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::Create)),
    }
}

pub async fn update_service(
    store: &Store,
    api: &dyn ServiceApi,
    id: i64,
    request: &ServiceUpsertRequest,
) -> Result<ServiceDetail, Rejection> {
    dispatch(store, ServiceAction::Update(AsyncPhase::Pending));
    match api.update(id, request).await {
        Ok(detail) => {
            dispatch(store, ServiceAction::Update(AsyncPhase::Fulfilled(detail.clone())));
            Ok(detail)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::Update)),
    }
}

pub async fn delete_service(store: &Store, api: &dyn ServiceApi, id: i64) -> Result<(), Rejection> {
    dispatch(store, ServiceAction::Delete(AsyncPhase::Pending));
    match api.delete(id).await {
        Ok(()) => {
            info!("Deleted service {}", id);
            dispatch(store, ServiceAction::Delete(AsyncPhase::Fulfilled(id)));
            Ok(())
        }
        Err(e) => Err(rejected(store, e, ServiceAction::Delete)),
    }
}

pub async fn duplicate_service(store: &Store, api: &dyn ServiceApi, id: i64) -> Result<ServiceDetail, Rejection> {
    dispatch(store, ServiceAction::Duplicate(AsyncPhase::Pending));
    match api.duplicate(id).await {
        Ok(copy) => {
            info!("Duplicated service {} as {}", id, copy.service_id);
            dispatch(store, ServiceAction::Duplicate(AsyncPhase::Fulfilled(copy.clone())));
            Ok(copy)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::Duplicate)),
    }
}

pub async fn bulk_delete_services(
    store: &Store,
    api: &dyn ServiceApi,
    ids: &[i64],
) -> Result<BulkDeleteOutcome, Rejection> {
    dispatch(store, ServiceAction::BulkDelete(AsyncPhase::Pending));
    match api.bulk_delete(ids).await {
        Ok(response) => {
            let outcome = BulkDeleteOutcome {
                requested_ids: ids.to_vec(),
                response,
            };
            if outcome.is_partial() {
                warn!(
                    "Bulk delete removed {} of {} services (failed: {:?})",
                    outcome.response.deleted_count,
                    ids.len(),
                    outcome.response.failed_ids
                );
            }
            dispatch(store, ServiceAction::BulkDelete(AsyncPhase::Fulfilled(outcome.clone())));
            Ok(outcome)
        }
        Err(e) => Err(rejected(store, e, ServiceAction::BulkDelete)),
    }
}
