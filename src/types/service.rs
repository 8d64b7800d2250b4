//! Service catalogue types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Row of the paginated service list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListItem {
    pub service_id: i64,
    pub service_code: String,
    pub service_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Full service record. Sections the client does not model explicitly
/// (usage scenarios, dependencies, ...) are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDetail {
    pub service_id: i64,
    pub service_code: String,
    pub service_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_published: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body for create and update calls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceUpsertRequest {
    pub service_code: String,
    pub service_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Filters applied to the service list. Changing any of them resets the
/// page to 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceFilters {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ServiceFilters {
    /// Overlay the fields set in `other` onto `self`
    pub fn merge(&mut self, other: ServiceFilters) {
        if other.search.is_some() {
            self.search = other.search;
        }
        if other.category_id.is_some() {
            self.category_id = other.category_id;
        }
        if other.subcategory_id.is_some() {
            self.subcategory_id = other.subcategory_id;
        }
        if other.is_active.is_some() {
            self.is_active = other.is_active;
        }
        if other.sort_by.is_some() {
            self.sort_by = other.sort_by;
        }
        if other.sort_order.is_some() {
            self.sort_order = other.sort_order;
        }
    }
}

/// Query for `GET /services`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub filters: ServiceFilters,
}

impl ServiceListParams {
    /// Query pairs with unset values skipped
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let f = &self.filters;
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(size) = self.page_size {
            query.push(("pageSize", size.to_string()));
        }
        if let Some(ref sort_by) = f.sort_by {
            query.push(("sortBy", sort_by.clone()));
        }
        if let Some(order) = f.sort_order {
            query.push(("sortOrder", order.as_str().to_string()));
        }
        if let Some(id) = f.category_id {
            query.push(("categoryId", id.to_string()));
        }
        if let Some(id) = f.subcategory_id {
            query.push(("subcategoryId", id.to_string()));
        }
        if let Some(ref search) = f.search {
            query.push(("search", search.clone()));
        }
        if let Some(active) = f.is_active {
            query.push(("isActive", active.to_string()));
        }
        query
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceListResponse {
    pub items: Vec<ServiceListItem>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    pub service_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteFailure {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteResponse {
    pub deleted_count: u64,
    #[serde(default)]
    pub failed_ids: Vec<i64>,
    #[serde(default)]
    pub errors: Vec<BulkDeleteFailure>,
}

/// Fulfilled bulk delete: the ids that were requested alongside what the
/// server reports. The two counts are not assumed to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkDeleteOutcome {
    pub requested_ids: Vec<i64>,
    pub response: BulkDeleteResponse,
}

impl BulkDeleteOutcome {
    pub fn is_partial(&self) -> bool {
        self.response.deleted_count != self.requested_ids.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_params_skip_unset_values() {
        let params = ServiceListParams {
            page: Some(2),
            page_size: None,
            filters: ServiceFilters {
                search: Some("backup".to_string()),
                is_active: Some(true),
                ..Default::default()
            },
        };

        let query = params.to_query();

        assert_eq!(
            query,
            vec![
                ("page", "2".to_string()),
                ("search", "backup".to_string()),
                ("isActive", "true".to_string()),
            ]
        );
    }

    #[test]
    fn test_filters_merge_overlays_set_fields_only() {
        let mut filters = ServiceFilters {
            search: Some("old".to_string()),
            category_id: Some(3),
            ..Default::default()
        };

        filters.merge(ServiceFilters {
            search: Some("new".to_string()),
            ..Default::default()
        });

        assert_eq!(filters.search.as_deref(), Some("new"));
        assert_eq!(filters.category_id, Some(3));
    }

    #[test]
    fn test_service_detail_keeps_unknown_sections() {
        let json = r#"{
            "serviceId": 7,
            "serviceCode": "SVC-7",
            "serviceName": "Backup",
            "usageScenarios": [{"scenarioNumber": 1}]
        }"#;
        let detail: ServiceDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.service_id, 7);
        assert!(detail.extra.contains_key("usageScenarios"));
    }

    #[test]
    fn test_bulk_delete_outcome_detects_partial_delete() {
        let outcome = BulkDeleteOutcome {
            requested_ids: vec![1, 2, 3],
            response: BulkDeleteResponse {
                deleted_count: 2,
                failed_ids: vec![3],
                errors: vec![],
            },
        };
        assert!(outcome.is_partial());
    }
}
