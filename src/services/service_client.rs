//! Service catalogue CRUD client

use async_trait::async_trait;

use crate::error::ApiError;
use crate::services::api_client::ApiClient;
use crate::types::{
    BulkDeleteRequest, BulkDeleteResponse, ServiceDetail, ServiceListParams, ServiceListResponse,
    ServiceUpsertRequest,
};

const SERVICES_PATH: &str = "/services";
const BULK_DELETE_PATH: &str = "/services/bulk-delete";

#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn list(&self, params: &ServiceListParams) -> Result<ServiceListResponse, ApiError>;
    async fn get(&self, id: i64) -> Result<ServiceDetail, ApiError>;
    async fn create(&self, request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError>;
    async fn update(&self, id: i64, request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError>;
    async fn delete(&self, id: i64) -> Result<(), ApiError>;
    async fn duplicate(&self, id: i64) -> Result<ServiceDetail, ApiError>;
    async fn bulk_delete(&self, ids: &[i64]) -> Result<BulkDeleteResponse, ApiError>;
}

pub struct HttpServiceApi<'a> {
    client: &'a ApiClient,
}

impl<'a> HttpServiceApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }
}

fn service_path(id: i64) -> String {
    format!("{}/{}", SERVICES_PATH, id)
}

#[async_trait]
impl ServiceApi for HttpServiceApi<'_> {
    async fn list(&self, params: &ServiceListParams) -> Result<ServiceListResponse, ApiError> {
        self.client.get_json(SERVICES_PATH, &params.to_query()).await
    }

    async fn get(&self, id: i64) -> Result<ServiceDetail, ApiError> {
        self.client.get_json(&service_path(id), &[]).await
    }

    async fn create(&self, request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError> {
        self.client.post_json(SERVICES_PATH, request).await
    }

    async fn update(&self, id: i64, request: &ServiceUpsertRequest) -> Result<ServiceDetail, ApiError> {
        self.client.put_json(&service_path(id), request).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&service_path(id)).await
    }

    async fn duplicate(&self, id: i64) -> Result<ServiceDetail, ApiError> {
        self.client
            .post_empty_json(&format!("{}/duplicate", service_path(id)))
            .await
    }

    async fn bulk_delete(&self, ids: &[i64]) -> Result<BulkDeleteResponse, ApiError> {
        let request = BulkDeleteRequest {
            service_ids: ids.to_vec(),
        };
        self.client.post_json(BULK_DELETE_PATH, &request).await
    }
}
