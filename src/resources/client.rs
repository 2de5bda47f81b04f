use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::gateway::{ApiMethod, GatewayClient, GatewayError, RequestBody, RequestOptions};
use crate::mvi::Reducer;
use crate::resources::kind::Resource;
use crate::resources::slice::{items_from_response, ResourceIntent, ResourceReducer, ResourceSlice};

/// Fetches and mutates one resource collection, keeping its slice current.
///
/// Successful mutations refetch the list so the slice reflects the backend.
#[derive(Clone)]
pub struct ResourceClient {
    gateway: GatewayClient,
    resource: Resource,
    state: Arc<RwLock<ResourceSlice>>,
}

impl ResourceClient {
    pub fn new(gateway: GatewayClient, resource: Resource) -> Self {
        Self {
            gateway,
            resource,
            state: Arc::new(RwLock::new(ResourceSlice::default())),
        }
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn snapshot(&self) -> ResourceSlice {
        self.state.read().clone()
    }

    fn dispatch(&self, intent: ResourceIntent) {
        let mut state = self.state.write();
        *state = ResourceReducer::reduce(state.clone(), intent);
    }

    pub async fn fetch_all(&self) -> Result<Vec<Value>, GatewayError> {
        self.fetch_all_with(&[]).await
    }

    /// List with query filters, e.g. `[("title", "Sleep"), ("q", "insomnia")]`.
    pub async fn fetch_all_with(&self, query: &[(&str, &str)]) -> Result<Vec<Value>, GatewayError> {
        let options = query
            .iter()
            .fold(RequestOptions::default(), |options, (name, value)| {
                options.with_query(*name, *value)
            });

        self.dispatch(ResourceIntent::FetchStarted);
        match self
            .gateway
            .request(ApiMethod::Get, self.resource.path(), None, options)
            .await
        {
            Ok(value) => {
                let items = items_from_response(value);
                tracing::debug!(resource = self.resource.slug(), count = items.len(), "Fetched");
                self.dispatch(ResourceIntent::FetchSucceeded(items.clone()));
                Ok(items)
            }
            Err(err) => {
                let fallback = format!("Failed to load {}", self.resource.label());
                self.dispatch(ResourceIntent::FetchFailed(err.user_message(&fallback)));
                Err(err)
            }
        }
    }

    /// Load one item and upsert it into the list. List status is untouched.
    pub async fn fetch_one(&self, id: &str) -> Result<Value, GatewayError> {
        let item = self.gateway.get(&self.resource.item_path(id)).await?;
        self.dispatch(ResourceIntent::ItemFetched(item.clone()));
        Ok(item)
    }

    pub async fn create(&self, body: RequestBody) -> Result<Value, GatewayError> {
        self.mutate("create", ApiMethod::Post, self.resource.create_path().to_string(), Some(body))
            .await
    }

    pub async fn update(&self, id: &str, body: RequestBody) -> Result<Value, GatewayError> {
        self.mutate("update", ApiMethod::Put, self.resource.item_path(id), Some(body))
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Value, GatewayError> {
        self.mutate("delete", ApiMethod::Delete, self.resource.item_path(id), None)
            .await
    }

    async fn mutate(
        &self,
        verb: &str,
        method: ApiMethod,
        path: String,
        body: Option<RequestBody>,
    ) -> Result<Value, GatewayError> {
        self.dispatch(ResourceIntent::MutationStarted);
        match self
            .gateway
            .request(method, &path, body, RequestOptions::default())
            .await
        {
            Ok(value) => {
                self.dispatch(ResourceIntent::MutationSucceeded);
                // the list error is recorded in the slice; the mutation itself succeeded
                if let Err(e) = self.fetch_all().await {
                    tracing::debug!(resource = self.resource.slug(), error = %e, "Refetch after {} failed", verb);
                }
                Ok(value)
            }
            Err(err) => {
                let fallback = format!("Failed to {} {}", verb, self.resource.singular());
                self.dispatch(ResourceIntent::MutationFailed(err.user_message(&fallback)));
                Err(err)
            }
        }
    }
}
