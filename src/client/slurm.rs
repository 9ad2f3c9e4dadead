//! SLURM allocations and their user associations.

use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use super::WaldurClient;
use crate::endpoints::Endpoint;
use crate::error::{Result, WaldurError};
use crate::http::OK;
use crate::identifier::is_uuid;
use crate::models::{Resource, SlurmAllocationState};
use crate::query::Query;

const OK_OR_CREATED: &[StatusCode] = &[StatusCode::OK, StatusCode::CREATED];

impl WaldurClient {
    pub async fn get_slurm_allocation(&self, uuid: &str) -> Result<Resource> {
        if !is_uuid(uuid) {
            return Err(WaldurError::Validation(format!(
                "The UUID of SLURM allocation has unexpected format: {}",
                uuid
            )));
        }
        self.get_resource(Endpoint::SlurmAllocations, uuid, None)
            .await
    }

    pub async fn list_slurm_allocations(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::SlurmAllocations, filters).await
    }

    async fn slurm_remote_action(
        &self,
        marketplace_resource_uuid: &str,
        action: &str,
        valid: &[StatusCode],
        body: &Value,
    ) -> Result<Resource> {
        self.action_with_status(
            Endpoint::MarketplaceSlurmRemote,
            marketplace_resource_uuid,
            action,
            valid,
            Some(body),
        )
        .await
    }

    pub async fn set_slurm_allocation_state(
        &self,
        marketplace_resource_uuid: &str,
        state: SlurmAllocationState,
    ) -> Result<()> {
        let body = json!({ "state": state });
        self.slurm_remote_action(marketplace_resource_uuid, "set_state", OK, &body)
            .await?;
        Ok(())
    }

    pub async fn set_slurm_allocation_backend_id(
        &self,
        marketplace_resource_uuid: &str,
        backend_id: &str,
    ) -> Result<()> {
        let body = json!({ "backend_id": backend_id });
        self.slurm_remote_action(marketplace_resource_uuid, "set_backend_id", OK, &body)
            .await?;
        Ok(())
    }

    /// Sets the resource limits of an allocation, e.g. `{"cpu": 1000}`.
    pub async fn set_slurm_allocation_limits(
        &self,
        marketplace_resource_uuid: &str,
        limits: Map<String, Value>,
    ) -> Result<Resource> {
        if !is_uuid(marketplace_resource_uuid) {
            return Err(WaldurError::Validation(format!(
                "The UUID of marketplace resource has unexpected format: {}",
                marketplace_resource_uuid
            )));
        }
        let body = Value::Object(limits);
        self.slurm_remote_action(marketplace_resource_uuid, "set_limits", OK, &body)
            .await
    }

    pub async fn list_slurm_associations(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::SlurmAssociations, filters).await
    }

    pub async fn create_slurm_association(
        &self,
        marketplace_resource_uuid: &str,
        username: &str,
    ) -> Result<Resource> {
        let body = json!({ "username": username });
        self.slurm_remote_action(
            marketplace_resource_uuid,
            "create_association",
            OK_OR_CREATED,
            &body,
        )
        .await
    }

    pub async fn delete_slurm_association(
        &self,
        marketplace_resource_uuid: &str,
        username: &str,
    ) -> Result<Resource> {
        let body = json!({ "username": username });
        self.slurm_remote_action(marketplace_resource_uuid, "delete_association", OK, &body)
            .await
    }

    pub async fn list_slurm_allocation_user_usages(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::SlurmAllocationUserUsages, filters)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::error::WaldurError;
    use crate::models::SlurmAllocationState;
    use crate::test_utils::{API_PATH, client_for};
    use mockito::Matcher;
    use serde_json::{Map, json};

    const RESOURCE: &str = "9ae5e13294884628aaf984a82214f7c4";

    #[tokio::test]
    async fn test_get_slurm_allocation_rejects_names() {
        let server = mockito::Server::new_async().await;
        let err = client_for(&server)
            .get_slurm_allocation("hpc")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The UUID of SLURM allocation has unexpected format: hpc"
        );
    }

    #[tokio::test]
    async fn test_set_slurm_allocation_state() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                format!("{API_PATH}/marketplace-slurm-remote/{RESOURCE}/set_state/").as_str(),
            )
            .match_body(Matcher::Json(json!({"state": "deletion_scheduled"})))
            .with_status(200)
            .create_async()
            .await;

        client_for(&server)
            .set_slurm_allocation_state(RESOURCE, SlurmAllocationState::DeletionScheduled)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_slurm_association_accepts_created() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                format!("{API_PATH}/marketplace-slurm-remote/{RESOURCE}/create_association/")
                    .as_str(),
            )
            .match_body(Matcher::Json(json!({"username": "alice"})))
            .with_status(201)
            .with_body(r#"{"status": "Association has been created."}"#)
            .create_async()
            .await;

        client_for(&server)
            .create_slurm_association(RESOURCE, "alice")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_slurm_allocation_limits_sends_limits_as_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                format!("{API_PATH}/marketplace-slurm-remote/{RESOURCE}/set_limits/").as_str(),
            )
            .match_body(Matcher::Json(json!({"cpu": 1000, "gpu": 10})))
            .with_status(200)
            .create_async()
            .await;

        let mut limits = Map::new();
        limits.insert("cpu".into(), json!(1000));
        limits.insert("gpu".into(), json!(10));
        client_for(&server)
            .set_slurm_allocation_limits(RESOURCE, limits)
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_set_slurm_allocation_limits_requires_uuid() {
        let server = mockito::Server::new_async().await;
        let err = client_for(&server)
            .set_slurm_allocation_limits("alloc", Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, WaldurError::Validation(_)));
    }
}
