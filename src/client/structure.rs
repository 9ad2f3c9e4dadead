//! Users, organizations, projects and their permissions.

use serde_json::{Value, json};

use super::{CREATED, WaldurClient};
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::OK;
use crate::models::{CustomerPayload, PermissionScope, ProjectPayload, Resource};
use crate::query::Query;

impl WaldurClient {
    pub async fn get_configuration(&self) -> Result<Resource> {
        self.list(Endpoint::Configuration, Query::new()).await
    }

    pub async fn get_user(&self, id: &str) -> Result<Resource> {
        self.get_resource(Endpoint::Users, id, None).await
    }

    pub async fn list_users(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::Users, filters).await
    }

    /// The user owning the access token.
    pub async fn get_current_user(&self) -> Result<Resource> {
        let url = self.build_url("users/me")?;
        self.get_url(&url, None).await
    }

    pub async fn count_users(&self, filters: Query) -> Result<u64> {
        self.count(Endpoint::Users, filters).await
    }

    pub async fn list_freeipa_profiles(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::FreeIpaProfiles, filters).await
    }

    pub async fn get_roles(&self, filters: Query) -> Result<Resource> {
        let url = self.build_url(Endpoint::Roles.as_str())?;
        self.http().get_all(&url, Some(&filters)).await
    }

    pub async fn list_ssh_keys(&self) -> Result<Resource> {
        let url = self.build_url(Endpoint::SshKeys.as_str())?;
        self.list_url(&url).await
    }

    pub async fn get_service_settings(&self, id: &str) -> Result<Resource> {
        self.get_resource(Endpoint::ServiceSettings, id, None).await
    }

    pub async fn list_service_settings(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::ServiceSettings, filters).await
    }

    pub async fn get_customer(&self, id: &str, filters: Option<Query>) -> Result<Resource> {
        self.get_resource(Endpoint::Customers, id, filters).await
    }

    pub async fn list_customers(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::Customers, filters).await
    }

    pub async fn count_customers(&self) -> Result<u64> {
        self.count(Endpoint::Customers, Query::new()).await
    }

    pub async fn create_customer(&self, customer: &CustomerPayload) -> Result<Resource> {
        let payload = serde_json::to_value(customer)?;
        self.create(Endpoint::Customers, &payload, CREATED).await
    }

    /// `customer` is a UUID or the customer URL.
    pub async fn delete_customer(&self, customer: &str) -> Result<Resource> {
        self.delete_by_reference(Endpoint::Customers, customer).await
    }

    pub async fn get_project(&self, id: &str) -> Result<Resource> {
        self.get_resource(Endpoint::Projects, id, None).await
    }

    pub async fn list_projects(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::Projects, filters).await
    }

    pub async fn count_projects(&self) -> Result<u64> {
        self.count(Endpoint::Projects, Query::new()).await
    }

    /// Creates a project; the type is always sent and is null when unset.
    pub async fn create_project(
        &self,
        customer_uuid: &str,
        project: &ProjectPayload,
    ) -> Result<Resource> {
        let mut payload = self.project_payload(project, true)?;
        payload["customer"] = Value::String(self.build_resource_url(
            Endpoint::Customers,
            customer_uuid,
            None,
        )?);
        self.create(Endpoint::Projects, &payload, CREATED).await
    }

    /// Patches only the fields set in `project`.
    pub async fn update_project(
        &self,
        project_uuid: &str,
        project: &ProjectPayload,
    ) -> Result<Resource> {
        let payload = self.project_payload(project, false)?;
        self.patch(Endpoint::Projects, project_uuid, &payload).await
    }

    /// `project` is a UUID or the project URL.
    pub async fn delete_project(&self, project: &str) -> Result<Resource> {
        self.delete_by_reference(Endpoint::Projects, project).await
    }

    fn project_payload(&self, project: &ProjectPayload, with_null_type: bool) -> Result<Value> {
        let mut payload = serde_json::to_value(project)?;
        match project.type_uuid.as_deref() {
            Some(type_uuid) => {
                payload["type"] = Value::String(self.build_resource_url(
                    Endpoint::ProjectTypes,
                    type_uuid,
                    None,
                )?);
            }
            None if with_null_type => payload["type"] = Value::Null,
            None => {}
        }
        Ok(payload)
    }

    /// Resolves an eduTEAMS user by CUID, creating the local account if needed.
    pub async fn get_remote_eduteams_user(&self, cuid: &str) -> Result<Resource> {
        self.create(Endpoint::RemoteEduteams, &json!({ "cuid": cuid }), OK)
            .await
    }

    fn permission_url(&self, scope: PermissionScope, uuid: &str, action: &str) -> Result<String> {
        self.build_resource_url(scope.as_str(), uuid, Some(action))
    }

    pub async fn create_permission(
        &self,
        scope: PermissionScope,
        scope_uuid: &str,
        user_uuid: &str,
        role_uuid: &str,
        expiration_time: Option<&str>,
    ) -> Result<Resource> {
        let url = self.permission_url(scope, scope_uuid, "add_user")?;
        let body = json!({
            "user": user_uuid,
            "role": role_uuid,
            "expiration_time": expiration_time,
        });
        self.post_url(&url, CREATED, Some(&body)).await
    }

    pub async fn list_permissions(
        &self,
        scope: PermissionScope,
        scope_uuid: &str,
        user_uuid: Option<&str>,
        role_uuid: Option<&str>,
    ) -> Result<Resource> {
        let filters = Query::new()
            .with_opt("role", role_uuid)
            .with_opt("user", user_uuid);
        self.list(
            format!("{}/{}/list_users", scope.as_str(), scope_uuid),
            filters,
        )
        .await
    }

    pub async fn update_permission(
        &self,
        scope: PermissionScope,
        scope_uuid: &str,
        user_uuid: &str,
        role_uuid: &str,
        expiration_time: Option<&str>,
    ) -> Result<Resource> {
        let url = self.permission_url(scope, scope_uuid, "update_user")?;
        let body = json!({
            "user": user_uuid,
            "role": role_uuid,
            "expiration_time": expiration_time,
        });
        self.post_url(&url, OK, Some(&body)).await
    }

    pub async fn remove_permission(
        &self,
        scope: PermissionScope,
        scope_uuid: &str,
        user_uuid: &str,
        role_uuid: &str,
    ) -> Result<Resource> {
        let url = self.permission_url(scope, scope_uuid, "delete_user")?;
        let body = json!({ "user": user_uuid, "role": role_uuid });
        self.post_url(&url, OK, Some(&body)).await
    }

    pub async fn create_event_subscription(
        &self,
        observable_objects: Vec<Value>,
        description: Option<&str>,
    ) -> Result<Resource> {
        let mut payload = json!({ "observable_objects": observable_objects });
        if let Some(description) = description {
            payload["description"] = Value::String(description.to_string());
        }
        self.create(Endpoint::EventSubscriptions, &payload, CREATED)
            .await
    }

    pub async fn list_event_subscriptions(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::EventSubscriptions, filters).await
    }

    pub async fn delete_event_subscription(&self, uuid: &str) -> Result<Resource> {
        self.delete(Endpoint::EventSubscriptions, uuid).await
    }
}
