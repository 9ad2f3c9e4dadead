//! Marketplace offerings, orders and resources.

use log::info;
use reqwest::StatusCode;
use serde_json::{Map, Value, json};

use super::{CREATED, WaldurClient, str_field};
use crate::endpoints::{Endpoint, OfferingType};
use crate::error::{Result, WaldurError};
use crate::http::OK;
use crate::identifier::is_uuid;
use crate::models::{
    ComponentUsage, CreateRobotAccount, MarketplaceResourceRef, OfferingComponent, OrderRequest,
    Resource, ResourceFilter, ResourceReportRecord, ScopeCreation, WaitOptions,
};
use crate::query::Query;

/// Marketplace resource states a lookup by name considers.
const LIVE_RESOURCE_STATES: [&str; 5] = ["Creating", "OK", "Erred", "Updating", "Terminating"];

impl WaldurClient {
    /// Finds the marketplace resource of a backend object and fetches that object.
    ///
    /// `name` is either the backend object UUID or its name, which then needs a project.
    #[tracing::instrument(skip(self))]
    pub async fn get_marketplace_resource_scope(
        &self,
        name: &str,
        offering_type: OfferingType,
        project: Option<&str>,
    ) -> Result<(Resource, Resource)> {
        if !is_uuid(name) && project.is_none() {
            return Err(WaldurError::Validation(
                "You should specify project name if name is not UUID".to_string(),
            ));
        }

        let mut query = Query::new().with("offering_type", offering_type);
        if is_uuid(name) {
            let scope = self.build_resource_url(offering_type.scope_endpoint(), name, None)?;
            query.push("scope", scope);
        } else {
            query = query
                .with_all("state", LIVE_RESOURCE_STATES)
                .with("name_exact", name);
        }
        if let Some(project) = project {
            let key = if is_uuid(project) {
                "project_uuid"
            } else {
                "project_name"
            };
            query.push(key, project);
        }

        let url = self.build_url(Endpoint::MarketplaceResources.as_str())?;
        let result = self.get_url(&url, Some(&query)).await?;
        let mut resources = match result {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => vec![other],
        };
        if resources.is_empty() {
            return Err(WaldurError::ObjectDoesNotExist(format!(
                "Result is empty. Endpoint: {}. Query: {}",
                Endpoint::MarketplaceResources,
                query
            )));
        }
        if resources.len() > 1 {
            return Err(WaldurError::MultipleObjectsReturned(format!(
                "Ambiguous result. Endpoint: {}. Query: {}",
                url, query
            )));
        }

        let resource = resources.swap_remove(0);
        let scope_url = str_field(&resource, "scope", "marketplace resource")?;
        let scope = self.get_url(scope_url, None).await?;
        if scope.is_null() || scope.as_object().is_some_and(Map::is_empty) {
            return Err(WaldurError::ObjectDoesNotExist(format!(
                "Result is empty. Endpoint: {}. Query: {}",
                Endpoint::MarketplaceResources,
                query
            )));
        }
        Ok((resource, scope))
    }

    pub async fn get_marketplace_resource(&self, resource_uuid: &str) -> Result<Resource> {
        self.get_resource(Endpoint::MarketplaceResources, resource_uuid, None)
            .await
    }

    pub async fn get_marketplace_provider_resource(&self, resource_uuid: &str) -> Result<Resource> {
        self.get_resource(Endpoint::MarketplaceProviderResources, resource_uuid, None)
            .await
    }

    pub async fn filter_marketplace_resources(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceResources, filters).await
    }

    pub async fn filter_marketplace_provider_resources(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceProviderResources, filters)
            .await
    }

    pub async fn list_marketplace_resources(&self, filter: &ResourceFilter) -> Result<Resource> {
        self.list(Endpoint::MarketplaceResources, filter.to_query())
            .await
    }

    /// Provider resources are not filtered by project.
    pub async fn list_marketplace_provider_resources(
        &self,
        filter: &ResourceFilter,
    ) -> Result<Resource> {
        let filter = ResourceFilter {
            project_uuid: None,
            ..filter.clone()
        };
        self.list(Endpoint::MarketplaceProviderResources, filter.to_query())
            .await
    }

    pub async fn count_marketplace_resources(&self, filters: Query) -> Result<u64> {
        self.count(Endpoint::MarketplaceResources, filters).await
    }

    pub async fn count_marketplace_provider_resources(&self, filters: Query) -> Result<u64> {
        self.count(Endpoint::MarketplaceProviderResources, filters)
            .await
    }

    async fn provider_resource_action(
        &self,
        resource_uuid: &str,
        action: &str,
        body: Option<&Value>,
    ) -> Result<Resource> {
        self.action_with_status(
            Endpoint::MarketplaceProviderResources,
            resource_uuid,
            action,
            OK,
            body,
        )
        .await
    }

    pub async fn marketplace_provider_resource_set_backend_id(
        &self,
        resource_uuid: &str,
        backend_id: &str,
    ) -> Result<Resource> {
        let body = json!({ "backend_id": backend_id });
        self.provider_resource_action(resource_uuid, "set_backend_id", Some(&body))
            .await
    }

    pub async fn marketplace_provider_resource_set_backend_metadata(
        &self,
        resource_uuid: &str,
        backend_metadata: Map<String, Value>,
    ) -> Result<Resource> {
        let body = json!({ "backend_metadata": backend_metadata });
        self.provider_resource_action(resource_uuid, "set_backend_metadata", Some(&body))
            .await
    }

    pub async fn marketplace_provider_resource_set_as_erred(
        &self,
        resource_uuid: &str,
        error_details: Option<Map<String, Value>>,
    ) -> Result<Resource> {
        let body = error_details.map(Value::Object);
        self.provider_resource_action(resource_uuid, "set_as_erred", body.as_ref())
            .await
    }

    pub async fn marketplace_provider_resource_set_as_ok(
        &self,
        resource_uuid: &str,
    ) -> Result<Resource> {
        self.provider_resource_action(resource_uuid, "set_as_ok", None)
            .await
    }

    pub async fn marketplace_provider_resource_submit_report(
        &self,
        resource_uuid: &str,
        report: &[ResourceReportRecord],
    ) -> Result<Resource> {
        let body = json!({ "report": report });
        self.provider_resource_action(resource_uuid, "submit_report", Some(&body))
            .await
    }

    pub async fn marketplace_provider_resource_get_team(
        &self,
        resource_uuid: &str,
    ) -> Result<Resource> {
        self.get_detail(Endpoint::MarketplaceProviderResources, resource_uuid, "team")
            .await
    }

    pub async fn marketplace_provider_resource_get_plan_periods(
        &self,
        resource_uuid: &str,
    ) -> Result<Resource> {
        self.get_detail(
            Endpoint::MarketplaceProviderResources,
            resource_uuid,
            "plan_periods",
        )
        .await
    }

    pub async fn marketplace_resource_get_plan_periods(
        &self,
        resource_uuid: &str,
    ) -> Result<Resource> {
        self.get_detail(Endpoint::MarketplaceResources, resource_uuid, "plan_periods")
            .await
    }

    pub async fn marketplace_resource_update_options(
        &self,
        resource_uuid: &str,
        options: Map<String, Value>,
    ) -> Result<Resource> {
        let body = json!({ "options": options });
        self.action_with_status(
            Endpoint::MarketplaceResources,
            resource_uuid,
            "update_options",
            OK,
            Some(&body),
        )
        .await
    }

    pub async fn update_marketplace_resource(
        &self,
        resource_uuid: &str,
        fields: Map<String, Value>,
    ) -> Result<Resource> {
        self.patch(
            Endpoint::MarketplaceResources,
            resource_uuid,
            &Value::Object(fields),
        )
        .await
    }

    pub async fn update_marketplace_provider_resource(
        &self,
        resource_uuid: &str,
        fields: Map<String, Value>,
    ) -> Result<Resource> {
        self.patch(
            Endpoint::MarketplaceProviderResources,
            resource_uuid,
            &Value::Object(fields),
        )
        .await
    }

    pub async fn list_marketplace_categories(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceCategories, filters).await
    }

    pub async fn list_marketplace_provider_offerings(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceProviderOfferings, filters)
            .await
    }

    pub async fn list_marketplace_public_offerings(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplacePublicOfferings, filters)
            .await
    }

    pub async fn get_marketplace_provider_offering(&self, offering_uuid: &str) -> Result<Resource> {
        self.query_resource_by_uuid(Endpoint::MarketplaceProviderOfferings, offering_uuid)
            .await
    }

    pub async fn get_marketplace_public_offering(&self, offering_uuid: &str) -> Result<Resource> {
        self.query_resource_by_uuid(Endpoint::MarketplacePublicOfferings, offering_uuid)
            .await
    }

    pub async fn marketplace_public_offering_get_plans(
        &self,
        offering_uuid: &str,
    ) -> Result<Resource> {
        self.get_detail(Endpoint::MarketplacePublicOfferings, offering_uuid, "plans")
            .await
    }

    pub async fn marketplace_public_offering_get_plan_details(
        &self,
        offering_uuid: &str,
        plan_uuid: &str,
    ) -> Result<Resource> {
        let url = self.build_nested_resource_url(
            Endpoint::MarketplacePublicOfferings,
            offering_uuid,
            "plans",
            plan_uuid,
        )?;
        self.get_url(&url, None).await
    }

    /// Finds a public offering by UUID, or by name among the offerings
    /// available to `project`.
    pub async fn get_offering(&self, offering: &str, project: Option<&str>) -> Result<Resource> {
        if is_uuid(offering) {
            return self
                .get_resource(Endpoint::MarketplacePublicOfferings, offering, None)
                .await;
        }
        let project = project.ok_or_else(|| {
            WaldurError::Validation(format!(
                "You should specify project name if offering \"{}\" is not UUID",
                offering
            ))
        })?;
        let project_uuid = self.resolve_project_uuid(project).await?;
        let extra = Query::new()
            .with("project_uuid", project_uuid)
            .with_all("state", ["Active", "Paused"]);
        self.get_resource(Endpoint::MarketplacePublicOfferings, offering, Some(extra))
            .await
    }

    async fn resolve_project_uuid(&self, project: &str) -> Result<String> {
        if is_uuid(project) {
            return Ok(project.to_string());
        }
        let project = self.get_project(project).await?;
        Ok(str_field(&project, "uuid", "project")?.to_string())
    }

    /// Creates a provider offering.
    ///
    /// `category` and `customer` may be names or UUIDs; they are replaced by URLs.
    /// In check mode the resolved parameters are returned and nothing is created.
    pub async fn create_offering(
        &self,
        mut params: Map<String, Value>,
        check_mode: bool,
    ) -> Result<(Resource, bool)> {
        let category = params
            .get("category")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| WaldurError::Validation("Offering category is required".to_string()))?;
        let category = self
            .get_resource(Endpoint::MarketplaceCategories, &category, None)
            .await?;
        let category_url = str_field(&category, "url", "category")?.to_string();
        params.insert("category".into(), Value::String(category_url));

        let customer = params
            .get("customer")
            .and_then(Value::as_str)
            .filter(|customer| !customer.is_empty())
            .map(str::to_string);
        if let Some(customer) = customer {
            let customer = self.get_resource(Endpoint::Customers, &customer, None).await?;
            let customer_url = str_field(&customer, "url", "customer")?.to_string();
            params.insert("customer".into(), Value::String(customer_url));
        }

        if check_mode {
            return Ok((Value::Object(params), false));
        }
        let offering = self
            .create(
                Endpoint::MarketplaceProviderOfferings,
                &Value::Object(params),
                CREATED,
            )
            .await?;
        Ok((offering, true))
    }

    pub async fn create_offering_component(
        &self,
        offering_uuid: &str,
        component: &OfferingComponent,
    ) -> Result<Resource> {
        let body = component.to_payload(false)?;
        self.action_with_status(
            Endpoint::MarketplaceProviderOfferings,
            offering_uuid,
            "create_offering_component",
            CREATED,
            Some(&body),
        )
        .await
    }

    pub async fn update_offering_component(
        &self,
        offering_uuid: &str,
        component: &OfferingComponent,
    ) -> Result<Resource> {
        let body = component.to_payload(true)?;
        self.action_with_status(
            Endpoint::MarketplaceProviderOfferings,
            offering_uuid,
            "update_offering_component",
            OK,
            Some(&body),
        )
        .await
    }

    /// Orders an offering for a project; `plan` is resolved among the offering plans.
    pub async fn create_marketplace_order(
        &self,
        project: &str,
        offering: &str,
        plan: Option<&str>,
        attributes: Map<String, Value>,
        limits: Map<String, Value>,
    ) -> Result<Resource> {
        let project_resource = self.get_project(project).await?;
        let project_uuid = str_field(&project_resource, "uuid", "project")?;
        let offering = self.get_offering(offering, Some(project)).await?;
        let offering_uuid = str_field(&offering, "uuid", "offering")?;
        let plan_uuid = match plan {
            Some(plan) => {
                let plan = self
                    .marketplace_public_offering_get_plan_details(offering_uuid, plan)
                    .await?;
                Some(str_field(&plan, "uuid", "plan")?.to_string())
            }
            None => None,
        };

        let order = OrderRequest {
            plan_uuid,
            attributes,
            limits,
            ..OrderRequest::new(project_uuid, offering_uuid)
        };
        self.create_order(&order).await
    }

    /// Places an order. All identifiers must be UUIDs.
    #[tracing::instrument(skip(self, order), fields(offering = %order.offering_uuid))]
    pub async fn create_order(&self, order: &OrderRequest) -> Result<Resource> {
        let mut payload = json!({
            "project": self.build_resource_url(Endpoint::Projects, &order.project_uuid, None)?,
            "offering": self.build_resource_url(
                Endpoint::MarketplacePublicOfferings,
                &order.offering_uuid,
                None,
            )?,
            "attributes": order.attributes,
            "limits": order.limits,
            "accepting_terms_of_service": true,
        });
        if let Some(plan_uuid) = order.plan_uuid.as_deref() {
            payload["plan"] = json!(self.build_nested_resource_url(
                Endpoint::MarketplacePublicOfferings,
                &order.offering_uuid,
                "plans",
                plan_uuid,
            )?);
        }
        if let Some(callback_url) = order.callback_url.as_deref() {
            payload["callback_url"] = json!(callback_url);
        }

        let created = self
            .create(Endpoint::MarketplaceOrders, &payload, CREATED)
            .await?;
        info!(
            "Created order {} for offering {}",
            created.get("uuid").and_then(Value::as_str).unwrap_or_default(),
            order.offering_uuid
        );
        Ok(created)
    }

    pub async fn get_order(&self, order_uuid: &str) -> Result<Resource> {
        self.get_resource(Endpoint::MarketplaceOrders, order_uuid, None)
            .await
    }

    pub async fn list_orders(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceOrders, filters).await
    }

    async fn order_action(
        &self,
        order_uuid: &str,
        action: &str,
        valid: &[StatusCode],
        body: Option<&Value>,
    ) -> Result<Resource> {
        self.action_with_status(Endpoint::MarketplaceOrders, order_uuid, action, valid, body)
            .await
    }

    pub async fn marketplace_order_approve_by_consumer(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "approve_by_consumer", OK, None)
            .await
    }

    pub async fn marketplace_order_approve_by_provider(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "approve_by_provider", OK, None)
            .await
    }

    pub async fn marketplace_order_reject_by_consumer(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "reject_by_consumer", OK, None)
            .await
    }

    pub async fn marketplace_order_reject_by_provider(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "reject_by_provider", OK, None)
            .await
    }

    pub async fn marketplace_order_cancel(&self, order_uuid: &str) -> Result<Resource> {
        self.action(Endpoint::MarketplaceOrders, order_uuid, "cancel", None)
            .await
    }

    pub async fn marketplace_order_set_state_executing(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "set_state_executing", OK, None)
            .await
    }

    pub async fn marketplace_order_set_state_done(&self, order_uuid: &str) -> Result<Resource> {
        self.order_action(order_uuid, "set_state_done", OK, None)
            .await
    }

    pub async fn marketplace_order_set_state_erred(
        &self,
        order_uuid: &str,
        error_message: &str,
        error_traceback: &str,
    ) -> Result<Resource> {
        let body = json!({
            "error_message": error_message,
            "error_traceback": error_traceback,
        });
        self.order_action(order_uuid, "set_state_erred", OK, Some(&body))
            .await
    }

    /// Orders a backend object and returns its UUID once the order produced it.
    ///
    /// `offering_uuid` must already be resolved. In check mode nothing is ordered.
    pub(crate) async fn create_scope_via_marketplace(
        &self,
        offering_uuid: &str,
        project: &str,
        attributes: Map<String, Value>,
        scope_endpoint: Endpoint,
        options: &WaitOptions,
        check_mode: bool,
    ) -> Result<ScopeCreation> {
        if check_mode {
            return Ok(ScopeCreation::Planned {
                attributes,
                project: project.to_string(),
                offering_uuid: offering_uuid.to_string(),
            });
        }

        let project_uuid = self.resolve_project_uuid(project).await?;
        let order = OrderRequest {
            attributes,
            ..OrderRequest::new(project_uuid, offering_uuid)
        };
        let order = self.create_order(&order).await?;
        let order_uuid = str_field(&order, "uuid", "order")?;

        let resource_uuid = self
            .resource_uuid_from_order(order_uuid, "resource_uuid", options)
            .await?;
        if options.wait {
            self.wait_for_resource(scope_endpoint, &resource_uuid, options)
                .await?;
        }
        Ok(ScopeCreation::Created(resource_uuid))
    }

    /// Orders a generic marketplace resource and waits for the order to name it.
    pub async fn create_resource_via_marketplace(
        &self,
        project: &str,
        offering: &str,
        plan: Option<&str>,
        attributes: Map<String, Value>,
        limits: Map<String, Value>,
        options: &WaitOptions,
    ) -> Result<MarketplaceResourceRef> {
        let order = self
            .create_marketplace_order(project, offering, plan, attributes, limits)
            .await?;
        let order_uuid = str_field(&order, "uuid", "order")?;
        let marketplace_resource_uuid = self
            .resource_uuid_from_order(order_uuid, "marketplace_resource_uuid", options)
            .await?;
        Ok(MarketplaceResourceRef {
            create_order_uuid: order_uuid.to_string(),
            marketplace_resource_uuid,
        })
    }

    /// Requests new limits; returns the UUID of the resulting order.
    pub async fn marketplace_resource_update_limits_order(
        &self,
        resource_uuid: &str,
        limits: Map<String, Value>,
        callback_url: Option<&str>,
    ) -> Result<String> {
        let mut body = json!({ "limits": limits });
        if let Some(callback_url) = callback_url {
            body["callback_url"] = json!(callback_url);
        }
        let response = self
            .action_with_status(
                Endpoint::MarketplaceResources,
                resource_uuid,
                "update_limits",
                OK,
                Some(&body),
            )
            .await?;
        Ok(str_field(&response, "order_uuid", "limits update")?.to_string())
    }

    /// Terminates a resource as its consumer; returns the UUID of the termination order.
    pub async fn terminate_order(
        &self,
        resource_uuid: &str,
        options: Map<String, Value>,
        callback_url: Option<&str>,
    ) -> Result<String> {
        self.terminate(Endpoint::MarketplaceResources, resource_uuid, options, callback_url)
            .await
    }

    /// Terminates a resource as its provider.
    pub async fn terminate_provider_resource_order(
        &self,
        resource_uuid: &str,
        options: Map<String, Value>,
        callback_url: Option<&str>,
    ) -> Result<String> {
        self.terminate(
            Endpoint::MarketplaceProviderResources,
            resource_uuid,
            options,
            callback_url,
        )
        .await
    }

    async fn terminate(
        &self,
        endpoint: Endpoint,
        resource_uuid: &str,
        options: Map<String, Value>,
        callback_url: Option<&str>,
    ) -> Result<String> {
        let body = termination_body(options, callback_url);
        let response = self
            .action_with_status(endpoint, resource_uuid, "terminate", OK, body.as_ref())
            .await?;
        Ok(str_field(&response, "order_uuid", "termination")?.to_string())
    }

    pub async fn list_component_usages(
        &self,
        resource_uuid: &str,
        date_after: Option<&str>,
        date_before: Option<&str>,
    ) -> Result<Resource> {
        let filters = Query::new()
            .with("resource_uuid", resource_uuid)
            .with_opt("date_after", date_after)
            .with_opt("date_before", date_before);
        self.list(Endpoint::MarketplaceComponentUsages, filters)
            .await
    }

    /// Reports usages for a plan period or, failing that, for a resource.
    pub async fn create_component_usages(
        &self,
        usages: &[ComponentUsage],
        plan_period_uuid: Option<&str>,
        resource_uuid: Option<&str>,
    ) -> Result<Resource> {
        let mut body = json!({ "usages": usages });
        match (plan_period_uuid, resource_uuid) {
            (Some(plan_period), _) => body["plan_period"] = json!(plan_period),
            (None, Some(resource)) => body["resource"] = json!(resource),
            (None, None) => {
                return Err(WaldurError::Validation(
                    "Neither plan_period_uuid nor resource_uuid provided".to_string(),
                ));
            }
        }
        let path = format!("{}/set_usage", Endpoint::MarketplaceComponentUsages);
        self.create(path, &body, CREATED).await
    }

    pub async fn create_component_user_usage(
        &self,
        component_usage_uuid: &str,
        usage: u64,
        username: &str,
        offering_user_uuid: Option<&str>,
    ) -> Result<Resource> {
        let mut body = json!({ "usage": usage, "username": username });
        if let Some(offering_user) = offering_user_uuid.filter(|uuid| is_uuid(uuid)) {
            body["user"] = json!(self.build_resource_url(
                Endpoint::MarketplaceOfferingUsers,
                offering_user,
                None,
            )?);
        }
        self.action_with_status(
            Endpoint::MarketplaceComponentUsages,
            component_usage_uuid,
            "set_user_usage",
            CREATED,
            Some(&body),
        )
        .await
    }

    /// Links a user to an offering. UUIDs are turned into URLs.
    pub async fn create_remote_offering_user(
        &self,
        offering: &str,
        user: &str,
        username: Option<&str>,
    ) -> Result<Resource> {
        let offering = self.url_or_reference(Endpoint::MarketplaceProviderOfferings, offering)?;
        let user = self.url_or_reference(Endpoint::Users, user)?;
        let mut payload = json!({ "offering": offering, "user": user });
        if let Some(username) = username {
            payload["username"] = json!(username);
        }
        self.create(Endpoint::MarketplaceOfferingUsers, &payload, CREATED)
            .await
    }

    fn url_or_reference(&self, endpoint: Endpoint, reference: &str) -> Result<String> {
        if is_uuid(reference) {
            self.build_resource_url(endpoint, reference, None)
        } else {
            Ok(reference.to_string())
        }
    }

    pub async fn list_remote_offering_users(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceOfferingUsers, filters).await
    }

    pub async fn delete_offering_user(&self, offering_user: &str) -> Result<Resource> {
        self.delete_by_reference(Endpoint::MarketplaceOfferingUsers, offering_user)
            .await
    }

    pub async fn set_offerings_username(
        &self,
        service_provider_uuid: &str,
        user_uuid: &str,
        username: &str,
    ) -> Result<Resource> {
        let body = json!({ "user_uuid": user_uuid, "username": username });
        self.action_with_status(
            Endpoint::MarketplaceServiceProviders,
            service_provider_uuid,
            "set_offerings_username",
            CREATED,
            Some(&body),
        )
        .await
    }

    pub async fn list_service_providers(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceServiceProviders, filters)
            .await
    }

    async fn list_service_provider_detail(
        &self,
        service_provider_uuid: &str,
        detail: &str,
    ) -> Result<Resource> {
        let url = self.build_resource_url(
            Endpoint::MarketplaceServiceProviders,
            service_provider_uuid,
            Some(detail),
        )?;
        self.list(url, Query::new()).await
    }

    pub async fn list_service_provider_users(&self, service_provider_uuid: &str) -> Result<Resource> {
        self.list_service_provider_detail(service_provider_uuid, "users")
            .await
    }

    pub async fn list_service_provider_projects(
        &self,
        service_provider_uuid: &str,
    ) -> Result<Resource> {
        self.list_service_provider_detail(service_provider_uuid, "projects")
            .await
    }

    pub async fn list_service_provider_project_permissions(
        &self,
        service_provider_uuid: &str,
    ) -> Result<Resource> {
        self.list_service_provider_detail(service_provider_uuid, "project_permissions")
            .await
    }

    pub async fn list_service_provider_ssh_keys(
        &self,
        service_provider_uuid: &str,
    ) -> Result<Resource> {
        self.list_service_provider_detail(service_provider_uuid, "keys")
            .await
    }

    pub async fn list_robot_accounts(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::MarketplaceRobotAccounts, filters).await
    }

    pub async fn create_robot_account(&self, account: &CreateRobotAccount) -> Result<Resource> {
        let users = account
            .users
            .iter()
            .map(|user| self.url_or_reference(Endpoint::Users, user))
            .collect::<Result<Vec<_>>>()?;
        let payload = json!({
            "resource": self.url_or_reference(Endpoint::MarketplaceResources, &account.resource)?,
            "type": account.account_type,
            "users": users,
            "username": account.username,
            "keys": account.keys,
        });
        self.create(Endpoint::MarketplaceRobotAccounts, &payload, CREATED)
            .await
    }

    pub async fn update_robot_account(
        &self,
        account_uuid: &str,
        fields: Map<String, Value>,
    ) -> Result<Resource> {
        self.patch(
            Endpoint::MarketplaceRobotAccounts,
            account_uuid,
            &Value::Object(fields),
        )
        .await
    }

    pub async fn delete_robot_account(&self, account_uuid: &str) -> Result<Resource> {
        self.delete(Endpoint::MarketplaceRobotAccounts, account_uuid)
            .await
    }

    /// One of the `marketplace-stats/<name>/` reports.
    pub async fn get_marketplace_stats(&self, name: &str) -> Result<Resource> {
        let url = self.build_url(&format!("{}/{}", Endpoint::MarketplaceStats, name))?;
        self.get_url(&url, None).await
    }
}

fn termination_body(options: Map<String, Value>, callback_url: Option<&str>) -> Option<Value> {
    let mut body = Map::new();
    if !options.is_empty() {
        body.insert("attributes".into(), Value::Object(options));
    }
    if let Some(callback_url) = callback_url {
        body.insert("callback_url".into(), json!(callback_url));
    }
    (!body.is_empty()).then_some(Value::Object(body))
}
