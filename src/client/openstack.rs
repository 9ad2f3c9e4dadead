//! OpenStack tenants, networking, instances, volumes and snapshots.

use log::debug;
use serde_json::{Map, Value, json};

use super::{ACCEPTED, CREATED, QueryMode, WaldurClient, str_field};
use crate::endpoints::{Endpoint, OfferingType};
use crate::error::{Result, WaldurError};
use crate::identifier::is_uuid;
use crate::models::{
    CreateInstance, CreateSecurityGroup, CreateSnapshot, CreateSubnet, CreateVolume, FloatingIp,
    FloatingIpAssignment, NetworkSpec, Resource, ScopeCreation, SecurityGroupRule, UpdateSubnet,
    WaitOptions, check_gateway,
};
use crate::query::Query;

/// Ports and floating IPs of an instance order.
struct NetworkAttachments {
    ports: Vec<Value>,
    floating_ips: Vec<Value>,
}

impl WaldurClient {
    pub async fn list_tenants(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::OpenStackTenants, filters).await
    }

    /// Finds a tenant by name or UUID, optionally within a project.
    pub async fn get_tenant(&self, tenant: &str, project: Option<&str>) -> Result<Resource> {
        let extra = match project {
            Some(project) => {
                let project = self.get_project(project).await?;
                let project_uuid = str_field(&project, "uuid", "project")?;
                Some(Query::new().with("project_uuid", project_uuid))
            }
            None => None,
        };
        self.get_resource(Endpoint::OpenStackTenants, tenant, extra)
            .await
    }

    pub async fn list_networks(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::OpenStackNetworks, filters).await
    }

    pub async fn list_subnets(&self, filters: Query) -> Result<Resource> {
        self.list(Endpoint::OpenStackSubnets, filters).await
    }

    pub async fn list_tenant_subnets(&self, tenant: &str) -> Result<Resource> {
        self.list(Endpoint::OpenStackSubnets, Query::new().with("tenant", tenant))
            .await
    }

    pub async fn connect_subnet(&self, uuid: &str) -> Result<Resource> {
        self.action(Endpoint::OpenStackSubnets, uuid, "connect", None)
            .await
    }

    pub async fn disconnect_subnet(&self, uuid: &str) -> Result<Resource> {
        self.action(Endpoint::OpenStackSubnets, uuid, "disconnect", None)
            .await
    }

    pub async fn unlink_subnet(&self, uuid: &str) -> Result<Resource> {
        self.action(Endpoint::OpenStackSubnets, uuid, "unlink", None)
            .await
    }

    /// Creates a subnet in a network of the tenant.
    pub async fn create_subnet(
        &self,
        subnet: &CreateSubnet,
        options: &WaitOptions,
    ) -> Result<Resource> {
        check_gateway(subnet.gateway_ip.as_deref(), subnet.disable_gateway)?;

        let tenant = self
            .get_tenant(&subnet.tenant, subnet.project.as_deref())
            .await?;
        let mut payload = json!({
            "name": subnet.name,
            "tenant": str_field(&tenant, "url", "tenant")?,
            "project": subnet.project,
            "network_uuid": subnet.network_uuid,
            "cidr": subnet.cidr,
            "dns_nameservers": subnet.dns_nameservers,
            "allocation_pools": subnet.allocation_pools,
            "enable_dhcp": subnet.enable_dhcp,
            "disable_gateway": subnet.disable_gateway,
        });
        if let Some(gateway_ip) = subnet.gateway_ip.as_deref().filter(|ip| !ip.is_empty()) {
            payload["gateway_ip"] = json!(gateway_ip);
        }

        let path = format!(
            "{}/{}/create_subnet",
            Endpoint::OpenStackNetworks,
            subnet.network_uuid
        );
        let resource = self.create(path, &payload, CREATED).await?;
        if options.wait {
            let uuid = str_field(&resource, "uuid", "subnet")?;
            self.wait_for_resource(Endpoint::OpenStackSubnets, uuid, options)
                .await?;
        }
        Ok(resource)
    }

    /// Updates a subnet, running the requested connect, disconnect and unlink actions first.
    pub async fn update_subnet(&self, subnet: &UpdateSubnet) -> Result<Resource> {
        check_gateway(subnet.gateway_ip.as_deref(), subnet.disable_gateway)?;
        if subnet.connect && subnet.disconnect {
            return Err(WaldurError::Validation(
                "connect_subnet and disconnect_subnet cannot both be True".to_string(),
            ));
        }

        let mut payload = json!({ "name": subnet.name });
        if let Some(tenant) = &subnet.tenant {
            payload["tenant"] = json!(tenant);
        }
        if let Some(gateway_ip) = subnet.gateway_ip.as_deref().filter(|ip| !ip.is_empty()) {
            payload["gateway_ip"] = json!(gateway_ip);
        }
        if subnet.disable_gateway {
            payload["disable_gateway"] = json!(true);
        }
        if subnet.enable_dhcp {
            payload["enable_dhcp"] = json!(true);
        }
        if !subnet.dns_nameservers.is_empty() {
            payload["dns_nameservers"] = json!(subnet.dns_nameservers);
        }

        if subnet.connect {
            self.connect_subnet(&subnet.uuid).await?;
        }
        if subnet.disconnect {
            self.disconnect_subnet(&subnet.uuid).await?;
        }
        if subnet.unlink {
            self.unlink_subnet(&subnet.uuid).await?;
        }

        self.update(Endpoint::OpenStackSubnets, &subnet.uuid, &payload)
            .await
    }

    pub async fn get_subnet_by_uuid(&self, uuid: &str) -> Result<Option<Resource>> {
        optional(self.query_resource_by_uuid(Endpoint::OpenStackSubnets, uuid).await)
    }

    pub async fn delete_subnet(&self, uuid: &str) -> Result<Resource> {
        self.delete(Endpoint::OpenStackSubnets, uuid).await
    }

    pub async fn create_security_group(
        &self,
        group: &CreateSecurityGroup,
        options: &WaitOptions,
    ) -> Result<Resource> {
        let tenant = self
            .get_tenant(&group.tenant, group.project.as_deref())
            .await?;
        let tenant_uuid = str_field(&tenant, "uuid", "tenant")?;

        let mut payload = json!({ "name": group.name, "rules": group.rules });
        if let Some(description) = group.description.as_deref().filter(|d| !d.is_empty()) {
            payload["description"] = json!(description);
        }
        if !group.tags.is_empty() {
            payload["tags"] = json!(group.tags);
        }

        let path = format!(
            "{}/{}/create_security_group",
            Endpoint::OpenStackTenants,
            tenant_uuid
        );
        let resource = self.create(path, &payload, CREATED).await?;
        if options.wait {
            let uuid = str_field(&resource, "uuid", "security group")?;
            self.wait_for_resource(Endpoint::OpenStackSecurityGroups, uuid, options)
                .await?;
        }
        Ok(resource)
    }

    async fn get_tenant_security_group(&self, tenant_uuid: &str, name: &str) -> Result<Resource> {
        let query = Query::new()
            .with("name_exact", name)
            .with("tenant_uuid", tenant_uuid);
        self.query_resource(Endpoint::OpenStackSecurityGroups, query, QueryMode::Single)
            .await
    }

    /// Returns `None` when the tenant has no group with that name.
    pub async fn get_security_group(&self, tenant: &str, name: &str) -> Result<Option<Resource>> {
        let tenant = self.get_tenant(tenant, None).await?;
        let tenant_uuid = str_field(&tenant, "uuid", "tenant")?;
        optional(self.get_tenant_security_group(tenant_uuid, name).await)
    }

    pub async fn list_security_groups(&self, tenant: &str) -> Result<Resource> {
        let tenant = self.get_tenant(tenant, None).await?;
        let tenant_uuid = str_field(&tenant, "uuid", "tenant")?;
        self.list(
            Endpoint::OpenStackSecurityGroups,
            Query::new().with("tenant_uuid", tenant_uuid),
        )
        .await
    }

    pub async fn update_security_group_description(
        &self,
        security_group: &Resource,
        description: &str,
    ) -> Result<Resource> {
        let payload = json!({
            "name": str_field(security_group, "name", "security group")?,
            "description": description,
        });
        let uuid = str_field(security_group, "uuid", "security group")?;
        self.update(Endpoint::OpenStackSecurityGroups, uuid, &payload)
            .await
    }

    pub async fn update_security_group_rules(
        &self,
        security_group: &Resource,
        rules: &[SecurityGroupRule],
    ) -> Result<Resource> {
        let uuid = str_field(security_group, "uuid", "security group")?;
        let body = serde_json::to_value(rules)?;
        self.action(Endpoint::OpenStackSecurityGroups, uuid, "set_rules", Some(&body))
            .await
    }

    pub async fn delete_security_group(&self, uuid: &str) -> Result<Resource> {
        self.delete(Endpoint::OpenStackSecurityGroups, uuid).await
    }

    async fn get_floating_ip(&self, address: &str) -> Result<Resource> {
        self.query_resource(
            Endpoint::OpenStackFloatingIps,
            Query::new().with("address", address),
            QueryMode::Single,
        )
        .await
    }

    async fn get_subnet(&self, id: &str) -> Result<Resource> {
        self.get_resource(Endpoint::OpenStackSubnets, id, None).await
    }

    /// Replaces the floating IPs of an instance.
    pub async fn assign_floating_ips(
        &self,
        instance: &str,
        floating_ips: &[FloatingIpAssignment],
        options: &WaitOptions,
    ) -> Result<Resource> {
        let instance = self
            .get_resource(Endpoint::OpenStackInstances, instance, None)
            .await?;
        let instance_uuid = str_field(&instance, "uuid", "instance")?;

        let mut assignments = Vec::with_capacity(floating_ips.len());
        for ip in floating_ips {
            let floating_ip = self.get_floating_ip(&ip.address).await?;
            let subnet = self.get_subnet(&ip.subnet).await?;
            assignments.push(json!({
                "url": str_field(&floating_ip, "url", "floating IP")?,
                "subnet": str_field(&subnet, "url", "subnet")?,
            }));
        }

        let path = format!(
            "{}/{}/update_floating_ips",
            Endpoint::OpenStackInstances,
            instance_uuid
        );
        let response = self
            .create(path, &json!({ "floating_ips": assignments }), ACCEPTED)
            .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackInstances, instance_uuid, options)
                .await?;
        }
        Ok(response)
    }

    /// A name that is not a UUID is only unique within a project.
    async fn get_project_resource(
        &self,
        endpoint: Endpoint,
        name: &str,
        project: Option<&str>,
    ) -> Result<Resource> {
        if is_uuid(name) {
            return self.query_resource_by_uuid(endpoint, name).await;
        }
        let project = project.ok_or_else(|| {
            WaldurError::Validation("You should specify project name if name is not UUID".to_string())
        })?;
        let project_key = if is_uuid(project) {
            "project_uuid"
        } else {
            "project_name"
        };
        let query = Query::new()
            .with(project_key, project)
            .with("name_exact", name);
        self.query_resource(endpoint, query, QueryMode::Single).await
    }

    /// Prefer [`WaldurClient::get_instance_via_marketplace`].
    pub async fn get_instance(&self, name: &str, project: Option<&str>) -> Result<Resource> {
        self.get_project_resource(Endpoint::OpenStackInstances, name, project)
            .await
    }

    pub async fn stop_instance(&self, uuid: &str, options: &WaitOptions) -> Result<()> {
        self.action(Endpoint::OpenStackInstances, uuid, "stop", None)
            .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackInstances, uuid, options)
                .await?;
        }
        Ok(())
    }

    /// Sets the security groups of an instance by name.
    pub async fn update_instance_security_groups(
        &self,
        instance_uuid: &str,
        security_groups: &[String],
        options: &WaitOptions,
    ) -> Result<()> {
        let instance = self
            .get_resource(Endpoint::OpenStackInstances, instance_uuid, None)
            .await?;
        let tenant_uuid = str_field(&instance, "tenant_uuid", "instance")?;

        let mut groups = Vec::with_capacity(security_groups.len());
        for name in security_groups {
            let group = self.get_tenant_security_group(tenant_uuid, name).await?;
            groups.push(json!({ "url": str_field(&group, "url", "security group")? }));
        }

        let body = json!({ "security_groups": groups });
        self.action(
            Endpoint::OpenStackInstances,
            instance_uuid,
            "update_security_groups",
            Some(&body),
        )
        .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackInstances, instance_uuid, options)
                .await?;
        }
        Ok(())
    }

    /// Sets the internal ports of an instance, one per subnet name.
    pub async fn update_instance_ports(
        &self,
        instance_uuid: &str,
        subnets: &[String],
        options: &WaitOptions,
    ) -> Result<()> {
        let mut ports = Vec::with_capacity(subnets.len());
        for subnet in subnets {
            let subnet = self.get_subnet(subnet).await?;
            ports.push(json!({ "subnet": str_field(&subnet, "url", "subnet")? }));
        }

        let body = json!({ "ports": ports });
        self.action(
            Endpoint::OpenStackInstances,
            instance_uuid,
            "update_ports",
            Some(&body),
        )
        .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackInstances, instance_uuid, options)
                .await?;
        }
        Ok(())
    }

    pub async fn get_volume(&self, name: &str, project: Option<&str>) -> Result<Resource> {
        self.get_project_resource(Endpoint::OpenStackVolumes, name, project)
            .await
    }

    pub async fn update_volume_description(
        &self,
        volume: &Resource,
        description: &str,
    ) -> Result<Resource> {
        let payload = json!({
            "name": str_field(volume, "name", "volume")?,
            "description": description,
        });
        let uuid = str_field(volume, "uuid", "volume")?;
        self.update(Endpoint::OpenStackVolumes, uuid, &payload).await
    }

    pub async fn detach_volume(&self, uuid: &str, options: &WaitOptions) -> Result<()> {
        self.action(Endpoint::OpenStackVolumes, uuid, "detach", None)
            .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackVolumes, uuid, options)
                .await?;
        }
        Ok(())
    }

    /// Attaches a volume to an instance as `device`, e.g. `/dev/vdb`.
    pub async fn attach_volume(
        &self,
        volume_uuid: &str,
        instance_uuid: &str,
        device: &str,
        options: &WaitOptions,
    ) -> Result<()> {
        let body = json!({
            "instance": self.build_resource_url(Endpoint::OpenStackInstances, instance_uuid, None)?,
            "device": device,
        });
        self.action(Endpoint::OpenStackVolumes, volume_uuid, "attach", Some(&body))
            .await?;
        if options.wait {
            self.wait_for_resource(Endpoint::OpenStackVolumes, volume_uuid, options)
                .await?;
        }
        Ok(())
    }

    pub async fn get_snapshot(&self, id: &str) -> Result<Resource> {
        self.get_resource(Endpoint::OpenStackSnapshots, id, None)
            .await
    }

    pub async fn delete_snapshot(&self, uuid: &str) -> Result<Resource> {
        self.delete(Endpoint::OpenStackSnapshots, uuid).await
    }

    pub async fn create_snapshot(
        &self,
        snapshot: &CreateSnapshot,
        options: &WaitOptions,
    ) -> Result<Resource> {
        let volume = self
            .get_resource(Endpoint::OpenStackVolumes, &snapshot.volume, None)
            .await?;
        let volume_uuid = str_field(&volume, "uuid", "volume")?;

        let mut payload = json!({ "name": snapshot.name });
        if let Some(description) = snapshot.description.as_deref().filter(|d| !d.is_empty()) {
            payload["description"] = json!(description);
        }
        if !snapshot.tags.is_empty() {
            payload["tags"] = json!(snapshot.tags);
        }
        if let Some(kept_until) = &snapshot.kept_until {
            payload["kept_until"] = json!(kept_until);
        }

        let path = format!("{}/{}/snapshot", Endpoint::OpenStackVolumes, volume_uuid);
        let resource = self.create(path, &payload, CREATED).await?;
        if options.wait {
            let uuid = str_field(&resource, "uuid", "snapshot")?;
            self.wait_for_resource(Endpoint::OpenStackSnapshots, uuid, options)
                .await?;
        }
        Ok(resource)
    }

    async fn get_flavor(&self, id: &str, tenant_uuid: &str) -> Result<Resource> {
        self.get_scoped_resource(
            Endpoint::OpenStackFlavors,
            id,
            Query::new().with("tenant_uuid", tenant_uuid),
        )
        .await
    }

    /// Smallest flavor of the tenant with at least the given cores and RAM.
    async fn get_flavor_from_params(
        &self,
        tenant_uuid: &str,
        min_cpu: Option<u32>,
        min_ram: Option<u64>,
    ) -> Result<Resource> {
        let query = Query::new()
            .with("tenant_uuid", tenant_uuid)
            .with("o", "cores,ram,disk")
            .with_opt("cores__gte", min_cpu)
            .with_opt("ram__gte", min_ram);
        self.query_resource(Endpoint::OpenStackFlavors, query, QueryMode::First)
            .await
    }

    async fn get_image(&self, id: &str, tenant_uuid: &str) -> Result<Resource> {
        self.get_scoped_resource(
            Endpoint::OpenStackImages,
            id,
            Query::new().with("tenant_uuid", tenant_uuid),
        )
        .await
    }

    async fn get_volume_type(&self, id: &str, tenant_uuid: &str) -> Result<Resource> {
        self.get_scoped_resource(
            Endpoint::OpenStackVolumeTypes,
            id,
            Query::new().with("tenant_uuid", tenant_uuid),
        )
        .await
    }

    async fn resolve_networks(&self, networks: &[NetworkSpec]) -> Result<NetworkAttachments> {
        let mut attachments = NetworkAttachments {
            ports: Vec::with_capacity(networks.len()),
            floating_ips: Vec::new(),
        };

        for network in networks {
            let subnet = network.subnet.as_deref().ok_or_else(|| {
                WaldurError::Validation("Wrong networks format. subnet key is required.".to_string())
            })?;
            let subnet = self.get_subnet(subnet).await?;
            let subnet_url = str_field(&subnet, "url", "subnet")?;
            attachments.ports.push(json!({ "subnet": subnet_url }));

            match &network.floating_ip {
                None => {}
                Some(FloatingIp::Auto) => {
                    attachments.floating_ips.push(json!({ "subnet": subnet_url }));
                }
                Some(FloatingIp::Address(address)) => {
                    let floating_ip = self.get_floating_ip(address).await?;
                    attachments.floating_ips.push(json!({
                        "subnet": subnet_url,
                        "url": str_field(&floating_ip, "url", "floating IP")?,
                    }));
                }
            }
        }

        Ok(attachments)
    }

    /// Orders an OpenStack instance and waits for it to become usable.
    ///
    /// With floating IPs requested, waiting also covers the external IP.
    pub async fn create_instance_via_marketplace(
        &self,
        instance: &CreateInstance,
        options: &WaitOptions,
    ) -> Result<ScopeCreation> {
        let system_volume_size = gib_to_mib(instance.system_volume_size, "system_volume_size")?;
        let data_volume_size = instance
            .data_volume_size
            .filter(|size| *size > 0)
            .map(|size| gib_to_mib(size, "data_volume_size"))
            .transpose()?;
        let offering = self
            .get_offering(&instance.offering, Some(&instance.project))
            .await?;
        let offering_uuid = str_field(&offering, "uuid", "offering")?;
        let tenant_uuid = str_field(&offering, "scope_uuid", "offering")?;

        let flavor = match instance.flavor.as_deref() {
            Some(flavor) => self.get_flavor(flavor, tenant_uuid).await?,
            None => {
                self.get_flavor_from_params(tenant_uuid, instance.flavor_min_cpu, instance.flavor_min_ram)
                    .await?
            }
        };
        let image = self.get_image(&instance.image, tenant_uuid).await?;
        let networks = self.resolve_networks(&instance.networks).await?;
        let wants_floating_ip = !networks.floating_ips.is_empty();

        let mut attributes = Map::new();
        attributes.insert("name".into(), json!(instance.name));
        attributes.insert("flavor".into(), json!(str_field(&flavor, "url", "flavor")?));
        attributes.insert("image".into(), json!(str_field(&image, "url", "image")?));
        attributes.insert(
            "system_volume_size".into(),
            json!(system_volume_size),
        );
        attributes.insert("ports".into(), Value::Array(networks.ports));
        attributes.insert("floating_ips".into(), Value::Array(networks.floating_ips));

        if !instance.security_groups.is_empty() {
            let mut groups = Vec::with_capacity(instance.security_groups.len());
            for name in &instance.security_groups {
                let group = self.get_tenant_security_group(tenant_uuid, name).await?;
                groups.push(json!({ "url": str_field(&group, "url", "security group")? }));
            }
            attributes.insert("security_groups".into(), Value::Array(groups));
        }
        if let Some(size) = data_volume_size {
            attributes.insert("data_volume_size".into(), json!(size));
        }
        if let Some(user_data) = instance.user_data.as_deref().filter(|d| !d.is_empty()) {
            attributes.insert("user_data".into(), json!(user_data));
        }
        if let Some(ssh_key) = instance.ssh_key.as_deref() {
            let key = self.get_resource(Endpoint::SshKeys, ssh_key, None).await?;
            attributes.insert(
                "ssh_public_key".into(),
                json!(str_field(&key, "url", "SSH key")?),
            );
        }
        if let Some(description) = instance.description.as_deref().filter(|d| !d.is_empty()) {
            attributes.insert("description".into(), json!(description));
        }
        if !instance.tags.is_empty() {
            attributes.insert("tags".into(), json!(instance.tags));
        }
        if let Some(volume_type) = instance.system_volume_type.as_deref() {
            let volume_type = self.get_volume_type(volume_type, tenant_uuid).await?;
            attributes.insert(
                "system_volume_type".into(),
                json!(str_field(&volume_type, "url", "volume type")?),
            );
        }
        if let Some(volume_type) = instance.data_volume_type.as_deref() {
            let volume_type = self.get_volume_type(volume_type, tenant_uuid).await?;
            attributes.insert(
                "data_volume_type".into(),
                json!(str_field(&volume_type, "url", "volume type")?),
            );
        }
        if let Some(server_group) = instance.server_group.as_deref() {
            let group = self
                .get_resource(Endpoint::OpenStackServerGroups, server_group, None)
                .await?;
            attributes.insert(
                "server_group".into(),
                json!(str_field(&group, "url", "server group")?),
            );
        }

        let created = self
            .create_scope_via_marketplace(
                offering_uuid,
                &instance.project,
                attributes,
                Endpoint::OpenStackInstances,
                options,
                instance.check_mode,
            )
            .await?;

        if let (true, Some(uuid)) = (options.wait && wants_floating_ip, created.resource_uuid()) {
            debug!("Waiting for an external IP of instance {}", uuid);
            self.wait_for_external_ip(uuid, options).await?;
        }
        Ok(created)
    }

    /// Terminates the marketplace resource of an instance; returns the order UUID.
    ///
    /// `options` become the termination attributes, e.g. `release_floating_ips`.
    pub async fn delete_instance_via_marketplace(
        &self,
        instance_uuid: &str,
        options: Map<String, Value>,
    ) -> Result<String> {
        self.delete_scope_via_marketplace(instance_uuid, OfferingType::OpenStackInstance, options)
            .await
    }

    pub async fn create_volume_via_marketplace(
        &self,
        volume: &CreateVolume,
        options: &WaitOptions,
    ) -> Result<ScopeCreation> {
        let size = gib_to_mib(volume.size, "size")?;
        let offering = self
            .get_offering(&volume.offering, Some(&volume.project))
            .await?;
        let offering_uuid = str_field(&offering, "uuid", "offering")?;
        let tenant_uuid = str_field(&offering, "scope_uuid", "offering")?;

        let mut attributes = Map::new();
        attributes.insert("name".into(), json!(volume.name));
        attributes.insert("size".into(), json!(size));
        if let Some(description) = volume.description.as_deref().filter(|d| !d.is_empty()) {
            attributes.insert("description".into(), json!(description));
        }
        if !volume.tags.is_empty() {
            attributes.insert("tags".into(), json!(volume.tags));
        }
        if let Some(volume_type) = volume.volume_type.as_deref() {
            let volume_type = self.get_volume_type(volume_type, tenant_uuid).await?;
            attributes.insert(
                "type".into(),
                json!(str_field(&volume_type, "url", "volume type")?),
            );
        }

        self.create_scope_via_marketplace(
            offering_uuid,
            &volume.project,
            attributes,
            Endpoint::OpenStackVolumes,
            options,
            false,
        )
        .await
    }

    pub async fn delete_volume_via_marketplace(&self, volume_uuid: &str) -> Result<String> {
        self.delete_scope_via_marketplace(volume_uuid, OfferingType::OpenStackVolume, Map::new())
            .await
    }

    async fn delete_scope_via_marketplace(
        &self,
        scope_uuid: &str,
        offering_type: OfferingType,
        options: Map<String, Value>,
    ) -> Result<String> {
        let (resource, _scope) = self
            .get_marketplace_resource_scope(scope_uuid, offering_type, None)
            .await?;
        let resource_uuid = str_field(&resource, "uuid", "marketplace resource")?;
        self.terminate_order(resource_uuid, options, None).await
    }

    pub async fn get_instance_via_marketplace(
        &self,
        name: &str,
        project: Option<&str>,
    ) -> Result<Resource> {
        let (_resource, instance) = self
            .get_marketplace_resource_scope(name, OfferingType::OpenStackInstance, project)
            .await?;
        Ok(instance)
    }

    pub async fn get_volume_via_marketplace(
        &self,
        name: &str,
        project: Option<&str>,
    ) -> Result<Resource> {
        let (_resource, volume) = self
            .get_marketplace_resource_scope(name, OfferingType::OpenStackVolume, project)
            .await?;
        Ok(volume)
    }
}

/// Sizes are given in GiB and sent in MiB.
fn gib_to_mib(size: u64, field: &str) -> Result<u64> {
    size.checked_mul(1024).ok_or_else(|| {
        WaldurError::Validation(format!("{} of {} GiB is too large", field, size))
    })
}

/// Turns a missing object into `None`.
fn optional(result: Result<Resource>) -> Result<Option<Resource>> {
    match result {
        Ok(resource) => Ok(Some(resource)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
