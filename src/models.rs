//! Typed request payloads and API enums.
//!
//! Responses stay untyped ([`Resource`]); only what the client sends is modelled.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, WaldurError};
use crate::query::Query;

/// Any object returned by the API.
pub type Resource = Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceState {
    Ok,
    Erred,
    Terminated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlurmAllocationState {
    Creating,
    UpdateScheduled,
    Updating,
    DeletionScheduled,
    Deleting,
    Ok,
    Erred,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentProfileType {
    #[serde(rename = "fixed_price")]
    FixedPrice,
    #[serde(rename = "invoices")]
    MonthlyInvoices,
    #[serde(rename = "payment_gw_monthly")]
    PaymentGwMonthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceState {
    Pending,
    Created,
    Paid,
    Canceled,
}

/// How an offering component is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillingType {
    #[serde(rename = "fixed")]
    Fixed,
    #[serde(rename = "usage")]
    Usage,
    #[serde(rename = "one")]
    OneTime,
    #[serde(rename = "few")]
    OnPlanSwitch,
    #[serde(rename = "limit")]
    Limit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitPeriod {
    Month,
    Annual,
    Total,
}

/// Renders a unit enum as the string it serializes to.
fn wire_name<T: Serialize>(value: &T) -> String {
    match serde_json::to_value(value) {
        Ok(Value::String(s)) => s,
        _ => String::new(),
    }
}

macro_rules! impl_wire_display {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&wire_name(self))
            }
        })*
    };
}

impl_wire_display!(
    ResourceState,
    SlurmAllocationState,
    PaymentProfileType,
    InvoiceState,
    BillingType,
    LimitPeriod
);

/// Floating IP requested for a network attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FloatingIp {
    /// Let the backend allocate one.
    Auto,
    Address(String),
}

impl FromStr for FloatingIp {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(if s == "auto" {
            FloatingIp::Auto
        } else {
            FloatingIp::Address(s.to_string())
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentUsage {
    #[serde(rename = "type")]
    pub component_type: String,
    pub amount: u64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceReportRecord {
    pub header: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferingComponent {
    pub billing_type: BillingType,
    #[serde(rename = "type")]
    pub component_type: String,
    pub name: String,
    pub measured_unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_period: Option<LimitPeriod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_amount: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_value: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_boolean: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limit: Option<u64>,
}

impl OfferingComponent {
    /// Serializes the component without empty, zero or false fields.
    pub fn to_payload(&self, include_uuid: bool) -> Result<Value> {
        let Value::Object(fields) = serde_json::to_value(self)? else {
            return Ok(Value::Object(Map::new()));
        };
        let fields = fields
            .into_iter()
            .filter(|(key, value)| (include_uuid || key != "uuid") && is_truthy(value))
            .collect();
        Ok(Value::Object(fields))
    }
}

/// JSON truthiness: null, false, zero and empty containers are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// A network an instance is attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkSpec {
    /// Subnet name or UUID.
    pub subnet: Option<String>,
    pub floating_ip: Option<FloatingIp>,
}

impl NetworkSpec {
    pub fn subnet(subnet: impl Into<String>) -> Self {
        Self {
            subnet: Some(subnet.into()),
            floating_ip: None,
        }
    }

    pub fn with_floating_ip(mut self, floating_ip: FloatingIp) -> Self {
        self.floating_ip = Some(floating_ip);
        self
    }
}

/// Binds an existing floating IP address to a subnet of an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingIpAssignment {
    pub address: String,
    pub subnet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_port: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ethertype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    pub start: String,
    pub end: String,
}

/// A subnet must either have a gateway IP or have its gateway disabled.
pub fn check_gateway(gateway_ip: Option<&str>, disable_gateway: bool) -> Result<()> {
    let gateway_ip = gateway_ip.filter(|ip| !ip.is_empty());
    match (gateway_ip, disable_gateway) {
        (Some(_), true) => Err(WaldurError::Validation(
            "Gateway IP cannot be set if disabling gateway is requested".to_string(),
        )),
        (None, false) => Err(WaldurError::Validation(
            "Either gateway IP must be set or it must be disabled".to_string(),
        )),
        _ => Ok(()),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSubnet {
    pub name: String,
    /// Tenant name or UUID.
    pub tenant: String,
    /// Project name or UUID used to find the tenant.
    pub project: Option<String>,
    pub network_uuid: String,
    pub cidr: String,
    pub allocation_pools: Vec<AllocationPool>,
    pub enable_dhcp: bool,
    pub dns_nameservers: Vec<String>,
    pub disable_gateway: bool,
    pub gateway_ip: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSubnet {
    pub uuid: String,
    pub name: String,
    pub tenant: Option<String>,
    pub gateway_ip: Option<String>,
    pub disable_gateway: bool,
    pub enable_dhcp: bool,
    pub dns_nameservers: Vec<String>,
    pub connect: bool,
    pub disconnect: bool,
    pub unlink: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSecurityGroup {
    /// Tenant name or UUID.
    pub tenant: String,
    pub name: String,
    pub rules: Vec<SecurityGroupRule>,
    pub project: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// OpenStack instance ordered through the marketplace.
///
/// Volume sizes are in GB. When `flavor` is absent the smallest flavor with
/// at least `flavor_min_cpu` cores and `flavor_min_ram` MB is picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateInstance {
    pub name: String,
    /// Offering name or UUID.
    pub offering: String,
    /// Project name or UUID.
    pub project: String,
    pub networks: Vec<NetworkSpec>,
    pub image: String,
    pub system_volume_size: u64,
    pub system_volume_type: Option<String>,
    pub data_volume_size: Option<u64>,
    pub data_volume_type: Option<String>,
    pub description: Option<String>,
    pub flavor: Option<String>,
    pub flavor_min_cpu: Option<u32>,
    pub flavor_min_ram: Option<u64>,
    pub ssh_key: Option<String>,
    pub security_groups: Vec<String>,
    pub server_group: Option<String>,
    pub tags: Vec<String>,
    pub user_data: Option<String>,
    /// Resolve everything but do not place the order.
    pub check_mode: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateVolume {
    pub name: String,
    pub project: String,
    pub offering: String,
    /// Size in GB.
    pub size: u64,
    pub volume_type: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSnapshot {
    pub name: String,
    /// Volume name or UUID.
    pub volume: String,
    /// Retention deadline; the snapshot is kept forever when absent.
    pub kept_until: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
}

/// Customer creation payload. Unset text fields are sent empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CustomerPayload {
    pub name: String,
    pub abbreviation: String,
    pub address: String,
    pub backend_id: String,
    pub bank_account: String,
    pub bank_name: String,
    pub contact_details: String,
    pub country: String,
    pub display_name: String,
    pub domain: String,
    pub email: String,
    pub homepage: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub native_name: String,
    pub phone_number: String,
    pub postal: String,
    pub registration_code: String,
    pub vat_code: String,
}

impl CustomerPayload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Project fields; `type_uuid` is sent as the project type URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProjectPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oecd_fos_2007_code: Option<String>,
    #[serde(skip)]
    pub type_uuid: Option<String>,
    /// Any other project attribute.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProjectPayload {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A marketplace order for one offering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderRequest {
    pub project_uuid: String,
    pub offering_uuid: String,
    pub plan_uuid: Option<String>,
    pub attributes: Map<String, Value>,
    pub limits: Map<String, Value>,
    pub callback_url: Option<String>,
}

impl OrderRequest {
    pub fn new(project_uuid: impl Into<String>, offering_uuid: impl Into<String>) -> Self {
        Self {
            project_uuid: project_uuid.into(),
            offering_uuid: offering_uuid.into(),
            ..Default::default()
        }
    }
}

/// Filters for listing marketplace resources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub provider_uuid: Option<String>,
    pub project_uuid: Option<String>,
    pub state: Option<String>,
    pub offering_uuid: Option<String>,
    /// Restricts the returned fields.
    pub fields: Vec<String>,
}

impl ResourceFilter {
    pub fn to_query(&self) -> Query {
        Query::new()
            .with_opt("provider_uuid", self.provider_uuid.as_deref())
            .with_opt("state", self.state.as_deref())
            .with_opt("offering_uuid", self.offering_uuid.as_deref())
            .with_opt("project_uuid", self.project_uuid.as_deref())
            .with_all("field", &self.fields)
    }
}

/// Identifiers produced by a provisioning order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketplaceResourceRef {
    pub create_order_uuid: String,
    pub marketplace_resource_uuid: String,
}

/// Outcome of ordering a resource scope through the marketplace.
#[derive(Debug, Clone, PartialEq)]
pub enum ScopeCreation {
    /// Check mode: what would have been ordered.
    Planned {
        attributes: Map<String, Value>,
        project: String,
        offering_uuid: String,
    },
    /// UUID of the provisioned backend object.
    Created(String),
}

impl ScopeCreation {
    pub fn resource_uuid(&self) -> Option<&str> {
        match self {
            ScopeCreation::Created(uuid) => Some(uuid),
            ScopeCreation::Planned { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRobotAccount {
    /// Marketplace resource UUID or URL.
    pub resource: String,
    pub account_type: String,
    /// User UUIDs or URLs.
    pub users: Vec<String>,
    pub username: String,
    pub keys: Vec<String>,
}

/// Scopes that carry user permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionScope {
    Project,
    Customer,
    Offering,
}

impl PermissionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionScope::Project => "projects",
            PermissionScope::Customer => "customers",
            PermissionScope::Offering => "offerings",
        }
    }
}

/// Polling behaviour for operations that wait for a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub wait: bool,
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            wait: true,
            interval: Duration::from_secs(10),
            timeout: Duration::from_secs(600),
        }
    }
}

impl WaitOptions {
    pub fn no_wait() -> Self {
        Self {
            wait: false,
            ..Self::default()
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
