//! API collection paths.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Configuration,
    Customers,
    EventSubscriptions,
    FreeIpaProfiles,
    Invoices,
    InvoiceItems,
    MarketplaceCategories,
    MarketplaceComponentUsages,
    MarketplaceOrders,
    MarketplaceProviderOfferings,
    MarketplacePlans,
    MarketplacePublicOfferings,
    MarketplaceResources,
    MarketplaceProviderResources,
    MarketplaceRobotAccounts,
    MarketplaceSlurm,
    MarketplaceSlurmRemote,
    MarketplaceStats,
    MarketplaceOfferingPermissions,
    MarketplaceOfferingUsers,
    MarketplaceServiceProviders,
    OpenStackFlavors,
    OpenStackFloatingIps,
    OpenStackImages,
    OpenStackInstances,
    OpenStackNetworks,
    OpenStackSecurityGroups,
    OpenStackServerGroups,
    OpenStackSnapshots,
    OpenStackSubnets,
    OpenStackTenants,
    OpenStackVolumes,
    OpenStackVolumeTypes,
    PaymentProfiles,
    Projects,
    ProjectTypes,
    ServiceSettings,
    RemoteEduteams,
    Roles,
    SlurmAllocations,
    SlurmAllocationUserUsages,
    SlurmAssociations,
    SshKeys,
    SupportComments,
    SupportIssues,
    Users,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Configuration => "configuration",
            Endpoint::Customers => "customers",
            Endpoint::EventSubscriptions => "event-subscriptions",
            Endpoint::FreeIpaProfiles => "freeipa-profiles",
            Endpoint::Invoices => "invoices",
            Endpoint::InvoiceItems => "invoice-items",
            Endpoint::MarketplaceCategories => "marketplace-categories",
            Endpoint::MarketplaceComponentUsages => "marketplace-component-usages",
            Endpoint::MarketplaceOrders => "marketplace-orders",
            Endpoint::MarketplaceProviderOfferings => "marketplace-provider-offerings",
            Endpoint::MarketplacePlans => "marketplace-plans",
            Endpoint::MarketplacePublicOfferings => "marketplace-public-offerings",
            Endpoint::MarketplaceResources => "marketplace-resources",
            Endpoint::MarketplaceProviderResources => "marketplace-provider-resources",
            Endpoint::MarketplaceRobotAccounts => "marketplace-robot-accounts",
            Endpoint::MarketplaceSlurm => "marketplace-slurm",
            Endpoint::MarketplaceSlurmRemote => "marketplace-slurm-remote",
            Endpoint::MarketplaceStats => "marketplace-stats",
            Endpoint::MarketplaceOfferingPermissions => "marketplace-offering-permissions",
            Endpoint::MarketplaceOfferingUsers => "marketplace-offering-users",
            Endpoint::MarketplaceServiceProviders => "marketplace-service-providers",
            Endpoint::OpenStackFlavors => "openstack-flavors",
            Endpoint::OpenStackFloatingIps => "openstack-floating-ips",
            Endpoint::OpenStackImages => "openstack-images",
            Endpoint::OpenStackInstances => "openstack-instances",
            Endpoint::OpenStackNetworks => "openstack-networks",
            Endpoint::OpenStackSecurityGroups => "openstack-security-groups",
            Endpoint::OpenStackServerGroups => "openstack-server-groups",
            Endpoint::OpenStackSnapshots => "openstack-snapshots",
            Endpoint::OpenStackSubnets => "openstack-subnets",
            Endpoint::OpenStackTenants => "openstack-tenants",
            Endpoint::OpenStackVolumes => "openstack-volumes",
            Endpoint::OpenStackVolumeTypes => "openstack-volume-types",
            Endpoint::PaymentProfiles => "payment-profiles",
            Endpoint::Projects => "projects",
            Endpoint::ProjectTypes => "project-types",
            Endpoint::ServiceSettings => "service-settings",
            Endpoint::RemoteEduteams => "remote-eduteams",
            Endpoint::Roles => "roles",
            Endpoint::SlurmAllocations => "slurm-allocations",
            Endpoint::SlurmAllocationUserUsages => "slurm-allocation-user-usages",
            Endpoint::SlurmAssociations => "slurm-associations",
            Endpoint::SshKeys => "keys",
            Endpoint::SupportComments => "support-comments",
            Endpoint::SupportIssues => "support-issues",
            Endpoint::Users => "users",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Marketplace offering types whose resources have a dedicated scope endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OfferingType {
    OpenStackInstance,
    OpenStackVolume,
}

impl OfferingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OfferingType::OpenStackInstance => "OpenStack.Instance",
            OfferingType::OpenStackVolume => "OpenStack.Volume",
        }
    }

    /// Endpoint holding the backend object a marketplace resource points to.
    pub fn scope_endpoint(&self) -> Endpoint {
        match self {
            OfferingType::OpenStackInstance => Endpoint::OpenStackInstances,
            OfferingType::OpenStackVolume => Endpoint::OpenStackVolumes,
        }
    }
}

impl fmt::Display for OfferingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
