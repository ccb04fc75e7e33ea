//! User roles and back-office modules.

use serde::{Deserialize, Serialize};

use crate::impl_text_enum;

/// Role stored on every user account.
///
/// Customers and staff share the `users` table; the role decides which
/// back-office modules (if any) the account may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Unrestricted access, including user and settings management.
    SuperAdmin,
    /// Store management without user, settings or audit access.
    Admin,
    /// Catalog and content editing.
    Editor,
    /// Order handling.
    OrderManager,
    /// Customer support.
    Support,
    /// Storefront shopper with no back-office access.
    #[default]
    Customer,
}

impl Role {
    pub const ALL: [Self; 6] = [
        Self::SuperAdmin,
        Self::Admin,
        Self::Editor,
        Self::OrderManager,
        Self::Support,
        Self::Customer,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::Admin => "admin",
            Self::Editor => "editor",
            Self::OrderManager => "order_manager",
            Self::Support => "support",
            Self::Customer => "customer",
        }
    }

    /// Whether the role is a staff role (anything but customer).
    #[must_use]
    pub const fn is_staff(self) -> bool {
        !matches!(self, Self::Customer)
    }
}

impl_text_enum!(Role, "role");

/// Back-office area, named after the first path segment under `/api/admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminModule {
    Dashboard,
    Products,
    Categories,
    Brands,
    Orders,
    Users,
    Coupons,
    Banners,
    Blog,
    Pages,
    Layouts,
    Navigation,
    Bundles,
    Testimonials,
    Campaigns,
    Reviews,
    Newsletters,
    Settings,
    PaymentMethods,
    AuditLogs,
    Consents,
    Marketplace,
}

impl AdminModule {
    pub const ALL: [Self; 22] = [
        Self::Dashboard,
        Self::Products,
        Self::Categories,
        Self::Brands,
        Self::Orders,
        Self::Users,
        Self::Coupons,
        Self::Banners,
        Self::Blog,
        Self::Pages,
        Self::Layouts,
        Self::Navigation,
        Self::Bundles,
        Self::Testimonials,
        Self::Campaigns,
        Self::Reviews,
        Self::Newsletters,
        Self::Settings,
        Self::PaymentMethods,
        Self::AuditLogs,
        Self::Consents,
        Self::Marketplace,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dashboard => "dashboard",
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Brands => "brands",
            Self::Orders => "orders",
            Self::Users => "users",
            Self::Coupons => "coupons",
            Self::Banners => "banners",
            Self::Blog => "blog",
            Self::Pages => "pages",
            Self::Layouts => "layouts",
            Self::Navigation => "navigation",
            Self::Bundles => "bundles",
            Self::Testimonials => "testimonials",
            Self::Campaigns => "campaigns",
            Self::Reviews => "reviews",
            Self::Newsletters => "newsletters",
            Self::Settings => "settings",
            Self::PaymentMethods => "payment_methods",
            Self::AuditLogs => "audit_logs",
            Self::Consents => "consents",
            Self::Marketplace => "marketplace",
        }
    }

    /// Resolve a URL path segment. Hyphenated forms (`payment-methods`) are
    /// accepted alongside the canonical `snake_case`.
    #[must_use]
    pub fn from_path_segment(segment: &str) -> Option<Self> {
        let normalized = segment.replace('-', "_");
        normalized.parse().ok()
    }
}

impl_text_enum!(AdminModule, "admin module");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in Role::ALL {
            assert_eq!(role.to_string().parse::<Role>().unwrap(), role);
        }
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_default_role_is_customer() {
        assert_eq!(Role::default(), Role::Customer);
        assert!(!Role::Customer.is_staff());
        assert!(Role::Support.is_staff());
    }

    #[test]
    fn test_module_from_path_segment() {
        assert_eq!(
            AdminModule::from_path_segment("payment-methods"),
            Some(AdminModule::PaymentMethods)
        );
        assert_eq!(
            AdminModule::from_path_segment("audit_logs"),
            Some(AdminModule::AuditLogs)
        );
        assert_eq!(AdminModule::from_path_segment("warehouse"), None);
    }
}
