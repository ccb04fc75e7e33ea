//! Role to back-office module access table.

use crate::types::{AdminModule, Role};

use crate::types::AdminModule as M;

const ADMIN: &[AdminModule] = &[
    M::Dashboard,
    M::Products,
    M::Categories,
    M::Brands,
    M::Orders,
    M::Coupons,
    M::Banners,
    M::Blog,
    M::Pages,
    M::Layouts,
    M::Navigation,
    M::Bundles,
    M::Testimonials,
    M::Campaigns,
    M::Reviews,
    M::Newsletters,
    M::PaymentMethods,
    M::Consents,
    M::Marketplace,
];

const EDITOR: &[AdminModule] = &[
    M::Dashboard,
    M::Products,
    M::Categories,
    M::Brands,
    M::Banners,
    M::Blog,
    M::Pages,
    M::Layouts,
    M::Navigation,
    M::Bundles,
    M::Testimonials,
    M::Campaigns,
    M::Reviews,
];

const ORDER_MANAGER: &[AdminModule] = &[
    M::Dashboard,
    M::Orders,
    M::Coupons,
    M::PaymentMethods,
    M::Marketplace,
];

const SUPPORT: &[AdminModule] = &[M::Dashboard, M::Orders, M::Reviews, M::Newsletters];

/// Modules the role may access.
///
/// `super_admin` is a wildcard and returns every known module.
#[must_use]
pub const fn allowed_modules(role: Role) -> &'static [AdminModule] {
    match role {
        Role::SuperAdmin => &AdminModule::ALL,
        Role::Admin => ADMIN,
        Role::Editor => EDITOR,
        Role::OrderManager => ORDER_MANAGER,
        Role::Support => SUPPORT,
        Role::Customer => &[],
    }
}

/// Whether `role` may use `module`.
#[must_use]
pub fn can_access(role: Role, module: AdminModule) -> bool {
    role == Role::SuperAdmin || allowed_modules(role).contains(&module)
}

/// Access check on a raw path segment.
///
/// Segments that do not name a known module are denied unless the role is
/// `super_admin`.
#[must_use]
pub fn can_access_segment(role: Role, segment: &str) -> bool {
    match AdminModule::from_path_segment(segment) {
        Some(module) => can_access(role, module),
        None => role == Role::SuperAdmin,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_denied_everywhere() {
        for module in AdminModule::ALL {
            assert!(!can_access(Role::Customer, module), "{module}");
        }
        assert!(!can_access_segment(Role::Customer, "whatever"));
    }

    #[test]
    fn test_super_admin_allowed_everywhere() {
        for module in AdminModule::ALL {
            assert!(can_access(Role::SuperAdmin, module));
        }
        assert!(can_access_segment(Role::SuperAdmin, "future-module"));
    }

    #[test]
    fn test_admin_excludes_sensitive_modules() {
        assert!(can_access(Role::Admin, AdminModule::Products));
        assert!(can_access(Role::Admin, AdminModule::Marketplace));
        for module in [AdminModule::Users, AdminModule::Settings, AdminModule::AuditLogs] {
            assert!(!can_access(Role::Admin, module));
        }
        assert_eq!(allowed_modules(Role::Admin).len(), AdminModule::ALL.len() - 3);
    }

    #[test]
    fn test_unknown_segment_denied_for_staff() {
        for role in [Role::Admin, Role::Editor, Role::OrderManager, Role::Support] {
            assert!(!can_access_segment(role, "warehouse"));
        }
    }

    #[test]
    fn test_order_manager_scope() {
        assert!(can_access_segment(Role::OrderManager, "orders"));
        assert!(can_access_segment(Role::OrderManager, "payment-methods"));
        assert!(!can_access_segment(Role::OrderManager, "blog"));
    }
}
