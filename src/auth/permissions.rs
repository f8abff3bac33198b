/*!
 * # Permissions Module
 *
 * Permissions are `resource:action` strings. A grant of `resource:*` covers
 * every action on the resource and `*` covers everything.
 */

/// Permission actions
pub struct Actions;

impl Actions {
    pub const READ: &'static str = "read";
    pub const CREATE: &'static str = "create";
    pub const UPDATE: &'static str = "update";
    pub const DELETE: &'static str = "delete";
    pub const MANAGE: &'static str = "manage";
    pub const ALL: &'static str = "*";
}

/// Resource types
pub struct Resources;

impl Resources {
    pub const COMPANIES: &'static str = "companies";
    pub const OFFICES: &'static str = "offices";
    pub const WORK_ORDERS: &'static str = "workorders";
    pub const ORDERS: &'static str = "orders";
    pub const TYPESETTING: &'static str = "typesetting";
    pub const PAPER: &'static str = "paper";
    pub const STOCK: &'static str = "stock";
    pub const PAYMENTS: &'static str = "payments";
    pub const INVOICES: &'static str = "invoices";
    pub const USERS: &'static str = "users";
    pub const ROLES: &'static str = "roles";
    pub const UPLOADS: &'static str = "uploads";
    pub const QUICKBOOKS: &'static str = "quickbooks";

    pub const ALL: [&'static str; 13] = [
        Self::COMPANIES,
        Self::OFFICES,
        Self::WORK_ORDERS,
        Self::ORDERS,
        Self::TYPESETTING,
        Self::PAPER,
        Self::STOCK,
        Self::PAYMENTS,
        Self::INVOICES,
        Self::USERS,
        Self::ROLES,
        Self::UPLOADS,
        Self::QUICKBOOKS,
    ];
}

/// Common permission string constants for compile-time safety
pub mod consts {
    // Companies, offices and addresses
    pub const COMPANIES_READ: &str = "companies:read";
    pub const COMPANIES_MANAGE: &str = "companies:manage";
    pub const OFFICES_READ: &str = "offices:read";
    pub const OFFICES_MANAGE: &str = "offices:manage";

    // Work orders
    pub const WORKORDERS_READ: &str = "workorders:read";
    pub const WORKORDERS_CREATE: &str = "workorders:create";
    pub const WORKORDERS_UPDATE: &str = "workorders:update";
    pub const WORKORDERS_DELETE: &str = "workorders:delete";

    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE: &str = "orders:update";
    pub const ORDERS_DELETE: &str = "orders:delete";

    // Production
    pub const TYPESETTING_READ: &str = "typesetting:read";
    pub const TYPESETTING_MANAGE: &str = "typesetting:manage";
    pub const PAPER_READ: &str = "paper:read";
    pub const PAPER_MANAGE: &str = "paper:manage";
    pub const STOCK_READ: &str = "stock:read";
    pub const STOCK_MANAGE: &str = "stock:manage";

    // Money
    pub const PAYMENTS_READ: &str = "payments:read";
    pub const PAYMENTS_MANAGE: &str = "payments:manage";
    pub const INVOICES_READ: &str = "invoices:read";
    pub const INVOICES_MANAGE: &str = "invoices:manage";

    // Administration
    pub const USERS_READ: &str = "users:read";
    pub const USERS_MANAGE: &str = "users:manage";
    pub const ROLES_MANAGE: &str = "roles:manage";
    pub const UPLOADS_CREATE: &str = "uploads:create";
    pub const QUICKBOOKS_MANAGE: &str = "quickbooks:manage";
}

/// Every concrete permission the API checks, used to seed the admin role.
pub fn all_permissions() -> Vec<&'static str> {
    use consts::*;
    vec![
        COMPANIES_READ,
        COMPANIES_MANAGE,
        OFFICES_READ,
        OFFICES_MANAGE,
        WORKORDERS_READ,
        WORKORDERS_CREATE,
        WORKORDERS_UPDATE,
        WORKORDERS_DELETE,
        ORDERS_READ,
        ORDERS_CREATE,
        ORDERS_UPDATE,
        ORDERS_DELETE,
        TYPESETTING_READ,
        TYPESETTING_MANAGE,
        PAPER_READ,
        PAPER_MANAGE,
        STOCK_READ,
        STOCK_MANAGE,
        PAYMENTS_READ,
        PAYMENTS_MANAGE,
        INVOICES_READ,
        INVOICES_MANAGE,
        USERS_READ,
        USERS_MANAGE,
        ROLES_MANAGE,
        UPLOADS_CREATE,
        QUICKBOOKS_MANAGE,
    ]
}

/// Whether a granted permission satisfies a required one.
pub fn permission_matches(granted: &str, required: &str) -> bool {
    if granted == required || granted == Actions::ALL {
        return true;
    }
    match (granted.split_once(':'), required.split_once(':')) {
        (Some((g_res, g_act)), Some((r_res, _))) => g_res == r_res && g_act == Actions::ALL,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcards_cover_their_resource_only() {
        assert!(permission_matches("orders:read", "orders:read"));
        assert!(permission_matches("orders:*", "orders:delete"));
        assert!(permission_matches("*", "quickbooks:manage"));
        assert!(!permission_matches("orders:*", "invoices:read"));
        assert!(!permission_matches("orders:read", "orders:update"));
    }

    #[test]
    fn every_constant_names_a_known_resource() {
        for permission in all_permissions() {
            let (resource, _) = permission.split_once(':').unwrap();
            assert!(Resources::ALL.contains(&resource), "{}", permission);
        }
    }
}
