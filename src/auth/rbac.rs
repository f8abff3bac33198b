/*!
 * # Role-Based Access Control (RBAC) Module
 *
 * Built-in role templates. Roles live in the database; these are the sets
 * of permissions the seed command creates them with.
 */

use super::permissions::{all_permissions, consts::*};
use lazy_static::lazy_static;
use std::collections::BTreeMap;

/// Name of the role that bypasses permission checks.
pub const ADMIN_ROLE: &str = "admin";

/// Role definition with associated permissions
#[derive(Debug, Clone)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: Vec<String>,
}

fn grants(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| p.to_string()).collect()
}

lazy_static! {
    pub static ref DEFAULT_ROLES: BTreeMap<&'static str, RoleTemplate> = {
        let mut roles = BTreeMap::new();

        roles.insert(
            ADMIN_ROLE,
            RoleTemplate {
                name: ADMIN_ROLE,
                description: "Administrator with full access",
                permissions: grants(&all_permissions()),
            },
        );

        // Front counter and production managers
        roles.insert(
            "manager",
            RoleTemplate {
                name: "manager",
                description: "Runs jobs from intake to invoice",
                permissions: grants(&[
                    "companies:*",
                    "offices:*",
                    "workorders:*",
                    "orders:*",
                    "typesetting:*",
                    "paper:*",
                    "stock:*",
                    "payments:*",
                    "invoices:*",
                    UPLOADS_CREATE,
                    QUICKBOOKS_MANAGE,
                    USERS_READ,
                ]),
            },
        );

        roles.insert(
            "staff",
            RoleTemplate {
                name: "staff",
                description: "Production floor and typesetting",
                permissions: grants(&[
                    COMPANIES_READ,
                    OFFICES_READ,
                    WORKORDERS_READ,
                    WORKORDERS_CREATE,
                    WORKORDERS_UPDATE,
                    ORDERS_READ,
                    ORDERS_UPDATE,
                    "typesetting:*",
                    PAPER_READ,
                    "stock:*",
                    UPLOADS_CREATE,
                ]),
            },
        );

        roles.insert(
            "readonly",
            RoleTemplate {
                name: "readonly",
                description: "Read-only access to jobs and customers",
                permissions: grants(&[
                    COMPANIES_READ,
                    OFFICES_READ,
                    WORKORDERS_READ,
                    ORDERS_READ,
                    TYPESETTING_READ,
                    PAPER_READ,
                    STOCK_READ,
                    PAYMENTS_READ,
                    INVOICES_READ,
                ]),
            },
        );

        roles
    };
}

pub fn default_role(name: &str) -> Option<&'static RoleTemplate> {
    DEFAULT_ROLES.get(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_template_holds_every_permission() {
        let admin = default_role(ADMIN_ROLE).unwrap();
        assert_eq!(admin.permissions.len(), all_permissions().len());
    }

    #[test]
    fn templates_use_resource_action_shape() {
        for role in DEFAULT_ROLES.values() {
            for permission in &role.permissions {
                assert!(permission.contains(':'), "{} in {}", permission, role.name);
            }
        }
    }
}
