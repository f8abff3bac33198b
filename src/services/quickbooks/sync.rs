use super::{
    client::{NewCustomer, QbCustomer, QuickbooksClient, Reference},
    token::{QuickbooksCredentials, QuickbooksTokenManager},
};
use crate::{
    entities::{company, invoice, office},
    errors::ServiceError,
    models::InvoiceStatus,
};
use chrono::Utc;
use metrics::counter;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct CustomerSyncSummary {
    pub fetched: usize,
    pub companies_created: usize,
    pub companies_updated: usize,
    pub offices_created: usize,
    pub offices_updated: usize,
    /// Sub-customers whose parent has no local company
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct InvoiceSyncSummary {
    pub fetched: usize,
    pub matched: usize,
    pub updated: usize,
    pub unmatched: Vec<String>,
}

/// Local status implied by a QuickBooks invoice balance.
pub fn status_for_balance(balance: Decimal) -> InvoiceStatus {
    if balance.is_zero() {
        InvoiceStatus::Paid
    } else {
        InvoiceStatus::Sent
    }
}

#[derive(Clone)]
pub struct QuickbooksSync {
    db_pool: Arc<DatabaseConnection>,
    tokens: Arc<QuickbooksTokenManager>,
    client: QuickbooksClient,
}

impl QuickbooksSync {
    pub fn new(
        db_pool: Arc<DatabaseConnection>,
        tokens: Arc<QuickbooksTokenManager>,
        client: QuickbooksClient,
    ) -> Self {
        Self {
            db_pool,
            tokens,
            client,
        }
    }

    pub fn client(&self) -> &QuickbooksClient {
        &self.client
    }

    pub async fn credentials(&self, user_id: Uuid) -> Result<QuickbooksCredentials, ServiceError> {
        self.tokens.access_token(user_id).await
    }

    /// Mirrors QuickBooks customers locally. Top-level customers become
    /// companies with a default office; sub-customers become offices under the
    /// company matching their parent.
    #[instrument(skip(self))]
    pub async fn sync_customers(&self, user_id: Uuid) -> Result<CustomerSyncSummary, ServiceError> {
        let creds = self.credentials(user_id).await?;
        let customers = self.client.customers(&creds).await?;
        let mut summary = CustomerSyncSummary {
            fetched: customers.len(),
            ..Default::default()
        };

        let (parents, children): (Vec<QbCustomer>, Vec<QbCustomer>) = customers
            .into_iter()
            .partition(|c| c.parent_ref.is_none());

        for customer in parents {
            let company_id = self.upsert_company(&customer, &mut summary).await?;
            self.upsert_office(company_id, &customer, &mut summary).await?;
        }

        let db = &*self.db_pool;
        for customer in children {
            let parent_id = customer
                .parent_ref
                .as_ref()
                .map(|r| r.value.clone())
                .unwrap_or_default();
            let parent = company::Entity::find()
                .filter(company::Column::QuickbooksId.eq(parent_id))
                .one(db)
                .await?;
            match parent {
                Some(parent) => self.upsert_office(parent.id, &customer, &mut summary).await?,
                None => summary.skipped += 1,
            }
        }

        counter!("printshop.quickbooks.customer_syncs", 1);
        info!(?summary, "QuickBooks customers synced");
        Ok(summary)
    }

    async fn upsert_company(
        &self,
        customer: &QbCustomer,
        summary: &mut CustomerSyncSummary,
    ) -> Result<Uuid, ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let existing = company::Entity::find()
            .filter(company::Column::QuickbooksId.eq(customer.id.clone()))
            .one(db)
            .await?;
        match existing {
            Some(found) => {
                let id = found.id;
                if found.name != customer.display_name {
                    let mut active: company::ActiveModel = found.into();
                    active.name = Set(customer.display_name.clone());
                    active.updated_at = Set(now);
                    active.update(db).await?;
                    summary.companies_updated += 1;
                }
                Ok(id)
            }
            None => {
                let created = company::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    name: Set(customer.display_name.clone()),
                    quickbooks_id: Set(Some(customer.id.clone())),
                    is_active: Set(customer.active.unwrap_or(true)),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await
                .map_err(|e| ServiceError::from_write(e, "Company"))?;
                summary.companies_created += 1;
                Ok(created.id)
            }
        }
    }

    async fn upsert_office(
        &self,
        company_id: Uuid,
        customer: &QbCustomer,
        summary: &mut CustomerSyncSummary,
    ) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let now = Utc::now();
        let existing = office::Entity::find()
            .filter(office::Column::QuickbooksCustomerId.eq(customer.id.clone()))
            .one(db)
            .await?;
        match existing {
            Some(found) => {
                if found.name != customer.display_name || found.company_id != company_id {
                    let mut active: office::ActiveModel = found.into();
                    active.name = Set(customer.display_name.clone());
                    active.company_id = Set(company_id);
                    active.updated_at = Set(now);
                    active.update(db).await?;
                    summary.offices_updated += 1;
                }
            }
            None => {
                office::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    company_id: Set(company_id),
                    name: Set(customer.display_name.clone()),
                    phone: Set(None),
                    fax: Set(None),
                    email: Set(None),
                    is_active: Set(customer.active.unwrap_or(true)),
                    is_walk_in_office: Set(false),
                    quickbooks_customer_id: Set(Some(customer.id.clone())),
                    created_by_id: Set(None),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(db)
                .await?;
                summary.offices_created += 1;
            }
        }
        Ok(())
    }

    /// Pulls the office's QuickBooks invoices and updates the status of the
    /// local invoices they correspond to.
    #[instrument(skip(self))]
    pub async fn sync_invoices_for_office(
        &self,
        user_id: Uuid,
        office_id: Uuid,
    ) -> Result<InvoiceSyncSummary, ServiceError> {
        let db = &*self.db_pool;
        let office = office::Entity::find_by_id(office_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Office {} not found", office_id)))?;
        let customer_id = office.quickbooks_customer_id.ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "Office {} is not linked to a QuickBooks customer",
                office_id
            ))
        })?;

        let creds = self.credentials(user_id).await?;
        let remote = self.client.invoices_for_customer(&creds, &customer_id).await?;
        let mut summary = InvoiceSyncSummary {
            fetched: remote.len(),
            ..Default::default()
        };

        for qb in remote {
            let local = invoice::Entity::find()
                .filter(invoice::Column::QuickbooksInvoiceId.eq(qb.id.clone()))
                .one(db)
                .await?;
            let Some(local) = local else {
                summary.unmatched.push(qb.id);
                continue;
            };
            summary.matched += 1;

            let status = status_for_balance(qb.balance);
            if local.status != status {
                let mut active: invoice::ActiveModel = local.into();
                active.status = Set(status);
                active.updated_at = Set(Utc::now());
                active.update(db).await?;
                summary.updated += 1;
            }
        }

        info!(office_id = %office_id, ?summary, "QuickBooks invoices synced");
        Ok(summary)
    }

    /// Returns the office's QuickBooks customer id, creating the customer (as a
    /// sub-customer of its company when the company is linked) if needed.
    #[instrument(skip(self, creds))]
    pub async fn ensure_customer(
        &self,
        creds: &QuickbooksCredentials,
        office_id: Uuid,
    ) -> Result<String, ServiceError> {
        let db = &*self.db_pool;
        let office = office::Entity::find_by_id(office_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Office {} not found", office_id)))?;
        if let Some(id) = office.quickbooks_customer_id.clone() {
            return Ok(id);
        }

        let company = company::Entity::find_by_id(office.company_id).one(db).await?;
        let parent_ref = company.as_ref().and_then(|c| {
            c.quickbooks_id.clone().map(|value| Reference {
                value,
                name: Some(c.name.clone()),
            })
        });
        let display_name = match &company {
            Some(c) if parent_ref.is_some() => format!("{} - {}", c.name, office.name),
            _ => office.name.clone(),
        };
        let created = self
            .client
            .create_customer(
                creds,
                &NewCustomer {
                    display_name,
                    job: parent_ref.as_ref().map(|_| true),
                    parent_ref,
                },
            )
            .await?;

        let mut active: office::ActiveModel = office.into();
        active.quickbooks_customer_id = Set(Some(created.id.clone()));
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        info!(office_id = %office_id, customer_id = %created.id, "QuickBooks customer created");
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn zero_balance_means_paid() {
        assert_eq!(status_for_balance(dec!(0)), InvoiceStatus::Paid);
        assert_eq!(status_for_balance(dec!(0.00)), InvoiceStatus::Paid);
        assert_eq!(status_for_balance(dec!(12.50)), InvoiceStatus::Sent);
    }
}
