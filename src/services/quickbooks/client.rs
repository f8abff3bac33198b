use super::token::QuickbooksCredentials;
use crate::{config::QuickbooksConfig, errors::ServiceError, logging::component_logger};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use slog::{debug as slog_debug, warn as slog_warn, Logger};
use std::time::Duration;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbCustomer {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub parent_ref: Option<Reference>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QbInvoice {
    pub id: String,
    #[serde(default)]
    pub doc_number: Option<String>,
    #[serde(default)]
    pub balance: Decimal,
    #[serde(default)]
    pub total_amt: Decimal,
    #[serde(default)]
    pub customer_ref: Option<Reference>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewCustomer {
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_ref: Option<Reference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SalesItemLineDetail {
    pub qty: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvoiceLine {
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub description: String,
    pub detail_type: String,
    pub sales_item_line_detail: SalesItemLineDetail,
}

impl InvoiceLine {
    pub fn sales_item(description: String, qty: i32, unit_price: Decimal, amount: Decimal) -> Self {
        Self {
            amount,
            description,
            detail_type: "SalesItemLineDetail".to_string(),
            sales_item_line_detail: SalesItemLineDetail { qty, unit_price },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewInvoice {
    pub customer_ref: Reference,
    pub doc_number: String,
    pub txn_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub line: Vec<InvoiceLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FaultEnvelope {
    fault: Fault,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Fault {
    #[serde(default)]
    error: Vec<FaultError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FaultError {
    #[serde(default)]
    message: String,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default, rename = "code")]
    code: Option<String>,
}

/// Turns a QuickBooks error body into a readable message, falling back to the raw text.
pub(crate) fn fault_message(body: &str) -> String {
    match serde_json::from_str::<FaultEnvelope>(body) {
        Ok(envelope) if !envelope.fault.error.is_empty() => envelope
            .fault
            .error
            .iter()
            .map(|e| {
                let mut msg = e.message.clone();
                if let Some(detail) = e.detail.as_deref().filter(|d| !d.is_empty()) {
                    msg = format!("{}: {}", msg, detail);
                }
                if let Some(code) = &e.code {
                    msg = format!("{} (code {})", msg, code);
                }
                msg
            })
            .collect::<Vec<_>>()
            .join("; "),
        _ => body.trim().to_string(),
    }
}

/// Escapes a value for a QuickBooks query literal.
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[derive(Clone)]
pub struct QuickbooksClient {
    http: reqwest::Client,
    api_base: String,
    minor_version: u32,
    logger: Logger,
}

impl QuickbooksClient {
    pub fn new(config: &QuickbooksConfig, logger: &Logger) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_base: config.api_base(),
            minor_version: config.minor_version,
            logger: component_logger(logger, "quickbooks.api"),
        })
    }

    fn company_url(&self, creds: &QuickbooksCredentials, path: &str) -> String {
        format!("{}/v3/company/{}/{}", self.api_base, creds.realm_id, path)
    }

    async fn read_json(&self, response: reqwest::Response, what: &str) -> Result<Value, ServiceError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("QuickBooks {}: {}", what, e)))?;
        if !status.is_success() {
            let message = fault_message(&body);
            slog_warn!(self.logger, "request failed"; "operation" => what, "status" => status.as_u16(), "fault" => &message);
            return Err(ServiceError::ExternalServiceError(format!(
                "QuickBooks {} failed ({}): {}",
                what, status, message
            )));
        }
        serde_json::from_str(&body).map_err(|e| {
            ServiceError::ExternalServiceError(format!("Unreadable QuickBooks {} response: {}", what, e))
        })
    }

    /// Runs a query and returns the rows under `QueryResponse.<entity>`.
    #[instrument(skip(self, creds))]
    pub async fn query<T: DeserializeOwned>(
        &self,
        creds: &QuickbooksCredentials,
        entity: &str,
        statement: &str,
    ) -> Result<Vec<T>, ServiceError> {
        slog_debug!(self.logger, "query"; "statement" => statement);
        let minor = self.minor_version.to_string();
        let response = self
            .http
            .get(self.company_url(creds, "query"))
            .bearer_auth(&creds.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("query", statement), ("minorversion", minor.as_str())])
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("QuickBooks query: {}", e)))?;

        let body = self.read_json(response, "query").await?;
        match body.get("QueryResponse").and_then(|r| r.get(entity)) {
            Some(rows) => serde_json::from_value(rows.clone()).map_err(|e| {
                ServiceError::ExternalServiceError(format!("Unreadable QuickBooks {} rows: {}", entity, e))
            }),
            None => Ok(Vec::new()),
        }
    }

    pub async fn customers(&self, creds: &QuickbooksCredentials) -> Result<Vec<QbCustomer>, ServiceError> {
        self.query(creds, "Customer", "select * from Customer maxresults 1000")
            .await
    }

    pub async fn invoices_for_customer(
        &self,
        creds: &QuickbooksCredentials,
        customer_id: &str,
    ) -> Result<Vec<QbInvoice>, ServiceError> {
        let statement = format!(
            "select * from Invoice where CustomerRef = '{}'",
            quote(customer_id)
        );
        self.query(creds, "Invoice", &statement).await
    }

    async fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        creds: &QuickbooksCredentials,
        path: &str,
        entity: &str,
        body: &B,
    ) -> Result<T, ServiceError> {
        let minor = self.minor_version.to_string();
        let response = self
            .http
            .post(self.company_url(creds, path))
            .bearer_auth(&creds.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&[("minorversion", minor.as_str())])
            .json(body)
            .send()
            .await
            .map_err(|e| ServiceError::ExternalServiceError(format!("QuickBooks create {}: {}", entity, e)))?;

        let body = self.read_json(response, entity).await?;
        let record = body.get(entity).cloned().ok_or_else(|| {
            ServiceError::ExternalServiceError(format!("QuickBooks response had no {}", entity))
        })?;
        serde_json::from_value(record).map_err(|e| {
            ServiceError::ExternalServiceError(format!("Unreadable QuickBooks {}: {}", entity, e))
        })
    }

    #[instrument(skip(self, creds, customer), fields(name = %customer.display_name))]
    pub async fn create_customer(
        &self,
        creds: &QuickbooksCredentials,
        customer: &NewCustomer,
    ) -> Result<QbCustomer, ServiceError> {
        self.create(creds, "customer", "Customer", customer).await
    }

    #[instrument(skip(self, creds, invoice), fields(doc_number = %invoice.doc_number))]
    pub async fn create_invoice(
        &self,
        creds: &QuickbooksCredentials,
        invoice: &NewInvoice,
    ) -> Result<QbInvoice, ServiceError> {
        self.create(creds, "invoice", "Invoice", invoice).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fault_body_is_summarised() {
        let body = r#"{"Fault":{"Error":[{"Message":"Duplicate Name Exists Error","Detail":"The name supplied already exists.","code":"6240"}],"type":"ValidationFault"}}"#;
        assert_eq!(
            fault_message(body),
            "Duplicate Name Exists Error: The name supplied already exists. (code 6240)"
        );
        assert_eq!(fault_message("  gateway timeout "), "gateway timeout");
    }

    #[test]
    fn invoice_serialises_in_pascal_case() {
        let invoice = NewInvoice {
            customer_ref: Reference {
                value: "58".into(),
                name: None,
            },
            doc_number: "1001".into(),
            txn_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            due_date: None,
            line: vec![InvoiceLine::sales_item(
                "Letterhead".into(),
                2,
                dec!(50),
                dec!(100),
            )],
        };
        let json = serde_json::to_value(&invoice).unwrap();
        assert_eq!(json["CustomerRef"]["value"], "58");
        assert_eq!(json["Line"][0]["DetailType"], "SalesItemLineDetail");
        assert_eq!(json["Line"][0]["SalesItemLineDetail"]["Qty"], 2);
        assert_eq!(json["Line"][0]["Amount"], 100.0);
        assert!(json.get("DueDate").is_none());
    }

    #[test]
    fn query_literals_are_escaped() {
        assert_eq!(quote("O'Brien"), "O\\'Brien");
    }
}
