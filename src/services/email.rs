//! Outbound email through SendGrid dynamic templates.

use crate::{config::EmailConfig, errors::ServiceError, logging::component_logger};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use metrics::counter;
use serde::Serialize;
use serde_json::{json, Value};
use slog::{info as slog_info, warn as slog_warn, Logger};
use std::{sync::Arc, time::Duration};
use tracing::{error, instrument};

/// Named templates, each mapped to a configured SendGrid template id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum EmailTemplate {
    Verification,
    OrderConfirmation,
    OrderStatusChange,
    Invoice,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attachment {
    /// Base64-encoded file body
    pub content: String,
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub disposition: String,
}

impl Attachment {
    /// Builds an attachment from base64 input, rejecting content that does not decode.
    pub fn from_base64(
        content: &str,
        filename: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Result<Self, ServiceError> {
        let trimmed = content.trim();
        if trimmed.is_empty() || STANDARD.decode(trimmed).is_err() {
            return Err(ServiceError::ValidationError(
                "Attachment content is not valid base64".to_string(),
            ));
        }
        Ok(Self {
            content: trimmed.to_string(),
            filename: filename.into(),
            mime_type: mime_type.into(),
            disposition: "attachment".to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEmail {
    pub to: String,
    pub template: EmailTemplate,
    pub data: Value,
    pub attachments: Vec<Attachment>,
}

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError>;
}

/// Sender used when no API key is configured; records the email and succeeds.
pub struct LogOnlySender {
    logger: Logger,
}

impl LogOnlySender {
    pub fn new(logger: &Logger) -> Self {
        Self {
            logger: component_logger(logger, "email"),
        }
    }
}

#[async_trait]
impl EmailSender for LogOnlySender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        slog_info!(self.logger, "email not sent, no SendGrid key configured";
            "to" => &email.to, "template" => email.template.to_string());
        Ok(())
    }
}

pub struct SendGridSender {
    client: reqwest::Client,
    config: EmailConfig,
    api_key: String,
    logger: Logger,
}

impl SendGridSender {
    pub fn new(config: EmailConfig, api_key: String, logger: &Logger) -> Result<Self, ServiceError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| ServiceError::InternalError(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            config,
            api_key,
            logger: component_logger(logger, "sendgrid"),
        })
    }

    fn template_id(&self, template: EmailTemplate) -> &str {
        match template {
            EmailTemplate::Verification => &self.config.verification_template_id,
            EmailTemplate::OrderConfirmation => &self.config.order_confirmation_template_id,
            EmailTemplate::OrderStatusChange => &self.config.order_status_template_id,
            EmailTemplate::Invoice => &self.config.invoice_template_id,
        }
    }

    pub(crate) fn payload(&self, email: &OutgoingEmail) -> Value {
        let mut body = json!({
            "personalizations": [{
                "to": [{ "email": email.to }],
                "dynamic_template_data": email.data,
            }],
            "from": { "email": self.config.from_email, "name": self.config.from_name },
            "template_id": self.template_id(email.template),
        });
        if !email.attachments.is_empty() {
            body["attachments"] = json!(email.attachments);
        }
        body
    }
}

#[async_trait]
impl EmailSender for SendGridSender {
    async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        let url = format!(
            "{}/v3/mail/send",
            self.config.sendgrid_api_base.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.payload(&email))
            .send()
            .await
            .map_err(|e| {
                slog_warn!(self.logger, "SendGrid request failed"; "error" => e.to_string());
                ServiceError::ExternalServiceError(format!("SendGrid request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            slog_warn!(self.logger, "SendGrid rejected email";
                "status" => status.as_u16(), "detail" => &detail, "template" => email.template.to_string());
            return Err(ServiceError::ExternalServiceError(format!(
                "SendGrid returned {}: {}",
                status, detail
            )));
        }

        slog_info!(self.logger, "email sent"; "to" => &email.to, "template" => email.template.to_string());
        Ok(())
    }
}

/// Composes the application's emails and hands them to the configured sender.
#[derive(Clone)]
pub struct EmailService {
    sender: Arc<dyn EmailSender>,
    frontend_url: String,
}

impl EmailService {
    pub fn new(sender: Arc<dyn EmailSender>, frontend_url: impl Into<String>) -> Self {
        Self {
            sender,
            frontend_url: frontend_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Picks SendGrid when an API key is configured, otherwise the log-only sender.
    pub fn from_config(
        config: &EmailConfig,
        frontend_url: &str,
        logger: &Logger,
    ) -> Result<Self, ServiceError> {
        let sender: Arc<dyn EmailSender> = match config
            .sendgrid_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
        {
            Some(key) => Arc::new(SendGridSender::new(config.clone(), key.to_string(), logger)?),
            None => Arc::new(LogOnlySender::new(logger)),
        };
        Ok(Self::new(sender, frontend_url))
    }

    #[instrument(skip(self, email), fields(to = %email.to, template = %email.template))]
    async fn deliver(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
        let template = email.template.to_string();
        match self.sender.send(email).await {
            Ok(()) => {
                counter!("printshop.emails.sent", 1, "template" => template);
                Ok(())
            }
            Err(e) => {
                counter!("printshop.emails.failed", 1, "template" => template);
                error!(error = %e, "Email delivery failed");
                Err(e)
            }
        }
    }

    pub async fn send_verification(
        &self,
        to: &str,
        name: &str,
        token: &str,
    ) -> Result<(), ServiceError> {
        self.deliver(OutgoingEmail {
            to: to.to_string(),
            template: EmailTemplate::Verification,
            data: json!({
                "name": name,
                "verification_url": format!("{}/verify-email?token={}", self.frontend_url, token),
            }),
            attachments: vec![],
        })
        .await
    }

    pub async fn send_order_confirmation(
        &self,
        to: &str,
        order_number: i32,
        data: Value,
    ) -> Result<(), ServiceError> {
        self.deliver(OutgoingEmail {
            to: to.to_string(),
            template: EmailTemplate::OrderConfirmation,
            data: json!({ "order_number": order_number, "order": data }),
            attachments: vec![],
        })
        .await
    }

    pub async fn send_order_status(
        &self,
        to: &str,
        order_number: i32,
        status: &str,
    ) -> Result<(), ServiceError> {
        self.deliver(OutgoingEmail {
            to: to.to_string(),
            template: EmailTemplate::OrderStatusChange,
            data: json!({ "order_number": order_number, "status": status }),
            attachments: vec![],
        })
        .await
    }

    pub async fn send_invoice(
        &self,
        to: &str,
        invoice_number: i32,
        data: Value,
        pdf_base64: Option<&str>,
    ) -> Result<(), ServiceError> {
        let attachments = match pdf_base64 {
            Some(pdf) => vec![Attachment::from_base64(
                pdf,
                format!("invoice-{}.pdf", invoice_number),
                "application/pdf",
            )?],
            None => vec![],
        };
        self.deliver(OutgoingEmail {
            to: to.to_string(),
            template: EmailTemplate::Invoice,
            data: json!({ "invoice_number": invoice_number, "invoice": data }),
            attachments,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::discard_logger;
    use assert_matches::assert_matches;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<OutgoingEmail>>);

    #[async_trait]
    impl EmailSender for Recorder {
        async fn send(&self, email: OutgoingEmail) -> Result<(), ServiceError> {
            self.0.lock().unwrap().push(email);
            Ok(())
        }
    }

    fn config() -> EmailConfig {
        EmailConfig {
            sendgrid_api_key: Some("SG.test".into()),
            sendgrid_api_base: "https://api.sendgrid.com".into(),
            from_email: "shop@example.com".into(),
            from_name: "Print Shop".into(),
            verification_template_id: "d-verify".into(),
            order_confirmation_template_id: "d-confirm".into(),
            order_status_template_id: "d-status".into(),
            invoice_template_id: "d-invoice".into(),
        }
    }

    #[test]
    fn invalid_base64_attachment_is_rejected() {
        assert_matches!(
            Attachment::from_base64("not base64 !!", "a.pdf", "application/pdf"),
            Err(ServiceError::ValidationError(_))
        );
        let ok = Attachment::from_base64("JVBERi0xLjQK", "a.pdf", "application/pdf").unwrap();
        assert_eq!(ok.disposition, "attachment");
    }

    #[test]
    fn payload_uses_template_and_attachments() {
        let sender = SendGridSender::new(config(), "SG.test".into(), &discard_logger()).unwrap();
        let email = OutgoingEmail {
            to: "buyer@example.com".into(),
            template: EmailTemplate::Invoice,
            data: json!({ "invoice_number": 1001 }),
            attachments: vec![
                Attachment::from_base64("JVBERi0xLjQK", "invoice-1001.pdf", "application/pdf")
                    .unwrap(),
            ],
        };
        let body = sender.payload(&email);
        assert_eq!(body["template_id"], "d-invoice");
        assert_eq!(body["personalizations"][0]["to"][0]["email"], "buyer@example.com");
        assert_eq!(
            body["personalizations"][0]["dynamic_template_data"]["invoice_number"],
            1001
        );
        assert_eq!(body["attachments"][0]["type"], "application/pdf");
        assert_eq!(body["from"]["name"], "Print Shop");
    }

    #[tokio::test]
    async fn verification_email_links_to_frontend() {
        let recorder = Arc::new(Recorder::default());
        let service = EmailService::new(recorder.clone(), "https://app.example.com/");
        service
            .send_verification("new@example.com", "Pat", "tok123")
            .await
            .unwrap();
        let sent = recorder.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].template, EmailTemplate::Verification);
        assert_eq!(
            sent[0].data["verification_url"],
            "https://app.example.com/verify-email?token=tok123"
        );
    }
}
