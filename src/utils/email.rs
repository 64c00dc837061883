use lettre::message::header;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::instrument;

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self, body))]
    pub async fn send_text(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.send(to, subject, body, header::ContentType::TEXT_PLAIN)
            .await
    }

    #[instrument(skip(self, html))]
    pub async fn send_html(&self, to: &str, subject: &str, html: &str) -> Result<(), AppError> {
        self.send(to, subject, html, header::ContentType::TEXT_HTML)
            .await
    }

    /// Send the same text message to every recipient. Per-recipient failures
    /// are logged and skipped; returns how many sends succeeded.
    #[instrument(skip(self, recipients, body))]
    pub async fn send_bulk(
        &self,
        recipients: &[String],
        subject: &str,
        body: &str,
    ) -> Result<usize, AppError> {
        let mut sent = 0;
        for to in recipients {
            match self.send_text(to, subject, body).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(to, error = %e.error, "failed to send bulk email"),
            }
        }
        Ok(sent)
    }

    #[instrument(skip(self))]
    pub async fn send_enrollment_notice(
        &self,
        to: &str,
        username: &str,
        course_title: &str,
    ) -> Result<(), AppError> {
        let body = format!(
            "Hi {},\n\n\
             You have been enrolled in the course: {}.\n\n\
             Best regards,\n\
             Campushub Team",
            username, course_title
        );
        self.send_text(to, "Course enrollment", &body).await
    }

    async fn send(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        content_type: header::ContentType,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            tracing::info!(to, subject, "email sending disabled, skipping");
            return Ok(());
        }

        let from = format!("{} <{}>", self.config.from_name, self.config.from_email);

        let email = Message::builder()
            .from(
                from.parse()
                    .map_err(|e| AppError::internal(format!("Invalid from email: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| AppError::internal(format!("Invalid to email: {}", e)))?)
            .subject(subject)
            .header(content_type)
            .body(body.to_string())
            .map_err(|e| AppError::internal(format!("Failed to build email: {}", e)))?;

        let mailer = if self.config.smtp_username.is_empty() {
            SmtpTransport::builder_dangerous(&self.config.smtp_host)
                .port(self.config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            );

            SmtpTransport::relay(&self.config.smtp_host)
                .map_err(|e| AppError::internal(format!("Failed to create SMTP relay: {}", e)))?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build()
        };

        tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::internal(format!("Task join error: {}", e)))?
            .map_err(|e| AppError::internal(format!("Failed to send email: {}", e)))?;

        Ok(())
    }
}
