use lettre::message::{header, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, instrument};

use crate::config::email::EmailConfig;
use crate::utils::errors::AppError;

pub struct EmailService {
    config: EmailConfig,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    #[instrument(skip(self))]
    pub async fn send_welcome_email(&self, to_email: &str, to_name: &str) -> Result<(), AppError> {
        let text_body = format!(
            "Hi {to_name},\n\n\
             Welcome to WalkTrack! Your account is ready.\n\n\
             Log in, record your first walk, and set yourself a distance goal.\n\n\
             Happy walking,\n\
             The WalkTrack Team"
        );
        let html_body = self.welcome_template(to_name);

        self.send_email(to_email, "Welcome to WalkTrack", &text_body, &html_body)
            .await
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        if !self.config.enabled {
            info!(to = to_email, subject, "Email sending disabled, skipping");
            return Ok(());
        }

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(AppError::internal)?,
            )
            .to(to_email.parse().map_err(AppError::internal)?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(AppError::internal)?;

        let mailer = SmtpTransport::relay(&self.config.smtp_host)
            .map_err(AppError::internal)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(
                self.config.smtp_username.clone(),
                self.config.smtp_password.clone(),
            ))
            .build();

        mailer.send(&message).map_err(AppError::internal)?;
        info!(to = to_email, subject, "Email sent");
        Ok(())
    }

    fn welcome_template(&self, to_name: &str) -> String {
        format!(
            r#"<html>
  <body style="font-family: sans-serif;">
    <h2>Welcome to WalkTrack, {to_name}!</h2>
    <p>Your account is ready.</p>
    <p>Log in, record your first walk, and set yourself a distance goal.</p>
    <p>Happy walking,<br/>The WalkTrack Team</p>
  </body>
</html>"#
        )
    }
}
