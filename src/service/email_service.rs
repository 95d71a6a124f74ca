//! Email Service
//!
//! SMTP implementation of the [`Notifier`] contract, sending OTP
//! verification codes and password-reset links.

use anyhow::Result;
use async_trait::async_trait;
use lettre::{
    message::{header, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use log::{error, info};
use tera::{Context, Tera};

use crate::config::env;
use crate::service::notifier::{DeliveryError, Notifier};

/// Email service configuration
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname
    pub smtp_host: String,
    /// SMTP server port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// From email address
    pub from_email: String,
    /// From name (display name)
    pub from_name: String,
}

impl EmailConfig {
    /// Create email configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            smtp_host: env::get_string("SMTP_HOST", "localhost"),
            smtp_port: env::get_u32("SMTP_PORT", 587) as u16,
            smtp_username: env::require("SMTP_USERNAME")?,
            smtp_password: env::require("SMTP_PASSWORD")?,
            from_email: env::require("FROM_EMAIL")?,
            from_name: env::get_string("FROM_NAME", "Auth Service"),
        })
    }
}

/// SMTP notifier for lifecycle emails
pub struct EmailService {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    templates: Tera,
    config: EmailConfig,
}

impl EmailService {
    /// Create a new email service
    pub fn new(config: EmailConfig) -> Result<Self> {
        let creds = Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| anyhow::anyhow!("Failed to configure SMTP relay: {}", e))?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        let mut templates = Tera::default();
        Self::add_embedded_templates(&mut templates)?;

        Ok(Self {
            transport,
            templates,
            config,
        })
    }

    /// Register the embedded email templates
    fn add_embedded_templates(tera: &mut Tera) -> Result<()> {
        let otp_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Verify Your Email Address</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .code { font-size: 32px; font-weight: bold; color: #007bff; letter-spacing: 4px; text-align: center; margin: 20px 0; padding: 15px; background: #f8f9fa; border-radius: 4px; }
    </style>
</head>
<body>
    <h1>Verify Your Email Address</h1>
    <p>Hello {{ user_name }},</p>
    <p>Thank you for signing up! Enter the verification code below to confirm your email address:</p>
    <div class="code">{{ otp_code }}</div>
    <p>This code will expire in <strong>{{ expires_in_minutes }} minutes</strong>.</p>
    <p>If you didn't create an account, you can safely ignore this email.</p>
    <p>Best regards,<br>The {{ app_name }} Team</p>
</body>
</html>
        "#;

        let otp_text = r#"
Verify Your Email Address

Hello {{ user_name }},

Thank you for signing up! Enter the verification code below to confirm your email address:

Verification Code: {{ otp_code }}

This code will expire in {{ expires_in_minutes }} minutes.

If you didn't create an account, you can safely ignore this email.

Best regards,
The {{ app_name }} Team
        "#;

        let reset_html = r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>Reset Your Password</title>
    <style>
        body { font-family: Arial, sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto; padding: 20px; }
        .button { display: inline-block; padding: 12px 24px; background: #007bff; color: white; text-decoration: none; border-radius: 4px; margin: 20px 0; }
    </style>
</head>
<body>
    <h1>Reset Your Password</h1>
    <p>Hello {{ user_name }},</p>
    <p>We received a request to reset your password. Click the button below to choose a new one:</p>
    <p><a class="button" href="{{ reset_url }}">Reset Password</a></p>
    <p>Or copy this link into your browser: {{ reset_url }}</p>
    <p>This link will expire in <strong>1 hour</strong>. If you didn't request a password reset, you can safely ignore this email.</p>
    <p>Best regards,<br>The {{ app_name }} Team</p>
</body>
</html>
        "#;

        let reset_text = r#"
Reset Your Password

Hello {{ user_name }},

We received a request to reset your password. Open the link below to choose a new one:

{{ reset_url }}

This link will expire in 1 hour. If you didn't request a password reset, you can safely ignore this email.

Best regards,
The {{ app_name }} Team
        "#;

        tera.add_raw_template("otp_email.html", otp_html)
            .map_err(|e| anyhow::anyhow!("Failed to add HTML template: {}", e))?;
        tera.add_raw_template("otp_email.txt", otp_text)
            .map_err(|e| anyhow::anyhow!("Failed to add text template: {}", e))?;
        tera.add_raw_template("reset_email.html", reset_html)
            .map_err(|e| anyhow::anyhow!("Failed to add HTML template: {}", e))?;
        tera.add_raw_template("reset_email.txt", reset_text)
            .map_err(|e| anyhow::anyhow!("Failed to add text template: {}", e))?;

        Ok(())
    }

    /// Render both bodies and dispatch a multipart message
    async fn send_multipart(
        &self,
        to_email: &str,
        subject: &str,
        template_base: &str,
        context: &Context,
    ) -> Result<(), DeliveryError> {
        let html_body = self
            .templates
            .render(&format!("{}.html", template_base), context)
            .map_err(|e| DeliveryError(format!("Failed to render HTML template: {}", e)))?;

        let text_body = self
            .templates
            .render(&format!("{}.txt", template_base), context)
            .map_err(|e| DeliveryError(format!("Failed to render text template: {}", e)))?;

        let message = Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| DeliveryError(format!("Invalid from address: {}", e)))?,
            )
            .to(to_email
                .parse()
                .map_err(|e| DeliveryError(format!("Invalid recipient email: {}", e)))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(header::ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )
            .map_err(|e| DeliveryError(format!("Failed to build email message: {}", e)))?;

        match self.transport.send(message).await {
            Ok(_) => {
                info!("Email sent successfully to: {}", to_email);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send email to {}: {}", to_email, e);
                Err(DeliveryError(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl Notifier for EmailService {
    async fn send_otp(
        &self,
        email: &str,
        name: &str,
        code: &str,
        expires_in_minutes: i64,
    ) -> Result<(), DeliveryError> {
        let mut context = Context::new();
        context.insert("user_name", name);
        context.insert("otp_code", code);
        context.insert("expires_in_minutes", &expires_in_minutes);
        context.insert("app_name", &self.config.from_name);

        self.send_multipart(email, "Verify Your Email Address", "otp_email", &context)
            .await
    }

    async fn send_password_reset(
        &self,
        email: &str,
        name: &str,
        reset_url: &str,
    ) -> Result<(), DeliveryError> {
        let mut context = Context::new();
        context.insert("user_name", name);
        context.insert("reset_url", reset_url);
        context.insert("app_name", &self.config.from_name);

        self.send_multipart(email, "Reset Your Password", "reset_email", &context)
            .await
    }
}
