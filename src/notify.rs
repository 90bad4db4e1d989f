use crate::config::EmailConfig;

const SEND_ENDPOINT: &str = "https://api.resend.com/emails";

/// One estimate email: the customer copy of the PDF, base64-encoded,
/// attached to a short branded note.
pub struct EstimateEmail<'a> {
    pub to: &'a str,
    pub customer_name: &'a str,
    pub address: &'a str,
    pub pdf_base64: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("email request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("email provider rejected the send ({status}): {body}")]
    Provider {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Transactional email client. Single attempt per send, no retry; the
/// provider's JSON response is passed back to the caller on success.
pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

impl Mailer {
    pub fn new(config: &EmailConfig) -> Self {
        Mailer {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            from: config.from.clone(),
        }
    }

    pub async fn send_estimate(
        &self,
        email: &EstimateEmail<'_>,
    ) -> Result<serde_json::Value, MailError> {
        let body = serde_json::json!({
            "from": self.from,
            "to": [email.to],
            "subject": format!("Estimate for Lawn Services at {}", email.address),
            "html": estimate_html(email.customer_name, email.address, &self.from),
            "attachments": [{
                "filename": attachment_name(email.customer_name),
                "content": email.pdf_base64,
            }],
        });

        let response = self
            .http
            .post(SEND_ENDPOINT)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Provider { status, body });
        }
        Ok(response.json().await?)
    }
}

fn estimate_html(customer_name: &str, address: &str, from: &str) -> String {
    // The display part of the sender line doubles as the signature.
    let company = from.split('<').next().unwrap_or(from).trim();
    format!(
        r#"<div style="font-family: sans-serif; line-height: 1.5; color: #333;">
  <h2>Hello {customer_name},</h2>
  <p>Thank you for requesting an estimate from <strong>{company}</strong>.</p>
  <p>We have attached the estimate for your property at <strong>{address}</strong>.</p>
  <p>If you have any questions or would like to get on our schedule, simply reply to this email or give us a call.</p>
  <br />
  <p>Best regards,</p>
  <p><strong>The {company} Team</strong></p>
</div>"#
    )
}

fn attachment_name(customer_name: &str) -> String {
    let joined: Vec<&str> = customer_name.split_whitespace().collect();
    format!("Lawn_Estimate_{}.pdf", joined.join("_"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attachment_name_collapses_whitespace() {
        assert_eq!(
            attachment_name("Pat  Doyle Jr"),
            "Lawn_Estimate_Pat_Doyle_Jr.pdf"
        );
    }

    #[test]
    fn html_greets_by_name_and_signs_with_the_company() {
        let html = estimate_html(
            "Pat",
            "12 Ocean Dr",
            "Sharp Lawn Mowing <onboarding@resend.dev>",
        );
        assert!(html.contains("Hello Pat,"));
        assert!(html.contains("<strong>12 Ocean Dr</strong>"));
        assert!(html.contains("The Sharp Lawn Mowing Team"));
        assert!(!html.contains("onboarding@resend.dev"));
    }
}
