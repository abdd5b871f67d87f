use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const MIN_SCORE: f64 = 0.5;
const EXPECTED_ACTION: &str = "contact";

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    action: String,
}

impl VerifyResponse {
    fn accepted(&self) -> bool {
        self.success && self.score >= MIN_SCORE && self.action == EXPECTED_ACTION
    }
}

/// Checks reCAPTCHA v3 tokens submitted with the contact form.
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
    client: Client,
    secret: String,
    verify_url: String,
}

impl RecaptchaVerifier {
    pub fn new(client: Client, secret: impl Into<String>, verify_url: impl Into<String>) -> Self {
        Self {
            client,
            secret: secret.into(),
            verify_url: verify_url.into(),
        }
    }

    pub async fn verify(&self, token: &str) -> Result<bool, reqwest::Error> {
        let response: VerifyResponse = self
            .client
            .post(&self.verify_url)
            .form(&[("secret", self.secret.as_str()), ("response", token)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        debug!(
            success = response.success,
            score = response.score,
            action = %response.action,
            "recaptcha verified"
        );
        Ok(response.accepted())
    }
}
