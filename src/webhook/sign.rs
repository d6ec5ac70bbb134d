use anyhow::Result;
use ring::hmac;

const PREFIX: &str = "sha256=";

/// HMAC-SHA256 signer over the exact payload bytes sent to the webhook.
pub struct WebhookSigner {
    key: hmac::Key,
}

impl WebhookSigner {
    pub fn new(secret: &str) -> Result<Self> {
        if secret.is_empty() {
            anyhow::bail!("webhook secret cannot be empty");
        }
        Ok(Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes()),
        })
    }

    /// Returns `sha256=<lowercase hex digest>`.
    pub fn sign(&self, payload: &[u8]) -> String {
        let tag = hmac::sign(&self.key, payload);
        format!("{}{}", PREFIX, hex::encode(tag.as_ref()))
    }

    /// Receiver-side check. Accepts `sha256=<hex>` or the bare hex digest.
    /// Comparison is constant-time.
    pub fn verify(&self, payload: &[u8], signature: &str) -> bool {
        let digest = signature.strip_prefix(PREFIX).unwrap_or(signature);
        match hex::decode(digest) {
            Ok(tag) => hmac::verify(&self.key, payload, &tag).is_ok(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let signer = WebhookSigner::new("Jefe").unwrap();
        assert_eq!(
            signer.sign(b"what do ya want for nothing?"),
            "sha256=5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_deterministic() {
        let signer = WebhookSigner::new("dev_webhook_secret_local").unwrap();
        let payload = br#"{"event_type":"article.created"}"#;
        assert_eq!(signer.sign(payload), signer.sign(payload));
    }

    #[test]
    fn test_one_byte_change_changes_signature() {
        let signer = WebhookSigner::new("secret").unwrap();
        let a = signer.sign(b"payload-a");
        let b = signer.sign(b"payload-b");
        assert_ne!(a, b);
        assert!(a.starts_with("sha256="));
        assert_eq!(a.len(), "sha256=".len() + 64);
    }

    #[test]
    fn test_different_secret_changes_signature() {
        let a = WebhookSigner::new("one").unwrap().sign(b"same");
        let b = WebhookSigner::new("two").unwrap().sign(b"same");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_prefixed_and_bare() {
        let signer = WebhookSigner::new("secret").unwrap();
        let sig = signer.sign(b"body");
        assert!(signer.verify(b"body", &sig));
        assert!(signer.verify(b"body", sig.trim_start_matches("sha256=")));
        assert!(!signer.verify(b"body!", &sig));
        assert!(!signer.verify(b"body", "sha256=not-hex"));
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(WebhookSigner::new("").is_err());
    }
}
