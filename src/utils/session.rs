use axum::http::{header, HeaderMap};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "session";

/// Signs and verifies the session cookie: `<username>.<hex hmac-sha256>`.
#[derive(Clone)]
pub struct SessionSigner {
    keyed: HmacSha256,
}

impl SessionSigner {
    pub fn new(secret: &str) -> Result<Self, hmac::digest::InvalidLength> {
        Ok(Self { keyed: HmacSha256::new_from_slice(secret.as_bytes())? })
    }

    fn mac(&self) -> HmacSha256 {
        self.keyed.clone()
    }

    pub fn sign(&self, username: &str) -> String {
        let mut mac = self.mac();
        mac.update(username.as_bytes());
        format!("{}.{}", username, hex::encode(mac.finalize().into_bytes()))
    }

    /// Returns the username if the signature checks out.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (username, sig) = value.rsplit_once('.')?;
        let sig = hex::decode(sig).ok()?;
        let mut mac = self.mac();
        mac.update(username.as_bytes());
        mac.verify_slice(&sig).ok()?;
        Some(username.to_string())
    }

    /// Username from the request's `Cookie` headers, if a valid session is present.
    pub fn current_user(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| self.verify(value))
    }

    pub fn set_cookie(&self, username: &str) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Lax",
            SESSION_COOKIE,
            self.sign(username)
        )
    }
}

pub fn clear_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}
