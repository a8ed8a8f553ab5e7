//! Bearer-token sessions. The backend signs a JWT whose `data` claim is a
//! JSON object written with single quotes; only that claim is read here.
//! Signature checks are the backend's job.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};
use shared::domain::CompanyId;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    #[serde(default)]
    pub role: Vec<String>,
    pub id: i64,
    #[serde(default)]
    pub company_id: Option<CompanyId>,
}

impl SessionClaims {
    pub fn is_admin(&self) -> bool {
        self.role.iter().any(|r| r == "ADMIN")
    }
}

#[derive(Deserialize)]
struct JwtPayload {
    data: String,
}

#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    claims: SessionClaims,
}

impl Session {
    pub fn from_token(token: impl Into<String>) -> Result<Self, ClientError> {
        let token = token.into();
        let claims = decode_claims(&token)?;
        Ok(Self { token, claims })
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &SessionClaims {
        &self.claims
    }

    pub fn company_id(&self) -> Result<CompanyId, ClientError> {
        self.claims
            .company_id
            .ok_or(ClientError::NoCompany)
    }
}

pub fn decode_claims(token: &str) -> Result<SessionClaims, ClientError> {
    let payload_b64 = token
        .trim()
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::InvalidToken("expected three dot-separated segments".into()))?;
    let payload = URL_SAFE_NO_PAD
        .decode(payload_b64.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidToken(format!("payload is not base64url: {e}")))?;
    let payload: JwtPayload = serde_json::from_slice(&payload)
        .map_err(|e| ClientError::InvalidToken(format!("payload is not a JWT body: {e}")))?;
    serde_json::from_str(&payload.data.replace('\'', "\""))
        .map_err(|e| ClientError::InvalidToken(format!("data claim is malformed: {e}")))
}
