use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    domain::{BudgetKind, CampaignStatus, Objective, Placement},
    error::ApiException,
    money::to_cents,
};

/// JSON part of the campaign-creation multipart request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDto {
    /// Absent only when the objective step was skipped programmatically.
    pub objective: Option<Objective>,
    pub budget: BudgetDto,
    pub localization: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetDto {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: BudgetKind,
    pub amount: f64,
    pub schedule_start: String,
    pub schedule_end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub token: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRegistration {
    pub company_name: String,
    pub fantasy_name: String,
    pub cnpj: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl CompanyRegistration {
    pub fn validate(&self) -> Result<(), ApiException> {
        let required = [
            ("companyName", &self.company_name),
            ("fantasyName", &self.fantasy_name),
            ("cnpj", &self.cnpj),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(ApiException::validation(format!("{field} is required")));
        }
        if !self.email.contains('@') {
            return Err(ApiException::validation("email is malformed"));
        }
        if self.password != self.confirm_password {
            return Err(ApiException::validation(
                "password and confirmation do not match",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTotemRequest {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    /// Cents.
    pub amount: i64,
    pub payment_intent_id_request: Uuid,
}

impl PaymentIntentRequest {
    pub fn for_amount(amount: f64) -> Self {
        Self {
            amount: to_cents(amount),
            payment_intent_id_request: Uuid::new_v4(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResponse {
    pub client_secret: String,
}

/// Body of an action pushed to a totem over the backend's event stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionPush {
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignStatusUpdate {
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
