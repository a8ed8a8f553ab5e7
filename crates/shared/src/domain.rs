use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

id_newtype!(TotemId);
id_newtype!(CampaignId);
id_newtype!(PaymentId);
id_newtype!(CompanyId);
id_newtype!(FileId);

/// What a campaign is trying to achieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Recognition,
    Engagement,
    Sales,
}

impl Objective {
    pub const ALL: [Objective; 3] = [Self::Recognition, Self::Engagement, Self::Sales];

    /// Parses a user-supplied tag. Accepts the legacy Portuguese tags the
    /// backend still stores for older campaigns.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "recognition" | "reconhecimento" => Some(Self::Recognition),
            "engagement" => Some(Self::Engagement),
            "sales" | "vendas" => Some(Self::Sales),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recognition => "recognition",
            Self::Engagement => "engagement",
            Self::Sales => "sales",
        }
    }
}

impl fmt::Display for Objective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetKind {
    Daily,
    Monthly,
}

impl BudgetKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(Self::Daily),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "Daily budget",
            Self::Monthly => "Monthly budget",
        }
    }
}

impl fmt::Display for BudgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Review state of a campaign as reported by the backend. Unknown states are
/// kept verbatim so listings never fail to decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CampaignStatus {
    Pending,
    Active,
    Approved,
    Denied,
    Inactive,
    Finished,
    Other(String),
}

impl CampaignStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Approved => "APPROVED",
            Self::Denied => "DENIED",
            Self::Inactive => "INACTIVE",
            Self::Finished => "FINISHED",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for CampaignStatus {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Self::Pending,
            "ACTIVE" => Self::Active,
            "APPROVED" => Self::Approved,
            "DENIED" => Self::Denied,
            "INACTIVE" => Self::Inactive,
            "FINISHED" => Self::Finished,
            _ => Self::Other(value),
        }
    }
}

impl From<CampaignStatus> for String {
    fn from(value: CampaignStatus) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A physical LED display unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totem {
    pub id: TotemId,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl Totem {
    pub fn placement(&self) -> Placement {
        Placement {
            latitude: self.latitude,
            longitude: self.longitude,
            name: self.name.clone(),
        }
    }
}

/// A display point selected for a campaign. Identity is the name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
}

/// Arithmetic mean of the given points, used to centre a map view.
pub fn center_of(placements: &[Placement]) -> Option<(f64, f64)> {
    if placements.is_empty() {
        return None;
    }
    let (lat, lng) = placements
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.latitude, lng + p.longitude));
    let count = placements.len() as f64;
    Some((lat / count, lng / count))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: CompanyId,
    pub company_name: String,
    pub fantasy_name: String,
    pub cnpj: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    pub id: CampaignId,
    pub status: CampaignStatus,
    pub name: String,
    pub from: String,
    pub to: String,
    pub goal: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignDetail {
    pub id: CampaignId,
    pub ad_name: String,
    pub objective: String,
    pub budget_type: String,
    pub budget_value: f64,
    pub start_date: String,
    pub end_date: String,
    pub status: CampaignStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    #[serde(default)]
    pub totems: Vec<Totem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub amount: f64,
    pub created_at: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BankBalance {
    pub balance: f64,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
}

impl Page<CampaignSummary> {
    pub fn filter_by_status(&self, status: &CampaignStatus) -> Vec<&CampaignSummary> {
        self.content
            .iter()
            .filter(|row| &row.status == status)
            .collect()
    }
}

/// Groups of cached backend reads. Invalidating a scope drops every cached
/// entry in it regardless of parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryScope {
    Campaigns,
    Totems,
    Payments,
    BankBalance,
}

impl QueryScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Campaigns => "campaigns",
            Self::Totems => "totem",
            Self::Payments => "payments",
            Self::BankBalance => "bank-balance",
        }
    }
}
