use std::sync::Arc;

use async_trait::async_trait;
use campaign_wizard::{CampaignSubmission, CampaignSubmitter};
use reqwest::{
    multipart::{Form, Part},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{
        BankBalance, CampaignDetail, CampaignId, CampaignStatus, CampaignSummary, CompanyId,
        FileId, Page, Payment, QueryScope, Totem,
    },
    error::{ApiError, ApiException},
    protocol::{
        ActionPush, CampaignStatusUpdate, CompanyRegistration, CreateTotemRequest,
        PaymentIntentRequest, PaymentIntentResponse, SessionRequest, SessionResponse,
    },
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use url::Url;

pub mod cache;
pub mod error;
pub mod session;

pub use cache::{QueryCache, QueryKey};
pub use error::ClientError;
pub use session::{Session, SessionClaims};

const COMPANY_HEADER: &str = "companyId";

/// Authenticated access to the dashboard backend.
pub struct DashboardClient {
    http: Client,
    base_url: String,
    session: RwLock<Option<Session>>,
    cache: Arc<QueryCache>,
}

impl DashboardClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Url::parse(base_url)?;
        Ok(Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session: RwLock::new(None),
            cache: Arc::new(QueryCache::new()),
        })
    }

    pub fn with_cache(mut self, cache: Arc<QueryCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Resumes a session from a previously stored token.
    pub fn with_token(mut self, token: &str) -> Result<Self, ClientError> {
        self.session = RwLock::new(Some(Session::from_token(token)?));
        Ok(self)
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|s| s.token().to_string())
    }

    pub async fn claims(&self) -> Option<SessionClaims> {
        self.session.read().await.as_ref().map(|s| s.claims().clone())
    }

    pub async fn is_admin(&self) -> bool {
        self.claims().await.is_some_and(|c| c.is_admin())
    }

    async fn company_id(&self) -> Result<CompanyId, ClientError> {
        self.session
            .read()
            .await
            .as_ref()
            .ok_or(ClientError::NotAuthenticated)?
            .company_id()
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, self.url(path));
        if let Some(session) = self.session.read().await.as_ref() {
            builder = builder.bearer_auth(session.token());
            if let Some(company_id) = session.claims().company_id {
                builder = builder.header(COMPANY_HEADER, company_id.to_string());
            }
        }
        builder
    }

    async fn expect_success(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::Http {
            status: status.as_u16(),
            error: ApiError::from_response(status.as_u16(), &body),
        })
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).await.send().await?;
        Ok(Self::expect_success(response).await?.json().await?)
    }

    async fn cached<T, F>(&self, key: QueryKey, fetch: F) -> Result<T, ClientError>
    where
        T: Serialize + DeserializeOwned,
        F: std::future::Future<Output = Result<T, ClientError>>,
    {
        if let Some(hit) = self.cache.get::<T>(&key) {
            debug!(scope = key.scope.as_str(), params = ?key.params, "cache hit");
            return Ok(hit);
        }
        let value = fetch.await?;
        self.cache.put(key, &value);
        Ok(value)
    }

    pub async fn login(&self, user: &str, password: &str) -> Result<SessionClaims, ClientError> {
        self.logout().await;
        let response = self
            .http
            .post(self.url("/sessions"))
            .json(&SessionRequest {
                login: user.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let body: SessionResponse = Self::expect_success(response).await?.json().await?;
        let session = Session::from_token(body.token)?;
        let claims = session.claims().clone();
        *self.session.write().await = Some(session);
        info!(user_id = claims.id, company_id = ?claims.company_id, "signed in");
        Ok(claims)
    }

    /// Forgets the token and everything cached under it.
    pub async fn logout(&self) {
        if self.session.write().await.take().is_some() {
            info!("signed out");
        }
        self.cache.clear();
    }

    /// Asks the backend whether the stored token is still accepted.
    pub async fn check_token(&self) -> Result<bool, ClientError> {
        let response = self.request(Method::GET, "/sessions").await.send().await?;
        if response.status() == StatusCode::FORBIDDEN {
            return Ok(false);
        }
        Self::expect_success(response).await?;
        Ok(true)
    }

    pub async fn register_company(
        &self,
        registration: &CompanyRegistration,
    ) -> Result<(), ClientError> {
        registration.validate()?;
        let response = self
            .http
            .post(self.url("/companies"))
            .json(registration)
            .send()
            .await?;
        Self::expect_success(response).await?;
        info!(company = %registration.fantasy_name, "company registered");
        Ok(())
    }

    pub async fn list_campaigns(
        &self,
        page: u32,
        size: u32,
    ) -> Result<Page<CampaignSummary>, ClientError> {
        let company_id = self.company_id().await?;
        let key = QueryKey::new(QueryScope::Campaigns).param(page).param(size);
        let path = format!("/campaigns/{company_id}?page={page}&size={size}");
        self.cached(key, self.fetch_json(&path)).await
    }

    pub async fn campaign(&self, id: CampaignId) -> Result<CampaignDetail, ClientError> {
        let key = QueryKey::new(QueryScope::Campaigns).param("detail").param(id);
        let path = format!("/campaigns/detail/{id}");
        self.cached(key, self.fetch_json(&path)).await
    }

    pub async fn campaign_media(&self, file_id: FileId) -> Result<Vec<u8>, ClientError> {
        let response = self
            .request(Method::GET, &format!("/files/{file_id}"))
            .await
            .send()
            .await?;
        Ok(Self::expect_success(response).await?.bytes().await?.to_vec())
    }

    /// Approves, denies or deactivates a campaign.
    pub async fn configure_status(
        &self,
        id: CampaignId,
        status: CampaignStatus,
        reason: Option<String>,
    ) -> Result<(), ClientError> {
        let response = self
            .request(Method::PATCH, &format!("/campaigns/{id}/status"))
            .await
            .json(&CampaignStatusUpdate {
                status: status.clone(),
                reason,
            })
            .send()
            .await?;
        Self::expect_success(response).await?;
        self.cache.invalidate_scope(QueryScope::Campaigns);
        info!(campaign_id = id.0, %status, "campaign status updated");
        Ok(())
    }

    /// Posts the wizard's result as `campaignDto` (JSON) plus an optional
    /// `file` part. Cache invalidation is left to the caller.
    pub async fn submit_campaign(&self, submission: CampaignSubmission) -> Result<(), ClientError> {
        let company_id = self.company_id().await?;
        let dto = serde_json::to_vec(&submission.dto)?;
        let mut form = Form::new().part(
            "campaignDto",
            Part::bytes(dto)
                .file_name("campaignDto.json")
                .mime_str("application/json")?,
        );
        if let Some(media) = submission.media {
            form = form.part(
                "file",
                Part::bytes(media.bytes)
                    .file_name(media.file_name)
                    .mime_str(&media.mime_type)?,
            );
        }

        let response = self
            .request(Method::POST, &format!("/campaigns/{company_id}"))
            .await
            .multipart(form)
            .send()
            .await?;
        Self::expect_success(response).await?;
        info!(company_id = company_id.0, "campaign created");
        Ok(())
    }

    pub async fn list_totems(&self) -> Result<Vec<Totem>, ClientError> {
        self.cached(QueryKey::new(QueryScope::Totems), self.fetch_json("/totem"))
            .await
    }

    pub async fn create_totem(&self, request: &CreateTotemRequest) -> Result<(), ClientError> {
        let response = self
            .request(Method::POST, "/totem")
            .await
            .json(request)
            .send()
            .await?;
        Self::expect_success(response).await?;
        self.cache.invalidate_scope(QueryScope::Totems);
        info!(name = %request.name, "totem created");
        Ok(())
    }

    pub async fn list_payments(&self) -> Result<Vec<Payment>, ClientError> {
        self.cached(
            QueryKey::new(QueryScope::Payments),
            self.fetch_json("/payments"),
        )
        .await
    }

    pub async fn bank_balance(&self) -> Result<BankBalance, ClientError> {
        self.cached(
            QueryKey::new(QueryScope::BankBalance),
            self.fetch_json("/bank-balance"),
        )
        .await
    }

    /// Opens a card-payment intent for a top-up and returns the processor's
    /// client secret. Payments are refetched afterwards whatever the outcome.
    pub async fn create_payment_intent(&self, amount: f64) -> Result<String, ClientError> {
        let result = self.post_payment_intent(amount).await;
        self.cache.invalidate_scope(QueryScope::Payments);
        if let Err(err) = &result {
            warn!(error = %err, "payment intent failed");
        }
        result
    }

    async fn post_payment_intent(&self, amount: f64) -> Result<String, ClientError> {
        if !(amount.is_finite() && amount > 0.0) {
            return Err(ApiException::validation("amount must be positive").into());
        }
        let request = PaymentIntentRequest::for_amount(amount);
        let response = self
            .request(Method::POST, "/payments/create-payment-intent")
            .await
            .json(&request)
            .send()
            .await?;
        let body: PaymentIntentResponse = Self::expect_success(response).await?.json().await?;
        info!(
            amount_cents = request.amount,
            request_id = %request.payment_intent_id_request,
            "payment intent created"
        );
        Ok(body.client_secret)
    }

    /// Pushes an action to a totem connected to the backend's event stream.
    pub async fn send_action(&self, client_id: &str, action: &str) -> Result<(), ClientError> {
        if client_id.trim().is_empty() {
            return Err(ApiException::validation("client id is required").into());
        }
        let response = self
            .request(Method::POST, &format!("/sse/send/{}", client_id.trim()))
            .await
            .json(&ActionPush {
                action: action.to_string(),
            })
            .send()
            .await?;
        Self::expect_success(response).await?;
        info!(client_id, action, "action pushed");
        Ok(())
    }
}

#[async_trait]
impl CampaignSubmitter for DashboardClient {
    async fn submit_campaign(&self, submission: CampaignSubmission) -> anyhow::Result<()> {
        DashboardClient::submit_campaign(self, submission).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
