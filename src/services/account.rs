//! System account service
//!
//! Account administration (admin only in the UI). Passwords are only sent
//! when creating an account or when an admin explicitly sets a new one.

use crate::client::odata::{self, Direction, ODataPage, ODataQuery};
use crate::client::{ApiClient, ApiError};
use crate::models::{AccountInput, Paged, Pagination, SystemAccount, TrashEntity};
use crate::services::trash::TrashService;

const ENTITY_SET: &str = "SystemAccounts";
const SEARCH_FIELDS: &[&str] = &["AccountName", "AccountEmail"];

pub struct AccountService<'a> {
    client: &'a ApiClient,
}

impl<'a> AccountService<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of accounts whose name or email matches
    pub async fn list(&self, keyword: &str, page: Pagination) -> Result<Paged<SystemAccount>, ApiError> {
        let url = ODataQuery::new()
            .filter_opt(odata::keyword_filter(SEARCH_FIELDS, keyword))
            .order_by("AccountName", Direction::Asc)
            .page(&page)
            .apply(&self.client.odata_url(ENTITY_SET));

        let result: ODataPage<SystemAccount> = self.client.get_json(&url).await?;
        Ok(result.into_paged(page))
    }

    pub async fn get(&self, id: i64) -> Result<SystemAccount, ApiError> {
        let url = self.client.odata_url(&format!("{}({})", ENTITY_SET, id));
        self.client.get_json(&url).await
    }

    pub async fn create(&self, input: &AccountInput) -> Result<SystemAccount, ApiError> {
        let account: SystemAccount = self
            .client
            .post_json(&self.client.api_url(ENTITY_SET), input)
            .await?;
        tracing::info!(id = account.account_id, role = %account.account_role, "account created");
        Ok(account)
    }

    pub async fn update(&self, id: i64, input: &AccountInput) -> Result<(), ApiError> {
        let url = self.client.api_url(&format!("{}/{}", ENTITY_SET, id));
        self.client.put_json(&url, input).await?;
        tracing::info!(id, password_changed = input.account_password.is_some(), "account updated");
        Ok(())
    }

    pub async fn soft_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).soft_delete(TrashEntity::SystemAccount, id).await
    }

    pub async fn hard_delete(&self, id: i64) -> Result<(), ApiError> {
        TrashService::new(self.client).hard_delete(TrashEntity::SystemAccount, id).await
    }
}
