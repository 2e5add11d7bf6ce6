use std::sync::Arc;
use std::time::Duration;

use dashmap::DashSet;

use crate::{
    app::config::AppConfig,
    clients::{
        billing::{BillingApi, HttpBillingClient},
        repos::{HttpRepoDirectory, RepoDirectory},
    },
    services::{cache::ScopedCache, recent::RecentVisits},
    usecases::upgrade::BillingContext,
};

#[derive(Clone)]
pub struct AppState {
    pub billing: BillingContext,
    pub directory: Arc<dyn RepoDirectory>,
    pub recent_visits: RecentVisits,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(config: AppConfig, recent_visits: RecentVisits) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|err| format!("HTTP client init failed: {}", err))?;

        let billing_api: Arc<dyn BillingApi> =
            Arc::new(HttpBillingClient::new(http.clone(), &config.billing_base_url));
        let directory: Arc<dyn RepoDirectory> =
            Arc::new(HttpRepoDirectory::new(http, &config.directory_base_url));

        Ok(Self {
            billing: BillingContext {
                api: billing_api,
                catalog_cache: Arc::new(ScopedCache::new(config.cache_ttl)),
                account_cache: Arc::new(ScopedCache::new(config.cache_ttl)),
                upgrades_in_flight: Arc::new(DashSet::new()),
            },
            directory,
            recent_visits,
            config: Arc::new(config),
        })
    }
}
