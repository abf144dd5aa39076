//! Wiring from configuration to ready-to-use services

use std::sync::Arc;
use std::time::Duration;

use b24rest_core::{
    CatalogResource, CatalogService, CrmItemService, DepartmentService, ProductRowService,
    RestContext, RestSettings, TaskService,
};
use b24rest_domain::{ClientConfig, Result, SystemEntityType};
use tracing::info;

use crate::http::HttpClient;
use crate::webhook::WebhookTransport;

/// Builds one [`RestContext`] and hands out services sharing it.
#[derive(Debug, Clone)]
pub struct RestClientFactory {
    context: RestContext,
}

impl RestClientFactory {
    /// Create a factory from a validated configuration.
    ///
    /// # Errors
    /// `RestError::Config` for invalid settings or webhook URL, and any
    /// error building the HTTP client.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .max_attempts(config.max_attempts)
            .user_agent(concat!("b24rest/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let transport = WebhookTransport::new(&config.webhook_url, http)?;
        info!(portal = transport.base_url().host_str().unwrap_or_default(), "REST client configured");

        let context = RestContext::new(Arc::new(transport)).with_settings(RestSettings::from(config));
        Ok(Self { context })
    }

    /// Create a factory for `webhook_url` with default limits.
    pub fn from_webhook(webhook_url: impl Into<String>) -> Result<Self> {
        Self::from_config(&ClientConfig::new(webhook_url))
    }

    /// Wrap an existing context, e.g. one over a custom transport.
    pub const fn from_context(context: RestContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> RestContext {
        self.context.clone()
    }

    pub fn deals(&self) -> CrmItemService {
        self.system_items(SystemEntityType::Deal)
    }

    pub fn leads(&self) -> CrmItemService {
        self.system_items(SystemEntityType::Lead)
    }

    pub fn contacts(&self) -> CrmItemService {
        self.system_items(SystemEntityType::Contact)
    }

    pub fn companies(&self) -> CrmItemService {
        self.system_items(SystemEntityType::Company)
    }

    pub fn quotes(&self) -> CrmItemService {
        self.system_items(SystemEntityType::Quote)
    }

    pub fn invoices(&self) -> CrmItemService {
        self.system_items(SystemEntityType::SmartInvoice)
    }

    /// Items of a smart-process (or any other) entity type.
    ///
    /// # Errors
    /// `RestError::InvalidInput` for a non-positive entity type id.
    pub fn smart_items(&self, entity_type_id: i64) -> Result<CrmItemService> {
        CrmItemService::new(self.context(), entity_type_id)
    }

    /// Product rows of `entity_type_id` owners.
    ///
    /// # Errors
    /// `RestError::InvalidInput` when the type has no known abbreviation.
    pub fn product_rows(&self, entity_type_id: i64) -> Result<ProductRowService> {
        ProductRowService::for_entity_type(self.context(), entity_type_id)
    }

    pub fn tasks(&self) -> TaskService {
        TaskService::new(self.context())
    }

    pub fn departments(&self) -> DepartmentService {
        DepartmentService::new(self.context())
    }

    pub fn measures(&self) -> CatalogService {
        CatalogService::new(self.context(), CatalogResource::MEASURES)
    }

    pub fn price_types(&self) -> CatalogService {
        CatalogService::new(self.context(), CatalogResource::PRICE_TYPES)
    }

    pub fn currencies(&self) -> CatalogService {
        CatalogService::new(self.context(), CatalogResource::CURRENCIES)
    }

    fn system_items(&self, kind: SystemEntityType) -> CrmItemService {
        CrmItemService::from_system_type(self.context(), kind)
    }
}
