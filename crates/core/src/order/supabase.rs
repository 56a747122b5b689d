//! PostgREST-backed order store.
//!
//! Talks to a Supabase-style REST endpoint: table access under
//! `/rest/v1/{table}`, equality filters as `?col=eq.value`, `apikey` plus
//! bearer auth on every request.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::config::StoreConfig;

use super::store::{OrderError, OrderFilter, OrderStore};
use super::types::{NewOrder, Order};

/// PostgREST client implementing [`OrderStore`].
pub struct SupabaseOrderStore {
    client: Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct CounterRow {
    ultimo_numero: i64,
}

impl SupabaseOrderStore {
    pub fn new(config: &StoreConfig) -> Result<Self, OrderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, OrderError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::Api {
                status: status.as_u16(),
                message: body,
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl OrderStore for SupabaseOrderStore {
    async fn insert(&self, order: NewOrder) -> Result<(), OrderError> {
        debug!("Inserting order {} ({})", order.order_id, order.status);

        let response = self
            .authed(self.client.post(self.table_url("pedidos")))
            .header("Prefer", "return=minimal")
            .json(&order)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn find(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        let url = format!(
            "{}?pedido_id=eq.{}&limit=1",
            self.table_url("pedidos"),
            urlencoding::encode(order_id)
        );

        let response = self.authed(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<Order> = response
            .json()
            .await
            .map_err(|e| OrderError::Parse(e.to_string()))?;

        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.remove(0))
        })
    }

    async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, OrderError> {
        let mut url = format!(
            "{}?order=timestamp.desc&limit={}",
            self.table_url("pedidos"),
            filter.limit
        );
        if let Some(status) = filter.status {
            url.push_str(&format!("&status=eq.{}", status.as_str()));
        }

        let response = self.authed(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;

        response
            .json()
            .await
            .map_err(|e| OrderError::Parse(e.to_string()))
    }

    async fn close(
        &self,
        order_id: &str,
        closed_by: &str,
        closed_at: DateTime<Utc>,
    ) -> Result<(), OrderError> {
        debug!("Closing order {}", order_id);

        let url = format!(
            "{}?pedido_id=eq.{}",
            self.table_url("pedidos"),
            urlencoding::encode(order_id)
        );

        let response = self
            .authed(self.client.patch(&url))
            .header("Prefer", "return=minimal")
            .json(&json!({
                "status": "fechado",
                "fechado_em": closed_at.to_rfc3339(),
                "fechado_por": closed_by,
            }))
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn read_counter(&self) -> Result<Option<i64>, OrderError> {
        let url = format!("{}?id=eq.1&select=ultimo_numero", self.table_url("contador"));

        let response = self.authed(self.client.get(&url)).send().await?;
        let response = Self::check(response).await?;

        let rows: Vec<CounterRow> = response
            .json()
            .await
            .map_err(|e| OrderError::Parse(e.to_string()))?;

        Ok(rows.first().map(|r| r.ultimo_numero))
    }

    async fn write_counter(&self, value: i64, insert: bool) -> Result<(), OrderError> {
        let response = if insert {
            self.authed(self.client.post(self.table_url("contador")))
                .header("Prefer", "return=minimal")
                .json(&json!({ "id": 1, "ultimo_numero": value }))
                .send()
                .await?
        } else {
            let url = format!("{}?id=eq.1", self.table_url("contador"));
            self.authed(self.client.patch(&url))
                .header("Prefer", "return=minimal")
                .json(&json!({ "ultimo_numero": value }))
                .send()
                .await?
        };

        Self::check(response).await?;
        Ok(())
    }
}
