//! Broccoli over its HTTP query API.

use super::output::parse_broccoli_response;
use super::{Measurement, QueryRunner};
use crate::batch::DialectBatch;
use crate::config::BroccoliConfig;
use crate::error::RunnerError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use sparqlbench_query::Dialect;
use tracing::{debug, error, info};

/// Sends each query as `GET <api_url><query>&format=json&cmd=clearcache`
pub struct HttpRunner {
    client: Client,
    api_url: String,
}

impl HttpRunner {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
        }
    }

    pub fn from_config(config: &BroccoliConfig) -> Result<Self, RunnerError> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self::new(client, config.api_url.clone()))
    }

    fn url(&self, query: &str) -> String {
        format!("{}{}&format=json&cmd=clearcache", self.api_url, query)
    }

    async fn measure(&self, query: &str) -> Result<Measurement, RunnerError> {
        let body: Value = self
            .client
            .get(self.url(query))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(parse_broccoli_response(&body)?)
    }
}

#[async_trait]
impl QueryRunner for HttpRunner {
    fn dialect(&self) -> Dialect {
        Dialect::Broccoli
    }

    /// A failed request only loses its own position, which is reported as
    /// [`Measurement::Missing`].
    async fn run(&self, batch: &DialectBatch) -> Result<Vec<Measurement>, RunnerError> {
        info!(dialect = %Dialect::Broccoli, queries = batch.lines.len(), api = %self.api_url, "running batch");

        let mut measurements = Vec::with_capacity(batch.lines.len());
        for (position, query) in batch.lines.iter().enumerate() {
            let measurement = match self.measure(query).await {
                Ok(measurement) => measurement,
                Err(err) => {
                    error!(dialect = %Dialect::Broccoli, position, "{}", err);
                    Measurement::Missing
                }
            };
            debug!(%measurement, "query done");
            measurements.push(measurement);
        }
        Ok(measurements)
    }
}
