// HTTP data feed implementation
use crate::application::data_feed::DataFeed;
use crate::domain::data_source::DataSource;
use crate::domain::series::{Candle, ComparisonData, DataPoint};
use crate::domain::widget::Timeframe;
use crate::infrastructure::config::{prepare_query, DataApiSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpDataFeed {
    base_url: String,
    candlestick_path: String,
    client: reqwest::Client,
}

impl HttpDataFeed {
    pub fn new(settings: &DataApiSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            candlestick_path: settings.candlestick_path.clone(),
            client,
        })
    }

    fn endpoints_url(&self) -> String {
        format!("{}/endpoints", self.base_url)
    }

    fn series_url(&self, source_url: &str) -> String {
        format!("{}{}", self.base_url, source_url)
    }

    fn comparison_url(
        &self,
        source_url: &str,
        period_a_start: NaiveDate,
        period_a_end: NaiveDate,
        period_b_start: NaiveDate,
        period_b_end: NaiveDate,
    ) -> String {
        // End dates are inclusive, so a period ending today covers today.
        let params = [
            ("periodAStart", start_of_day(period_a_start)),
            ("periodAEnd", end_of_day(period_a_end)),
            ("periodBStart", start_of_day(period_b_start)),
            ("periodBEnd", end_of_day(period_b_end)),
        ]
        .iter()
        .map(|(key, instant)| format!("{}={}", key, urlencoding::encode(&iso_millis(*instant))))
        .collect::<Vec<_>>()
        .join("&");

        format!("{}{}/compare?{}", self.base_url, source_url, params)
    }

    fn candlestick_url(&self, symbol: &str, timeframe: Timeframe) -> String {
        let mut vars = HashMap::new();
        vars.insert("symbol".to_string(), urlencoding::encode(symbol).into_owned());
        vars.insert("timeframe".to_string(), timeframe.as_str().to_string());
        format!("{}{}", self.base_url, prepare_query(&self.candlestick_path, &vars))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Data API request failed with status {}: {}", status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    start_of_day(date) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

fn iso_millis(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

#[async_trait]
impl DataFeed for HttpDataFeed {
    async fn list_data_sources(&self) -> Result<Vec<DataSource>> {
        let sources: Vec<DataSource> = self.get_json(&self.endpoints_url()).await?;
        tracing::debug!("Data API listed {} sources", sources.len());
        Ok(sources)
    }

    async fn fetch_series(&self, source_url: &str) -> Result<Vec<DataPoint>> {
        self.get_json(&self.series_url(source_url)).await
    }

    async fn fetch_aggregate_comparison(
        &self,
        source_url: &str,
        period_a_start: NaiveDate,
        period_a_end: NaiveDate,
        period_b_start: NaiveDate,
        period_b_end: NaiveDate,
    ) -> Result<Option<ComparisonData>> {
        let url = self.comparison_url(
            source_url,
            period_a_start,
            period_a_end,
            period_b_start,
            period_b_end,
        );
        self.get_json(&url).await
    }

    async fn fetch_ohlcv(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Candle>> {
        let candles: Vec<Candle> = self.get_json(&self.candlestick_url(symbol, timeframe)).await?;
        tracing::debug!("Fetched {} {} candles for {}", candles.len(), timeframe.as_str(), symbol);
        Ok(candles)
    }
}
