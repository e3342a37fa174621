// Data feed decorator that degrades transport failures to empty results
use crate::application::data_feed::DataFeed;
use crate::domain::data_source::DataSource;
use crate::domain::series::{Candle, ComparisonData, DataPoint};
use crate::domain::widget::Timeframe;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;

/// Never fails: a failed catalog is empty, a failed series or OHLCV fetch
/// is empty, a failed comparison is `None`.
pub struct FallbackDataFeed {
    inner: Arc<dyn DataFeed>,
}

impl FallbackDataFeed {
    pub fn new(inner: Arc<dyn DataFeed>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl DataFeed for FallbackDataFeed {
    async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>> {
        match self.inner.list_data_sources().await {
            Ok(sources) => Ok(sources),
            Err(e) => {
                tracing::warn!("Failed to load data sources: {:#}", e);
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_series(&self, source_url: &str) -> anyhow::Result<Vec<DataPoint>> {
        match self.inner.fetch_series(source_url).await {
            Ok(points) => Ok(points),
            Err(e) => {
                tracing::warn!("Failed to load data for {}: {:#}", source_url, e);
                Ok(Vec::new())
            }
        }
    }

    async fn fetch_aggregate_comparison(
        &self,
        source_url: &str,
        period_a_start: NaiveDate,
        period_a_end: NaiveDate,
        period_b_start: NaiveDate,
        period_b_end: NaiveDate,
    ) -> anyhow::Result<Option<ComparisonData>> {
        let result = self
            .inner
            .fetch_aggregate_comparison(
                source_url,
                period_a_start,
                period_a_end,
                period_b_start,
                period_b_end,
            )
            .await;
        match result {
            Ok(data) => Ok(data),
            Err(e) => {
                tracing::warn!("Failed to load comparison data for {}: {:#}", source_url, e);
                Ok(None)
            }
        }
    }

    async fn fetch_ohlcv(&self, symbol: &str, timeframe: Timeframe) -> anyhow::Result<Vec<Candle>> {
        match self.inner.fetch_ohlcv(symbol, timeframe).await {
            Ok(candles) => Ok(candles),
            Err(e) => {
                tracing::warn!("Failed to load market data for {}: {:#}", symbol, e);
                Ok(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{day, StubFeed};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_failures_become_fallbacks() {
        let stub = StubFeed::default()
            .failing("endpoints")
            .failing("/broken")
            .failing("BTC");
        let feed = FallbackDataFeed::new(Arc::new(stub));

        assert!(feed.list_data_sources().await.unwrap().is_empty());
        assert!(feed.fetch_series("/broken").await.unwrap().is_empty());
        assert!(
            feed.fetch_ohlcv("BTC", Timeframe::OneDay)
                .await
                .unwrap()
                .is_empty()
        );
        let comparison = feed
            .fetch_aggregate_comparison(
                "/broken",
                date(2024, 1, 1),
                date(2024, 1, 31),
                date(2023, 1, 1),
                date(2023, 1, 31),
            )
            .await
            .unwrap();
        assert!(comparison.is_none());
    }

    #[tokio::test]
    async fn test_successes_pass_through() {
        let stub = StubFeed::default()
            .with_series("/ok", vec![DataPoint::new(day(2024, 1, 1), 4.0)])
            .with_candles("ETH", vec![StubFeed::candle(day(2024, 1, 1), 1.0, 2.0)]);
        let feed = FallbackDataFeed::new(Arc::new(stub));

        assert_eq!(feed.fetch_series("/ok").await.unwrap().len(), 1);
        assert_eq!(
            feed.fetch_ohlcv("ETH", Timeframe::OneHour).await.unwrap().len(),
            1
        );
    }
}
