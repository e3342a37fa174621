// Data feed trait - read-only access to the remote data API
use crate::domain::data_source::DataSource;
use crate::domain::series::{Candle, ComparisonData, DataPoint};
use crate::domain::widget::Timeframe;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait DataFeed: Send + Sync {
    /// List the catalog of data sources widgets can reference
    async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>>;

    /// Fetch the time series behind a source url (bar charts, overlays)
    async fn fetch_series(&self, source_url: &str) -> anyhow::Result<Vec<DataPoint>>;

    /// Fetch one aggregate value per period for a source (comparison cards)
    async fn fetch_aggregate_comparison(
        &self,
        source_url: &str,
        period_a_start: NaiveDate,
        period_a_end: NaiveDate,
        period_b_start: NaiveDate,
        period_b_end: NaiveDate,
    ) -> anyhow::Result<Option<ComparisonData>>;

    /// Fetch OHLCV candles for a symbol (candlestick charts)
    async fn fetch_ohlcv(&self, symbol: &str, timeframe: Timeframe) -> anyhow::Result<Vec<Candle>>;
}
