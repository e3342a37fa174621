// In-memory data feed for tests
use crate::application::data_feed::DataFeed;
use crate::domain::data_source::DataSource;
use crate::domain::series::{Candle, ComparisonData, DataPoint, PeriodValue};
use crate::domain::widget::Timeframe;
use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

pub fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

type ComparisonRequest = (String, NaiveDate, NaiveDate, NaiveDate, NaiveDate);

#[derive(Default)]
pub struct StubFeed {
    sources: Vec<DataSource>,
    series: HashMap<String, Vec<DataPoint>>,
    comparisons: HashMap<String, (f64, f64)>,
    candles: HashMap<String, Vec<Candle>>,
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    comparison_requests: Mutex<Vec<ComparisonRequest>>,
}

impl StubFeed {
    pub fn with_source(mut self, id: &str, url: &str) -> Self {
        self.sources.push(DataSource::new(
            id.to_string(),
            id.to_uppercase(),
            url.to_string(),
            String::new(),
        ));
        self
    }

    pub fn with_series(mut self, url: &str, points: Vec<DataPoint>) -> Self {
        self.series.insert(url.to_string(), points);
        self
    }

    pub fn with_comparison(mut self, url: &str, period_a: f64, period_b: f64) -> Self {
        self.comparisons.insert(url.to_string(), (period_a, period_b));
        self
    }

    pub fn with_candles(mut self, symbol: &str, candles: Vec<Candle>) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self
    }

    pub fn with_delay(mut self, key: &str, delay: Duration) -> Self {
        self.delays.insert(key.to_string(), delay);
        self
    }

    pub fn failing(mut self, key: &str) -> Self {
        self.failing.insert(key.to_string());
        self
    }

    pub fn candle(date: DateTime<Utc>, open: f64, close: f64) -> Candle {
        Candle {
            date,
            open,
            high: open.max(close) + 1.0,
            low: open.min(close) - 1.0,
            close,
            volume: 10_000.0,
        }
    }

    pub fn comparison_requests(&self) -> Vec<ComparisonRequest> {
        self.comparison_requests.lock().unwrap().clone()
    }

    async fn simulate(&self, key: &str) -> anyhow::Result<()> {
        if let Some(delay) = self.delays.get(key) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(key) {
            bail!("connection refused for {}", key);
        }
        Ok(())
    }
}

#[async_trait]
impl DataFeed for StubFeed {
    async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>> {
        self.simulate("endpoints").await?;
        Ok(self.sources.clone())
    }

    async fn fetch_series(&self, source_url: &str) -> anyhow::Result<Vec<DataPoint>> {
        self.simulate(source_url).await?;
        Ok(self.series.get(source_url).cloned().unwrap_or_default())
    }

    async fn fetch_aggregate_comparison(
        &self,
        source_url: &str,
        period_a_start: NaiveDate,
        period_a_end: NaiveDate,
        period_b_start: NaiveDate,
        period_b_end: NaiveDate,
    ) -> anyhow::Result<Option<ComparisonData>> {
        self.comparison_requests.lock().unwrap().push((
            source_url.to_string(),
            period_a_start,
            period_a_end,
            period_b_start,
            period_b_end,
        ));
        self.simulate(source_url).await?;

        let midnight = |d: NaiveDate| d.and_hms_opt(0, 0, 0).unwrap().and_utc();
        Ok(self.comparisons.get(source_url).map(|(a, b)| ComparisonData {
            period_a: PeriodValue {
                start_date: midnight(period_a_start),
                end_date: midnight(period_a_end),
                value: *a,
            },
            period_b: PeriodValue {
                start_date: midnight(period_b_start),
                end_date: midnight(period_b_end),
                value: *b,
            },
            percentage_change: 0.0,
        }))
    }

    async fn fetch_ohlcv(&self, symbol: &str, _timeframe: Timeframe) -> anyhow::Result<Vec<Candle>> {
        self.simulate(symbol).await?;
        Ok(self.candles.get(symbol).cloned().unwrap_or_default())
    }
}
