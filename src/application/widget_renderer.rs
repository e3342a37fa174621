// Widget dispatcher - turns a WidgetConfig into a chart-ready view
use crate::application::data_feed::DataFeed;
use crate::domain::chart::{
    bar_series, build_bar_rows, comparison_periods, price_scale, shape_candles, shape_comparison,
    volume_scale, BarChartView, CandlestickView, RenderedWidget, WidgetView,
};
use crate::domain::series::DataPoint;
use crate::domain::widget::{
    BarSettings, CandlestickSettings, ComparisonSettings, WidgetConfig, WidgetKind, MAX_SOURCES,
};
use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use std::sync::Arc;

const NO_DATA: &str = "No data available";

#[derive(Clone)]
pub struct WidgetRenderer {
    feed: Arc<dyn DataFeed>,
}

impl WidgetRenderer {
    pub fn new(feed: Arc<dyn DataFeed>) -> Self {
        Self { feed }
    }

    /// Render with today's date as the comparison reference.
    pub async fn render(&self, config: &WidgetConfig) -> RenderedWidget {
        self.render_on(config, Utc::now().date_naive()).await
    }

    /// Never fails: unknown kinds become a placeholder and missing data a
    /// "no data" view.
    pub async fn render_on(&self, config: &WidgetConfig, today: NaiveDate) -> RenderedWidget {
        match &config.kind {
            WidgetKind::Comparison(settings) => {
                self.render_comparison(config, settings, today).await
            }
            WidgetKind::Bar(settings) => self.render_bar(config, settings).await,
            WidgetKind::Candlestick(settings) => self.render_candlestick(config, settings).await,
            WidgetKind::Unsupported { kind, .. } => {
                tracing::warn!("Component {} has unknown type {}", config.id, kind);
                RenderedWidget::new(
                    config.id.clone(),
                    config.title.clone(),
                    WidgetView::Unsupported {
                        message: format!("Unknown component type: {}", kind),
                    },
                )
            }
        }
    }

    async fn render_comparison(
        &self,
        config: &WidgetConfig,
        settings: &ComparisonSettings,
        today: NaiveDate,
    ) -> RenderedWidget {
        let Some(source) = config.sources.first() else {
            return RenderedWidget::no_data(&config.id, &config.title, "No data source selected");
        };

        let periods = comparison_periods(settings, today);
        let result = self
            .feed
            .fetch_aggregate_comparison(
                source,
                periods.period_a.start,
                periods.period_a.end,
                periods.period_b.start,
                periods.period_b.end,
            )
            .await;

        match result {
            Ok(Some(data)) => RenderedWidget::new(
                config.id.clone(),
                config.title.clone(),
                WidgetView::Comparison(shape_comparison(&data)),
            ),
            Ok(None) => RenderedWidget::no_data(&config.id, &config.title, NO_DATA),
            Err(e) => {
                tracing::error!("Error fetching comparison for {}: {:#}", config.id, e);
                RenderedWidget::no_data(&config.id, &config.title, NO_DATA)
            }
        }
    }

    async fn render_bar(&self, config: &WidgetConfig, settings: &BarSettings) -> RenderedWidget {
        if config.sources.is_empty() {
            return RenderedWidget::no_data(&config.id, &config.title, "No data source selected");
        }

        let sources = capped_sources(config);
        let series = self.fetch_all_series(&config.id, &sources).await;
        let rows = build_bar_rows(&series);

        if rows.is_empty() {
            return RenderedWidget::no_data(&config.id, &config.title, NO_DATA);
        }

        RenderedWidget::new(
            config.id.clone(),
            config.title.clone(),
            WidgetView::Bar(BarChartView {
                series: bar_series(&sources),
                rows,
                stacked: settings.stacked,
            }),
        )
    }

    async fn render_candlestick(
        &self,
        config: &WidgetConfig,
        settings: &CandlestickSettings,
    ) -> RenderedWidget {
        let title = if config.title.trim().is_empty() {
            format!("{} Chart", settings.symbol)
        } else {
            config.title.clone()
        };

        if settings.symbol.trim().is_empty() {
            return RenderedWidget::no_data(&config.id, title, "No symbol selected");
        }

        let sources = capped_sources(config);
        let (candles, overlays) = tokio::join!(
            self.feed.fetch_ohlcv(&settings.symbol, settings.timeframe),
            self.fetch_all_series(&config.id, &sources),
        );

        let candles = match candles {
            Ok(candles) => candles,
            Err(e) => {
                tracing::error!("Error fetching candles for {}: {:#}", settings.symbol, e);
                Vec::new()
            }
        };

        if candles.is_empty() {
            return RenderedWidget::no_data(&config.id, title, NO_DATA);
        }

        let overlays: Vec<(String, Vec<DataPoint>)> = sources.into_iter().zip(overlays).collect();
        let (candles, overlays) = shape_candles(&candles, &overlays);

        RenderedWidget::new(
            config.id.clone(),
            title,
            WidgetView::Candlestick(CandlestickView {
                symbol: settings.symbol.clone(),
                timeframe: settings.timeframe.as_str().to_string(),
                price_scale: price_scale(&candles),
                volume_scale: volume_scale(&candles),
                candles,
                overlays,
            }),
        )
    }

    /// One series per source, in source order regardless of which request
    /// finishes first. Failed sources contribute an empty series.
    async fn fetch_all_series(&self, widget_id: &str, sources: &[String]) -> Vec<Vec<DataPoint>> {
        let requests = sources.iter().map(|source| async move {
            match self.feed.fetch_series(source).await {
                Ok(points) => points,
                Err(e) => {
                    tracing::error!(
                        "Error fetching series {} for {}: {:#}",
                        source,
                        widget_id,
                        e
                    );
                    Vec::new()
                }
            }
        });
        join_all(requests).await
    }
}

fn capped_sources(config: &WidgetConfig) -> Vec<String> {
    if config.sources.len() > MAX_SOURCES {
        tracing::warn!(
            "Component {} has {} sources, only the first {} are used",
            config.id,
            config.sources.len(),
            MAX_SOURCES
        );
    }
    config.sources.iter().take(MAX_SOURCES).cloned().collect()
}
