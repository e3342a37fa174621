// Catalog service - Use case for listing data sources and widget options
use crate::application::data_feed::DataFeed;
use crate::domain::data_source::DataSource;
use crate::domain::widget_form::WidgetOptions;
use std::sync::Arc;

#[derive(Clone)]
pub struct CatalogService {
    feed: Arc<dyn DataFeed>,
}

impl CatalogService {
    pub fn new(feed: Arc<dyn DataFeed>) -> Self {
        Self { feed }
    }

    /// Data sources with display names filled in, sorted by name.
    pub async fn list_data_sources(&self) -> anyhow::Result<Vec<DataSource>> {
        let mut sources = self.feed.list_data_sources().await?;
        for source in sources.iter_mut() {
            source.name = source.display_name();
        }
        sources.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(sources)
    }

    pub fn widget_options(&self) -> WidgetOptions {
        WidgetOptions::catalog()
    }
}
