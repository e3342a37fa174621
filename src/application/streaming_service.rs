// Streaming render service - Progressive dashboard rendering
use crate::application::widget_renderer::WidgetRenderer;
use crate::domain::chart::RenderedWidget;
use crate::domain::dashboard::Dashboard;
use crate::domain::layout::{GridLayout, Position};
use serde::Serialize;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

const CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSkeleton {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub position: Position,
    pub width: u32,
    pub height: u32,
    pub z_index: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSkeleton {
    pub dashboard_id: String,
    pub name: String,
    pub description: String,
    pub widgets: Vec<WidgetSkeleton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "message", rename_all = "camelCase")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    Widget(RenderedWidget),
    #[serde(rename_all = "camelCase")]
    Complete { widget_count: usize, duration_ms: u64 },
}

#[derive(Clone)]
pub struct StreamingRenderService {
    renderer: WidgetRenderer,
    cell_size: u32,
}

impl StreamingRenderService {
    pub fn new(renderer: WidgetRenderer, cell_size: u32) -> Self {
        Self { renderer, cell_size }
    }

    /// Send the skeleton at once, then each widget as its render finishes,
    /// then a completion event once every widget has been sent.
    pub async fn stream_dashboard(&self, dashboard: Dashboard) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let start_time = Instant::now();

        let skeleton = self.build_skeleton(&dashboard);
        let total_widgets = skeleton.widgets.len();
        let _ = tx.send(StreamMessage::Skeleton(skeleton)).await;

        let mut tasks = JoinSet::new();
        for component in dashboard.components {
            let tx = tx.clone();
            let renderer = self.renderer.clone();
            tasks.spawn(async move {
                let rendered = renderer.render(&component).await;
                tracing::debug!(
                    "Rendered component {} (has data: {})",
                    component.id,
                    rendered.has_data()
                );
                let _ = tx.send(StreamMessage::Widget(rendered)).await;
            });
        }

        tokio::spawn(async move {
            while let Some(result) = tasks.join_next().await {
                if let Err(e) = result {
                    tracing::error!("Widget render task failed: {}", e);
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as u64;
            tracing::debug!("Rendered {} widgets in {}ms", total_widgets, duration_ms);
            let _ = tx
                .send(StreamMessage::Complete {
                    widget_count: total_widgets,
                    duration_ms,
                })
                .await;
        });

        rx
    }

    fn build_skeleton(&self, dashboard: &Dashboard) -> DashboardSkeleton {
        let mut layout = GridLayout::new(self.cell_size);
        layout.initialize_positions(&dashboard.components);

        let widgets = layout
            .placements()
            .into_iter()
            .filter_map(|placement| {
                dashboard.component(&placement.id).map(|c| WidgetSkeleton {
                    id: c.id.clone(),
                    title: c.title.clone(),
                    kind: c.kind.type_name().to_string(),
                    position: placement.position,
                    width: c.width,
                    height: c.height,
                    z_index: placement.z_index,
                })
            })
            .collect();

        DashboardSkeleton {
            dashboard_id: dashboard.id.clone(),
            name: dashboard.name.clone(),
            description: dashboard.description.clone(),
            widgets,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{day, StubFeed};
    use crate::domain::series::DataPoint;
    use crate::domain::widget::{BarSettings, WidgetConfig, WidgetKind};
    use std::sync::Arc;
    use std::time::Duration;

    fn bar(id: &str, source: &str, x: u32) -> WidgetConfig {
        WidgetConfig {
            id: id.to_string(),
            kind: WidgetKind::Bar(BarSettings::default()),
            title: id.to_uppercase(),
            x,
            y: 0,
            width: 600,
            height: 400,
            sources: vec![source.to_string()],
        }
    }

    #[tokio::test]
    async fn test_stream_order_skeleton_widgets_complete() {
        let feed = StubFeed::default()
            .with_series("/slow", vec![DataPoint::new(day(2024, 1, 1), 1.0)])
            .with_series("/fast", vec![DataPoint::new(day(2024, 1, 1), 2.0)])
            .with_delay("/slow", Duration::from_millis(50));
        let service = StreamingRenderService::new(WidgetRenderer::new(Arc::new(feed)), 100);

        let mut dashboard = Dashboard::default();
        dashboard.id = "dash_1".to_string();
        dashboard.components = vec![bar("slow", "/slow", 0), bar("fast", "/fast", 600)];

        let mut rx = service.stream_dashboard(dashboard).await;
        let mut messages = Vec::new();
        while let Some(msg) = rx.recv().await {
            messages.push(msg);
        }

        assert_eq!(messages.len(), 4);
        let StreamMessage::Skeleton(skeleton) = &messages[0] else {
            panic!("expected skeleton first");
        };
        assert_eq!(skeleton.widgets.len(), 2);
        assert_eq!(skeleton.widgets[1].position, Position::new(600, 0));
        assert_eq!(skeleton.widgets[0].kind, "bar");

        let widget_ids: Vec<_> = messages[1..3]
            .iter()
            .map(|m| match m {
                StreamMessage::Widget(w) => w.id.clone(),
                other => panic!("unexpected message {:?}", other),
            })
            .collect();
        assert_eq!(widget_ids, ["fast", "slow"]);

        assert!(matches!(
            messages[3],
            StreamMessage::Complete { widget_count: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_empty_dashboard_completes() {
        let service =
            StreamingRenderService::new(WidgetRenderer::new(Arc::new(StubFeed::default())), 100);
        let mut rx = service.stream_dashboard(Dashboard::default()).await;

        assert!(matches!(rx.recv().await, Some(StreamMessage::Skeleton(_))));
        assert!(matches!(
            rx.recv().await,
            Some(StreamMessage::Complete { widget_count: 0, .. })
        ));
        assert!(rx.recv().await.is_none());
    }

    #[test]
    fn test_message_json_shape() {
        let msg = StreamMessage::Complete {
            widget_count: 3,
            duration_ms: 12,
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            serde_json::json!({"message": "complete", "widgetCount": 3, "durationMs": 12})
        );
    }
}
