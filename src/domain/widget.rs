// Widget configuration domain model
use super::layout::Position;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Maximum number of data sources a widget may reference.
pub const MAX_SOURCES: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComparisonType {
    #[default]
    MonthOverMonth,
    YearOverYear,
    Custom,
}

impl ComparisonType {
    pub const ALL: [ComparisonType; 3] = [
        ComparisonType::MonthOverMonth,
        ComparisonType::YearOverYear,
        ComparisonType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonType::MonthOverMonth => "month-over-month",
            ComparisonType::YearOverYear => "year-over-year",
            ComparisonType::Custom => "custom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomDates {
    pub period_a_start: NaiveDate,
    pub period_a_end: NaiveDate,
    pub period_b_start: NaiveDate,
    pub period_b_end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonSettings {
    pub comparison_type: ComparisonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_dates: Option<CustomDates>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarSettings {
    pub stacked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "15m")]
    FifteenMinutes,
}

impl Timeframe {
    pub const ALL: [Timeframe; 4] = [
        Timeframe::OneDay,
        Timeframe::FourHours,
        Timeframe::OneHour,
        Timeframe::FifteenMinutes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::FourHours => "4h",
            Timeframe::OneHour => "1h",
            Timeframe::FifteenMinutes => "15m",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1 Day",
            Timeframe::FourHours => "4 Hours",
            Timeframe::OneHour => "1 Hour",
            Timeframe::FifteenMinutes => "15 Minutes",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandlestickSettings {
    pub symbol: String,
    pub timeframe: Timeframe,
}

/// Per-type widget settings. `Unsupported` keeps whatever type string and
/// settings were stored so they survive a load/save cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetKind {
    Comparison(ComparisonSettings),
    Bar(BarSettings),
    Candlestick(CandlestickSettings),
    Unsupported { kind: String, settings: Value },
}

impl WidgetKind {
    pub fn type_name(&self) -> &str {
        match self {
            WidgetKind::Comparison(_) => "comparison",
            WidgetKind::Bar(_) => "bar",
            WidgetKind::Candlestick(_) => "candlestick",
            WidgetKind::Unsupported { kind, .. } => kind.as_str(),
        }
    }

    /// Default (width, height) a freshly configured widget of this kind gets.
    pub fn default_size(&self) -> (u32, u32) {
        match self {
            WidgetKind::Comparison(_) => (400, 200),
            WidgetKind::Bar(_) | WidgetKind::Candlestick(_) | WidgetKind::Unsupported { .. } => {
                (600, 400)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWidgetConfig", into = "RawWidgetConfig")]
pub struct WidgetConfig {
    pub id: String,
    pub kind: WidgetKind,
    pub title: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub sources: Vec<String>,
}

impl WidgetConfig {
    pub fn position(&self) -> Position {
        Position::new(self.x, self.y)
    }

    pub fn with_position(mut self, position: Position) -> Self {
        self.x = position.x;
        self.y = position.y;
        self
    }
}

/// Wire shape: `{"id","type","title","x","y","width","height","sources","settings"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawWidgetConfig {
    id: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    x: u32,
    #[serde(default)]
    y: u32,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    sources: Vec<String>,
    #[serde(default)]
    settings: Value,
}

impl TryFrom<RawWidgetConfig> for WidgetConfig {
    type Error = serde_json::Error;

    fn try_from(raw: RawWidgetConfig) -> Result<Self, Self::Error> {
        let settings = match raw.settings {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let kind = match raw.kind.as_str() {
            "comparison" => WidgetKind::Comparison(serde_json::from_value(settings)?),
            "bar" => WidgetKind::Bar(serde_json::from_value(settings)?),
            "candlestick" => WidgetKind::Candlestick(serde_json::from_value(settings)?),
            _ => WidgetKind::Unsupported {
                kind: raw.kind,
                settings,
            },
        };

        Ok(WidgetConfig {
            id: raw.id,
            kind,
            title: raw.title,
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            sources: raw.sources,
        })
    }
}

impl From<WidgetConfig> for RawWidgetConfig {
    fn from(config: WidgetConfig) -> Self {
        let kind = config.kind.type_name().to_string();
        let settings = match config.kind {
            WidgetKind::Comparison(s) => serde_json::to_value(s),
            WidgetKind::Bar(s) => serde_json::to_value(s),
            WidgetKind::Candlestick(s) => serde_json::to_value(s),
            WidgetKind::Unsupported { settings, .. } => Ok(settings),
        }
        .unwrap_or_default();

        RawWidgetConfig {
            id: config.id,
            kind,
            title: config.title,
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            sources: config.sources,
            settings,
        }
    }
}
