// Widget configuration forms - validated drafts that become WidgetConfigs
use super::widget::{
    BarSettings, CandlestickSettings, ComparisonSettings, ComparisonType, CustomDates, Timeframe,
    WidgetConfig, WidgetKind, MAX_SOURCES,
};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Symbols offered by the candlestick form.
pub const SUPPORTED_SYMBOLS: [(&str, &str); 5] = [
    ("BTC", "Bitcoin (BTC)"),
    ("ETH", "Ethereum (ETH)"),
    ("BNB", "Binance Coin (BNB)"),
    ("SOL", "Solana (SOL)"),
    ("ADA", "Cardano (ADA)"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WidgetDraft {
    Comparison(ComparisonDraft),
    Bar(BarDraft),
    Candlestick(CandlestickDraft),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComparisonDraft {
    pub title: String,
    pub source: Option<String>,
    pub comparison_type: ComparisonType,
    pub custom_dates: Option<CustomDates>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BarDraft {
    pub title: String,
    pub sources: Vec<String>,
    pub stacked: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CandlestickDraft {
    pub title: String,
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Overlay sources.
    pub sources: Vec<String>,
}

impl WidgetDraft {
    /// Build a brand new widget: fresh id, placed at the origin, default size.
    pub fn into_config(self) -> Result<WidgetConfig, ValidationError> {
        let (kind, title, sources) = self.validate()?;
        let (width, height) = kind.default_size();
        Ok(WidgetConfig {
            id: format!("component_{}", uuid::Uuid::new_v4().simple()),
            kind,
            title,
            x: 0,
            y: 0,
            width,
            height,
            sources,
        })
    }

    /// Apply an edit to an existing widget. Id and position are kept; the
    /// size is reset only when the widget changes type.
    pub fn apply_to(self, existing: &WidgetConfig) -> Result<WidgetConfig, ValidationError> {
        let (kind, title, sources) = self.validate()?;
        let (width, height) = if kind.type_name() == existing.kind.type_name() {
            (existing.width, existing.height)
        } else {
            kind.default_size()
        };
        Ok(WidgetConfig {
            id: existing.id.clone(),
            kind,
            title,
            x: existing.x,
            y: existing.y,
            width,
            height,
            sources,
        })
    }

    fn validate(self) -> Result<(WidgetKind, String, Vec<String>), ValidationError> {
        match self {
            WidgetDraft::Comparison(draft) => {
                let source = draft
                    .source
                    .filter(|s| !s.trim().is_empty())
                    .ok_or(ValidationError::MissingSource)?;

                let custom_dates = match draft.comparison_type {
                    ComparisonType::Custom => {
                        let dates = draft.custom_dates.ok_or(ValidationError::MissingCustomDates)?;
                        validate_custom_dates(&dates)?;
                        Some(dates)
                    }
                    _ => None,
                };

                let settings = ComparisonSettings {
                    comparison_type: draft.comparison_type,
                    custom_dates,
                };
                Ok((
                    WidgetKind::Comparison(settings),
                    title_or(draft.title, "Comparison"),
                    vec![source],
                ))
            }
            WidgetDraft::Bar(draft) => {
                if draft.sources.is_empty() {
                    return Err(ValidationError::MissingSource);
                }
                validate_sources(&draft.sources)?;
                Ok((
                    WidgetKind::Bar(BarSettings {
                        stacked: draft.stacked,
                    }),
                    title_or(draft.title, "Bar Chart"),
                    draft.sources,
                ))
            }
            WidgetDraft::Candlestick(draft) => {
                let symbol = draft.symbol.trim().to_uppercase();
                if symbol.is_empty() {
                    return Err(ValidationError::MissingSymbol);
                }
                validate_sources(&draft.sources)?;
                let title = title_or(draft.title, &format!("{} Market Chart", symbol));
                Ok((
                    WidgetKind::Candlestick(CandlestickSettings {
                        symbol,
                        timeframe: draft.timeframe,
                    }),
                    title,
                    draft.sources,
                ))
            }
        }
    }
}

fn title_or(title: String, default: &str) -> String {
    if title.trim().is_empty() {
        default.to_string()
    } else {
        title
    }
}

pub fn validate_sources(sources: &[String]) -> Result<(), ValidationError> {
    if sources.len() > MAX_SOURCES {
        return Err(ValidationError::TooManySources { max: MAX_SOURCES });
    }
    let mut seen = HashSet::new();
    for source in sources {
        if source.trim().is_empty() {
            return Err(ValidationError::MissingSource);
        }
        if !seen.insert(source.as_str()) {
            return Err(ValidationError::DuplicateSource(source.clone()));
        }
    }
    Ok(())
}

/// Rules a stored widget must satisfy, whether it came through a draft or
/// a whole-dashboard update.
pub fn validate_component(config: &WidgetConfig) -> Result<(), ValidationError> {
    validate_sources(&config.sources)?;
    match &config.kind {
        WidgetKind::Comparison(settings) => {
            if config.sources.is_empty() {
                return Err(ValidationError::MissingSource);
            }
            if let Some(dates) = &settings.custom_dates {
                validate_custom_dates(dates)?;
            }
        }
        WidgetKind::Bar(_) => {
            if config.sources.is_empty() {
                return Err(ValidationError::MissingSource);
            }
        }
        WidgetKind::Candlestick(settings) => {
            if settings.symbol.trim().is_empty() {
                return Err(ValidationError::MissingSymbol);
            }
        }
        WidgetKind::Unsupported { .. } => {}
    }
    Ok(())
}

/// Period A is the more recent one; the two periods must not overlap.
pub fn validate_custom_dates(dates: &CustomDates) -> Result<(), ValidationError> {
    if dates.period_a_start > dates.period_a_end {
        return Err(ValidationError::InvalidCustomDates(
            "period A starts after it ends".to_string(),
        ));
    }
    if dates.period_b_start > dates.period_b_end {
        return Err(ValidationError::InvalidCustomDates(
            "period B starts after it ends".to_string(),
        ));
    }
    if dates.period_b_end >= dates.period_a_start {
        return Err(ValidationError::InvalidCustomDates(
            "period B must end before period A starts".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionEntry {
    pub value: &'static str,
    pub label: &'static str,
}

/// Choices offered by the configuration forms.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetOptions {
    pub symbols: Vec<OptionEntry>,
    pub timeframes: Vec<OptionEntry>,
    pub comparison_types: Vec<&'static str>,
    pub max_sources: usize,
}

impl WidgetOptions {
    pub fn catalog() -> Self {
        Self {
            symbols: SUPPORTED_SYMBOLS
                .iter()
                .map(|&(value, label)| OptionEntry { value, label })
                .collect(),
            timeframes: Timeframe::ALL
                .iter()
                .map(|t| OptionEntry {
                    value: t.as_str(),
                    label: t.label(),
                })
                .collect(),
            comparison_types: ComparisonType::ALL.iter().map(|c| c.as_str()).collect(),
            max_sources: MAX_SOURCES,
        }
    }
}
