// Chart-ready view models and the per-widget data shaping
use super::series::{Candle, ComparisonData, DataPoint};
use super::widget::{ComparisonSettings, ComparisonType};
use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};

pub const BAR_COLORS: [&str; 3] = ["#0088FE", "#00C49F", "#FFBB28"];
pub const OVERLAY_COLORS: [&str; 3] = ["#8884d8", "#82ca9d", "#ffc658"];
pub const UP_COLOR: &str = "#00C49F";
pub const DOWN_COLOR: &str = "#FF4D4F";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedWidget {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub view: WidgetView,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "camelCase")]
pub enum WidgetView {
    Comparison(ComparisonView),
    Bar(BarChartView),
    Candlestick(CandlestickView),
    NoData { reason: String },
    Unsupported { message: String },
}

impl RenderedWidget {
    pub fn new(id: impl Into<String>, title: impl Into<String>, view: WidgetView) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            view,
        }
    }

    pub fn no_data(id: impl Into<String>, title: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(
            id,
            title,
            WidgetView::NoData {
                reason: reason.into(),
            },
        )
    }

    pub fn has_data(&self) -> bool {
        !matches!(
            self.view,
            WidgetView::NoData { .. } | WidgetView::Unsupported { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Zero counts as up.
    pub fn from_change(change: f64) -> Self {
        if change >= 0.0 { Direction::Up } else { Direction::Down }
    }

    pub fn of_candle(open: f64, close: f64) -> Self {
        if close >= open { Direction::Up } else { Direction::Down }
    }

    pub fn color(&self) -> &'static str {
        match self {
            Direction::Up => UP_COLOR,
            Direction::Down => DOWN_COLOR,
        }
    }
}

// ── Comparison ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Period A is the more recent range, period B the older one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonPeriods {
    pub period_a: DateRange,
    pub period_b: DateRange,
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(first)
}

/// Periods for a comparison relative to `today`. A custom comparison with
/// no stored dates falls back to year-over-year.
pub fn comparison_periods(settings: &ComparisonSettings, today: NaiveDate) -> ComparisonPeriods {
    let month_start = first_of_month(today);
    let current = DateRange {
        start: month_start,
        end: today,
    };

    match (settings.comparison_type, settings.custom_dates) {
        (ComparisonType::Custom, Some(dates)) => ComparisonPeriods {
            period_a: DateRange {
                start: dates.period_a_start,
                end: dates.period_a_end,
            },
            period_b: DateRange {
                start: dates.period_b_start,
                end: dates.period_b_end,
            },
        },
        (ComparisonType::MonthOverMonth, _) => {
            let previous_start = month_start
                .checked_sub_months(Months::new(1))
                .unwrap_or(month_start);
            ComparisonPeriods {
                period_a: current,
                period_b: DateRange {
                    start: previous_start,
                    end: last_of_month(previous_start),
                },
            }
        }
        _ => {
            let last_year_start = month_start
                .checked_sub_months(Months::new(12))
                .unwrap_or(month_start);
            ComparisonPeriods {
                period_a: current,
                period_b: DateRange {
                    start: last_year_start,
                    end: last_of_month(last_year_start),
                },
            }
        }
    }
}

/// Relative change of period A against period B, in percent. `None` when
/// period B is zero.
pub fn percentage_change(period_a: f64, period_b: f64) -> Option<f64> {
    if period_b == 0.0 {
        return None;
    }
    let change = (period_a - period_b) / period_b * 100.0;
    change.is_finite().then_some(change)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonView {
    pub period_a: PeriodSummary,
    pub period_b: PeriodSummary,
    pub percentage_change: Option<f64>,
    /// Unsigned, two decimals, e.g. "20.00%"; the sign lives in `direction`.
    pub display_change: String,
    pub direction: Direction,
}

pub fn shape_comparison(data: &ComparisonData) -> ComparisonView {
    let a = data.period_a.value;
    let b = data.period_b.value;
    let change = percentage_change(a, b);
    let direction = Direction::from_change(change.unwrap_or(a - b));
    let display_change = match change {
        Some(c) => format!("{:.2}%", c.abs()),
        None => "n/a".to_string(),
    };

    ComparisonView {
        period_a: PeriodSummary {
            start_date: data.period_a.start_date,
            end_date: data.period_a.end_date,
            value: a,
        },
        period_b: PeriodSummary {
            start_date: data.period_b.start_date,
            end_date: data.period_b.end_date,
            value: b,
        },
        percentage_change: change,
        display_change,
        direction,
    }
}

// ── Bar chart ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    pub key: String,
    pub source: String,
    pub color: &'static str,
}

/// One row per date; `values[i]` belongs to source `i` and is absent when
/// that source has no point on this date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarRow {
    pub date: DateTime<Utc>,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChartView {
    pub series: Vec<BarSeries>,
    pub rows: Vec<BarRow>,
    pub stacked: bool,
}

pub fn bar_series(sources: &[String]) -> Vec<BarSeries> {
    sources
        .iter()
        .enumerate()
        .map(|(i, source)| BarSeries {
            key: format!("Source {}", i + 1),
            source: source.clone(),
            color: BAR_COLORS[i % BAR_COLORS.len()],
        })
        .collect()
}

/// Merge per-source series into date rows sorted ascending. A later point
/// for the same date within one source replaces the earlier one.
pub fn build_bar_rows(series: &[Vec<DataPoint>]) -> Vec<BarRow> {
    let mut rows: BTreeMap<DateTime<Utc>, Vec<Option<f64>>> = BTreeMap::new();

    for (index, points) in series.iter().enumerate() {
        for point in points {
            let row = rows
                .entry(point.date)
                .or_insert_with(|| vec![None; series.len()]);
            row[index] = Some(point.value);
        }
    }

    rows.into_iter()
        .map(|(date, values)| BarRow { date, values })
        .collect()
}

// ── Candlestick ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleView {
    pub date: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub body_height: f64,
    pub body_base: f64,
    pub wick_height: f64,
    pub wick_base: f64,
    pub direction: Direction,
    pub color: &'static str,
    /// Overlay values by overlay source index.
    pub overlays: Vec<Option<f64>>,
}

impl CandleView {
    pub fn from_candle(candle: &Candle, overlay_count: usize) -> Self {
        let direction = Direction::of_candle(candle.open, candle.close);
        Self {
            date: candle.date,
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close: candle.close,
            volume: candle.volume,
            body_height: (candle.close - candle.open).abs(),
            body_base: candle.close.min(candle.open),
            wick_height: candle.high - candle.low,
            wick_base: candle.low,
            direction,
            color: direction.color(),
            overlays: vec![None; overlay_count],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlaySeries {
    pub index: usize,
    pub key: String,
    pub source: String,
    pub color: &'static str,
    /// Points that matched no candle or lost to an earlier point on the
    /// same calendar day.
    pub dropped_points: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    fn from_values(values: impl Iterator<Item = f64>) -> Option<Self> {
        values.fold(None, |range, v| match range {
            None => Some(AxisRange { min: v, max: v }),
            Some(r) => Some(AxisRange {
                min: r.min.min(v),
                max: r.max.max(v),
            }),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickView {
    pub symbol: String,
    pub timeframe: String,
    pub candles: Vec<CandleView>,
    /// Only overlays with at least one matched value.
    pub overlays: Vec<OverlaySeries>,
    pub price_scale: Option<AxisRange>,
    /// Volume is drawn against its own axis.
    pub volume_scale: Option<AxisRange>,
}

/// Shape candles and attach overlay values by same UTC calendar day. The
/// first overlay point of a day wins.
pub fn shape_candles(
    candles: &[Candle],
    overlays: &[(String, Vec<DataPoint>)],
) -> (Vec<CandleView>, Vec<OverlaySeries>) {
    let mut views: Vec<CandleView> = candles
        .iter()
        .map(|c| CandleView::from_candle(c, overlays.len()))
        .collect();

    let mut series = Vec::new();
    for (index, (source, points)) in overlays.iter().enumerate() {
        let mut by_day: HashMap<NaiveDate, (usize, f64)> = HashMap::new();
        for (point_index, point) in points.iter().enumerate() {
            by_day
                .entry(point.date.date_naive())
                .or_insert((point_index, point.value));
        }

        let mut used = HashSet::new();
        for view in views.iter_mut() {
            if let Some((point_index, value)) = by_day.get(&view.date.date_naive()) {
                view.overlays[index] = Some(*value);
                used.insert(*point_index);
            }
        }

        let dropped_points = points.len() - used.len();
        if dropped_points > 0 {
            tracing::warn!(
                "Overlay {} ({}) dropped {} of {} points during same-day matching",
                index + 1,
                source,
                dropped_points,
                points.len()
            );
        }

        if !used.is_empty() {
            series.push(OverlaySeries {
                index,
                key: format!("Overlay {}", index + 1),
                source: source.clone(),
                color: OVERLAY_COLORS[index % OVERLAY_COLORS.len()],
                dropped_points,
            });
        }
    }

    (views, series)
}

pub fn price_scale(candles: &[CandleView]) -> Option<AxisRange> {
    AxisRange::from_values(candles.iter().flat_map(|c| {
        [c.low, c.high]
            .into_iter()
            .chain(c.overlays.iter().flatten().copied())
    }))
}

pub fn volume_scale(candles: &[CandleView]) -> Option<AxisRange> {
    AxisRange::from_values(candles.iter().map(|c| c.volume)).map(|r| AxisRange {
        min: r.min.min(0.0),
        max: r.max,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series::PeriodValue;
    use crate::domain::widget::CustomDates;
    use chrono::TimeZone;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn naive(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn point(date: DateTime<Utc>, value: f64) -> DataPoint {
        DataPoint::new(date, value)
    }

    fn candle(date: DateTime<Utc>, open: f64, close: f64) -> Candle {
        Candle {
            date,
            open,
            high: open.max(close) + 5.0,
            low: open.min(close) - 5.0,
            close,
            volume: 1_000.0,
        }
    }

    fn comparison(a: f64, b: f64) -> ComparisonData {
        ComparisonData {
            period_a: PeriodValue {
                start_date: day(2024, 2, 1),
                end_date: day(2024, 2, 20),
                value: a,
            },
            period_b: PeriodValue {
                start_date: day(2024, 1, 1),
                end_date: day(2024, 1, 31),
                value: b,
            },
            percentage_change: 0.0,
        }
    }

    #[test]
    fn test_percentage_change_sign() {
        let up = shape_comparison(&comparison(120.0, 100.0));
        assert_eq!(up.display_change, "20.00%");
        assert_eq!(up.direction, Direction::Up);
        assert!((up.percentage_change.unwrap() - 20.0).abs() < 1e-9);

        let down = shape_comparison(&comparison(80.0, 100.0));
        assert_eq!(down.display_change, "20.00%");
        assert_eq!(down.direction, Direction::Down);
        assert!((down.percentage_change.unwrap() + 20.0).abs() < 1e-9);

        let flat = shape_comparison(&comparison(100.0, 100.0));
        assert_eq!(flat.direction, Direction::Up);
        assert_eq!(flat.display_change, "0.00%");
    }

    #[test]
    fn test_percentage_change_zero_base() {
        assert_eq!(percentage_change(10.0, 0.0), None);
        let view = shape_comparison(&comparison(10.0, 0.0));
        assert_eq!(view.display_change, "n/a");
        assert_eq!(view.direction, Direction::Up);
        assert_eq!(shape_comparison(&comparison(-3.0, 0.0)).direction, Direction::Down);
    }

    #[test]
    fn test_month_over_month_periods() {
        let settings = ComparisonSettings {
            comparison_type: ComparisonType::MonthOverMonth,
            custom_dates: None,
        };
        let periods = comparison_periods(&settings, naive(2024, 3, 15));
        assert_eq!(periods.period_a.start, naive(2024, 3, 1));
        assert_eq!(periods.period_a.end, naive(2024, 3, 15));
        assert_eq!(periods.period_b.start, naive(2024, 2, 1));
        assert_eq!(periods.period_b.end, naive(2024, 2, 29));

        let january = comparison_periods(&settings, naive(2024, 1, 10));
        assert_eq!(january.period_b.start, naive(2023, 12, 1));
        assert_eq!(january.period_b.end, naive(2023, 12, 31));
    }

    #[test]
    fn test_year_over_year_periods() {
        let settings = ComparisonSettings {
            comparison_type: ComparisonType::YearOverYear,
            custom_dates: None,
        };
        let periods = comparison_periods(&settings, naive(2024, 2, 29));
        assert_eq!(periods.period_a.start, naive(2024, 2, 1));
        assert_eq!(periods.period_b.start, naive(2023, 2, 1));
        assert_eq!(periods.period_b.end, naive(2023, 2, 28));
        assert!(periods.period_b.end < periods.period_a.start);
    }

    #[test]
    fn test_custom_periods_and_fallback() {
        let dates = CustomDates {
            period_a_start: naive(2024, 6, 1),
            period_a_end: naive(2024, 6, 30),
            period_b_start: naive(2024, 5, 1),
            period_b_end: naive(2024, 5, 31),
        };
        let custom = ComparisonSettings {
            comparison_type: ComparisonType::Custom,
            custom_dates: Some(dates),
        };
        let periods = comparison_periods(&custom, naive(2024, 9, 1));
        assert_eq!(periods.period_a.start, naive(2024, 6, 1));
        assert_eq!(periods.period_b.end, naive(2024, 5, 31));

        let missing = ComparisonSettings {
            comparison_type: ComparisonType::Custom,
            custom_dates: None,
        };
        let fallback = comparison_periods(&missing, naive(2024, 9, 12));
        assert_eq!(fallback.period_b.start, naive(2023, 9, 1));
    }

    #[test]
    fn test_bar_rows_union_sorted_with_gaps() {
        let series = vec![
            vec![point(day(2024, 1, 3), 3.0), point(day(2024, 1, 1), 1.0)],
            vec![point(day(2024, 1, 2), 20.0)],
            vec![point(day(2024, 1, 1), 100.0), point(day(2024, 1, 3), 300.0)],
        ];
        let rows = build_bar_rows(&series);

        let dates: Vec<_> = rows.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![day(2024, 1, 1), day(2024, 1, 2), day(2024, 1, 3)]);
        assert_eq!(rows[0].values, vec![Some(1.0), None, Some(100.0)]);
        assert_eq!(rows[1].values, vec![None, Some(20.0), None]);
        assert_eq!(rows[2].values, vec![Some(3.0), None, Some(300.0)]);
    }

    #[test]
    fn test_bar_rows_are_idempotent() {
        let series = vec![
            vec![point(day(2024, 1, 2), 2.0)],
            vec![point(day(2024, 1, 1), 1.0)],
        ];
        assert_eq!(build_bar_rows(&series), build_bar_rows(&series));
        assert!(build_bar_rows(&[vec![], vec![]]).is_empty());
    }

    #[test]
    fn test_bar_series_colors_follow_index() {
        let series = bar_series(&["/a".to_string(), "/b".to_string(), "/c".to_string()]);
        assert_eq!(series[0].key, "Source 1");
        assert_eq!(series[0].color, "#0088FE");
        assert_eq!(series[2].color, "#FFBB28");
    }

    #[test]
    fn test_candle_colors() {
        let up = CandleView::from_candle(&candle(day(2024, 1, 1), 100.0, 105.0), 0);
        assert_eq!(up.color, UP_COLOR);
        assert_eq!(up.body_height, 5.0);
        assert_eq!(up.body_base, 100.0);

        let down = CandleView::from_candle(&candle(day(2024, 1, 1), 100.0, 95.0), 0);
        assert_eq!(down.color, DOWN_COLOR);
        assert_eq!(down.body_base, 95.0);
        assert_eq!(down.wick_base, 90.0);
        assert_eq!(down.wick_height, 15.0);

        let flat = CandleView::from_candle(&candle(day(2024, 1, 1), 100.0, 100.0), 0);
        assert_eq!(flat.direction, Direction::Up);
        assert_eq!(flat.body_height, 0.0);
    }

    #[test]
    fn test_overlays_match_by_calendar_day() {
        let candles = vec![
            candle(day(2024, 1, 1), 10.0, 11.0),
            candle(day(2024, 1, 2), 11.0, 12.0),
        ];
        let overlay = vec![
            point(Utc.with_ymd_and_hms(2024, 1, 2, 18, 30, 0).unwrap(), 11.5),
            point(day(2024, 1, 5), 99.0),
        ];
        let (views, series) = shape_candles(&candles, &[("/sma".to_string(), overlay)]);

        assert_eq!(views[0].overlays, vec![None]);
        assert_eq!(views[1].overlays, vec![Some(11.5)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].key, "Overlay 1");
        assert_eq!(series[0].color, "#8884d8");
        assert_eq!(series[0].dropped_points, 1);
    }

    #[test]
    fn test_intraday_overlay_first_point_wins() {
        // Hourly candles share a calendar day, so every candle of the day
        // gets the first overlay point of that day and the rest are dropped.
        let candles = vec![
            candle(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), 10.0, 11.0),
            candle(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(), 11.0, 10.0),
        ];
        let overlay = vec![
            point(Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(), 1.0),
            point(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(), 2.0),
        ];
        let (views, series) = shape_candles(&candles, &[("/hourly".to_string(), overlay)]);

        assert_eq!(views[0].overlays, vec![Some(1.0)]);
        assert_eq!(views[1].overlays, vec![Some(1.0)]);
        assert_eq!(series[0].dropped_points, 1);
    }

    #[test]
    fn test_overlay_without_matches_is_omitted() {
        let candles = vec![candle(day(2024, 1, 1), 10.0, 11.0)];
        let overlays = vec![
            ("/none".to_string(), vec![point(day(2023, 1, 1), 1.0)]),
            ("/hit".to_string(), vec![point(day(2024, 1, 1), 2.0)]),
        ];
        let (views, series) = shape_candles(&candles, &overlays);
        assert_eq!(views[0].overlays, vec![None, Some(2.0)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].index, 1);
        assert_eq!(series[0].color, "#82ca9d");
    }

    #[test]
    fn test_scales() {
        let candles = vec![
            candle(day(2024, 1, 1), 100.0, 110.0),
            candle(day(2024, 1, 2), 110.0, 90.0),
        ];
        let (mut views, _) = shape_candles(&candles, &[]);
        views[1].volume = 5_000.0;

        assert_eq!(price_scale(&views), Some(AxisRange { min: 85.0, max: 115.0 }));
        assert_eq!(volume_scale(&views), Some(AxisRange { min: 0.0, max: 5_000.0 }));
        assert_eq!(price_scale(&[]), None);
    }
}
