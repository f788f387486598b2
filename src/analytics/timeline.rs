use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{month_id, month_key};
use crate::dedup::TrackGroup;

/// Multiplier applied to the median month for the chart's y-axis ceiling.
const Y_AXIS_MEDIAN_FACTOR: f64 = 3.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonthCount {
    /// `2024-03`
    pub month: String,
    /// `Mar 2024`
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimelineSummary {
    pub oldest_date: Option<String>,
    pub newest_date: Option<String>,
    pub total_months: usize,
    pub avg_per_month: usize,
    pub peak_month: Option<String>,
    pub peak_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineStats {
    pub timeline: Vec<MonthCount>,
    pub y_axis_max: f64,
    pub summary: TimelineSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub count: usize,
    /// Intensity bucket 0..=4 relative to the busiest days of the year.
    pub level: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct YearActivity {
    pub year: i32,
    pub days: Vec<DayActivity>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeeklyActivity {
    /// Newest year first.
    pub years: Vec<YearActivity>,
}

fn added_dates(groups: &[TrackGroup]) -> impl Iterator<Item = &DateTime<Utc>> {
    groups.iter().flat_map(|g| g.tracks.iter().map(|t| &t.added_at))
}

/// Additions per month over every occurrence, duplicates included.
pub fn calculate_timeline_stats(groups: &[TrackGroup]) -> TimelineStats {
    let mut months: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for date in added_dates(groups) {
        *months.entry(month_key(date)).or_insert(0) += 1;
    }

    let timeline: Vec<MonthCount> = months
        .iter()
        .map(|(&month, &count)| MonthCount {
            month: month_id(month),
            label: month.format("%b %Y").to_string(),
            count,
        })
        .collect();

    let y_axis_max = median(months.values().copied().collect()) * Y_AXIS_MEDIAN_FACTOR;

    let oldest = added_dates(groups).min();
    let newest = added_dates(groups).max();
    let summary = match (oldest, newest) {
        (Some(oldest), Some(newest)) => {
            let total_months = ((newest.year() - oldest.year()) * 12
                + newest.month() as i32
                - oldest.month() as i32
                + 1) as usize;

            // Earliest month wins a tie for the peak.
            let mut peak: Option<(NaiveDate, usize)> = None;
            for (&month, &count) in &months {
                if peak.is_none_or(|(_, best)| count > best) {
                    peak = Some((month, count));
                }
            }

            TimelineSummary {
                oldest_date: Some(oldest.format("%B %Y").to_string()),
                newest_date: Some(newest.format("%B %Y").to_string()),
                total_months,
                avg_per_month: (groups.len() as f64 / total_months as f64).round() as usize,
                peak_month: peak.map(|(month, _)| month.format("%B %Y").to_string()),
                peak_count: peak.map(|(_, count)| count).unwrap_or(0),
            }
        }
        _ => TimelineSummary::default(),
    };

    TimelineStats {
        timeline,
        y_axis_max,
        summary,
    }
}

fn median(mut counts: Vec<usize>) -> f64 {
    if counts.is_empty() {
        return 0.0;
    }
    counts.sort_unstable();
    let mid = counts.len() / 2;
    if counts.len() % 2 == 0 {
        (counts[mid - 1] + counts[mid]) as f64 / 2.0
    } else {
        counts[mid] as f64
    }
}

/// Calendar-style daily activity for every year between the first and the
/// last addition.
pub fn calculate_weekly_activity(groups: &[TrackGroup]) -> WeeklyActivity {
    let mut per_day: HashMap<NaiveDate, usize> = HashMap::new();
    for date in added_dates(groups) {
        *per_day.entry(date.date_naive()).or_insert(0) += 1;
    }

    let (Some(first), Some(last)) = (per_day.keys().min(), per_day.keys().max()) else {
        return WeeklyActivity::default();
    };

    let years = (first.year()..=last.year())
        .rev()
        .filter_map(|year| year_activity(year, &per_day))
        .collect();

    WeeklyActivity { years }
}

fn year_activity(year: i32, per_day: &HashMap<NaiveDate, usize>) -> Option<YearActivity> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let end = NaiveDate::from_ymd_opt(year, 12, 31)?;

    let mut days = Vec::new();
    let mut day = start;
    while day <= end {
        days.push(DayActivity {
            date: day,
            count: per_day.get(&day).copied().unwrap_or(0),
            level: 0,
        });
        day += Duration::days(1);
    }

    let mut active: Vec<usize> = days.iter().map(|d| d.count).filter(|&c| c > 0).collect();
    if !active.is_empty() {
        active.sort_unstable();
        let reference = active[active.len() * 9 / 10] as f64;
        for day in &mut days {
            day.level = activity_level(day.count, reference);
        }
    }

    Some(YearActivity { year, days })
}

/// Buckets against the 90th percentile of the year's active days so a few
/// huge import days do not flatten everything else.
fn activity_level(count: usize, reference: f64) -> u8 {
    let count = count as f64;
    if count == 0.0 {
        0
    } else if count <= reference * 0.25 {
        1
    } else if count <= reference * 0.5 {
        2
    } else if count <= reference * 0.75 {
        3
    } else {
        4
    }
}
