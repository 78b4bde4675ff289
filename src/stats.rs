use crate::lexicon::PRIORITY;
use crate::models::{
    AppData, DayMoodPoint, JourneySummary, MoodCategory, MoodCount, StatsResponse, Trend,
    WeeklyMoodPoint,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use std::collections::BTreeMap;

type Tally = [u64; 6];

pub fn build_stats(data: &AppData, user_id: &str) -> StatsResponse {
    build_stats_at(Utc::now().date_naive(), data, user_id)
}

/// Days are UTC calendar days.
pub fn build_stats_at(today: NaiveDate, data: &AppData, user_id: &str) -> StatsResponse {
    const WEEK_COUNT: usize = 8;

    let mut days: BTreeMap<NaiveDate, Tally> = BTreeMap::new();
    for entry in data.entries.iter().filter(|entry| entry.user_id == user_id) {
        let tally = days.entry(entry.created_at.date_naive()).or_default();
        tally[slot(entry.mood)] += 1;
    }

    let mut last_7_days = Vec::with_capacity(7);
    for offset in (0..7).rev() {
        let date = today - Duration::days(offset);
        let tally = days.get(&date).copied().unwrap_or_default();
        last_7_days.push(DayMoodPoint {
            date: date.to_string(),
            counts: counts(&tally),
            total: tally.iter().sum(),
            dominant: dominant(&tally),
        });
    }

    let current_week_start = week_start(today);
    let mut weekly_totals = Vec::with_capacity(WEEK_COUNT);
    for offset in (0..WEEK_COUNT).rev() {
        let start = current_week_start - Duration::weeks(offset as i64);
        let end = start + Duration::days(6);

        let mut tally = Tally::default();
        for day_offset in 0..7 {
            let date = start + Duration::days(day_offset);
            if let Some(day) = days.get(&date) {
                for (sum, count) in tally.iter_mut().zip(day) {
                    *sum = sum.saturating_add(*count);
                }
            }
        }

        weekly_totals.push(WeeklyMoodPoint {
            week: week_label(start),
            start_date: start.to_string(),
            end_date: end.to_string(),
            counts: counts(&tally),
            total: tally.iter().sum(),
        });
    }

    StatsResponse {
        last_7_days,
        weekly_totals,
        journey: journey_summary(data, user_id),
    }
}

fn journey_summary(data: &AppData, user_id: &str) -> JourneySummary {
    let mut journeys: Vec<_> = data
        .journeys
        .iter()
        .filter(|journey| journey.user_id == user_id)
        .collect();
    journeys.sort_by_key(|journey| journey.created_at);
    let qualities: Vec<f64> = journeys
        .iter()
        .map(|journey| f64::from(journey.day_quality))
        .collect();

    JourneySummary {
        journeys: qualities.len(),
        average_day_quality: mean(&qualities),
        trend: trend(&qualities),
    }
}

/// Latest seven check-ins against the seven before them.
fn trend(qualities: &[f64]) -> Trend {
    let split = qualities.len().saturating_sub(7);
    let recent = &qualities[split..];
    let older = &qualities[split.saturating_sub(7)..split];
    match (mean(recent), mean(older)) {
        (Some(recent), Some(older)) if recent > older => Trend::Improving,
        (Some(recent), Some(older)) if recent < older => Trend::Declining,
        _ => Trend::Stable,
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn slot(mood: MoodCategory) -> usize {
    PRIORITY
        .iter()
        .position(|candidate| *candidate == mood)
        .unwrap_or_default()
}

fn counts(tally: &Tally) -> Vec<MoodCount> {
    PRIORITY
        .iter()
        .zip(tally)
        .map(|(mood, count)| MoodCount {
            mood: *mood,
            count: *count,
        })
        .collect()
}

/// Most frequent mood; ties go to the earlier priority.
fn dominant(tally: &Tally) -> Option<MoodCategory> {
    let mut best: Option<(MoodCategory, u64)> = None;
    for (mood, count) in PRIORITY.iter().zip(tally) {
        if *count > best.map_or(0, |(_, top)| top) {
            best = Some((*mood, *count));
        }
    }
    best.map(|(mood, _)| mood)
}

fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

fn week_label(date: NaiveDate) -> String {
    let iso = date.iso_week();
    format!("{}-W{:02}", iso.year(), iso.week())
}
