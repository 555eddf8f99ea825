//! Week bucketing for the chart endpoint.
//!
//! Weeks follow ISO-8601 (Monday start, the first week holds the year's first
//! Thursday). Buckets are keyed by the (ISO year, week) pair, so a window that
//! crosses New Year keeps walking forward instead of resetting at week 1.

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::models::{FeedbackRecord, TypeCounts, WeekBucket};
use crate::store::{FeedbackStore, StoreError};

/// Number of weeks shown on the dashboard chart, current week included.
pub const CHART_WEEKS: i64 = 4;

pub async fn weekly_breakdown(
    store: &dyn FeedbackStore,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> Result<Vec<WeekBucket>, StoreError> {
    let (start, end) = day_bounds(start_date, end_date);
    let records = store.find_by_created_at_range(start, end).await?;
    let buckets = bucket_by_week(start_date, end_date, &records);

    debug!(
        %start_date,
        %end_date,
        records = records.len(),
        buckets = buckets.len(),
        "built weekly breakdown"
    );
    Ok(buckets)
}

/// Start of `start` through the last instant of `end`.
pub fn day_bounds(start: NaiveDate, end: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let from = start.and_time(NaiveTime::MIN);
    let to = end.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::nanoseconds(1);
    (from, to)
}

/// The trailing chart window ending on `today`.
pub fn chart_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    (today - Duration::weeks(CHART_WEEKS - 1), today)
}

/// Groups `records` (already limited to the date range) into one bucket per
/// ISO week between `start_date` and `end_date`, oldest first. Weeks without
/// records still get an all-zero bucket.
pub fn bucket_by_week(
    start_date: NaiveDate,
    end_date: NaiveDate,
    records: &[FeedbackRecord],
) -> Vec<WeekBucket> {
    if start_date > end_date {
        return Vec::new();
    }

    let mut by_week: HashMap<(i32, u32), Vec<&FeedbackRecord>> = HashMap::new();
    for record in records {
        let iso = record.created_at.date().iso_week();
        by_week.entry((iso.year(), iso.week())).or_default().push(record);
    }

    let mut buckets = Vec::new();
    let mut cursor = monday_of(start_date);
    let last = monday_of(end_date);

    while cursor <= last {
        let iso = cursor.iso_week();
        let counts = by_week
            .get(&(iso.year(), iso.week()))
            .map(|group| TypeCounts::tally(group.iter().copied()))
            .unwrap_or_default();
        buckets.push(WeekBucket::new(iso.year(), iso.week(), counts));
        cursor += Duration::weeks(1);
    }

    buckets
}

fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryFeedbackStore;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(day: NaiveDate, h: u32, m: u32, s: u32) -> NaiveDateTime {
        day.and_hms_opt(h, m, s).unwrap()
    }

    fn weeks(buckets: &[WeekBucket]) -> Vec<u32> {
        buckets.iter().map(|b| b.week).collect()
    }

    #[test]
    fn day_bounds_cover_whole_end_day() {
        let (from, to) = day_bounds(date(2026, 10, 1), date(2026, 10, 16));
        assert_eq!(from, at(date(2026, 10, 1), 0, 0, 0));
        assert_eq!(to.date(), date(2026, 10, 16));
        assert!(to > at(date(2026, 10, 16), 23, 59, 59));
        assert!(to < at(date(2026, 10, 17), 0, 0, 0));
    }

    #[test]
    fn chart_window_spans_three_prior_weeks() {
        let (start, end) = chart_window(date(2026, 10, 16));
        assert_eq!(start, date(2026, 9, 25));
        assert_eq!(end, date(2026, 10, 16));
    }

    #[test]
    fn four_week_window_has_four_contiguous_buckets() {
        let (start, end) = chart_window(date(2026, 10, 16));
        let buckets = bucket_by_week(start, end, &[]);

        assert_eq!(weeks(&buckets), vec![39, 40, 41, 42]);
        assert!(buckets.iter().all(|b| b.counts() == TypeCounts::default()));
    }

    #[test]
    fn bucket_count_matches_weeks_spanned() {
        let start = date(2026, 3, 4);
        for span_days in 0..60 {
            let end = start + Duration::days(span_days);
            let buckets = bucket_by_week(start, end, &[]);
            let expected = (monday_of(end) - monday_of(start)).num_weeks() + 1;

            assert_eq!(buckets.len() as i64, expected, "span of {span_days} days");
            for pair in buckets.windows(2) {
                assert_eq!(pair[1].week, pair[0].week + 1);
            }
        }
    }

    #[test]
    fn counts_land_in_their_weeks() {
        let records = vec![
            FeedbackRecord::new("complaint", at(date(2026, 10, 12), 8, 0, 0)),
            FeedbackRecord::new("complaint", at(date(2026, 10, 16), 17, 45, 0)),
            FeedbackRecord::new("suggestion", at(date(2026, 10, 14), 11, 0, 0)),
            FeedbackRecord::new("compliment", at(date(2026, 10, 2), 9, 0, 0)),
        ];

        let buckets = bucket_by_week(date(2026, 9, 25), date(2026, 10, 16), &records);

        assert_eq!(weeks(&buckets), vec![39, 40, 41, 42]);
        assert_eq!(buckets[0].counts(), TypeCounts::default());
        assert_eq!(
            buckets[1].counts(),
            TypeCounts {
                complaints: 0,
                suggestions: 0,
                compliments: 1,
            }
        );
        assert_eq!(buckets[2].counts(), TypeCounts::default());
        assert_eq!(
            buckets[3].counts(),
            TypeCounts {
                complaints: 2,
                suggestions: 1,
                compliments: 0,
            }
        );
    }

    #[test]
    fn unknown_types_are_not_counted() {
        let records = vec![
            FeedbackRecord::new("other", at(date(2026, 10, 13), 10, 0, 0)),
            FeedbackRecord::new("Complaint", at(date(2026, 10, 13), 10, 0, 0)),
            FeedbackRecord::new("compliment", at(date(2026, 10, 13), 10, 0, 0)),
        ];

        let buckets = bucket_by_week(date(2026, 10, 12), date(2026, 10, 16), &records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(
            buckets[0].counts(),
            TypeCounts {
                complaints: 0,
                suggestions: 0,
                compliments: 1,
            }
        );
    }

    #[test]
    fn year_boundary_keeps_walking_forward() {
        // 2026 has 53 ISO weeks; 2027-01-04 opens week 1.
        let records = vec![
            FeedbackRecord::new("complaint", at(date(2026, 12, 31), 12, 0, 0)),
            FeedbackRecord::new("suggestion", at(date(2027, 1, 5), 12, 0, 0)),
        ];

        let buckets = bucket_by_week(date(2026, 12, 24), date(2027, 1, 12), &records);

        assert_eq!(weeks(&buckets), vec![52, 53, 1, 2]);
        assert_eq!(
            buckets.iter().map(|b| b.year).collect::<Vec<_>>(),
            vec![2026, 2026, 2027, 2027]
        );
        assert_eq!(buckets[1].complaints, 1);
        assert_eq!(buckets[2].suggestions, 1);
        assert_eq!(buckets[3].counts(), TypeCounts::default());
    }

    #[test]
    fn early_january_can_belong_to_previous_iso_year() {
        // 2027-01-01 is a Friday, still inside 2026-W53.
        let buckets = bucket_by_week(date(2027, 1, 1), date(2027, 1, 1), &[]);
        assert_eq!(buckets.len(), 1);
        assert_eq!((buckets[0].year, buckets[0].week), (2026, 53));
    }

    #[test]
    fn inverted_range_yields_nothing() {
        assert!(bucket_by_week(date(2026, 10, 16), date(2026, 9, 1), &[]).is_empty());
    }

    #[tokio::test]
    async fn breakdown_respects_day_boundaries() {
        let store = MemoryFeedbackStore::new();
        store
            .insert("complaint", at(date(2026, 9, 25), 0, 0, 0))
            .await;
        store
            .insert("complaint", at(date(2026, 10, 16), 23, 59, 59))
            .await;
        store
            .insert("complaint", at(date(2026, 10, 17), 0, 0, 0))
            .await;
        store
            .insert("suggestion", at(date(2026, 9, 24), 23, 59, 59))
            .await;

        let buckets = weekly_breakdown(&store, date(2026, 9, 25), date(2026, 10, 16))
            .await
            .unwrap();

        assert_eq!(weeks(&buckets), vec![39, 40, 41, 42]);
        assert_eq!(buckets[0].complaints, 1);
        assert_eq!(buckets[0].suggestions, 0);
        assert_eq!(buckets[3].complaints, 1);
    }

    #[tokio::test]
    async fn breakdown_propagates_storage_failure() {
        let store = MemoryFeedbackStore::new();
        store.set_unavailable(true);

        let result = weekly_breakdown(&store, date(2026, 9, 25), date(2026, 10, 16)).await;
        assert!(matches!(result, Err(StoreError::Unavailable(_))));
    }
}
