use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{FeedbackSummary, FeedbackType, TypeCounts, WeekBucket};
use crate::store::{FeedbackStore, StoreError};

pub async fn summarize_by_type(store: &dyn FeedbackStore) -> Result<FeedbackSummary, StoreError> {
    let total = store.count_total().await?;
    let complaints = store
        .count_by_type(FeedbackType::Complaint.as_str())
        .await?;
    let suggestions = store
        .count_by_type(FeedbackType::Suggestion.as_str())
        .await?;
    let compliments = store
        .count_by_type(FeedbackType::Compliment.as_str())
        .await?;

    Ok(FeedbackSummary {
        total,
        by_type: TypeCounts {
            complaints,
            suggestions,
            compliments,
        },
    })
}

pub fn build_report(
    generated_on: NaiveDate,
    summary: &FeedbackSummary,
    weeks: &[WeekBucket],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Feedback Report");
    let _ = writeln!(output, "Generated on {generated_on}");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- All feedback: {}", summary.total);

    let by_type = &summary.by_type;
    for (kind, count) in [
        (FeedbackType::Complaint, by_type.complaints),
        (FeedbackType::Suggestion, by_type.suggestions),
        (FeedbackType::Compliment, by_type.compliments),
    ] {
        let _ = writeln!(
            output,
            "- {kind}: {count} ({:.1}%)",
            share(count, summary.total)
        );
    }

    let untyped = summary.total - by_type.sum();
    if untyped > 0 {
        let _ = writeln!(output, "- unrecognized type: {untyped}");
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Weekly Breakdown");

    if weeks.is_empty() {
        let _ = writeln!(output, "No weeks in this window.");
    } else {
        let _ = writeln!(output, "| Week | Complaints | Suggestions | Compliments |");
        let _ = writeln!(output, "|---|---|---|---|");
        for bucket in weeks {
            let _ = writeln!(
                output,
                "| {}-W{:02} | {} | {} | {} |",
                bucket.year, bucket.week, bucket.complaints, bucket.suggestions, bucket.compliments
            );
        }
    }

    output
}

fn share(count: i64, total: i64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
