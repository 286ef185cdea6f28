//! Dashboard statistics.
//!
//! The four figures are independent reads. [`aggregate`] runs them
//! concurrently and fails as a whole if any one of them fails.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::Result;
use crate::numbering::ReferenceClock;
use crate::storage::stats::{self, CategoryCount};
use crate::storage::Database;
use crate::view::DashboardView;

/// Number of days covered by the daily trend, today included.
pub const TREND_DAYS: u64 = 7;

/// Where dashboard figures are read from.
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    /// Count all letters.
    async fn total_letters(&self) -> Result<i64>;

    /// Count letters issued in one calendar month.
    async fn letters_in_month(&self, year: i32, month: u32) -> Result<i64>;

    /// Count lost items per category, most frequent first.
    async fn category_counts(&self) -> Result<Vec<CategoryCount>>;

    /// Count letters per day in an inclusive date range.
    async fn daily_counts(&self, from: NaiveDate, to: NaiveDate)
        -> Result<BTreeMap<NaiveDate, i64>>;
}

#[async_trait::async_trait]
impl StatsSource for Database {
    async fn total_letters(&self) -> Result<i64> {
        self.run(|storage| stats::total_letters(storage.conn())).await
    }

    async fn letters_in_month(&self, year: i32, month: u32) -> Result<i64> {
        self.run(move |storage| stats::letters_in_month(storage.conn(), year, month))
            .await
    }

    async fn category_counts(&self) -> Result<Vec<CategoryCount>> {
        self.run(|storage| stats::category_counts(storage.conn())).await
    }

    async fn daily_counts(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, i64>> {
        self.run(move |storage| stats::daily_counts(storage.conn(), from, to))
            .await
    }
}

/// Gather the dashboard figures as of `today`.
///
/// # Errors
///
/// Returns the first error reported by any of the reads; no partial view is
/// produced.
pub async fn aggregate<S>(source: &S, today: NaiveDate) -> Result<DashboardView>
where
    S: StatsSource + ?Sized,
{
    let from = today - Days::new(TREND_DAYS - 1);

    let (total_letters, letters_this_month, categories, daily) = tokio::try_join!(
        source.total_letters(),
        source.letters_in_month(today.year(), today.month()),
        source.category_counts(),
        source.daily_counts(from, today),
    )?;

    let (category_labels, category_data): (Vec<String>, Vec<i64>) = categories
        .into_iter()
        .map(|c| (c.category, c.total))
        .unzip();

    let (daily_labels, daily_data): (Vec<String>, Vec<i64>) = from
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| {
            (
                day.format("%d %b").to_string(),
                daily.get(&day).copied().unwrap_or(0),
            )
        })
        .unzip();

    Ok(DashboardView {
        total_letters,
        letters_this_month,
        category_labels,
        category_data,
        daily_labels,
        daily_data,
    })
}

/// Builds the dashboard from the database.
#[derive(Debug, Clone)]
pub struct DashboardService {
    db: Database,
    clock: ReferenceClock,
}

impl DashboardService {
    /// Create a service over `db`, bucketing dates with `clock`.
    #[must_use]
    pub fn new(db: Database, clock: ReferenceClock) -> Self {
        Self { db, clock }
    }

    /// The dashboard as of today in the reference offset.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the reads fail.
    pub async fn view(&self) -> Result<DashboardView> {
        aggregate(&self.db, self.clock.today()).await
    }
}
