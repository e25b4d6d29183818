//! Record aggregation into calendar-period buckets for charts.
//!
//! Records are grouped by the calendar period their timestamp falls in, and
//! an amount is summed per category within each period. The result is a list
//! of sparse [SeriesPoint]s, one per bucket.

use std::{
    cmp::Reverse,
    collections::HashMap,
    fmt::Display,
    str::FromStr,
};

use serde::{Deserialize, Serialize, Serializer, ser::SerializeMap};
use time::{Date, Month, UtcOffset};

use crate::{Record, field::FieldPath};

/// The most buckets the daily period keeps, counting back from the latest day.
pub const DAILY_BUCKET_LIMIT: usize = 31;

/// The calendar resolution records are bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// One bucket per calendar day, e.g. "2024-03-05".
    Daily,
    /// One bucket per ISO 8601 week, e.g. "Week 10 2024".
    Weekly,
    /// One bucket per calendar month, e.g. "Mar 2024".
    Monthly,
    /// One bucket per calendar year, e.g. "2024".
    Yearly,
}

impl Period {
    /// The lowercase name used in config files and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(format!(
                "unknown period \"{other}\", expected one of daily, weekly, monthly, yearly"
            )),
        }
    }
}

/// Derive the bucket label for `date` at the given period.
pub fn bucket_key(date: Date, period: Period) -> String {
    match period {
        Period::Daily => format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ),
        Period::Weekly => {
            let (iso_year, week, _) = date.to_iso_week_date();
            format!("Week {week} {iso_year}")
        }
        Period::Monthly => format!("{} {:04}", month_abbrev(date.month()), date.year()),
        Period::Yearly => format!("{:04}", date.year()),
    }
}

fn month_abbrev(month: Month) -> &'static str {
    match month {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}

/// One chart data point: a bucket label and the summed amount per category.
///
/// Sparse: a category with no records in the bucket is absent rather than zero.
/// Serializes as a flat object, `{"label": "Mar 2024", "refund": 12.5, ...}`,
/// with categories in the order they were first added to the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    /// The bucket key.
    pub label: String,
    values: Vec<(String, f64)>,
}

impl SeriesPoint {
    /// An empty point for the bucket `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            values: Vec::new(),
        }
    }

    /// Add `amount` to the running total for `category`, starting from zero.
    pub fn add(&mut self, category: &str, amount: f64) {
        match self.values.iter_mut().find(|(name, _)| name == category) {
            Some((_, total)) => *total += amount,
            None => self.values.push((category.to_owned(), amount)),
        }
    }

    /// The total for `category`, or `None` if the bucket has no records in it.
    pub fn get(&self, category: &str) -> Option<f64> {
        self.values
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, total)| *total)
    }

    /// The `(category, total)` pairs in insertion order.
    pub fn values(&self) -> &[(String, f64)] {
        &self.values
    }
}

impl Serialize for SeriesPoint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 1))?;
        map.serialize_entry("label", &self.label)?;
        for (category, total) in &self.values {
            map.serialize_entry(category, total)?;
        }
        map.end()
    }
}

/// Bucket `records` by `period` and sum `amount_field` per `category_field` in each bucket.
///
/// Calendar dates are taken in `offset`. Records with a missing or unparseable
/// date are skipped. Amounts are summed as plain `f64`s: a non-numeric amount
/// contributes `NaN` to its bucket and category, and it is left to whoever
/// draws the chart to decide how to show that.
///
/// Buckets come out in the order their key was first seen, except for
/// [Period::Daily]: daily buckets are cut down to the latest
/// [DAILY_BUCKET_LIMIT] days and sorted oldest first.
pub fn aggregate(
    records: &[Record],
    period: Period,
    date_field: &FieldPath,
    category_field: &FieldPath,
    amount_field: &FieldPath,
    offset: UtcOffset,
) -> Vec<SeriesPoint> {
    let mut buckets: Vec<(Date, SeriesPoint)> = Vec::new();
    let mut bucket_index: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for record in records {
        let Some(date) = record
            .timestamp(date_field, offset)
            .and_then(|timestamp| timestamp.checked_to_offset(offset))
            .map(|timestamp| timestamp.date())
        else {
            skipped += 1;
            continue;
        };

        let key = bucket_key(date, period);
        let index = *bucket_index.entry(key).or_insert_with_key(|key| {
            buckets.push((date, SeriesPoint::new(key.as_str())));
            buckets.len() - 1
        });

        let category = record.category(category_field);
        buckets[index]
            .1
            .add(&category, record.amount(amount_field));
    }

    if skipped > 0 {
        tracing::debug!("skipped {skipped} records with no valid \"{date_field}\" while bucketing");
    }

    if period == Period::Daily {
        buckets.sort_by_key(|(date, _)| Reverse(*date));
        buckets.truncate(DAILY_BUCKET_LIMIT);
        buckets.reverse();
    }

    buckets.into_iter().map(|(_, point)| point).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use time::{Duration, UtcOffset, macros::date};

    use crate::{
        field::FieldPath,
        test_utils::{record, records},
    };

    use super::{DAILY_BUCKET_LIMIT, Period, SeriesPoint, aggregate, bucket_key};

    fn path(path: &str) -> FieldPath {
        FieldPath::parse(path).unwrap()
    }

    fn aggregate_flows(records: &[crate::Record], period: Period) -> Vec<SeriesPoint> {
        aggregate(
            records,
            period,
            &path("created_at"),
            &path("type"),
            &path("amount"),
            UtcOffset::UTC,
        )
    }

    #[test]
    fn bucket_keys_for_each_period() {
        let day = date!(2024 - 03 - 05);

        assert_eq!(bucket_key(day, Period::Daily), "2024-03-05");
        assert_eq!(bucket_key(day, Period::Weekly), "Week 10 2024");
        assert_eq!(bucket_key(day, Period::Monthly), "Mar 2024");
        assert_eq!(bucket_key(day, Period::Yearly), "2024");
    }

    #[test]
    fn weekly_keys_use_iso_week_year() {
        assert_eq!(bucket_key(date!(2021 - 01 - 01), Period::Weekly), "Week 53 2020");
        assert_eq!(bucket_key(date!(2024 - 12 - 30), Period::Weekly), "Week 1 2025");
    }

    #[test]
    fn period_parses_from_lowercase_names() {
        assert_eq!("weekly".parse::<Period>(), Ok(Period::Weekly));
        assert!("Weekly".parse::<Period>().is_err());
        assert_eq!(
            serde_json::from_str::<Period>("\"monthly\"").unwrap(),
            Period::Monthly
        );
    }

    #[test]
    fn same_iso_week_shares_a_bucket() {
        let records = records(vec![
            json!({"created_at": "2024-01-01", "type": "a", "amount": 10}),
            json!({"created_at": "2024-01-05", "type": "b", "amount": 5}),
        ]);

        let got = aggregate_flows(&records, Period::Weekly);

        let mut want = SeriesPoint::new("Week 1 2024");
        want.add("a", 10.0);
        want.add("b", 5.0);
        assert_eq!(got, vec![want]);
    }

    #[test]
    fn series_point_serializes_flat() {
        let mut point = SeriesPoint::new("Week 1 2024");
        point.add("a", 10.0);
        point.add("b", 5.0);

        let got = serde_json::to_string(&point).unwrap();

        assert_eq!(got, r#"{"label":"Week 1 2024","a":10.0,"b":5.0}"#);
    }

    #[test]
    fn sums_per_category_within_bucket() {
        let records = records(vec![
            json!({"created_at": "2024-03-01T08:00:00Z", "type": "wallet_cashin", "amount": 100.5}),
            json!({"created_at": "2024-03-15T08:00:00Z", "type": "refund", "amount": "20"}),
            json!({"created_at": "2024-03-20T08:00:00Z", "type": "wallet_cashin", "amount": 50}),
        ]);

        let got = aggregate_flows(&records, Period::Monthly);

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].label, "Mar 2024");
        assert_eq!(got[0].get("wallet_cashin"), Some(150.5));
        assert_eq!(got[0].get("refund"), Some(20.0));
        assert_eq!(got[0].get("chargeback"), None);
    }

    #[test]
    fn non_daily_periods_keep_first_seen_order() {
        let records = records(vec![
            json!({"created_at": "2024-05-01", "type": "a", "amount": 1}),
            json!({"created_at": "2023-01-01", "type": "a", "amount": 1}),
            json!({"created_at": "2024-02-01", "type": "a", "amount": 1}),
            json!({"created_at": "2024-05-09", "type": "a", "amount": 1}),
        ]);

        let monthly: Vec<String> = aggregate_flows(&records, Period::Monthly)
            .into_iter()
            .map(|point| point.label)
            .collect();
        let yearly: Vec<String> = aggregate_flows(&records, Period::Yearly)
            .into_iter()
            .map(|point| point.label)
            .collect();

        assert_eq!(monthly, ["May 2024", "Jan 2023", "Feb 2024"]);
        assert_eq!(yearly, ["2024", "2023"]);
    }

    #[test]
    fn daily_keeps_latest_days_in_chronological_order() {
        let start = date!(2024 - 01 - 01);
        // Newest first, as most list endpoints return them.
        let records = records(
            (0..45)
                .rev()
                .map(|day| {
                    json!({
                        "created_at": (start + Duration::days(day)).to_string(),
                        "type": "a",
                        "amount": 1,
                    })
                })
                .collect(),
        );

        let got = aggregate_flows(&records, Period::Daily);

        assert_eq!(got.len(), DAILY_BUCKET_LIMIT);
        assert_eq!(got.first().unwrap().label, "2024-01-15");
        assert_eq!(got.last().unwrap().label, "2024-02-14");
        assert!(got.windows(2).all(|pair| pair[0].label < pair[1].label));
    }

    #[test]
    fn daily_under_the_cap_is_sorted() {
        let records = records(vec![
            json!({"created_at": "2024-01-03", "type": "a", "amount": 1}),
            json!({"created_at": "2024-01-01", "type": "a", "amount": 2}),
            json!({"created_at": "2024-01-03", "type": "b", "amount": 3}),
            json!({"created_at": "2024-01-02", "type": "a", "amount": 4}),
        ]);

        let got = aggregate_flows(&records, Period::Daily);

        let labels: Vec<&str> = got.iter().map(|point| point.label.as_str()).collect();
        assert_eq!(labels, ["2024-01-01", "2024-01-02", "2024-01-03"]);
        assert_eq!(got[2].get("a"), Some(1.0));
        assert_eq!(got[2].get("b"), Some(3.0));
    }

    #[test]
    fn calendar_date_follows_offset() {
        let records = vec![record(
            json!({"created_at": "2024-03-05T23:30:00Z", "type": "a", "amount": 1}),
        )];
        let auckland = UtcOffset::from_hms(13, 0, 0).unwrap();

        let got = aggregate(
            &records,
            Period::Daily,
            &path("created_at"),
            &path("type"),
            &path("amount"),
            auckland,
        );

        assert_eq!(got[0].label, "2024-03-06");
    }

    #[test]
    fn skips_unparseable_dates() {
        let records = records(vec![
            json!({"created_at": "garbage", "type": "a", "amount": 1}),
            json!({"type": "a", "amount": 1}),
            json!({"created_at": "2024-01-01", "type": "a", "amount": 2}),
        ]);

        let got = aggregate_flows(&records, Period::Yearly);

        assert_eq!(got.len(), 1);
        assert_eq!(got[0].get("a"), Some(2.0));
    }

    #[test]
    fn skips_dates_past_the_calendar_range_in_view_offset() {
        let records = records(vec![
            json!({"created_at": "9999-12-31T22:00:00-05:00", "type": "a", "amount": 1}),
            json!({"created_at": 253_402_300_799_000_i64, "type": "a", "amount": 1}),
            json!({"created_at": "2024-01-01T00:00:00Z", "type": "a", "amount": 2}),
        ]);
        let auckland = UtcOffset::from_hms(13, 0, 0).unwrap();
        let labels = |offset| -> Vec<String> {
            aggregate(
                &records,
                Period::Daily,
                &path("created_at"),
                &path("type"),
                &path("amount"),
                offset,
            )
            .into_iter()
            .map(|point| point.label)
            .collect()
        };

        // The epoch-millis record is the last second of 9999 at UTC.
        assert_eq!(labels(UtcOffset::UTC), ["2024-01-01", "9999-12-31"]);
        assert_eq!(labels(auckland), ["2024-01-01"]);
    }

    #[test]
    fn non_numeric_amount_propagates_nan() {
        let records = records(vec![
            json!({"created_at": "2024-01-01", "type": "a", "amount": 2}),
            json!({"created_at": "2024-01-02", "type": "a", "amount": "n/a"}),
            json!({"created_at": "2024-01-03", "type": "b", "amount": 1}),
        ]);

        let got = aggregate_flows(&records, Period::Monthly);

        assert!(got[0].get("a").unwrap().is_nan());
        assert_eq!(got[0].get("b"), Some(1.0));
    }

    #[test]
    fn missing_category_is_grouped_as_other() {
        let records = records(vec![json!({"created_at": "2024-01-01", "amount": 2})]);

        let got = aggregate_flows(&records, Period::Yearly);

        assert_eq!(got[0].get(crate::UNCATEGORIZED_LABEL), Some(2.0));
    }

    #[test]
    fn sums_are_conserved_for_every_period() {
        let records = records(
            (0..60)
                .map(|i| {
                    json!({
                        "created_at": (date!(2023 - 12 - 01) + Duration::days(i * 3)).to_string(),
                        "type": (["a", "b", "c"][(i % 3) as usize]),
                        "amount": i as f64 * 1.5,
                    })
                })
                .collect(),
        );

        for period in [Period::Weekly, Period::Monthly, Period::Yearly] {
            let got = aggregate_flows(&records, period);

            for category in ["a", "b", "c"] {
                let want: f64 = records
                    .iter()
                    .filter(|record| record.as_map()["type"] == category)
                    .map(|record| record.as_map()["amount"].as_f64().unwrap())
                    .sum();
                let total: f64 = got.iter().filter_map(|point| point.get(category)).sum();

                assert!(
                    (want - total).abs() < 1e-9,
                    "period {period}: category {category} summed to {total}, want {want}"
                );
            }
        }
    }

    #[test]
    fn empty_input_gives_no_points() {
        for period in [Period::Daily, Period::Weekly, Period::Monthly, Period::Yearly] {
            assert!(aggregate_flows(&[], period).is_empty());
        }
    }
}
