//! The group-by engine: buckets rows by day or fixed 7-day window.

use synctime_utils::dates::{day_label, days_in_month, month_name, week_of_month, weeks_in_month};

use super::column::TableRow;

/// Grouping mode for the table body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    None,
    Day,
    Week,
}

/// The month/year context a group belongs to, handed back to the caller when
/// the group's "add" affordance is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupContext {
    pub mode: GroupBy,
    /// Day of month (by-day) or week window index (by-week), 1-based.
    pub bucket: u32,
    pub month: u32,
    pub year: i32,
}

impl GroupContext {
    /// The first date covered by the bucket, used to pre-fill creation
    /// forms.
    pub fn first_date(&self) -> Option<chrono::NaiveDate> {
        let day = match self.mode {
            GroupBy::Day => self.bucket,
            GroupBy::Week => (self.bucket - 1) * 7 + 1,
            GroupBy::None => return None,
        };
        chrono::NaiveDate::from_ymd_opt(self.year, self.month, day)
    }
}

/// One bucket of the grouped month view.
pub struct Group<'r, R> {
    pub context: GroupContext,
    pub label: String,
    pub rows: Vec<&'r R>,
}

/// Buckets `rows` into one group per calendar day or per 7-day window of the
/// target month. Every bucket of the month is emitted, empty ones included.
///
/// Rows whose `date_key` field does not parse, or whose date falls outside
/// the target month/year, go into no group. The drop is deliberate (the
/// caller scopes its queries to the same month) but logged so vanishing rows
/// are observable.
pub fn group_rows<'r, R: TableRow>(
    rows: &[&'r R],
    date_key: &str,
    mode: GroupBy,
    month: u32,
    year: i32,
) -> Vec<Group<'r, R>> {
    use chrono::Datelike;

    let Some(days) = days_in_month(year, month) else {
        return Vec::new();
    };
    let buckets = match mode {
        GroupBy::Day => days,
        GroupBy::Week => weeks_in_month(year, month).unwrap_or(0),
        GroupBy::None => return Vec::new(),
    };

    let mut groups: Vec<Group<'r, R>> = (1..=buckets)
        .map(|bucket| {
            let context = GroupContext {
                mode,
                bucket,
                month,
                year,
            };
            Group {
                context,
                label: bucket_label(mode, bucket, month, year, days),
                rows: Vec::new(),
            }
        })
        .collect();

    let mut dropped = 0usize;
    for row in rows {
        let date = row.field(date_key).as_date();
        let Some(date) = date else {
            dropped += 1;
            continue;
        };
        if date.month() != month || date.year() != year {
            dropped += 1;
            continue;
        }
        let bucket = match mode {
            GroupBy::Day => date.day(),
            GroupBy::Week => week_of_month(date.day()),
            GroupBy::None => unreachable!(),
        };
        if let Some(group) = groups.get_mut(bucket as usize - 1) {
            group.rows.push(row);
        }
    }
    if dropped > 0 {
        log::debug!("group-by excluded {dropped} rows outside {month}/{year}");
    }

    groups
}

fn bucket_label(mode: GroupBy, bucket: u32, month: u32, year: i32, days: u32) -> String {
    match mode {
        GroupBy::Day => chrono::NaiveDate::from_ymd_opt(year, month, bucket)
            .map(day_label)
            .unwrap_or_default(),
        GroupBy::Week => {
            let start = (bucket - 1) * 7 + 1;
            let end = (start + 6).min(days);
            let name = &month_name(month)[..3];
            format!("Week {bucket} ({name} {start} to {name} {end})")
        }
        GroupBy::None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widgets::data_table::column::CellValue;
    use ustr::Ustr;

    struct Row {
        id: &'static str,
        date: &'static str,
    }

    impl TableRow for Row {
        fn row_id(&self) -> Ustr {
            Ustr::from(self.id)
        }

        fn field(&self, key: &str) -> CellValue {
            match key {
                "date" => CellValue::Text(self.date.to_owned()),
                _ => CellValue::Empty,
            }
        }
    }

    fn refs(rows: &[Row]) -> Vec<&Row> {
        rows.iter().collect()
    }

    #[test]
    fn by_day_emits_one_group_per_calendar_day() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(group_rows(&refs(&empty), "date", GroupBy::Day, 4, 2025).len(), 30);
        assert_eq!(group_rows(&refs(&empty), "date", GroupBy::Day, 2, 2024).len(), 29);
        assert_eq!(group_rows(&refs(&empty), "date", GroupBy::Day, 2, 2025).len(), 28);
    }

    #[test]
    fn by_week_emits_ceil_of_days_over_seven() {
        let empty: Vec<Row> = Vec::new();
        assert_eq!(group_rows(&refs(&empty), "date", GroupBy::Week, 10, 2025).len(), 5);
        assert_eq!(group_rows(&refs(&empty), "date", GroupBy::Week, 2, 2025).len(), 4);
    }

    #[test]
    fn a_row_lands_only_in_its_bucket() {
        let rows = vec![Row { id: "r", date: "2025-10-15" }];
        let by_day = group_rows(&refs(&rows), "date", GroupBy::Day, 10, 2025);
        for group in &by_day {
            let expected = usize::from(group.context.bucket == 15);
            assert_eq!(group.rows.len(), expected, "day bucket {}", group.context.bucket);
        }

        let by_week = group_rows(&refs(&rows), "date", GroupBy::Week, 10, 2025);
        for group in &by_week {
            let expected = usize::from(group.context.bucket == 3);
            assert_eq!(group.rows.len(), expected, "week bucket {}", group.context.bucket);
        }
    }

    #[test]
    fn rows_outside_the_target_month_are_excluded() {
        let rows = vec![
            Row { id: "in", date: "2025-10-03" },
            Row { id: "other-month", date: "2025-09-03" },
            Row { id: "other-year", date: "2024-10-03" },
            Row { id: "garbage", date: "not a date" },
        ];
        let groups = group_rows(&refs(&rows), "date", GroupBy::Day, 10, 2025);
        let total: usize = groups.iter().map(|g| g.rows.len()).sum();
        assert_eq!(total, 1);
        assert_eq!(groups[2].rows[0].row_id(), Ustr::from("in"));
    }

    #[test]
    fn week_context_prefills_the_window_start() {
        let context = GroupContext {
            mode: GroupBy::Week,
            bucket: 3,
            month: 10,
            year: 2025,
        };
        assert_eq!(
            context.first_date(),
            chrono::NaiveDate::from_ymd_opt(2025, 10, 15)
        );
    }

    #[test]
    fn day_groups_carry_readable_labels() {
        let empty: Vec<Row> = Vec::new();
        let groups = group_rows(&refs(&empty), "date", GroupBy::Day, 10, 2025);
        assert_eq!(groups[14].label, "Wed, Oct 15");
        let weeks = group_rows(&refs(&empty), "date", GroupBy::Week, 10, 2025);
        assert_eq!(weeks[4].label, "Week 5 (Oct 29 to Oct 31)");
    }
}
