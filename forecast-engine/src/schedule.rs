//! Schedule resolution
//!
//! Expands an auto-order's `frequency` and `custom_days` into the weekdays it
//! fires on. Bad data degrades to fewer days plus an [`Anomaly`]; no default
//! frequency is guessed.

use crate::types::{Anomaly, AnomalyKind};
use canteen_model::{parse_weekday_tag, weekday_index, AutoOrder, Frequency};
use chrono::Weekday;

/// Weekdays in index order, Monday = 0
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekdays as a bitmask over weekday indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// No days
    pub const EMPTY: WeekdaySet = WeekdaySet(0);
    /// Monday to Sunday
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);
    /// Monday to Friday
    pub const WEEKDAYS: WeekdaySet = WeekdaySet(0b001_1111);

    /// Add a day
    pub fn insert(&mut self, day: Weekday) {
        self.0 |= 1 << weekday_index(day);
    }

    /// Check membership
    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & (1 << weekday_index(day)) != 0
    }

    /// Number of days
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Days in Monday-first order
    pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
        WEEK.iter().copied().filter(move |day| self.contains(*day))
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        let mut set = WeekdaySet::EMPTY;
        for day in iter {
            set.insert(day);
        }
        set
    }
}

/// Days an auto-order fires on, with any problems found on the way
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolved {
    /// Firing days
    pub days: WeekdaySet,

    /// Data problems
    pub anomalies: Vec<Anomaly>,
}

/// Resolve the firing days of an auto-order
pub fn resolve(order: &AutoOrder) -> Resolved {
    match order.frequency {
        Frequency::Daily => Resolved {
            days: WeekdaySet::ALL,
            anomalies: Vec::new(),
        },
        Frequency::Weekdays => Resolved {
            days: WeekdaySet::WEEKDAYS,
            anomalies: Vec::new(),
        },
        Frequency::Custom => {
            let mut resolved = Resolved::default();
            for tag in &order.custom_days {
                match parse_weekday_tag(tag) {
                    Some(day) => resolved.days.insert(day),
                    None => {
                        tracing::warn!(
                            auto_order_id = %order.id,
                            tag = %tag,
                            "Ignoring unknown weekday tag"
                        );
                        resolved.anomalies.push(Anomaly {
                            auto_order_id: order.id,
                            kind: AnomalyKind::UnknownWeekdayTag,
                            detail: tag.clone(),
                        });
                    }
                }
            }
            resolved
        }
        Frequency::Unrecognized => {
            tracing::warn!(
                auto_order_id = %order.id,
                item_id = %order.item_id,
                "Auto-order has no recognised frequency, contributing no demand"
            );
            Resolved {
                days: WeekdaySet::EMPTY,
                anomalies: vec![Anomaly {
                    auto_order_id: order.id,
                    kind: AnomalyKind::UnrecognizedFrequency,
                    detail: "frequency".to_string(),
                }],
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canteen_model::{ItemId, UserId};

    fn auto_order(frequency: Frequency, days: &[&str]) -> AutoOrder {
        AutoOrder::new(
            UserId::new("u1"),
            ItemId::new("idli"),
            2,
            frequency,
            days.iter().map(|d| d.to_string()).collect(),
        )
    }

    #[test]
    fn test_daily_and_weekdays() {
        let daily = resolve(&auto_order(Frequency::Daily, &[]));
        assert_eq!(daily.days.len(), 7);
        assert!(daily.anomalies.is_empty());

        let weekdays = resolve(&auto_order(Frequency::Weekdays, &["sat"]));
        assert_eq!(
            weekdays.days.iter().collect::<Vec<_>>(),
            vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri
            ]
        );
        assert!(!weekdays.days.contains(Weekday::Sat));
    }

    #[test]
    fn test_custom_days_exact() {
        let resolved = resolve(&auto_order(Frequency::Custom, &["Wednesday", "mon", "MON"]));
        assert_eq!(
            resolved.days.iter().collect::<Vec<_>>(),
            vec![Weekday::Mon, Weekday::Wed]
        );
        assert!(resolved.anomalies.is_empty());
    }

    #[test]
    fn test_custom_unknown_tag_is_skipped() {
        let resolved = resolve(&auto_order(Frequency::Custom, &["fri", "funday"]));
        assert_eq!(resolved.days.iter().collect::<Vec<_>>(), vec![Weekday::Fri]);
        assert_eq!(resolved.anomalies.len(), 1);
        assert_eq!(resolved.anomalies[0].kind, AnomalyKind::UnknownWeekdayTag);
        assert_eq!(resolved.anomalies[0].detail, "funday");
    }

    #[test]
    fn test_unrecognized_frequency_yields_nothing() {
        let resolved = resolve(&auto_order(Frequency::from("fortnightly".to_string()), &["mon"]));
        assert!(resolved.days.is_empty());
        assert_eq!(resolved.anomalies[0].kind, AnomalyKind::UnrecognizedFrequency);
    }

    #[test]
    fn test_weekday_set_from_iter() {
        let set: WeekdaySet = [Weekday::Sun, Weekday::Sun, Weekday::Tue].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Weekday::Tue, Weekday::Sun]);
    }
}
