use chrono::{Datelike, NaiveTime, Weekday};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "business_hours")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub restaurant_id: i64,
    pub day_of_week: DayOfWeek,
    pub open_time: Option<NaiveTime>,
    pub close_time: Option<NaiveTime>,
    pub is_open: bool,
    pub is_24_hours: bool,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::restaurant::Entity",
        from = "Column::RestaurantId",
        to = "super::restaurant::Column::Id"
    )]
    Restaurant,
}

impl Related<super::restaurant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restaurant.def()
    }
}

super::timestamped_behavior!();

impl Model {
    pub fn formatted_hours(&self) -> String {
        if !self.is_open {
            return "Closed".to_string();
        }
        if self.is_24_hours {
            return "24 Hours".to_string();
        }
        match (self.open_time, self.close_time) {
            (Some(open), Some(close)) => {
                format!("{} - {}", open.format("%-I:%M %p"), close.format("%-I:%M %p"))
            }
            _ => "Hours not set".to_string(),
        }
    }

    /// Whether the restaurant is open at `time` on this day.
    /// A close time earlier than the open time wraps past midnight.
    pub fn is_open_at(&self, time: NaiveTime) -> bool {
        if !self.is_open {
            return false;
        }
        if self.is_24_hours {
            return true;
        }
        let (Some(open), Some(close)) = (self.open_time, self.close_time) else {
            return false;
        };
        if close < open {
            time >= open || time <= close
        } else {
            time >= open && time <= close
        }
    }

    /// Open right now: `now` falls on this row's weekday and within its hours.
    /// Times are compared in UTC.
    pub fn is_open_on(&self, now: DateTimeUtc) -> bool {
        self.day_of_week == DayOfWeek::from(now.weekday()) && self.is_open_at(now.time())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    #[sea_orm(string_value = "monday")]
    Monday,
    #[sea_orm(string_value = "tuesday")]
    Tuesday,
    #[sea_orm(string_value = "wednesday")]
    Wednesday,
    #[sea_orm(string_value = "thursday")]
    Thursday,
    #[sea_orm(string_value = "friday")]
    Friday,
    #[sea_orm(string_value = "saturday")]
    Saturday,
    #[sea_orm(string_value = "sunday")]
    Sunday,
}

impl DayOfWeek {
    pub fn label(&self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn hours(open: Option<&str>, close: Option<&str>) -> Model {
        let parse = |s: &str| NaiveTime::parse_from_str(s, "%H:%M").unwrap();
        let now = Utc::now();
        Model {
            id: 1,
            restaurant_id: 1,
            day_of_week: DayOfWeek::Friday,
            open_time: open.map(parse),
            close_time: close.map(parse),
            is_open: true,
            is_24_hours: false,
            created_at: now,
            updated_at: now,
        }
    }

    fn at(s: &str) -> NaiveTime {
        NaiveTime::parse_from_str(s, "%H:%M").unwrap()
    }

    #[test]
    fn test_formatted_hours() {
        assert_eq!(
            hours(Some("09:00"), Some("17:30")).formatted_hours(),
            "9:00 AM - 5:30 PM"
        );
        assert_eq!(hours(None, None).formatted_hours(), "Hours not set");

        let mut closed = hours(Some("09:00"), Some("17:00"));
        closed.is_open = false;
        assert_eq!(closed.formatted_hours(), "Closed");

        let mut always = hours(None, None);
        always.is_24_hours = true;
        assert_eq!(always.formatted_hours(), "24 Hours");
    }

    #[test]
    fn test_is_open_at_same_day_range() {
        let h = hours(Some("09:00"), Some("17:00"));
        assert!(h.is_open_at(at("09:00")));
        assert!(h.is_open_at(at("12:30")));
        assert!(!h.is_open_at(at("08:59")));
        assert!(!h.is_open_at(at("17:01")));
    }

    #[test]
    fn test_is_open_at_overnight_range() {
        let h = hours(Some("22:00"), Some("02:00"));
        assert!(h.is_open_at(at("23:15")));
        assert!(h.is_open_at(at("01:00")));
        assert!(!h.is_open_at(at("12:00")));
    }

    #[test]
    fn test_missing_times_means_closed() {
        assert!(!hours(Some("09:00"), None).is_open_at(at("10:00")));
    }

    #[test]
    fn test_is_open_on_checks_the_weekday() {
        let h = hours(Some("09:00"), Some("17:00"));
        // 2025-07-11 is a Friday
        let friday_noon = Utc.with_ymd_and_hms(2025, 7, 11, 12, 0, 0).unwrap();
        assert!(h.is_open_on(friday_noon));
        assert!(!h.is_open_on(friday_noon + chrono::Duration::days(1)));
        assert!(!h.is_open_on(friday_noon + chrono::Duration::hours(8)));
    }
}
