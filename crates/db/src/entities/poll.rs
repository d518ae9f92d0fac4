//! Poll entity: a time-windowed questionnaire.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    #[sea_orm(unique)]
    pub title: String,

    /// First day the poll is visible to the public (inclusive).
    pub start_date: Date,

    /// Last day the poll is visible to the public (inclusive).
    pub end_date: Date,

    #[sea_orm(column_type = "Text")]
    pub description: String,
}

impl Model {
    /// Whether `today` falls inside `[start_date, end_date]`.
    #[must_use]
    pub fn is_active_on(&self, today: Date) -> bool {
        self.start_date <= today && today <= self.end_date
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::question::Entity")]
    Questions,
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Questions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap_or_default()
    }

    #[test]
    fn test_active_window_is_inclusive() {
        let poll = Model {
            id: 1,
            title: "Poll".to_string(),
            start_date: date(2020, 1, 1),
            end_date: date(2020, 2, 1),
            description: String::new(),
        };

        assert!(poll.is_active_on(date(2020, 1, 1)));
        assert!(poll.is_active_on(date(2020, 1, 15)));
        assert!(poll.is_active_on(date(2020, 2, 1)));
        assert!(!poll.is_active_on(date(2019, 12, 31)));
        assert!(!poll.is_active_on(date(2020, 2, 2)));
    }
}
