//! Question entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of answer a question accepts. Stored and exchanged as a two-letter code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(2))")]
pub enum QuestionType {
    /// Free text answer.
    #[sea_orm(string_value = "TX")]
    #[serde(rename = "TX")]
    Text,
    /// Exactly one option, given as a single digit.
    #[sea_orm(string_value = "SO")]
    #[serde(rename = "SO")]
    SingleOption,
    /// Several options, given as whitespace separated digits.
    #[sea_orm(string_value = "MO")]
    #[serde(rename = "MO")]
    MultipleOptions,
}

impl QuestionType {
    /// Wire code of this type.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Text => "TX",
            Self::SingleOption => "SO",
            Self::MultipleOptions => "MO",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Text => "Text answer",
            Self::SingleOption => "Select single option",
            Self::MultipleOptions => "Select several of the options",
        }
    }

    /// Parse a wire code. Codes are case sensitive.
    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "TX" => Some(Self::Text),
            "SO" => Some(Self::SingleOption),
            "MO" => Some(Self::MultipleOptions),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "question")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Owning poll.
    #[sea_orm(indexed)]
    pub poll_id: i64,

    #[sea_orm(column_type = "Text")]
    pub text: String,

    #[sea_orm(column_name = "type")]
    pub question_type: QuestionType,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id"
    )]
    Poll,

    #[sea_orm(has_many = "super::answer::Entity")]
    Answers,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::answer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Answers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
