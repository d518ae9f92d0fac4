//! Database entities.

pub mod answer;
pub mod poll;
pub mod question;
pub mod user;

pub use answer::Entity as Answer;
pub use poll::Entity as Poll;
pub use question::{Entity as Question, QuestionType};
pub use user::Entity as User;
