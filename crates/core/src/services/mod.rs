//! Business logic services.

#![allow(missing_docs)]

pub mod answer;
pub mod auth;
pub mod poll;
pub mod question;

pub use answer::{AnswerInput, AnswerScope, AnswerService};
pub use auth::{AccessToken, AuthService, Identity, NewUserInput, TokenPair};
pub use poll::{Audience, PollInput, PollService};
pub use question::{QuestionInput, QuestionService};
