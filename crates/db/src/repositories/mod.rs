//! Data access repositories.

mod answer;
mod poll;
mod question;
mod user;

pub use answer::AnswerRepository;
pub use poll::PollRepository;
pub use question::QuestionRepository;
pub use user::UserRepository;
