//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod ai_answer;
pub mod answer;
pub mod point_entry;
pub mod profile;
pub mod question;

// Re-export specific types to avoid conflicts
pub use ai_answer::{Column as AiAnswerColumn, Entity as AiAnswer, Model as AiAnswerModel};
pub use answer::{Column as AnswerColumn, Entity as Answer, Model as AnswerModel};
pub use point_entry::{Column as PointEntryColumn, Entity as PointEntry, Model as PointEntryModel};
pub use profile::{Column as ProfileColumn, Entity as Profile, Model as ProfileModel};
pub use question::{Column as QuestionColumn, Entity as Question, Model as QuestionModel};
