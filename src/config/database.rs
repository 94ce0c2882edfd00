//! Database connection and table creation using `SeaORM`.
//!
//! Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema always
//! matches the Rust structs without hand-written SQL.

use crate::entities::{AiAnswer, Answer, PointEntry, Profile, Question};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let profile_table = schema.create_table_from_entity(Profile);
    let question_table = schema.create_table_from_entity(Question);
    let answer_table = schema.create_table_from_entity(Answer);
    let ai_answer_table = schema.create_table_from_entity(AiAnswer);
    let point_entry_table = schema.create_table_from_entity(PointEntry);

    db.execute(builder.build(&profile_table)).await?;
    db.execute(builder.build(&question_table)).await?;
    db.execute(builder.build(&answer_table)).await?;
    db.execute(builder.build(&ai_answer_table)).await?;
    db.execute(builder.build(&point_entry_table)).await?;

    Ok(())
}
