//! Prompt templates, embedded at compile time.
//!
//! Templates are rendered with strict undefined handling: a placeholder
//! the caller forgot to supply is an error, not an empty string.

use minijinja::{context, Environment, UndefinedBehavior};

use crate::error::Result;

const DECOMPOSE_TEMPLATE: &str = include_str!("prompts/decompose.txt");
const SQL_SYSTEM_TEMPLATE: &str = include_str!("prompts/sql_system.txt");
const ANSWER_TEMPLATE: &str = include_str!("prompts/answer.txt");

fn environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env
}

fn render(template: &str, ctx: minijinja::Value) -> Result<String> {
    let env = environment();
    Ok(env.template_from_str(template)?.render(ctx)?)
}

pub fn decompose_prompt(question: &str) -> Result<String> {
    render(DECOMPOSE_TEMPLATE, context! { question })
}

pub fn sql_system_prompt(schema: &str, collection_id: i64) -> Result<String> {
    render(SQL_SYSTEM_TEMPLATE, context! { schema, collection_id })
}

pub fn answer_prompt(question: &str, context: &str) -> Result<String> {
    render(ANSWER_TEMPLATE, context! { question, context })
}
