pub mod commands;
pub mod tokenizer;
