//! egov core library: conversation sessions, LLM client, tool dispatch for the
//! citizen services, and the chat gateway used by the CLI.

pub mod config;
pub mod conversation;
pub mod gateway;
pub mod llm;
pub mod render;
pub mod session;
pub mod tools;
