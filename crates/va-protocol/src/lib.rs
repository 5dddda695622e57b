//! Response Parser + Chat Client contract.

mod client;
mod parser;

pub use client::{ChatClient, OpenAiCompatClient};
pub use parser::parse_model_response;
