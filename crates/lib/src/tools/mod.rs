//! Tool layer: tool-call wire format, static lookup tables and the citizen services executor.

mod call;
mod lookup;
mod services;

pub use call::{decode, extract_payload, ToolCallError, ToolRequest, TOOL_CALL_CLOSE, TOOL_CALL_OPEN};
pub use services::{CitizenServices, GrievanceIds, ToolExecutor};
