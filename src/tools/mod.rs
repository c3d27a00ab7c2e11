//! Tool abstractions and the built-in tools

use std::time::Duration;

pub mod flights;
pub mod search;
pub mod serpapi;
pub mod tool;
pub mod weather;
pub mod youtube;

pub use flights::{FlightRecord, FlightSearchTool};
pub use search::WebSearchTool;
pub use serpapi::SerpApiClient;
pub use tool::{Tool, ToolFuture, ToolRegistry, ToolResult};
pub use weather::{WeatherReport, WeatherTool};
pub use youtube::{TranscriptSegment, TranscriptTool};

/// Per-request timeout used by the built-in tools unless overridden
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);
