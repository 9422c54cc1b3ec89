mod aggregate;
mod cascade;
mod selection;
mod viewport;

pub use aggregate::{summarize, summarize_with_total, Row, TOTAL_ROW_ID};
pub use cascade::{CascadeConfig, Event, Session, SessionState};
pub use selection::SelectionSet;
pub use viewport::{expand_bounds, PanelId, Viewport, ViewportSync};
