//! pinback-core: filter state, query composition, layout, and fetch coordination

pub mod catalog;
pub mod color;
pub mod dimension;
pub mod fetch;
pub mod filter;
pub mod layout;
pub mod query;
pub mod record;
pub mod session;

pub use catalog::{Catalog, FetchError, HttpCatalog, MemCatalog, DEFAULT_BASE_URL};
pub use color::{hue_distance, ColorParseError, RgbHex};
pub use dimension::parse_dimension;
pub use fetch::{Generation, Outcome, RequestTracker, ResultFetcher, SuggestionFetcher, Ticket};
pub use filter::{Category, FilterAction, FilterState, RenderMode};
pub use layout::{layout, Empty, Layout, Placed, RenderBox};
pub use query::{compose_query, ColorMatch, Query, YearRange};
pub use record::ImageRecord;
pub use session::{Completion, Session, SessionConfig};
