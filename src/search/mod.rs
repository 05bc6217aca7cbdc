//! Multi-entity search: request/response types, the index gateway boundary,
//! facet aggregation, highlighting, and the engine that ties them together.

pub mod engine;
pub mod facet;
pub mod gateway;
pub mod highlight;
pub mod request;
pub mod response;

pub use engine::SearchEngine;
pub use facet::{FacetAggregator, FacetCount, FacetCounts, PriceFacet};
pub use gateway::{GatewayRequest, IndexGateway, MemoryIndexGateway, RawHit};
pub use highlight::Highlighter;
pub use request::{EntityScope, FieldFilter, MultiEntitySearchRequest, RangeFilter};
pub use response::{MultiEntitySearchResponse, NlpMetadata, PaginationInfo, SearchResultItem};
