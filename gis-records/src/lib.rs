//! Wire records exchanged with the network GIS REST API.
//!
//! Everything here is consumed, not owned: the server is authoritative and
//! these types only describe what it sends back and what writes look like.

pub mod envelope;
pub mod lenient;
pub mod payload;
pub mod records;
pub mod timestamp;

pub use envelope::{Envelope, EnvelopeError, Pagination};
pub use payload::{IncidentInput, StationInput, ValidationError};
pub use records::{
    AxisCount, FilterOptions, Incident, IncidentStats, IncidentType, IncidentTypeStats, Location,
    Segment, SegmentStats, Station, StationStats, Statistics, StatusCount, TypeCount,
};
