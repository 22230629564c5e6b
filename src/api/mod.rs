//! Per-resource API surface.
//!
//! Thin generated-style methods: build the request options, call the
//! dispatcher, deserialize. All state machines live below this layer.

mod instruments;
mod portfolios;

pub use instruments::{
    Instrument, InstrumentDefinition, InstrumentsApi, UpsertInstrumentsResponse,
};
pub use portfolios::{DeletedEntityResponse, PagedPortfolios, Portfolio, PortfoliosApi, ResourceId};
