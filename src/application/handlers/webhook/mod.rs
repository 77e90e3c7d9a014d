//! Provider webhook handlers.

mod process_provider_event;

pub use process_provider_event::{
    ProcessProviderEventCommand, ProcessProviderEventHandler, ProcessProviderEventResult,
};
