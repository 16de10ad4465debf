//! Loaders for the local inputs of a run

pub mod channel_catalog;
pub mod epg_source_list;

pub use channel_catalog::ChannelCatalog;
pub use epg_source_list::EpgSourceList;
