//! EPG source fetching

pub mod traits;
pub mod xmltv_epg;

pub use traits::EpgFetcher;
pub use xmltv_epg::HttpEpgFetcher;
