pub mod epg_merge;
pub mod playlist;
pub mod publish_content;

pub use epg_merge::EpgMerger;
pub use playlist::{PlaylistBuilder, PlaylistDocument, PlaylistEntry};
pub use publish_content::publish;
