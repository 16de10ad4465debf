//! M3U playlist generation

use tracing::debug;

use crate::models::Channel;
use crate::services::ChannelCatalog;
use crate::utils::url::UrlUtils;

/// One `#EXTINF` entry and its stream URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub tvg_id: String,
    pub tvg_logo: String,
    pub group_title: String,
    pub name: String,
    pub stream_url: String,
}

impl PlaylistEntry {
    /// Entry for `channel`, or `None` when it has no stream URL
    pub fn from_channel(channel: &Channel) -> Option<Self> {
        let stream_url = channel.stream_url()?;
        Some(Self {
            tvg_id: channel.tvg_id().unwrap_or_default().to_string(),
            tvg_logo: channel.tvg_logo().to_string(),
            group_title: channel.category().to_string(),
            name: channel.display_name().to_string(),
            stream_url: stream_url.to_string(),
        })
    }

    pub fn extinf_line(&self) -> String {
        format!(
            r#"#EXTINF:-1 tvg-id="{}" tvg-logo="{}" group-title="{}",{}"#,
            self.tvg_id, self.tvg_logo, self.group_title, self.name
        )
    }
}

/// A rendered playlist: header plus entries in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistDocument {
    pub epg_url: String,
    pub entries: Vec<PlaylistEntry>,
}

impl PlaylistDocument {
    pub fn header_line(&self) -> String {
        format!(r#"#EXTM3U x-tvg-url="{}""#, self.epg_url)
    }

    /// Lines joined with `\n`, without a trailing newline
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(1 + self.entries.len() * 2);
        lines.push(self.header_line());
        for entry in &self.entries {
            lines.push(entry.extinf_line());
            lines.push(entry.stream_url.clone());
        }
        lines.join("\n")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct PlaylistBuilder;

impl PlaylistBuilder {
    /// Build the playlist for an already sorted catalog
    pub fn build(catalog: &ChannelCatalog, epg_reference_url: &str) -> PlaylistDocument {
        let entries: Vec<PlaylistEntry> = catalog.iter().filter_map(PlaylistEntry::from_channel).collect();
        debug!(
            "Built playlist with {} entries ({} channels without stream URL omitted)",
            entries.len(),
            catalog.len() - entries.len()
        );
        PlaylistDocument {
            epg_url: epg_reference_url.to_string(),
            entries,
        }
    }

    /// `<base_url>/<epg_filename>` with a single separating slash
    pub fn epg_reference_url(base_url: &str, epg_filename: &str) -> String {
        UrlUtils::join_path(base_url, epg_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog(json: &str) -> ChannelCatalog {
        let mut catalog = ChannelCatalog::from_json(json).unwrap();
        catalog.sort_in_place();
        catalog
    }

    #[test]
    fn test_render_matches_expected_layout() {
        let catalog = catalog(
            r#"[
                {"name":"News 10","tvg_id":"n10","stream_url":"http://x/n10","category":"News"},
                {"name":"News 2","tvg_id":"n2","tvg_logo":"http://logo/n2.png","stream_url":"http://x/n2"}
            ]"#,
        );
        let playlist = PlaylistBuilder::build(&catalog, "https://example.com/epg.xml");

        assert_eq!(
            playlist.render(),
            [
                r#"#EXTM3U x-tvg-url="https://example.com/epg.xml""#,
                r#"#EXTINF:-1 tvg-id="n2" tvg-logo="http://logo/n2.png" group-title="Uncategorized",News 2"#,
                "http://x/n2",
                r#"#EXTINF:-1 tvg-id="n10" tvg-logo="" group-title="News",News 10"#,
                "http://x/n10",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_channels_without_stream_url_are_omitted() {
        let catalog = catalog(
            r#"[{"name":"A","stream_url":""},{"name":"B"},{"name":"C","stream_url":"http://x/c"}]"#,
        );
        let playlist = PlaylistBuilder::build(&catalog, "https://example.com/epg.xml");

        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.render().lines().count(), 3);
        assert!(!playlist.render().contains(",A"));
    }

    #[test]
    fn test_missing_name_renders_placeholder() {
        let catalog = catalog(r#"[{"stream_url":"http://x/1","category":""}]"#);
        let playlist = PlaylistBuilder::build(&catalog, "u");
        assert_eq!(
            playlist.entries[0].extinf_line(),
            r#"#EXTINF:-1 tvg-id="" tvg-logo="" group-title="",Unknown Channel"#
        );
    }

    #[test]
    fn test_empty_catalog_renders_header_only() {
        let playlist = PlaylistBuilder::build(&ChannelCatalog::default(), "https://example.com/epg.xml");
        assert!(playlist.is_empty());
        assert_eq!(playlist.render(), r#"#EXTM3U x-tvg-url="https://example.com/epg.xml""#);
    }

    #[test]
    fn test_epg_reference_url() {
        assert_eq!(
            PlaylistBuilder::epg_reference_url("https://example.com/", "epg.xml"),
            "https://example.com/epg.xml"
        );
    }
}
