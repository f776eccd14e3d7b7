//! Entry shapes: the page markup variants that list one video each.
//!
//! Adding a shape is a table edit: a new [`EntryShape`] variant and its
//! [`ShapeDescriptor`] row at the same index.

use std::fmt;

use crate::dom::{Selector, SelectorError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryShape {
    /// Home feed grid.
    RichGrid,
    /// Search results.
    List,
    /// Channel "Videos" tab.
    ChannelGrid,
    /// Watch-page sidebar and history.
    Compact,
    /// Playlist page and playlist panel.
    Playlist,
    /// View-model markup rolled out to newer layouts.
    Lockup,
}

pub struct ShapeDescriptor {
    pub shape: EntryShape,
    /// Matches the entry container.
    pub container: &'static str,
    /// Element inside the container the control is attached to.
    pub anchor: &'static str,
    /// Shape-specific links that carry the video id in `v`.
    pub link: &'static str,
    /// Attributes holding a bare video id, in preference order.
    pub id_attributes: &'static [&'static str],
}

const THUMBNAIL_ANCHOR: &str = r#"a[href*="/watch?v="], ytd-thumbnail, [data-video-id]"#;

/// Generic watch link, tried before the shape's own link selector.
pub const WATCH_LINK: &str = r#"a[href*="watch?v="]"#;

/// Indexed by `EntryShape as usize`. Scans visit shapes in this order.
pub const SHAPES: &[ShapeDescriptor] = &[
    ShapeDescriptor {
        shape: EntryShape::RichGrid,
        container: "ytd-rich-item-renderer",
        anchor: THUMBNAIL_ANCHOR,
        link: "a#video-title-link, a#thumbnail",
        id_attributes: &["data-video-id"],
    },
    ShapeDescriptor {
        shape: EntryShape::List,
        container: "ytd-video-renderer",
        anchor: THUMBNAIL_ANCHOR,
        link: "a#video-title, a#thumbnail",
        id_attributes: &["data-video-id"],
    },
    ShapeDescriptor {
        shape: EntryShape::ChannelGrid,
        container: "ytd-grid-video-renderer",
        anchor: THUMBNAIL_ANCHOR,
        link: "a#video-title, a#thumbnail",
        id_attributes: &["data-video-id"],
    },
    ShapeDescriptor {
        shape: EntryShape::Compact,
        container: "ytd-compact-video-renderer",
        anchor: THUMBNAIL_ANCHOR,
        link: "a.yt-simple-endpoint, a#thumbnail",
        id_attributes: &["data-video-id"],
    },
    ShapeDescriptor {
        shape: EntryShape::Playlist,
        container: "ytd-playlist-video-renderer, ytd-playlist-panel-video-renderer",
        anchor: THUMBNAIL_ANCHOR,
        link: "a#wc-endpoint, a#thumbnail",
        id_attributes: &["data-video-id", "video-id"],
    },
    ShapeDescriptor {
        shape: EntryShape::Lockup,
        container: "yt-lockup-view-model",
        anchor: r#"a[href*="/watch?v="], yt-thumbnail-view-model, [data-video-id]"#,
        link: r#"a[href^="/watch"], a.yt-lockup-metadata-view-model__title"#,
        id_attributes: &["data-video-id", "data-content-id"],
    },
];

impl EntryShape {
    pub const ALL: [EntryShape; 6] = [
        EntryShape::RichGrid,
        EntryShape::List,
        EntryShape::ChannelGrid,
        EntryShape::Compact,
        EntryShape::Playlist,
        EntryShape::Lockup,
    ];

    pub fn descriptor(self) -> &'static ShapeDescriptor {
        &SHAPES[self as usize]
    }

    pub fn name(self) -> &'static str {
        match self {
            EntryShape::RichGrid => "rich-grid",
            EntryShape::List => "list",
            EntryShape::ChannelGrid => "channel-grid",
            EntryShape::Compact => "compact",
            EntryShape::Playlist => "playlist",
            EntryShape::Lockup => "lockup",
        }
    }
}

impl fmt::Display for EntryShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A descriptor with its selectors parsed.
pub struct CompiledShape {
    pub shape: EntryShape,
    pub container: Selector,
    pub anchor: Selector,
    /// Generic watch link plus the shape's link selector.
    pub link: Selector,
    pub id_attributes: &'static [&'static str],
}

impl CompiledShape {
    pub fn compile(desc: &ShapeDescriptor) -> Result<Self, SelectorError> {
        Ok(Self {
            shape: desc.shape,
            container: Selector::parse(desc.container)?,
            anchor: Selector::parse(desc.anchor)?,
            link: Selector::parse(&format!("{}, {}", WATCH_LINK, desc.link))?,
            id_attributes: desc.id_attributes,
        })
    }

    pub fn compile_all() -> Result<Vec<Self>, SelectorError> {
        SHAPES.iter().map(Self::compile).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_variant() {
        assert_eq!(SHAPES.len(), EntryShape::ALL.len());
        for shape in EntryShape::ALL {
            assert_eq!(shape.descriptor().shape, shape);
        }
    }

    #[test]
    fn every_descriptor_compiles() {
        let compiled = CompiledShape::compile_all().unwrap();
        assert_eq!(compiled.len(), SHAPES.len());
        for shape in &compiled {
            assert!(!shape.id_attributes.is_empty(), "{}", shape.shape);
        }
    }
}
