//! Storage component kinds and the mappers that turn API payloads into
//! monitoring records

pub mod detail;
pub mod discovery;
pub mod health;

use std::fmt;

pub use detail::map_detail;
pub use discovery::map_discovery;
pub use health::map_health;

/// Storage component class handled by one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ComponentKind {
    /// Physical drives
    Disks,
    /// Virtual disks
    Vdisks,
    /// RAID controllers
    Controllers,
    /// Drive enclosures
    Enclosures,
}

impl ComponentKind {
    /// Segment used in `/api/show/<segment>`
    pub fn api_name(self) -> &'static str {
        match self {
            ComponentKind::Disks => "disks",
            ComponentKind::Vdisks => "vdisks",
            ComponentKind::Controllers => "controllers",
            ComponentKind::Enclosures => "enclosures",
        }
    }

    /// `name` attribute of the payload objects describing this kind
    pub fn object_name(self) -> &'static str {
        match self {
            ComponentKind::Disks => "drive",
            ComponentKind::Vdisks => "virtual-disk",
            ComponentKind::Controllers => "controllers",
            ComponentKind::Enclosures => "enclosures",
        }
    }

    /// Property that identifies one item of this kind
    pub fn id_property(self) -> &'static str {
        match self {
            ComponentKind::Disks => "location",
            ComponentKind::Vdisks => "name",
            ComponentKind::Controllers => "controller-id",
            ComponentKind::Enclosures => "enclosure-id",
        }
    }

    /// Whether the API can scope a `show` request to a single item
    pub fn supports_item_query(self) -> bool {
        matches!(self, ComponentKind::Disks | ComponentKind::Vdisks)
    }

    /// Path segments (below `/api/`) listing every item of this kind
    pub fn show_path(self) -> Vec<&'static str> {
        vec!["show", self.api_name()]
    }

    /// Path segments (below `/api/`) used to fetch the health of one item.
    ///
    /// The item is kept as a single segment; the client percent-encodes it.
    /// Controllers and enclosures cannot be queried individually, so the
    /// full list is requested and filtered locally.
    pub fn health_path(self, item: &str) -> Vec<&str> {
        let mut path: Vec<&str> = self.show_path();
        if self.supports_item_query() {
            path.push(item);
        }
        path
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_name())
    }
}
