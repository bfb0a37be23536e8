//! Single-item health lookup

use super::ComponentKind;
use crate::error::ApiError;
use crate::xml::Document;

/// Health string of `item`.
///
/// Disk and vdisk responses are already scoped to the requested item, so the
/// first object's `health` is used. Controller and enclosure responses list
/// every item and are searched by identifier.
pub fn map_health(document: &Document, kind: ComponentKind, item: &str) -> Result<String, ApiError> {
    if kind.supports_item_query() {
        return document
            .object_named(kind.object_name())
            .and_then(|object| object.property("health"))
            .map(str::to_string)
            .ok_or_else(|| ApiError::NotFound {
                id: item.to_string(),
                available: Vec::new(),
            });
    }

    let mut available = Vec::new();
    let mut found = None;
    for object in document.objects_named(kind.object_name()) {
        let id = object.require(kind.id_property())?;
        let health = object.require("health")?;
        if id == item {
            // Later duplicates win, same as the bulk mapping
            found = Some(health.to_string());
        }
        available.push(id.to_string());
    }

    found.ok_or_else(|| ApiError::NotFound {
        id: item.to_string(),
        available,
    })
}
