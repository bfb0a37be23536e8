//! Full health/detail records for bulk (`--get all`) requests
//!
//! Required fields fail the whole request when missing. Optional fields are
//! absent on some firmware versions and are omitted from the output when the
//! payload does not carry them or carries an empty or non-numeric value for a
//! numeric field.

use std::collections::BTreeMap;

use serde::Serialize;

use super::ComponentKind;
use crate::error::ApiError;
use crate::xml::{Document, Object};

type Result<T> = std::result::Result<T, ApiError>;

/// Identifier → record, serialized as one compact JSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DetailMap {
    Disks(BTreeMap<String, DiskDetail>),
    Vdisks(BTreeMap<String, VdiskDetail>),
    Controllers(BTreeMap<String, ControllerDetail>),
    Enclosures(BTreeMap<String, EnclosureDetail>),
}

impl DetailMap {
    /// Number of distinct identifiers
    pub fn len(&self) -> usize {
        match self {
            DetailMap::Disks(m) => m.len(),
            DetailMap::Vdisks(m) => m.len(),
            DetailMap::Controllers(m) => m.len(),
            DetailMap::Enclosures(m) => m.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_hours: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VdiskDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redundancy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flash: Option<FlashDetail>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub ports: BTreeMap<String, PortDetail>,
}

/// Controller compact-flash module
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlashDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Host port of a controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sfp_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnclosureDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub power_supplies: BTreeMap<String, PowerSupplyDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerSupplyDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_num: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fans: BTreeMap<String, FanDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FanDetail {
    pub health: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<u64>,
}

/// Collect a detail record for every object of `kind`.
///
/// A duplicated identifier keeps the record of the last object carrying it.
pub fn map_detail(document: &Document, kind: ComponentKind) -> Result<DetailMap> {
    let objects = document.objects_named(kind.object_name());
    let map = match kind {
        ComponentKind::Disks => DetailMap::Disks(keyed(objects, kind.id_property(), disk)?),
        ComponentKind::Vdisks => DetailMap::Vdisks(keyed(objects, kind.id_property(), vdisk)?),
        ComponentKind::Controllers => {
            DetailMap::Controllers(keyed(objects, kind.id_property(), controller)?)
        }
        ComponentKind::Enclosures => {
            DetailMap::Enclosures(keyed(objects, kind.id_property(), enclosure)?)
        }
    };

    log::debug!("Collected details for {} {}", map.len(), kind);
    Ok(map)
}

/// Map objects by their `id` property, later duplicates overwriting earlier ones
fn keyed<'a, T>(
    objects: impl Iterator<Item = &'a Object>,
    id: &str,
    build: impl Fn(&Object) -> Result<T>,
) -> Result<BTreeMap<String, T>> {
    let mut map = BTreeMap::new();
    for object in objects {
        let key = object.require(id)?.to_string();
        if map.insert(key.clone(), build(object)?).is_some() {
            log::warn!("Duplicate {} '{}' in response, keeping the last one", id, key);
        }
    }
    Ok(map)
}

fn optional(object: &Object, name: &str) -> Option<String> {
    object.property(name).map(str::to_string)
}

fn disk(object: &Object) -> Result<DiskDetail> {
    Ok(DiskDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        error: optional(object, "error"),
        temperature: object.numeric("temperature-numeric"),
        work_hours: object.numeric("power-on-hours"),
    })
}

fn vdisk(object: &Object) -> Result<VdiskDetail> {
    Ok(VdiskDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        status: optional(object, "status"),
    })
}

fn controller(object: &Object) -> Result<ControllerDetail> {
    let flash = match object.child_by_basetype("compact-flash") {
        Some(cf) => Some(FlashDetail {
            health: cf.require("health")?.to_string(),
            status: optional(cf, "status"),
        }),
        None => None,
    };

    Ok(ControllerDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        status: optional(object, "status"),
        redundancy: optional(object, "redundancy-status"),
        flash,
        ports: keyed(object.children_named("ports"), "port", port)?,
    })
}

fn port(object: &Object) -> Result<PortDetail> {
    Ok(PortDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        status: optional(object, "status"),
        sfp_status: object
            .child_named("port-details")
            .and_then(|details| optional(details, "sfp-status")),
    })
}

fn enclosure(object: &Object) -> Result<EnclosureDetail> {
    Ok(EnclosureDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        status: optional(object, "status"),
        power_supplies: keyed(
            object.children_named("power-supplies"),
            "durable-id",
            power_supply,
        )?,
    })
}

fn power_supply(object: &Object) -> Result<PowerSupplyDetail> {
    Ok(PowerSupplyDetail {
        health: object.require("health")?.to_string(),
        health_num: object.numeric("health-numeric"),
        status: optional(object, "status"),
        fans: keyed(object.children_named("fan-details"), "durable-id", fan)?,
    })
}

fn fan(object: &Object) -> Result<FanDetail> {
    Ok(FanDetail {
        health: object.require("health")?.to_string(),
        status: optional(object, "status"),
        speed: object.numeric("speed"),
    })
}
