//! Zabbix low-level discovery records

use serde::Serialize;

use super::ComponentKind;
use crate::error::ApiError;
use crate::xml::{Document, Object};

/// Discovery output: `{"data": [...]}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryList {
    pub data: Vec<DiscoveryRecord>,
}

/// One discovered item, keyed by LLD macro names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiscoveryRecord {
    Disk(DiskDiscovery),
    Vdisk(VdiskDiscovery),
    Controller(ControllerDiscovery),
    Enclosure(EnclosureDiscovery),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskDiscovery {
    #[serde(rename = "{#DISKLOCATION}")]
    pub location: String,
    #[serde(rename = "{#DISKSN}")]
    pub serial_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VdiskDiscovery {
    #[serde(rename = "{#VDISKNAME}")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControllerDiscovery {
    #[serde(rename = "{#CTRLID}")]
    pub id: String,
    #[serde(rename = "{#CTRLSN}")]
    pub serial_number: String,
    #[serde(rename = "{#CTRLIP}")]
    pub ip_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnclosureDiscovery {
    #[serde(rename = "{#ENCLOSUREID}")]
    pub id: String,
    #[serde(rename = "{#ENCLOSURESN}")]
    pub serial_number: String,
}

/// Build discovery records for every object of `kind`, in payload order.
pub fn map_discovery(document: &Document, kind: ComponentKind) -> Result<DiscoveryList, ApiError> {
    let data = document
        .objects_named(kind.object_name())
        .map(|object| discovery_record(object, kind))
        .collect::<Result<Vec<_>, _>>()?;

    log::debug!("Discovered {} {}", data.len(), kind);
    Ok(DiscoveryList { data })
}

fn discovery_record(object: &Object, kind: ComponentKind) -> Result<DiscoveryRecord, ApiError> {
    let id = object.require(kind.id_property())?.to_string();

    let record = match kind {
        ComponentKind::Disks => DiscoveryRecord::Disk(DiskDiscovery {
            location: id,
            serial_number: object.require("serial-number")?.to_string(),
        }),
        ComponentKind::Vdisks => DiscoveryRecord::Vdisk(VdiskDiscovery { name: id }),
        ComponentKind::Controllers => DiscoveryRecord::Controller(ControllerDiscovery {
            id,
            serial_number: object.require("serial-number")?.to_string(),
            ip_address: object.require("ip-address")?.to_string(),
        }),
        ComponentKind::Enclosures => DiscoveryRecord::Enclosure(EnclosureDiscovery {
            id,
            serial_number: object.require("midplane-serial-number")?.to_string(),
        }),
    };
    Ok(record)
}
