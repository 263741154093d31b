//! crates/inc_core/src/org.rs
//! Organization directory: seller→store assignment and the two management
//! chains (ASE→ZSE on the service side, ABM→ZSM on the business side).
//!
//! The directory is validated once at construction; lookups afterwards are
//! infallible map reads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{OrgUnitId, SellerId, StoreId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OrgRole {
    #[serde(rename = "ASE")]
    Ase,
    #[serde(rename = "ZSE")]
    Zse,
    #[serde(rename = "ABM")]
    Abm,
    #[serde(rename = "ZSM")]
    Zsm,
}

impl OrgRole {
    /// Roles that own stores directly.
    #[inline]
    pub fn owns_stores(self) -> bool {
        matches!(self, OrgRole::Ase | OrgRole::Abm)
    }

    /// Role a child of this role must have, if any.
    pub fn child_role(self) -> Option<OrgRole> {
        match self {
            OrgRole::Zse => Some(OrgRole::Ase),
            OrgRole::Zsm => Some(OrgRole::Abm),
            OrgRole::Ase | OrgRole::Abm => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrgRole::Ase => "ASE",
            OrgRole::Zse => "ZSE",
            OrgRole::Abm => "ABM",
            OrgRole::Zsm => "ZSM",
        }
    }
}

impl core::fmt::Display for OrgRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreInfo {
    pub store_id: StoreId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub sellers: Vec<SellerId>,
    /// Declared seller count for the period; falls back to `sellers.len()`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_sellers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ase: Option<OrgUnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abm: Option<OrgUnitId>,
}

impl StoreInfo {
    /// Seller count used to scale thresholds in aggregate mode (always ≥ 1).
    pub fn seller_count(&self) -> u32 {
        let assigned = u32::try_from(self.sellers.len()).unwrap_or(u32::MAX);
        self.number_of_sellers.unwrap_or(assigned).max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OrgUnit {
    pub id: OrgUnitId,
    pub role: OrgRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<OrgUnitId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct DirectoryWire {
    #[serde(default)]
    stores: Vec<StoreInfo>,
    #[serde(default)]
    units: Vec<OrgUnit>,
}

/// Validated org directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DirectoryWire", into = "DirectoryWire")]
pub struct OrgDirectory {
    stores: BTreeMap<StoreId, StoreInfo>,
    units: BTreeMap<OrgUnitId, OrgUnit>,
    seller_index: BTreeMap<SellerId, StoreId>,
}

impl TryFrom<DirectoryWire> for OrgDirectory {
    type Error = CoreError;
    fn try_from(w: DirectoryWire) -> Result<Self, Self::Error> {
        OrgDirectory::from_parts(w.stores, w.units)
    }
}

impl From<OrgDirectory> for DirectoryWire {
    fn from(d: OrgDirectory) -> Self {
        DirectoryWire {
            stores: d.stores.into_values().collect(),
            units: d.units.into_values().collect(),
        }
    }
}

impl OrgDirectory {
    /// Build and validate: unique ids, resolvable references, role-correct
    /// parents and store owners, and each seller assigned to one store only.
    pub fn from_parts(stores: Vec<StoreInfo>, units: Vec<OrgUnit>) -> Result<Self, CoreError> {
        let mut unit_map = BTreeMap::new();
        for u in units {
            let id = u.id.clone();
            if unit_map.insert(id.clone(), u).is_some() {
                return Err(CoreError::InvalidId(format!("duplicate org unit {id}")));
            }
        }
        for u in unit_map.values() {
            match (&u.parent, u.role.owns_stores()) {
                (Some(p), true) => {
                    let parent = unit_map
                        .get(p)
                        .ok_or_else(|| CoreError::UnknownReference(format!("{}.parent={p}", u.id)))?;
                    if parent.role.child_role() != Some(u.role) {
                        return Err(CoreError::UnknownReference(format!(
                            "{} ({}) cannot report to {} ({})",
                            u.id, u.role, parent.id, parent.role
                        )));
                    }
                }
                (Some(p), false) => {
                    return Err(CoreError::UnknownReference(format!(
                        "{} ({}) is a top-level role but has parent {p}",
                        u.id, u.role
                    )));
                }
                (None, _) => {}
            }
        }

        let mut store_map = BTreeMap::new();
        let mut seller_index = BTreeMap::new();
        for s in stores {
            for (owner, role) in [(&s.ase, OrgRole::Ase), (&s.abm, OrgRole::Abm)] {
                if let Some(id) = owner {
                    match unit_map.get(id) {
                        Some(u) if u.role == role => {}
                        Some(u) => {
                            return Err(CoreError::UnknownReference(format!(
                                "store {} expects {role} but {id} is {}",
                                s.store_id, u.role
                            )))
                        }
                        None => {
                            return Err(CoreError::UnknownReference(format!(
                                "store {} references unknown {role} {id}",
                                s.store_id
                            )))
                        }
                    }
                }
            }
            if s.number_of_sellers == Some(0) {
                return Err(CoreError::DomainOutOfRange("number_of_sellers (>= 1)"));
            }
            for seller in &s.sellers {
                if let Some(prev) = seller_index.insert(seller.clone(), s.store_id.clone()) {
                    return Err(CoreError::InvalidId(format!(
                        "seller {seller} assigned to both {prev} and {}",
                        s.store_id
                    )));
                }
            }
            let id = s.store_id.clone();
            if store_map.insert(id.clone(), s).is_some() {
                return Err(CoreError::InvalidId(format!("duplicate store {id}")));
            }
        }

        Ok(OrgDirectory { stores: store_map, units: unit_map, seller_index })
    }

    #[inline]
    pub fn store(&self, id: &StoreId) -> Option<&StoreInfo> {
        self.stores.get(id)
    }

    #[inline]
    pub fn unit(&self, id: &OrgUnitId) -> Option<&OrgUnit> {
        self.units.get(id)
    }

    #[inline]
    pub fn seller_store(&self, id: &SellerId) -> Option<&StoreId> {
        self.seller_index.get(id)
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreInfo> {
        self.stores.values()
    }

    pub fn units(&self) -> impl Iterator<Item = &OrgUnit> {
        self.units.values()
    }

    pub fn sellers(&self) -> impl Iterator<Item = &SellerId> {
        self.seller_index.keys()
    }

    /// Direct children of a ZSE/ZSM, ordered by id. Empty for store-owning roles.
    pub fn children(&self, id: &OrgUnitId) -> Vec<&OrgUnit> {
        self.units
            .values()
            .filter(|u| u.parent.as_ref() == Some(id))
            .collect()
    }

    /// Stores directly owned by an ASE/ABM, ordered by id.
    pub fn direct_stores(&self, id: &OrgUnitId) -> Vec<&StoreId> {
        let Some(unit) = self.units.get(id) else {
            return Vec::new();
        };
        self.stores
            .values()
            .filter(|s| match unit.role {
                OrgRole::Ase => s.ase.as_ref() == Some(id),
                OrgRole::Abm => s.abm.as_ref() == Some(id),
                OrgRole::Zse | OrgRole::Zsm => false,
            })
            .map(|s| &s.store_id)
            .collect()
    }

    /// Every store under a unit, through at most one level of children. Ordered by id.
    pub fn stores_of(&self, id: &OrgUnitId) -> Vec<&StoreId> {
        let Some(unit) = self.units.get(id) else {
            return Vec::new();
        };
        if unit.role.owns_stores() {
            return self.direct_stores(id);
        }
        let mut out: Vec<&StoreId> = self
            .children(id)
            .into_iter()
            .flat_map(|c| self.direct_stores(&c.id))
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
