use super::forcefield::ForceFieldType;
use super::params::{
    AngleParam, AtomTypeParam, BondParam, ImproperParam, ParamClass, ParamRecord, Parameter,
    TorsionParam,
};
use super::policy::ErrorPolicy;
use indexmap::IndexMap;
use thiserror::Error;
use tracing::warn;

/// Identity-keyed table iterating in insertion order.
pub type OrderedMap<V> = IndexMap<String, V>;

/// What happened to a record submitted to [`ParameterStore::merge`].
#[derive(Debug, Clone, PartialEq)]
pub enum MergeOutcome<T> {
    /// No record with this identity existed.
    Inserted,
    /// An equal record already existed and was kept.
    Duplicate,
    /// A conflicting record was replaced; it is handed back for auditing.
    Overwritten(T),
}

impl<T> MergeOutcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MergeOutcome<U> {
        match self {
            MergeOutcome::Inserted => MergeOutcome::Inserted,
            MergeOutcome::Duplicate => MergeOutcome::Duplicate,
            MergeOutcome::Overwritten(previous) => MergeOutcome::Overwritten(f(previous)),
        }
    }

    pub fn overwritten(self) -> Option<T> {
        match self {
            MergeOutcome::Overwritten(previous) => Some(previous),
            _ => None,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("Conflicting {class} parameters for '{identity}': existing {existing}, new {incoming}")]
    MergeConflict {
        class: ParamClass,
        identity: String,
        existing: String,
        incoming: String,
    },
    #[error("Conflicting values for option '{key}': existing '{existing}', new '{incoming}'")]
    OptionConflict {
        key: String,
        existing: String,
        incoming: String,
    },
}

/// In-memory parameter set: free-form options plus one identity-keyed table per
/// [`ParamClass`].
///
/// Every identity maps to exactly one record. Records only enter through
/// [`merge`](Self::merge), which decides between insert, duplicate and conflict.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    ff_type: ForceFieldType,
    options: OrderedMap<String>,
    atom_types: OrderedMap<AtomTypeParam>,
    bonds: OrderedMap<BondParam>,
    angles: OrderedMap<AngleParam>,
    torsions: OrderedMap<TorsionParam>,
    generic_torsions: OrderedMap<TorsionParam>,
    impropers: OrderedMap<ImproperParam>,
    generic_impropers: OrderedMap<ImproperParam>,
}

impl ParameterStore {
    pub fn new(ff_type: ForceFieldType) -> Self {
        Self {
            ff_type,
            options: OrderedMap::new(),
            atom_types: OrderedMap::new(),
            bonds: OrderedMap::new(),
            angles: OrderedMap::new(),
            torsions: OrderedMap::new(),
            generic_torsions: OrderedMap::new(),
            impropers: OrderedMap::new(),
            generic_impropers: OrderedMap::new(),
        }
    }

    pub fn ff_type(&self) -> ForceFieldType {
        self.ff_type
    }

    /// Merges one record into its table.
    ///
    /// Records are compared through [`Parameter::value_repr`], so comments never cause a
    /// conflict. An equal record is reported as a duplicate and the stored one (with its
    /// comment) is kept.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::MergeConflict`] when a different record is already stored under the
    /// same identity and `policy` is strict. Under the relaxed policy the conflict is logged, the
    /// new record replaces the old one and the old one is returned.
    pub fn merge(
        &mut self,
        record: ParamRecord,
        policy: ErrorPolicy,
    ) -> Result<MergeOutcome<ParamRecord>, StoreError> {
        let class = record.class();
        match record {
            ParamRecord::AtomType(p) => {
                merge_into(&mut self.atom_types, class, p, policy).map(|o| o.map(Into::into))
            }
            ParamRecord::Bond(p) => {
                merge_into(&mut self.bonds, class, p, policy).map(|o| o.map(Into::into))
            }
            ParamRecord::Angle(p) => {
                merge_into(&mut self.angles, class, p, policy).map(|o| o.map(Into::into))
            }
            ParamRecord::Torsion(p) => {
                let table = if class == ParamClass::GenericTorsion {
                    &mut self.generic_torsions
                } else {
                    &mut self.torsions
                };
                merge_into(table, class, p, policy).map(|o| o.map(Into::into))
            }
            ParamRecord::Improper(p) => {
                let table = if class == ParamClass::GenericImproper {
                    &mut self.generic_impropers
                } else {
                    &mut self.impropers
                };
                merge_into(table, class, p, policy).map(|o| o.map(Into::into))
            }
        }
    }

    /// Merges an option with the same duplicate/conflict rules as parameter records.
    pub fn merge_option(
        &mut self,
        key: &str,
        value: &str,
        policy: ErrorPolicy,
    ) -> Result<MergeOutcome<String>, StoreError> {
        match self.options.get(key).cloned() {
            None => {
                self.options.insert(key.to_string(), value.to_string());
                Ok(MergeOutcome::Inserted)
            }
            Some(existing) if existing == value => {
                warn!("Duplicate option '{}' = '{}' ignored", key, value);
                Ok(MergeOutcome::Duplicate)
            }
            Some(existing) => {
                policy.escalate(StoreError::OptionConflict {
                    key: key.to_string(),
                    existing,
                    incoming: value.to_string(),
                })?;
                Ok(self
                    .options
                    .insert(key.to_string(), value.to_string())
                    .map_or(MergeOutcome::Inserted, MergeOutcome::Overwritten))
            }
        }
    }

    /// Sets an option unconditionally, returning the previous value.
    pub fn set_option(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.options.insert(key.into(), value.into())
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(key).map(String::as_str)
    }

    pub fn options(&self) -> &OrderedMap<String> {
        &self.options
    }

    pub fn atom_types(&self) -> &OrderedMap<AtomTypeParam> {
        &self.atom_types
    }

    pub fn bonds(&self) -> &OrderedMap<BondParam> {
        &self.bonds
    }

    pub fn angles(&self) -> &OrderedMap<AngleParam> {
        &self.angles
    }

    pub fn torsions(&self) -> &OrderedMap<TorsionParam> {
        &self.torsions
    }

    pub fn generic_torsions(&self) -> &OrderedMap<TorsionParam> {
        &self.generic_torsions
    }

    pub fn impropers(&self) -> &OrderedMap<ImproperParam> {
        &self.impropers
    }

    pub fn generic_impropers(&self) -> &OrderedMap<ImproperParam> {
        &self.generic_impropers
    }

    pub fn class_len(&self, class: ParamClass) -> usize {
        match class {
            ParamClass::AtomType => self.atom_types.len(),
            ParamClass::Bond => self.bonds.len(),
            ParamClass::Angle => self.angles.len(),
            ParamClass::Torsion => self.torsions.len(),
            ParamClass::GenericTorsion => self.generic_torsions.len(),
            ParamClass::Improper => self.impropers.len(),
            ParamClass::GenericImproper => self.generic_impropers.len(),
        }
    }

    /// Total number of parameter records, options excluded.
    pub fn len(&self) -> usize {
        ParamClass::ALL.iter().map(|&c| self.class_len(c)).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn merge_into<T: Parameter + Clone + Into<ParamRecord>>(
    table: &mut OrderedMap<T>,
    class: ParamClass,
    record: T,
    policy: ErrorPolicy,
) -> Result<MergeOutcome<T>, StoreError> {
    let identity = record.identity().to_string();
    let Some(existing_repr) = table.get(&identity).map(|e| e.value_repr()) else {
        table.insert(identity, record);
        return Ok(MergeOutcome::Inserted);
    };

    let incoming_repr = record.value_repr();
    if existing_repr == incoming_repr {
        warn!(
            "Duplicate {} parameter ignored: {}",
            class,
            Into::<ParamRecord>::into(record)
        );
        return Ok(MergeOutcome::Duplicate);
    }

    policy.escalate(StoreError::MergeConflict {
        class,
        identity: identity.clone(),
        existing: existing_repr,
        incoming: incoming_repr,
    })?;
    Ok(table
        .insert(identity, record)
        .map_or(MergeOutcome::Inserted, MergeOutcome::Overwritten))
}
