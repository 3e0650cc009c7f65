use crate::input::{InputDescriptor, InputKind, VirtualDevice};
use crate::rule::RemapRule;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of which vJoy inputs are already bound, per device and kind.
///
/// Keyboard usage is recorded under `Button`, the slot kind it occupies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputUsage {
    devices: BTreeMap<u32, BTreeMap<InputKind, BTreeSet<u32>>>,
}

impl InputUsage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_used(&mut self, device_id: u32, kind: InputKind, input_id: u32) {
        self.devices
            .entry(device_id)
            .or_default()
            .entry(kind.virtual_kind())
            .or_default()
            .insert(input_id);
    }

    /// Records the target of an assigned rule. Unset targets are ignored.
    pub fn mark_target(&mut self, target: &InputDescriptor) {
        if target.has_device() && target.has_input() {
            self.mark_used(target.device_id, target.kind, target.input_id);
        }
    }

    pub fn is_used(&self, device_id: u32, kind: InputKind, input_id: u32) -> bool {
        self.devices
            .get(&device_id)
            .and_then(|kinds| kinds.get(&kind.virtual_kind()))
            .is_some_and(|ids| ids.contains(&input_id))
    }

    /// Used indices in ascending order.
    pub fn used(&self, device_id: u32, kind: InputKind) -> impl Iterator<Item = u32> + '_ {
        self.devices
            .get(&device_id)
            .and_then(|kinds| kinds.get(&kind.virtual_kind()))
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    /// Keeps only the usage of one kind, as the host query does with a kind filter.
    pub fn filtered(&self, kind: InputKind) -> InputUsage {
        let kind = kind.virtual_kind();
        let devices = self
            .devices
            .iter()
            .filter_map(|(dev, kinds)| {
                let ids = kinds.get(&kind)?;
                Some((*dev, BTreeMap::from([(kind, ids.clone())])))
            })
            .collect();
        InputUsage { devices }
    }

    pub fn is_empty(&self) -> bool {
        self.devices.values().all(|kinds| kinds.values().all(|ids| ids.is_empty()))
    }
}

/// Inputs of `kind` on `device` that nothing is bound to yet, ascending.
pub fn free_inputs(device: &VirtualDevice, kind: InputKind, usage: &InputUsage) -> Vec<u32> {
    device
        .valid_range(kind)
        .filter(|id| !usage.is_used(device.id, kind, *id))
        .collect()
}

/// Picks the vJoy input a rule should target when parts of it are unset.
///
/// An unset device resolves to the lowest device id in the catalog. An unset
/// input resolves to the lowest free index of the target kind on that device,
/// or to index 1 when every index is taken. Several rules may share a vJoy
/// input, so running out is not an error. Already-set parts are kept.
pub fn resolve_default_target(
    rule: &RemapRule,
    catalog: &[VirtualDevice],
    usage: &InputUsage,
) -> InputDescriptor {
    let current = rule.target();
    let kind = match rule.physical_kind() {
        InputKind::Keyboard => InputKind::Button,
        InputKind::Axis | InputKind::Button | InputKind::Hat => current.kind,
    };

    let device_id = if current.has_device() {
        current.device_id
    } else {
        match catalog.iter().map(|d| d.id).min() {
            Some(id) => id,
            None => {
                log::warn!("No virtual devices available, defaulting to vJoy device 1");
                1
            }
        }
    };

    let input_id = if current.has_input() {
        current.input_id
    } else {
        let first_free = catalog
            .iter()
            .find(|d| d.id == device_id)
            .and_then(|d| free_inputs(d, kind, usage).first().copied());
        match first_free {
            Some(id) => id,
            None => {
                log::debug!(
                    "No free {} on vJoy device {}, sharing input 1",
                    kind.tag(),
                    device_id
                );
                1
            }
        }
    };

    log::debug!(
        "Resolved {:?} rule target to device {} {} {}",
        rule.physical_kind(),
        device_id,
        kind.tag(),
        input_id
    );
    InputDescriptor::new(device_id, input_id, kind)
}
