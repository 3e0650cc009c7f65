use crate::error::RemapError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Axis,
    Button,
    Hat,
    Keyboard,
}

impl InputKind {
    /// Virtual input kinds a physical input of this kind may be bound to.
    pub fn allowed_targets(self) -> &'static [InputKind] {
        match self {
            InputKind::Axis => &[InputKind::Axis, InputKind::Button],
            InputKind::Button => &[InputKind::Button],
            InputKind::Hat => &[InputKind::Hat],
            InputKind::Keyboard => &[InputKind::Button],
        }
    }

    pub fn allows_target(self, target: InputKind) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// Kind of virtual slot a keyboard key occupies. Everything else maps to itself.
    pub fn virtual_kind(self) -> InputKind {
        match self {
            InputKind::Keyboard => InputKind::Button,
            other => other,
        }
    }

    /// Whether inputs of this kind have press/release edges.
    pub fn is_button_like(self) -> bool {
        match self {
            InputKind::Button | InputKind::Keyboard => true,
            InputKind::Axis | InputKind::Hat => false,
        }
    }

    /// Lowercase tag used for XML attributes and icon names.
    pub fn tag(self) -> &'static str {
        match self {
            InputKind::Axis => "axis",
            InputKind::Button | InputKind::Keyboard => "button",
            InputKind::Hat => "hat",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            InputKind::Axis => "Axis",
            InputKind::Button | InputKind::Keyboard => "Button",
            InputKind::Hat => "Hat",
        }
    }
}

impl FromStr for InputKind {
    type Err = RemapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "axis" => Ok(InputKind::Axis),
            "button" => Ok(InputKind::Button),
            "hat" => Ok(InputKind::Hat),
            "keyboard" => Ok(InputKind::Keyboard),
            _ => Err(RemapError::MalformedRule(format!("unknown input kind: {}", s))),
        }
    }
}

/// Identifies one physical or virtual input. A zero id means "unset".
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct InputDescriptor {
    pub device_id: u32,
    pub input_id: u32,
    pub kind: InputKind,
}

impl InputDescriptor {
    pub fn new(device_id: u32, input_id: u32, kind: InputKind) -> Self {
        Self {
            device_id,
            input_id,
            kind,
        }
    }

    pub fn unset(kind: InputKind) -> Self {
        Self::new(0, 0, kind)
    }

    pub fn has_device(&self) -> bool {
        self.device_id != 0
    }

    pub fn has_input(&self) -> bool {
        self.input_id != 0
    }

    /// Neither device nor input has been chosen yet.
    pub fn is_unset(&self) -> bool {
        !self.has_device() && !self.has_input()
    }
}

/// A vJoy device as reported by the host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VirtualDevice {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    pub axes: u32,
    pub buttons: u32,
    pub hats: u32,
}

impl VirtualDevice {
    pub fn new(id: u32, axes: u32, buttons: u32, hats: u32) -> Self {
        Self {
            id,
            name: format!("vJoy Device {}", id),
            axes,
            buttons,
            hats,
        }
    }

    pub fn input_count(&self, kind: InputKind) -> u32 {
        match kind {
            InputKind::Axis => self.axes,
            InputKind::Button | InputKind::Keyboard => self.buttons,
            InputKind::Hat => self.hats,
        }
    }

    /// Valid input indices of `kind`, 1-based. Empty when unsupported.
    pub fn valid_range(&self, kind: InputKind) -> RangeInclusive<u32> {
        1..=self.input_count(kind)
    }

    pub fn supported_kinds(&self) -> Vec<InputKind> {
        [InputKind::Axis, InputKind::Button, InputKind::Hat]
            .into_iter()
            .filter(|k| self.input_count(*k) > 0)
            .collect()
    }
}
