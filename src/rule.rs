use crate::error::{RemapError, Result};
use crate::input::{InputDescriptor, InputKind};
use serde::{Deserialize, Serialize};

/// Which edges of a button-like input fire the remap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivationCondition {
    pub on_press: bool,
    pub on_release: bool,
}

impl ActivationCondition {
    pub fn new(on_press: bool, on_release: bool) -> Self {
        Self {
            on_press,
            on_release,
        }
    }

    /// Fires on both press and release, so the virtual button mirrors the physical one.
    pub fn both_edges() -> Self {
        Self::new(true, true)
    }

    pub fn is_unset(&self) -> bool {
        !self.on_press && !self.on_release
    }
}

/// Binds one physical input to one vJoy input.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemapRule {
    physical_kind: InputKind,
    target: InputDescriptor,
    condition: Option<ActivationCondition>,
}

impl RemapRule {
    /// A rule as created for a freshly added action: vJoy device 1, input 1.
    pub fn new(physical_kind: InputKind) -> Self {
        let condition = physical_kind
            .is_button_like()
            .then(ActivationCondition::both_edges);
        Self {
            physical_kind,
            target: InputDescriptor::new(1, 1, physical_kind.virtual_kind()),
            condition,
        }
    }

    /// A rule with no target chosen yet; the allocator fills it in.
    pub fn unassigned(physical_kind: InputKind) -> Self {
        Self {
            physical_kind,
            target: InputDescriptor::unset(physical_kind.virtual_kind()),
            condition: None,
        }
    }

    /// Builds a rule, validating the target kind.
    pub fn with_target(physical_kind: InputKind, target: InputDescriptor) -> Result<Self> {
        let mut rule = Self::unassigned(physical_kind);
        rule.set_target(target)?;
        Ok(rule)
    }

    pub fn physical_kind(&self) -> InputKind {
        self.physical_kind
    }

    pub fn target(&self) -> InputDescriptor {
        self.target
    }

    pub fn condition(&self) -> Option<ActivationCondition> {
        self.condition
    }

    /// Conditions only apply to button-like inputs and are dropped otherwise.
    pub fn set_condition(&mut self, condition: ActivationCondition) {
        if self.physical_kind.is_button_like() {
            self.condition = Some(condition);
        }
    }

    /// Gives a brand-new button rule the press+release condition.
    ///
    /// Only acts while the target is still completely unset, so once the
    /// allocator or the user has picked a target this is a no-op. Returns
    /// whether the condition was changed.
    pub fn apply_default_condition(&mut self) -> bool {
        let unset = self.condition.map_or(true, |c| c.is_unset());
        if unset && self.target.is_unset() && self.physical_kind.is_button_like() {
            self.condition = Some(ActivationCondition::both_edges());
            log::debug!("Applied default press/release condition to {:?} rule", self.physical_kind);
            return true;
        }
        false
    }

    pub fn set_target(&mut self, target: InputDescriptor) -> Result<()> {
        if !self.physical_kind.allows_target(target.kind) {
            return Err(RemapError::InvalidKind {
                physical: self.physical_kind,
                target: target.kind,
            });
        }
        self.target = target;
        Ok(())
    }

    /// Icon name such as `button_005`.
    pub fn icon_key(&self) -> String {
        format!("{}_{:03}", self.physical_kind.tag(), self.target.input_id)
    }

    pub fn icon_file_name(&self) -> String {
        format!("icon_{}.png", self.icon_key())
    }

    /// Names the generated binding code passes to the remap callback.
    pub fn callback_params() -> &'static [&'static str] {
        &["vjoy"]
    }

    pub fn is_valid(&self) -> bool {
        self.target.has_device() && self.target.has_input()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rule_defaults() {
        let rule = RemapRule::new(InputKind::Button);
        assert_eq!(rule.target(), InputDescriptor::new(1, 1, InputKind::Button));
        assert_eq!(rule.condition(), Some(ActivationCondition::both_edges()));

        let axis = RemapRule::new(InputKind::Axis);
        assert_eq!(axis.condition(), None);
        assert!(axis.is_valid());
    }

    #[test]
    fn keyboard_rule_targets_button() {
        let rule = RemapRule::new(InputKind::Keyboard);
        assert_eq!(rule.target().kind, InputKind::Button);
        assert!(rule.condition().is_some());
    }

    #[test]
    fn default_condition_applies_once() {
        let mut rule = RemapRule::unassigned(InputKind::Button);
        assert!(!rule.is_valid());
        assert!(rule.apply_default_condition());
        assert_eq!(rule.condition(), Some(ActivationCondition::new(true, true)));

        rule.set_condition(ActivationCondition::new(true, false));
        rule.set_target(InputDescriptor::new(1, 5, InputKind::Button)).unwrap();
        assert!(!rule.apply_default_condition());
        assert_eq!(rule.condition(), Some(ActivationCondition::new(true, false)));
    }

    #[test]
    fn default_condition_skips_assigned_target() {
        let mut rule = RemapRule::unassigned(InputKind::Button);
        rule.set_target(InputDescriptor::new(1, 5, InputKind::Button)).unwrap();
        assert!(!rule.apply_default_condition());
        assert_eq!(rule.condition(), None);
    }

    #[test]
    fn default_condition_ignores_axes() {
        let mut rule = RemapRule::unassigned(InputKind::Axis);
        assert!(!rule.apply_default_condition());
        assert_eq!(rule.condition(), None);
    }

    #[test]
    fn set_target_rejects_disallowed_kind() {
        let mut rule = RemapRule::new(InputKind::Axis);
        let err = rule
            .set_target(InputDescriptor::new(1, 2, InputKind::Hat))
            .unwrap_err();
        assert!(matches!(
            err,
            RemapError::InvalidKind {
                physical: InputKind::Axis,
                target: InputKind::Hat
            }
        ));
        assert_eq!(rule.target(), InputDescriptor::new(1, 1, InputKind::Axis));
    }

    #[test]
    fn with_target_validates_kind() {
        let rule =
            RemapRule::with_target(InputKind::Axis, InputDescriptor::new(1, 4, InputKind::Button))
                .unwrap();
        assert_eq!(rule.physical_kind(), InputKind::Axis);
        assert!(matches!(
            RemapRule::with_target(InputKind::Hat, InputDescriptor::new(1, 1, InputKind::Axis)),
            Err(RemapError::InvalidKind { .. })
        ));
    }

    #[test]
    fn axis_can_drive_a_button() {
        let mut rule = RemapRule::new(InputKind::Axis);
        rule.set_target(InputDescriptor::new(2, 7, InputKind::Button)).unwrap();
        assert_eq!(rule.target().kind, InputKind::Button);
    }

    #[test]
    fn keyboard_rejects_axis_target() {
        let mut rule = RemapRule::new(InputKind::Keyboard);
        assert!(rule.set_target(InputDescriptor::new(1, 1, InputKind::Axis)).is_err());
    }

    #[test]
    fn icon_key_is_zero_padded() {
        let mut rule = RemapRule::new(InputKind::Keyboard);
        rule.set_target(InputDescriptor::new(1, 5, InputKind::Button)).unwrap();
        assert_eq!(rule.icon_key(), "button_005");
        assert_eq!(rule.icon_file_name(), "icon_button_005.png");

        let hat = RemapRule::new(InputKind::Hat);
        assert_eq!(hat.icon_key(), "hat_001");
    }

    #[test]
    fn conditions_dropped_for_axes() {
        let mut rule = RemapRule::new(InputKind::Axis);
        rule.set_condition(ActivationCondition::both_edges());
        assert_eq!(rule.condition(), None);
    }
}
