use crate::allocator::{resolve_default_target, InputUsage};
use crate::error::Result;
use crate::input::{InputDescriptor, InputKind, VirtualDevice};
use crate::rule::RemapRule;

/// Enumerate the vJoy devices the host knows about.
pub trait VirtualDeviceSource {
    fn enumerate_virtual_devices(&self) -> Result<Vec<VirtualDevice>>;
}

/// Report which vJoy inputs existing rules already drive.
pub trait UsageSource {
    fn used_inputs_by_device(&self, kind_filter: Option<InputKind>) -> InputUsage;
}

/// Combined trait for everything default resolution needs from the host.
pub trait RemapHost: VirtualDeviceSource + UsageSource {}

impl<T: VirtualDeviceSource + UsageSource> RemapHost for T {}

/// Resolves a rule's default target, querying the host once for each input.
pub fn resolve_with_host(host: &dyn RemapHost, rule: &RemapRule) -> Result<InputDescriptor> {
    let catalog = host.enumerate_virtual_devices()?;
    let usage = host.used_inputs_by_device(Some(rule.target().kind));
    Ok(resolve_default_target(rule, &catalog, &usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemapError;
    use std::cell::Cell;

    struct FakeHost {
        devices: Vec<VirtualDevice>,
        usage: InputUsage,
        usage_queries: Cell<u32>,
    }

    impl VirtualDeviceSource for FakeHost {
        fn enumerate_virtual_devices(&self) -> Result<Vec<VirtualDevice>> {
            Ok(self.devices.clone())
        }
    }

    impl UsageSource for FakeHost {
        fn used_inputs_by_device(&self, kind_filter: Option<InputKind>) -> InputUsage {
            self.usage_queries.set(self.usage_queries.get() + 1);
            match kind_filter {
                Some(kind) => self.usage.filtered(kind),
                None => self.usage.clone(),
            }
        }
    }

    struct NoDriver;

    impl VirtualDeviceSource for NoDriver {
        fn enumerate_virtual_devices(&self) -> Result<Vec<VirtualDevice>> {
            Err(RemapError::Config("vJoy driver not installed".into()))
        }
    }

    impl UsageSource for NoDriver {
        fn used_inputs_by_device(&self, _kind_filter: Option<InputKind>) -> InputUsage {
            InputUsage::new()
        }
    }

    #[test]
    fn queries_usage_once() {
        let mut usage = InputUsage::new();
        usage.mark_used(1, InputKind::Button, 1);
        usage.mark_used(1, InputKind::Axis, 2);
        let host = FakeHost {
            devices: vec![VirtualDevice::new(1, 8, 32, 4), VirtualDevice::new(2, 8, 32, 4)],
            usage,
            usage_queries: Cell::new(0),
        };

        let rule = RemapRule::unassigned(InputKind::Button);
        let target = resolve_with_host(&host, &rule).unwrap();
        assert_eq!(target, InputDescriptor::new(1, 2, InputKind::Button));
        assert_eq!(host.usage_queries.get(), 1);
    }

    #[test]
    fn enumeration_errors_propagate() {
        let rule = RemapRule::unassigned(InputKind::Axis);
        assert!(matches!(
            resolve_with_host(&NoDriver, &rule),
            Err(RemapError::Config(_))
        ));
    }
}
