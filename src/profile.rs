use crate::allocator::{resolve_default_target, InputUsage};
use crate::codec::{self, REMAP_TAG};
use crate::error::{RemapError, Result};
use crate::host::UsageSource;
use crate::input::{InputDescriptor, InputKind, VirtualDevice};
use crate::rule::RemapRule;
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use serde::{Deserialize, Serialize};
use std::path::Path;

const PROFILE_TAG: &str = "profile";
const INPUT_TAG: &str = "input";

/// A physical input together with the rule it triggers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileEntry {
    pub input: InputDescriptor,
    pub rule: RemapRule,
}

/// An entry that could not be loaded. The rest of the profile still loads.
#[derive(Debug)]
pub struct SkippedEntry {
    /// Position of the entry in the document, counting skipped ones.
    pub index: usize,
    pub error: RemapError,
}

/// All remap rules of one profile, in document order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemapProfile {
    entries: Vec<ProfileEntry>,
}

impl RemapProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ProfileEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binds `rule` to `input`, replacing any rule the input already had.
    pub fn insert(&mut self, input: InputDescriptor, rule: RemapRule) {
        match self.entries.iter_mut().find(|e| e.input == input) {
            Some(entry) => entry.rule = rule,
            None => self.entries.push(ProfileEntry { input, rule }),
        }
    }

    /// Adds a rule with no target yet for `input`.
    pub fn add_unassigned(&mut self, input: InputDescriptor) {
        self.insert(input, RemapRule::unassigned(input.kind));
    }

    pub fn rule(&self, input: &InputDescriptor) -> Option<&RemapRule> {
        self.entries.iter().find(|e| &e.input == input).map(|e| &e.rule)
    }

    pub fn rule_mut(&mut self, input: &InputDescriptor) -> Option<&mut RemapRule> {
        self.entries
            .iter_mut()
            .find(|e| &e.input == input)
            .map(|e| &mut e.rule)
    }

    pub fn remove(&mut self, input: &InputDescriptor) -> Option<RemapRule> {
        let pos = self.entries.iter().position(|e| &e.input == input)?;
        Some(self.entries.remove(pos).rule)
    }

    /// vJoy inputs driven by the rules that already have a target.
    pub fn used_inputs(&self) -> InputUsage {
        let mut usage = InputUsage::new();
        for entry in &self.entries {
            usage.mark_target(&entry.rule.target());
        }
        usage
    }

    /// Fills in every rule whose target is not fully set.
    ///
    /// Entries are handled in order and each resolved target counts as used
    /// for the ones after it. Returns how many rules were changed.
    pub fn resolve_defaults(&mut self, catalog: &[VirtualDevice]) -> Result<usize> {
        let mut usage = self.used_inputs();
        let mut resolved = 0;
        for entry in &mut self.entries {
            let target = entry.rule.target();
            if target.has_device() && target.has_input() {
                continue;
            }
            entry.rule.apply_default_condition();
            let new_target = resolve_default_target(&entry.rule, catalog, &usage);
            entry.rule.set_target(new_target)?;
            usage.mark_target(&new_target);
            resolved += 1;
        }
        if resolved > 0 {
            log::info!("Resolved default targets for {} remap rules", resolved);
        }
        Ok(resolved)
    }

    /// Parses a profile document. Malformed entries are skipped and reported;
    /// only broken XML fails the whole load.
    pub fn from_xml(xml: &str) -> Result<(Self, Vec<SkippedEntry>)> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut profile = RemapProfile::new();
        let mut skipped = Vec::new();
        let mut pending: Option<Result<InputDescriptor>> = None;
        let mut index = 0;

        loop {
            match reader.read_event()? {
                Event::Start(e) if e.name().as_ref() == INPUT_TAG.as_bytes() => {
                    pending = Some(parse_input(&e));
                }
                Event::Empty(e) if e.name().as_ref() == INPUT_TAG.as_bytes() => {
                    let error = parse_input(&e)
                        .err()
                        .unwrap_or_else(|| RemapError::MalformedRule("input without remap rule".into()));
                    skip(&mut skipped, index, error);
                    index += 1;
                }
                Event::Empty(e) | Event::Start(e) if e.name().as_ref() == REMAP_TAG.as_bytes() => {
                    let decoded = match pending.take() {
                        Some(Ok(input)) => codec::decode(&e)
                            .and_then(|rule| fit_to_slot(input.kind, rule))
                            .map(|rule| (input, rule)),
                        Some(Err(err)) => Err(err),
                        None => Err(RemapError::MalformedRule("remap outside of input".into())),
                    };
                    match decoded {
                        Ok((input, rule)) => profile.insert(input, rule),
                        Err(err) => skip(&mut skipped, index, err),
                    }
                    index += 1;
                }
                Event::End(e) if e.name().as_ref() == INPUT_TAG.as_bytes() => {
                    if let Some(unused) = pending.take() {
                        let error = unused
                            .err()
                            .unwrap_or_else(|| RemapError::MalformedRule("input without remap rule".into()));
                        skip(&mut skipped, index, error);
                        index += 1;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok((profile, skipped))
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 4);
        writer.write_event(Event::Start(BytesStart::new(PROFILE_TAG)))?;
        for entry in &self.entries {
            let mut input = BytesStart::new(INPUT_TAG);
            input.push_attribute(("device", entry.input.device_id.to_string().as_str()));
            input.push_attribute(("kind", kind_attr(entry.input.kind)));
            input.push_attribute(("id", entry.input.input_id.to_string().as_str()));
            writer.write_event(Event::Start(input))?;
            writer.write_event(Event::Empty(codec::encode(&entry.rule)))?;
            writer.write_event(Event::End(BytesEnd::new(INPUT_TAG)))?;
        }
        writer.write_event(Event::End(BytesEnd::new(PROFILE_TAG)))?;
        String::from_utf8(writer.into_inner()).map_err(|e| RemapError::Xml(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<(Self, Vec<SkippedEntry>)> {
        let data = std::fs::read_to_string(path)?;
        let (profile, skipped) = Self::from_xml(&data)?;
        log::info!(
            "Loaded {} remap rules from {} ({} skipped)",
            profile.len(),
            path.display(),
            skipped.len()
        );
        Ok((profile, skipped))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_xml()?)?;
        log::info!("Saved {} remap rules to {}", self.len(), path.display());
        Ok(())
    }
}

impl UsageSource for RemapProfile {
    fn used_inputs_by_device(&self, kind_filter: Option<InputKind>) -> InputUsage {
        let usage = self.used_inputs();
        match kind_filter {
            Some(kind) => usage.filtered(kind),
            None => usage,
        }
    }
}

/// Rebuilds a decoded rule around the kind of the slot that owns it.
///
/// The `<remap>` node only records the target slot kind, so an axis bound to a
/// vJoy button decodes as a button rule. Keyboard slots keep the decoded
/// button rule. Targets the slot kind cannot drive fail with `InvalidKind`.
fn fit_to_slot(slot_kind: InputKind, decoded: RemapRule) -> Result<RemapRule> {
    let target = decoded.target();
    if slot_kind == InputKind::Keyboard {
        if !slot_kind.allows_target(target.kind) {
            return Err(RemapError::InvalidKind {
                physical: slot_kind,
                target: target.kind,
            });
        }
        return Ok(decoded);
    }
    let mut rule = RemapRule::new(slot_kind);
    rule.set_target(target)?;
    Ok(rule)
}

fn skip(skipped: &mut Vec<SkippedEntry>, index: usize, error: RemapError) {
    log::warn!("Skipping profile entry {}: {}", index, error);
    skipped.push(SkippedEntry { index, error });
}

// Unlike the remap attribute, the physical input keeps keyboard distinct.
fn kind_attr(kind: InputKind) -> &'static str {
    match kind {
        InputKind::Axis => "axis",
        InputKind::Button => "button",
        InputKind::Hat => "hat",
        InputKind::Keyboard => "keyboard",
    }
}

fn parse_input(node: &BytesStart) -> Result<InputDescriptor> {
    let mut device = None;
    let mut id = None;
    let mut kind = None;
    for attr in node.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?;
        match attr.key.as_ref() {
            b"device" => device = Some(parse_u32("device", &value)?),
            b"id" => id = Some(parse_u32("id", &value)?),
            b"kind" => kind = Some(value.parse::<InputKind>()?),
            _ => {}
        }
    }
    match (device, id, kind) {
        (Some(device), Some(id), Some(kind)) => Ok(InputDescriptor::new(device, id, kind)),
        _ => Err(RemapError::MalformedRule(
            "input missing device, id or kind attribute".into(),
        )),
    }
}

fn parse_u32(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| RemapError::MalformedRule(format!("non-integer value {}=\"{}\"", name, value)))
}
