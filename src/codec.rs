//! `<remap>` node encoding.
//!
//! A rule is stored as a single empty element:
//!
//! ```xml
//! <remap vjoy="1" button="5"/>
//! ```
//!
//! `vjoy` is the target device, and exactly one of `axis`, `button` or `hat`
//! carries the target input index. Keyboard rules are written with `button`,
//! so they come back as button rules.

use crate::error::{RemapError, Result};
use crate::input::{InputDescriptor, InputKind};
use crate::rule::RemapRule;
use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

pub const REMAP_TAG: &str = "remap";

const VJOY_ATTR: &str = "vjoy";
const KEYBOARD_ATTR: &str = "keyboard";

fn parse_id(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| RemapError::MalformedRule(format!("non-integer value {}=\"{}\"", name, value)))
}

/// Reads a rule from a `<remap>` element.
pub fn decode(node: &BytesStart) -> Result<RemapRule> {
    if node.name().as_ref() != REMAP_TAG.as_bytes() {
        return Err(RemapError::MalformedRule(format!(
            "expected <{}>, found <{}>",
            REMAP_TAG,
            String::from_utf8_lossy(node.name().as_ref())
        )));
    }

    let mut vjoy = None;
    let mut axis = None;
    let mut button = None;
    let mut hat = None;
    let mut keyboard = None;
    for attr in node.attributes() {
        let attr = attr?;
        let value = attr.unescape_value()?.into_owned();
        match attr.key.as_ref() {
            b"vjoy" => vjoy = Some(value),
            b"axis" => axis = Some(value),
            b"button" => button = Some(value),
            b"hat" => hat = Some(value),
            b"keyboard" => keyboard = Some(value),
            _ => {}
        }
    }

    let (kind, attr_name, raw_input) = if let Some(v) = axis {
        (InputKind::Axis, InputKind::Axis.tag(), v)
    } else if let Some(v) = button {
        (InputKind::Button, InputKind::Button.tag(), v)
    } else if let Some(v) = hat {
        (InputKind::Hat, InputKind::Hat.tag(), v)
    } else if let Some(v) = keyboard {
        (InputKind::Keyboard, KEYBOARD_ATTR, v)
    } else {
        return Err(RemapError::MalformedRule("missing kind attribute".into()));
    };
    let input_id = parse_id(attr_name, &raw_input)?;

    let raw_vjoy =
        vjoy.ok_or_else(|| RemapError::MalformedRule("missing vjoy attribute".into()))?;
    let device_id = parse_id(VJOY_ATTR, &raw_vjoy)?;
    if device_id == 0 {
        return Err(RemapError::MalformedRule("vjoy device id must be at least 1".into()));
    }

    let mut rule = RemapRule::new(kind);
    rule.set_target(InputDescriptor::new(device_id, input_id, kind.virtual_kind()))?;
    Ok(rule)
}

/// Writes a rule as a `<remap>` element. The kind attribute follows the
/// target slot, so keyboard rules are written as buttons.
pub fn encode(rule: &RemapRule) -> BytesStart<'static> {
    let target = rule.target();
    let mut node = BytesStart::new(REMAP_TAG);
    node.push_attribute((VJOY_ATTR, target.device_id.to_string().as_str()));
    node.push_attribute((target.kind.tag(), target.input_id.to_string().as_str()));
    node
}

pub fn rule_to_xml(rule: &RemapRule) -> Result<String> {
    let mut writer = Writer::new(Vec::new());
    writer.write_event(Event::Empty(encode(rule)))?;
    String::from_utf8(writer.into_inner()).map_err(|e| RemapError::Xml(e.to_string()))
}

/// Decodes the first element of `xml`.
pub fn rule_from_xml(xml: &str) -> Result<RemapRule> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    loop {
        match reader.read_event()? {
            Event::Empty(ref e) | Event::Start(ref e) => return decode(e),
            Event::Eof => return Err(RemapError::Xml("no element found".into())),
            _ => {}
        }
    }
}
