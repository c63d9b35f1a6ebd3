//! Device resolution.
//!
//! Turns a profile [`Device`] into one or more [`ResolvedComponent`]s. Most devices
//! resolve to exactly one component; a device whose name matches a [`CompositeRule`]
//! (a stick with an attached module) splits into a base and an attachment component,
//! each owning a disjoint button range.

use crate::device::{split_instance_suffix, Device};
use crate::error::{Error, Result};
use crate::input::InputCode;
use crate::registry::{InputRange, Template, TemplateRegistry};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Splits one product family into base + attachment by name markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeRule {
    pub name: String,
    /// Every marker must appear (case-insensitive) in the device name.
    pub markers: Vec<String>,
    /// Whitespace-separated token removed to derive the base name.
    pub strip_marker: String,
    /// Fixed name of the attachment component.
    pub attachment_name: String,
    pub attachment_range: InputRange,
    /// Defaults to `[1, attachment_range.min - 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_range: Option<InputRange>,
}

impl CompositeRule {
    /// Built-in rules used when a registry declares none.
    pub fn defaults() -> Vec<CompositeRule> {
        vec![CompositeRule {
            name: "vkb_sem".to_string(),
            markers: vec!["VKB".to_string(), "SEM".to_string()],
            strip_marker: "SEM".to_string(),
            attachment_name: "VKB SEM".to_string(),
            attachment_range: InputRange::new(41, 64),
            base_range: Some(InputRange::new(1, 40)),
        }]
    }

    pub fn matches(&self, device_name: &str) -> bool {
        let upper = device_name.to_uppercase();
        !self.markers.is_empty() && self.markers.iter().all(|m| upper.contains(&m.to_uppercase()))
    }

    /// Device name with the strip marker removed and whitespace collapsed.
    pub fn base_name(&self, device_name: &str) -> String {
        device_name
            .split_whitespace()
            .filter(|token| !token.eq_ignore_ascii_case(&self.strip_marker))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn base_range(&self) -> InputRange {
        self.base_range
            .unwrap_or_else(|| InputRange::new(1, self.attachment_range.min.saturating_sub(1)))
    }

    /// Rejects partitions that overlap.
    ///
    /// The attachment partition is checked against the rule's base range and against the
    /// `button_range` of every other active template.
    pub(crate) fn validate(&self, registry: &TemplateRegistry) -> Result<()> {
        let attachment_template = registry.find(&self.attachment_name);
        let owner = attachment_template.map_or(self.name.as_str(), |t| t.id.as_str());
        let base = self.base_range();
        let attachment = attachment_template
            .and_then(|t| t.input_range)
            .unwrap_or(self.attachment_range);
        for range in [base, attachment, self.attachment_range] {
            if range.min == 0 || range.min > range.max {
                return Err(Error::invariant(
                    owner,
                    format!(
                        "composite rule `{}`: range [{}, {}] is not a valid 1-based range",
                        self.name, range.min, range.max
                    ),
                ));
            }
        }
        if base.overlaps(&attachment) {
            return Err(Error::invariant(
                owner,
                format!(
                    "composite rule `{}`: partitions [{}, {}] and [{}, {}] overlap",
                    self.name, base.min, base.max, attachment.min, attachment.max
                ),
            ));
        }

        let attachments: Vec<&str> = registry
            .composites()
            .iter()
            .filter_map(|rule| registry.find(&rule.attachment_name))
            .map(|t| t.id.as_str())
            .collect();
        for template in registry.active() {
            let Some(range) = template.input_range else {
                continue;
            };
            if attachments.contains(&template.id.as_str()) || !range.overlaps(&attachment) {
                continue;
            }
            return Err(Error::invariant(
                &template.id,
                format!(
                    "button_range [{}, {}] overlaps the `{}` attachment partition [{}, {}]",
                    range.min, range.max, self.name, attachment.min, attachment.max
                ),
            ));
        }
        Ok(())
    }
}

/// One templated part of a physical device.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedComponent<'r> {
    pub device: Device,
    /// Name shown to the user, including any `#N` instance suffix.
    pub effective_name: String,
    /// `None` when no template matches; the component still exists.
    pub template: Option<&'r Template>,
    /// Button range this component owns. `None` means unrestricted.
    pub partition: Option<InputRange>,
}

impl ResolvedComponent<'_> {
    /// Whether `code` belongs to this component's partition.
    ///
    /// Buttons must fall inside the range. Axes, hats and other kinds belong only to
    /// the partition that starts at button 1.
    pub fn accepts(&self, code: &InputCode) -> bool {
        self.partition.map_or(true, |range| range.admits(&code.kind))
    }

    pub fn has_template(&self) -> bool {
        self.template.is_some()
    }
}

/// Matches devices against a [`TemplateRegistry`].
#[derive(Debug, Clone, Copy)]
pub struct DeviceResolver<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> DeviceResolver<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }

    /// Resolves a device into its components. A blank name yields none.
    pub fn resolve(&self, device: &Device) -> Vec<ResolvedComponent<'r>> {
        let raw = device.raw_name.as_deref().unwrap_or_default();
        let (name, suffix) = split_instance_suffix(raw);
        if name.is_empty() {
            return Vec::new();
        }
        let display = |n: &str| match suffix {
            Some(s) => format!("{n} {s}"),
            None => n.to_string(),
        };

        let Some(rule) = self.registry.composites().iter().find(|r| r.matches(name)) else {
            return vec![ResolvedComponent {
                device: device.clone(),
                effective_name: display(name),
                template: self.registry.find(name),
                partition: None,
            }];
        };

        debug!(device = name, rule = %rule.name, "composite device detected");
        let base_name = rule.base_name(name);
        [
            (base_name.as_str(), rule.base_range()),
            (rule.attachment_name.as_str(), rule.attachment_range),
        ]
        .into_iter()
        .map(|(part, default_range)| {
            let template = self.registry.find(part);
            ResolvedComponent {
                device: device.clone(),
                effective_name: display(part),
                template,
                partition: Some(template.and_then(|t| t.input_range).unwrap_or(default_range)),
            }
        })
        .collect()
    }

    /// Resolves several devices, keeping their order.
    pub fn resolve_all<'d>(
        &self,
        devices: impl IntoIterator<Item = &'d Device>,
    ) -> Vec<ResolvedComponent<'r>> {
        devices.into_iter().flat_map(|d| self.resolve(d)).collect()
    }
}

/// The first component whose partition accepts `code`.
pub fn component_for_input<'a, 'r>(
    components: &'a [ResolvedComponent<'r>],
    code: &InputCode,
) -> Option<&'a ResolvedComponent<'r>> {
    components.iter().find(|c| c.accepts(code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn evo_r() -> Template {
        Template::new("evo_r", "VKB Gladiator EVO (Right)", &["Gladiator EVO R"])
    }

    fn sem() -> Template {
        Template::new("sem", "VKB SEM", &["VKB SEM"])
    }

    fn registry() -> TemplateRegistry {
        TemplateRegistry::new(vec![
            evo_r().with_range(1, 40),
            sem().with_range(41, 64),
            Template::new("mt50", "VPC MT-50CM3", &["MT-50CM3"]),
        ])
        .unwrap()
    }

    fn code(s: &str) -> InputCode {
        InputCode::parse(s).unwrap()
    }

    #[test]
    fn test_composite_split() {
        let r = registry();
        let device = Device::joystick(1, "VKBsim Gladiator EVO R SEM");
        let parts = DeviceResolver::new(&r).resolve(&device);

        let names: Vec<_> = parts.iter().map(|c| c.effective_name.as_str()).collect();
        assert_eq!(names, vec!["VKBsim Gladiator EVO R", "VKB SEM"]);
        assert_eq!(parts[0].template.unwrap().id, "evo_r");
        assert_eq!(parts[1].template.unwrap().id, "sem");

        let owner = component_for_input(&parts, &code("js1_button41")).unwrap();
        assert_eq!(owner.effective_name, "VKB SEM");
        assert!(!parts[0].accepts(&code("js1_button41")));
        assert!(parts[0].accepts(&code("js1_button40")));
        assert!(parts[0].accepts(&code("js1_rotz")));
        assert!(!parts[1].accepts(&code("js1_hat1_up")));
        assert!(component_for_input(&parts, &code("js1_button70")).is_none());
    }

    #[test]
    fn test_plain_device_single_component() {
        let r = registry();
        let parts = DeviceResolver::new(&r).resolve(&Device::joystick(2, "VPC Stick MT-50CM3"));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].template.unwrap().id, "mt50");
        assert_eq!(parts[0].partition, None);
        assert!(parts[0].accepts(&code("js2_button99")));
    }

    #[test]
    fn test_instance_suffix_reappended() {
        let r = registry();
        let resolver = DeviceResolver::new(&r);
        let parts = resolver.resolve(&Device::joystick(2, "VKBsim Gladiator EVO R SEM #2"));
        let names: Vec<_> = parts.iter().map(|c| c.effective_name.as_str()).collect();
        assert_eq!(names, vec!["VKBsim Gladiator EVO R #2", "VKB SEM #2"]);
        assert_eq!(parts[0].template.unwrap().id, "evo_r");
    }

    #[test]
    fn test_unmatched_and_blank_devices() {
        let r = registry();
        let resolver = DeviceResolver::new(&r);
        let parts = resolver.resolve(&Device::joystick(1, "Thrustmaster T.16000M"));
        assert_eq!(parts.len(), 1);
        assert!(!parts[0].has_template());
        assert!(resolver.resolve(&Device::joystick(1, "   ")).is_empty());
    }

    #[test]
    fn test_template_range_preferred_over_rule_default() {
        let r = TemplateRegistry::new(vec![sem().with_range(45, 60)]).unwrap();
        let parts = DeviceResolver::new(&r).resolve(&Device::joystick(1, "VKB Gladiator SEM"));
        assert_eq!(parts[0].template, None);
        assert_eq!(parts[0].partition, Some(InputRange::new(1, 40)));
        assert_eq!(parts[1].partition, Some(InputRange::new(45, 60)));
    }

    #[test]
    fn test_overlapping_partitions_rejected() {
        let err = TemplateRegistry::new(vec![sem().with_range(30, 64)]).unwrap_err();
        assert!(matches!(&err, Error::Invariant { template, .. } if template == "sem"));
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn test_base_template_range_must_not_reach_attachment() {
        let err = TemplateRegistry::new(vec![evo_r().with_range(1, 50), sem().with_range(41, 64)])
            .unwrap_err();
        assert!(matches!(&err, Error::Invariant { template, .. } if template == "evo_r"));
        assert!(err.to_string().contains("[41, 64]"));
    }

    #[test]
    fn test_deprecated_template_range_is_ignored() {
        let mut old = evo_r().with_range(1, 64);
        old.deprecated = true;
        let r = TemplateRegistry::new(vec![old, sem().with_range(41, 64)]).unwrap();
        let device = Device::joystick(1, "VKBsim Gladiator EVO R SEM");
        let parts = DeviceResolver::new(&r).resolve(&device);
        let button45 = code("js1_button45");
        let owners: Vec<_> = parts.iter().filter(|c| c.accepts(&button45)).collect();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].effective_name, "VKB SEM");
    }

    #[test]
    fn test_rule_from_configuration() {
        let rule: CompositeRule = serde_json::from_str(
            r#"{"name": "vpc_panel", "markers": ["VPC", "PANEL"], "strip_marker": "Panel",
                "attachment_name": "VPC Control Panel", "attachment_range": [33, 48]}"#,
        )
        .unwrap();
        assert_eq!(rule.base_range(), InputRange::new(1, 32));
        assert!(rule.matches("vpc stick panel"));
        assert_eq!(rule.base_name("VPC  Stick Panel"), "VPC Stick");
    }
}
