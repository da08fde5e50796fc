use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::color::{contrast_ratio, CssColor, WcagLevel};
use crate::animation::registry::ElementId;
use crate::kernel::host::DeviceCapabilityProbe;
use crate::monitor::types::round_to_hundredths;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Scan budget: elements beyond this index are not inspected.
    pub max_elements: usize,
    pub aa_ratio: f64,
    pub aaa_ratio: f64,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_elements: 20,
            aa_ratio: 4.5,
            aaa_ratio: 7.0,
        }
    }
}

/// Computed colors of one text-bearing element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementStyle {
    pub tag: String,
    pub color: String,
    pub background: String,
}

impl ElementStyle {
    pub fn new(tag: &str, color: &str, background: &str) -> Self {
        Self {
            tag: tag.to_string(),
            color: color.to_string(),
            background: background.to_string(),
        }
    }
}

/// Enumerates text-bearing elements in document order.
pub trait StyleInspector: Send + Sync {
    fn text_elements(&self) -> Vec<ElementStyle>;
}

/// Fixed element list; used by headless hosts and audits of known palettes.
#[derive(Debug, Clone, Default)]
pub struct StaticStyleInspector(pub Vec<ElementStyle>);

impl StyleInspector for StaticStyleInspector {
    fn text_elements(&self) -> Vec<ElementStyle> {
        self.0.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationState {
    pub element: ElementId,
    pub animation_name: Option<String>,
}

impl AnimationState {
    pub fn is_animating(&self) -> bool {
        match self.animation_name.as_deref() {
            Some(name) => !name.trim().is_empty() && name.trim() != "none",
            None => false,
        }
    }
}

/// Enumerates animated-surface elements with their live animation state.
pub trait AnimationInspector: Send + Sync {
    fn animated_elements(&self) -> Vec<AnimationState>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastResult {
    pub element_tag: String,
    pub foreground: String,
    pub background: String,
    /// Rounded to two decimals; the verdict uses the exact value.
    pub ratio: f64,
    pub passed: bool,
    pub wcag_level: WcagLevel,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastReport {
    pub passed: bool,
    pub results: Vec<ContrastResult>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationPreferenceDetails {
    pub prefers_reduced_motion: bool,
    pub animated_elements_count: usize,
    pub should_disable_animations: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationPreferenceReport {
    pub respects_preferences: bool,
    pub details: AnimationPreferenceDetails,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub color_contrast: ContrastReport,
    pub animation_preferences: AnimationPreferenceReport,
}

/// Point-in-time accessibility checks. Holds no state between calls.
pub struct AccessibilityAuditor {
    config: AuditConfig,
    styles: Arc<dyn StyleInspector>,
    animations: Arc<dyn AnimationInspector>,
    probe: Arc<dyn DeviceCapabilityProbe>,
}

impl AccessibilityAuditor {
    pub fn new(
        config: AuditConfig,
        styles: Arc<dyn StyleInspector>,
        animations: Arc<dyn AnimationInspector>,
        probe: Arc<dyn DeviceCapabilityProbe>,
    ) -> Self {
        Self {
            config,
            styles,
            animations,
            probe,
        }
    }

    /// Contrast of the first `max_elements` text elements against their background.
    /// Transparent or missing backgrounds are skipped.
    pub fn check_color_contrast(&self) -> ContrastReport {
        let results: Vec<ContrastResult> = self
            .styles
            .text_elements()
            .into_iter()
            .take(self.config.max_elements)
            .filter_map(|element| self.inspect(element))
            .collect();

        let passed = results.iter().all(|r| r.passed);
        info!(
            "Contrast audit: {} elements inspected, {}",
            results.len(),
            if passed { "all passed" } else { "failures found" }
        );
        ContrastReport { passed, results }
    }

    fn inspect(&self, element: ElementStyle) -> Option<ContrastResult> {
        if element.color.trim().is_empty() || element.background.trim().is_empty() {
            return None;
        }

        let background = CssColor::parse(&element.background);
        if background.map(|bg| bg.is_transparent()).unwrap_or(false) {
            debug!("Skipping <{}> with transparent background", element.tag);
            return None;
        }

        let ratio = match (CssColor::parse(&element.color), background) {
            (Some(fg), Some(bg)) => contrast_ratio(fg.rgb, bg.rgb),
            _ => {
                warn!(
                    "Unparseable color on <{}>: '{}' on '{}'",
                    element.tag, element.color, element.background
                );
                0.0
            }
        };

        Some(ContrastResult {
            element_tag: element.tag,
            foreground: element.color,
            background: element.background,
            ratio: round_to_hundredths(ratio),
            passed: ratio >= self.config.aa_ratio,
            wcag_level: WcagLevel::classify(ratio, self.config.aa_ratio, self.config.aaa_ratio),
        })
    }

    /// With reduced motion requested, every animated element must be still.
    pub fn check_animation_preferences(&self) -> AnimationPreferenceReport {
        let prefers_reduced_motion = self.probe.read().prefers_reduced_motion;
        let elements = self.animations.animated_elements();

        let respects_preferences =
            !prefers_reduced_motion || elements.iter().all(|e| !e.is_animating());
        if !respects_preferences {
            warn!("Reduced motion requested but animated elements are still running");
        }

        AnimationPreferenceReport {
            respects_preferences,
            details: AnimationPreferenceDetails {
                prefers_reduced_motion,
                animated_elements_count: elements.len(),
                should_disable_animations: prefers_reduced_motion,
            },
        }
    }

    pub fn audit(&self) -> AccessibilityReport {
        AccessibilityReport {
            color_contrast: self.check_color_contrast(),
            animation_preferences: self.check_animation_preferences(),
        }
    }
}
