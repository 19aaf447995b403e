//! Hazard definitions: which NWS phenomenon/significance pair gets a map.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{AlertMapError, AlertMapResult};

/// Phenomenon code of the sentinel definition that stands for "no alerts".
pub const SENTINEL_PHENOMENON: &str = "none";

/// One row of the hazard table, as written in configuration.
///
/// Every field is checked when the row is composed, so a malformed row fails
/// its own map instead of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HazardDefinition {
    /// Display name, also used to derive the artifact file name
    #[serde(default)]
    pub name: String,

    /// NWS phenomenon code (PHENOM), e.g. "RP" for rip current
    #[serde(default, alias = "phenom")]
    pub phenomenon: Option<String>,

    /// NWS significance code (SIG), e.g. "S" for statement
    #[serde(default, alias = "sig")]
    pub significance: Option<String>,

    /// Human-readable significance, e.g. "Statement"
    #[serde(default, alias = "sig_type")]
    pub significance_label: Option<String>,

    /// Fill and legend color, e.g. "#40E0D0"
    #[serde(default)]
    pub color: Option<String>,
}

impl HazardDefinition {
    /// The "no alerts" placeholder definition.
    pub fn sentinel(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phenomenon: Some(SENTINEL_PHENOMENON.to_string()),
            significance: None,
            significance_label: None,
            color: None,
        }
    }

    pub fn new(
        name: impl Into<String>,
        phenomenon: impl Into<String>,
        significance: impl Into<String>,
        significance_label: impl Into<String>,
        color: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            phenomenon: Some(phenomenon.into()),
            significance: Some(significance.into()),
            significance_label: Some(significance_label.into()),
            color: Some(color.into()),
        }
    }

    /// Whether this row is the "no active alerts" sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.phenomenon
            .as_deref()
            .map_or(false, |p| p.trim().eq_ignore_ascii_case(SENTINEL_PHENOMENON))
    }

    /// A blank display name cannot name an artifact.
    pub fn check_name(&self) -> AlertMapResult<()> {
        if self.name.trim().is_empty() {
            return Err(AlertMapError::missing_field(&self.name, "name"));
        }
        Ok(())
    }

    /// Check every field a hazard map needs and parse the color.
    ///
    /// Fails with `MissingDefinitionField` when a field is absent or blank and
    /// with `InvalidDefinitionField` when the color does not parse or is fully
    /// transparent. Any alpha in the color is dropped.
    pub fn resolve(&self) -> AlertMapResult<ResolvedHazard> {
        self.check_name()?;
        let phenomenon = required(&self.name, "phenomenon", &self.phenomenon)?;
        let significance = required(&self.name, "significance", &self.significance)?;
        let significance_label =
            required(&self.name, "significance_label", &self.significance_label)?;
        let color_text = required(&self.name, "color", &self.color)?;

        let invalid_color = || AlertMapError::InvalidDefinitionField {
            definition: self.name.clone(),
            field: "color".to_string(),
            value: color_text.clone(),
        };
        let parsed = Color::parse(&color_text).map_err(|_| invalid_color())?;
        if parsed.is_transparent() {
            return Err(invalid_color());
        }
        // Hazard polygons are always filled at full opacity.
        let color = parsed.with_alpha(1.0);

        Ok(ResolvedHazard {
            name: self.name.clone(),
            phenomenon,
            significance,
            significance_label,
            color,
        })
    }
}

fn required(definition: &str, field: &str, value: &Option<String>) -> AlertMapResult<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(AlertMapError::missing_field(definition, field)),
    }
}

/// A non-sentinel definition with every field present and parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedHazard {
    pub name: String,
    pub phenomenon: String,
    pub significance: String,
    pub significance_label: String,
    pub color: Color,
}

impl ResolvedHazard {
    /// Legend text, e.g. "Rip Current Statement".
    pub fn legend_label(&self) -> String {
        format!("{} {}", self.name, self.significance_label)
    }

    /// Exact, case-sensitive match on both codes.
    pub fn matches(&self, phenomenon: &str, significance: &str) -> bool {
        self.phenomenon == phenomenon && self.significance == significance
    }
}

/// Check table-level invariants: unique names, unique code pairs.
///
/// Rows with a blank name or missing codes are left for their own iteration
/// to report.
pub fn validate_table(definitions: &[HazardDefinition]) -> Result<(), String> {
    let mut names = HashSet::new();
    let mut pairs = HashSet::new();

    for def in definitions {
        if def.name.trim().is_empty() {
            continue;
        }
        if !names.insert(def.name.trim()) {
            return Err(format!("duplicate hazard name '{}'", def.name));
        }
        if def.is_sentinel() {
            continue;
        }
        if let (Some(p), Some(s)) = (&def.phenomenon, &def.significance) {
            let (p, s) = (p.trim(), s.trim());
            if !pairs.insert((p, s)) {
                return Err(format!(
                    "duplicate phenomenon/significance pair {}.{} in '{}'",
                    p, s, def.name
                ));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rip_current() -> HazardDefinition {
        HazardDefinition::new("Rip Current", "RP", "S", "Statement", "#40E0D0")
    }

    #[test]
    fn test_sentinel_detection_is_case_insensitive() {
        assert!(HazardDefinition::sentinel("None").is_sentinel());
        let mut def = HazardDefinition::sentinel("None");
        def.phenomenon = Some("None".to_string());
        assert!(def.is_sentinel());
        assert!(!rip_current().is_sentinel());
    }

    #[test]
    fn test_resolve_complete_definition() {
        let resolved = rip_current().resolve().unwrap();
        assert_eq!(resolved.color, Color::rgb(0x40, 0xE0, 0xD0));
        assert_eq!(resolved.legend_label(), "Rip Current Statement");
        assert!(resolved.matches("RP", "S"));
        assert!(!resolved.matches("RP", "W"));
        assert!(!resolved.matches("rp", "S"));
    }

    #[test]
    fn test_resolve_missing_color() {
        let mut def = rip_current();
        def.color = None;
        match def.resolve() {
            Err(AlertMapError::MissingDefinitionField { definition, field }) => {
                assert_eq!(definition, "Rip Current");
                assert_eq!(field, "color");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_blank_significance_is_missing() {
        let mut def = rip_current();
        def.significance = Some("  ".to_string());
        assert!(matches!(
            def.resolve(),
            Err(AlertMapError::MissingDefinitionField { ref field, .. }) if field == "significance"
        ));
    }

    #[test]
    fn test_resolve_bad_color() {
        let mut def = rip_current();
        def.color = Some("#nothex".to_string());
        assert!(matches!(
            def.resolve(),
            Err(AlertMapError::InvalidDefinitionField { .. })
        ));
    }

    #[test]
    fn test_resolve_drops_color_alpha() {
        let mut def = rip_current();
        def.color = Some("#40E0D080".to_string());
        let resolved = def.resolve().unwrap();
        assert_eq!(resolved.color, Color::rgb(0x40, 0xE0, 0xD0));
    }

    #[test]
    fn test_resolve_rejects_transparent_color() {
        let mut def = rip_current();
        def.color = Some("none".to_string());
        match def.resolve() {
            Err(AlertMapError::InvalidDefinitionField { field, value, .. }) => {
                assert_eq!(field, "color");
                assert_eq!(value, "none");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_validate_table_rejects_duplicate_pairs() {
        let table = vec![
            HazardDefinition::sentinel("None"),
            rip_current(),
            HazardDefinition::new("Rip Risk", "RP", "S", "Statement", "#000000"),
        ];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_validate_table_compares_trimmed_codes() {
        let table = vec![
            rip_current(),
            HazardDefinition::new("Rip Risk", " RP", "S ", "Statement", "#000000"),
        ];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_blank_name_is_reported_per_definition() {
        let mut def = rip_current();
        def.name = "  ".to_string();
        assert!(matches!(
            def.resolve(),
            Err(AlertMapError::MissingDefinitionField { ref field, .. }) if field == "name"
        ));

        let mut sentinel = HazardDefinition::sentinel("None");
        sentinel.name = String::new();
        assert!(sentinel.check_name().is_err());

        assert!(validate_table(&[def, rip_current()]).is_ok());
    }

    #[test]
    fn test_validate_table_rejects_duplicate_names() {
        let table = vec![rip_current(), rip_current()];
        assert!(validate_table(&table).is_err());
    }

    #[test]
    fn test_validate_table_accepts_default_table() {
        let table = vec![
            HazardDefinition::sentinel("None"),
            rip_current(),
            HazardDefinition::new("Beach Hazards", "BH", "S", "Statement", "#40E0D0"),
        ];
        assert!(validate_table(&table).is_ok());
    }
}
