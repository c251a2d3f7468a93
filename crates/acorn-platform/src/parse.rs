//! TOML parsing, serialization and validation for board definitions.
//!
//! Board definitions are stored as `.board.toml` files next to a project's
//! `acorn.toml`. They let a user describe a re-spun baseboard without
//! touching the built-in pin table.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::board::Board;
use crate::error::{PlatformError, Result};
use crate::resource::{PhysicalResourceMap, PinGroup};
use crate::variant::BoardVariant;

/// On-disk board definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BoardDefinition {
    /// Variant the pin table belongs to.
    pub variant: BoardVariant,
    /// On-chip main RAM size in bytes (0 = use external SDRAM).
    #[serde(default)]
    pub integrated_main_ram_size: u64,
    /// Pin groups.
    #[serde(default, rename = "resource")]
    pub resources: Vec<PinGroup>,
}

impl BoardDefinition {
    /// Definition equivalent to the built-in board for `variant`.
    pub fn builtin(variant: BoardVariant) -> Self {
        Self {
            variant,
            integrated_main_ram_size: 0,
            resources: PhysicalResourceMap::acorn_baseboard_mini(variant)
                .groups()
                .to_vec(),
        }
    }

    /// Turn the definition into a board, rejecting duplicate groups.
    pub fn into_board(self) -> Result<Board> {
        let map = PhysicalResourceMap::from_groups(self.resources)?;
        Ok(Board::with_resources(self.variant, map)
            .with_integrated_main_ram(self.integrated_main_ram_size))
    }
}

/// A validation issue found in a board definition.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

/// Load, validate and convert a `.board.toml` file.
///
/// Warnings are logged; any error-severity issue rejects the file.
pub fn load_board_toml(path: &Path) -> Result<Board> {
    if !path.exists() {
        return Err(PlatformError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    let definition = parse_board_toml(&content)?;
    if let Err(issues) = validate_board(&definition) {
        let mut errors = Vec::new();
        for issue in issues {
            if issue.severity == "error" {
                errors.push(issue.message);
            } else {
                warn!(path = %path.display(), "{}", issue.message);
            }
        }
        if !errors.is_empty() {
            return Err(PlatformError::Validation {
                detail: format!("{}: {}", path.display(), errors.join("; ")),
            });
        }
    }
    definition.into_board()
}

/// Parse a board definition from a TOML string.
pub fn parse_board_toml(toml_str: &str) -> Result<BoardDefinition> {
    let definition: BoardDefinition = toml::from_str(toml_str)?;
    Ok(definition)
}

/// Serialize a board definition to pretty TOML.
pub fn board_to_toml(definition: &BoardDefinition) -> Result<String> {
    let toml_str = toml::to_string_pretty(definition)?;
    Ok(toml_str)
}

/// Validate a board definition for structural correctness.
///
/// Returns `Ok(())` if valid, or `Err(issues)` with a list of problems.
pub fn validate_board(definition: &BoardDefinition) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    // 1. A differential reference clock exists
    match definition
        .resources
        .iter()
        .find(|g| g.name == "clk200" && g.index == 0)
    {
        None => issues.push(ValidationIssue {
            severity: "error",
            message: "missing reference clock group 'clk200'".into(),
        }),
        Some(group) if !group.is_differential() => issues.push(ValidationIssue {
            severity: "error",
            message: "reference clock group 'clk200' must have 'p' and 'n' subsignals".into(),
        }),
        Some(_) => {}
    }

    // 2. No package pin is used twice
    let mut owners: BTreeMap<&str, String> = BTreeMap::new();
    for group in &definition.resources {
        for pin in group.all_pins() {
            let owner = format!("{}:{}", group.name, group.index);
            if let Some(previous) = owners.insert(pin, owner.clone()) {
                issues.push(ValidationIssue {
                    severity: "error",
                    message: format!("pin {pin} assigned to both {previous} and {owner}"),
                });
            }
        }
    }

    // 3. Every group has at least one pin
    for group in &definition.resources {
        if group.all_pins().next().is_none() {
            issues.push(ValidationIssue {
                severity: "error",
                message: format!("resource {}:{} has no pins", group.name, group.index),
            });
        }
    }

    // 4. Transceiver group agrees with the variant table
    let has_sfp = definition.resources.iter().any(|g| g.name == "sfp");
    let info = definition.variant.info();
    if has_sfp && !info.has_transceiver {
        issues.push(ValidationIssue {
            severity: "warning",
            message: format!(
                "'sfp' group defined but {} has no transceiver lane to drive it",
                info.name
            ),
        });
    }

    // 5. Status LEDs are optional but worth flagging
    if !definition.resources.iter().any(|g| g.name == "user_led") {
        issues.push(ValidationIssue {
            severity: "warning",
            message: "no 'user_led' groups; the LED chaser cannot be instantiated".into(),
        });
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
variant = "cle-215"

[[resource]]
name = "clk200"
io-standard = "DIFF_SSTL15"

[[resource.subsignal]]
name = "p"
pins = ["J19"]

[[resource.subsignal]]
name = "n"
pins = ["H19"]

[[resource]]
name = "user_led"
index = 0
pins = ["G3"]
"#;

    #[test]
    fn parse_minimal_board() {
        let def = parse_board_toml(MINIMAL).unwrap();
        assert_eq!(def.variant, BoardVariant::Cle215);
        assert_eq!(def.resources.len(), 2);
        assert!(validate_board(&def).is_ok());
        let board = def.into_board().unwrap();
        assert!(board.resources().lookup("clk200", 0).unwrap().is_differential());
        assert!(!board.has_transceiver());
    }

    #[test]
    fn builtin_definitions_validate() {
        for variant in BoardVariant::ALL {
            let def = BoardDefinition::builtin(variant);
            assert!(validate_board(&def).is_ok(), "{variant} failed validation");
        }
    }

    #[test]
    fn toml_round_trip_builtin() {
        let def = BoardDefinition::builtin(BoardVariant::Cle215Plus);
        let text = board_to_toml(&def).unwrap();
        let back = parse_board_toml(&text).unwrap();
        assert_eq!(def, back);
    }

    #[test]
    fn duplicate_pin_detected() {
        let mut def = BoardDefinition::builtin(BoardVariant::Cle215Plus);
        def.resources
            .push(PinGroup::new("user_led", 7).with_pins("J19"));
        let issues = validate_board(&def).unwrap_err();
        assert!(issues
            .iter()
            .any(|i| i.severity == "error" && i.message.contains("J19")));
    }

    #[test]
    fn missing_reference_clock() {
        let def = BoardDefinition {
            variant: BoardVariant::Cle101,
            integrated_main_ram_size: 0,
            resources: vec![PinGroup::new("user_led", 0).with_pins("G3")],
        };
        let issues = validate_board(&def).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("clk200")));
    }

    #[test]
    fn sfp_on_cle101_is_a_warning() {
        let mut def = BoardDefinition::builtin(BoardVariant::Cle101);
        def.resources.push(
            PhysicalResourceMap::acorn_baseboard_mini(BoardVariant::Cle215Plus)
                .lookup("sfp", 0)
                .unwrap()
                .clone(),
        );
        let issues = validate_board(&def).unwrap_err();
        assert!(issues.iter().all(|i| i.severity == "warning"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acorn.board.toml");
        std::fs::write(&path, MINIMAL).unwrap();
        let board = load_board_toml(&path).unwrap();
        assert_eq!(board.variant(), BoardVariant::Cle215);

        let missing = load_board_toml(&dir.path().join("nope.board.toml"));
        assert!(matches!(missing, Err(PlatformError::NotFound { .. })));
    }

    #[test]
    fn load_rejects_invalid_definition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.board.toml");
        std::fs::write(
            &path,
            "variant = \"cle-215+\"\n\n[[resource]]\nname = \"user_led\"\npins = [\"G3\"]\n",
        )
        .unwrap();
        let err = load_board_toml(&path).unwrap_err();
        assert!(matches!(err, PlatformError::Validation { ref detail } if detail.contains("clk200")));
    }

    #[test]
    fn load_accepts_warnings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no-leds.board.toml");
        let mut def = BoardDefinition::builtin(BoardVariant::Cle101);
        def.resources.retain(|g| g.name != "user_led");
        std::fs::write(&path, board_to_toml(&def).unwrap()).unwrap();
        assert!(load_board_toml(&path).is_ok());
    }

    #[test]
    fn integrated_ram_from_file() {
        let text = format!("integrated-main-ram-size = 65536\n{MINIMAL}");
        let board = parse_board_toml(&text).unwrap().into_board().unwrap();
        assert!(board.has_integrated_main_ram());
    }
}
