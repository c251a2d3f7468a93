//! `acorn variants`, `acorn describe`, `acorn validate`: board inspection.

use std::path::Path;

use acorn_platform::parse::{board_to_toml, load_board_toml, BoardDefinition};
use acorn_platform::variant::VARIANTS;
use acorn_platform::{Board, BoardVariant, PinGroup};
use anyhow::{bail, Result};

/// List the supported board variants.
pub fn variants() -> Result<()> {
    println!("Board variants:");
    println!();
    for info in &VARIANTS {
        println!("  {:<10} {}", info.name, info.description);
    }
    println!();
    println!("Use 'acorn describe <variant>' for details.");
    Ok(())
}

/// Describe a variant's capabilities and pin groups, or dump its definition as TOML.
pub fn describe(variant: BoardVariant, format: Option<&str>) -> Result<()> {
    match format {
        None | Some("text") => print!("{}", describe_text(&Board::acorn(variant))),
        Some("toml") => print!("{}", board_to_toml(&BoardDefinition::builtin(variant))?),
        Some(other) => bail!("unknown format '{other}' (expected 'text' or 'toml')"),
    }
    Ok(())
}

pub(crate) fn describe_text(board: &Board) -> String {
    let info = board.info();
    let mut out = String::new();
    out.push_str(&format!("=== Board: {} ===\n", info.name));
    out.push_str(&format!("{}\n\n", info.description));

    out.push_str("--- Device ---\n");
    out.push_str(&format!("  Part:        {}\n", info.device));
    out.push_str(&format!("  Speed grade: {}\n", info.speed_grade));
    out.push_str(&format!("  Transceiver: {}\n", yes_no(board.has_transceiver())));
    out.push_str(&format!("  Flash proxy: {}\n", info.flash_proxy));
    out.push('\n');

    out.push_str("--- Resources ---\n");
    for group in board.resources().groups() {
        out.push_str(&format!("  {}\n", group_line(group)));
        for sub in &group.subsignals {
            out.push_str(&format!("      {:<8} {}\n", sub.name, sub.pins.join(" ")));
        }
    }
    out
}

fn group_line(group: &PinGroup) -> String {
    let label = format!("{}:{}", group.name, group.index);
    let standard = group.io_standard.as_deref().unwrap_or("-");
    if group.pins.is_empty() {
        format!("{label:<14} {standard}")
    } else {
        format!("{label:<14} {standard:<10} {}", group.pins.join(" "))
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// Check a `.board.toml` file and report issues.
pub fn validate(path: &Path) -> Result<()> {
    let board = load_board_toml(path)?;
    println!("{}: ok ({})", path.display(), board.variant());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn describe_lists_groups() {
        let text = describe_text(&Board::acorn(BoardVariant::Cle215Plus));
        assert!(text.starts_with("=== Board: cle-215+ ==="));
        assert!(text.contains("xc7a200t-fbg484-3"));
        assert!(text.contains("Transceiver: yes"));
        assert!(text.contains("clk200:0"));
        assert!(text.contains("ddram:0"));
    }

    #[test]
    fn cle101_has_no_transceiver() {
        let text = describe_text(&Board::acorn(BoardVariant::Cle101));
        assert!(text.contains("Transceiver: no"));
        assert!(!text.contains("sfp:0"));
    }

    #[test]
    fn unknown_format_rejected() {
        assert!(describe(BoardVariant::Cle215, Some("yaml")).is_err());
    }

    #[test]
    fn validate_builtin_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cle-215.board.toml");
        fs::write(&path, board_to_toml(&BoardDefinition::builtin(BoardVariant::Cle215)).unwrap())
            .unwrap();
        validate(&path).unwrap();
    }

    #[test]
    fn validate_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.board.toml");
        fs::write(&path, "variant = 7\n").unwrap();
        assert!(validate(&path).is_err());
    }
}
