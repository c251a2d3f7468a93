//! CLI command implementations.

pub mod assemble;
pub mod board;
pub mod clocks;
pub mod init;

use std::path::{Path, PathBuf};

use acorn_platform::parse::load_board_toml;
use acorn_platform::{Board, BoardVariant};
use acorn_soc::{EthernetAddressing, EthernetMode, FeatureConfig};
use anyhow::{Context, Result};

use crate::manifest::{frequency_from_hz, AcornManifest};

/// Board and feature options shared by every command that derives clocks.
#[derive(Debug, Clone, Default)]
pub struct TargetOptions {
    pub variant: Option<BoardVariant>,
    pub board_file: Option<PathBuf>,
    pub integrated_main_ram_size: Option<u64>,
    pub sys_clk_freq: Option<f64>,
    pub ethernet: Option<EthernetMode>,
    pub eth_ip: Option<String>,
    pub remote_ip: Option<String>,
    pub eth_dynamic_ip: bool,
    pub no_memory: bool,
    pub no_led_chaser: bool,
    pub ident: Option<String>,
}

/// Resolve the board: flag file, then manifest file, then the built-in Acorn table.
pub fn resolve_board(
    project_dir: &Path,
    manifest: Option<&AcornManifest>,
    opts: &TargetOptions,
) -> Result<Board> {
    let file = opts.board_file.clone().or_else(|| {
        manifest
            .and_then(|m| m.board.file.as_ref())
            .map(|f| project_dir.join(f))
    });
    let mut board = match file {
        Some(path) => load_board_toml(&path)
            .with_context(|| format!("loading board file {}", path.display()))?,
        None => {
            let variant = opts
                .variant
                .or_else(|| manifest.and_then(|m| m.board.variant))
                .unwrap_or_default();
            Board::acorn(variant)
        }
    };
    let ram = opts
        .integrated_main_ram_size
        .or_else(|| manifest.and_then(|m| m.board.integrated_main_ram_size));
    if let Some(size) = ram {
        board = board.with_integrated_main_ram(size);
    }
    Ok(board)
}

/// Manifest defaults overridden by command-line flags.
pub fn resolve_config(
    manifest: Option<&AcornManifest>,
    board: &Board,
    opts: &TargetOptions,
) -> Result<FeatureConfig> {
    let mut config = match manifest {
        Some(m) => m.feature_config()?,
        None => FeatureConfig::default(),
    };
    // An explicit variant wins; otherwise follow the board that was loaded.
    config.variant = opts
        .variant
        .or_else(|| manifest.and_then(|m| m.board.variant))
        .unwrap_or(board.variant());
    if let Some(hz) = opts.sys_clk_freq {
        config.sys_clk_freq = frequency_from_hz(hz)?;
    }
    if let Some(mode) = opts.ethernet {
        config.ethernet.mode = mode;
    }
    if let Some(ip) = &opts.eth_ip {
        config.ethernet.local_ip = ip.clone();
    }
    if let Some(ip) = &opts.remote_ip {
        config.ethernet.remote_ip = Some(ip.clone());
    }
    if opts.eth_dynamic_ip {
        config.ethernet.addressing = EthernetAddressing::DynamicIp;
    }
    if opts.no_memory {
        config.with_memory = false;
    }
    if opts.no_led_chaser {
        config.with_led_chaser = false;
    }
    if let Some(ident) = &opts.ident {
        config.ident = Some(ident.clone());
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use acorn_platform::parse::{board_to_toml, BoardDefinition};

    #[test]
    fn flags_override_manifest() {
        let manifest: AcornManifest = toml::from_str(
            "[board]\nvariant = \"cle-215\"\n[features]\nwith-led-chaser = false\n",
        )
        .unwrap();
        let opts = TargetOptions {
            ethernet: Some(EthernetMode::Etherbone),
            eth_ip: Some("10.1.1.1".into()),
            sys_clk_freq: Some(156.25e6),
            no_memory: true,
            ..TargetOptions::default()
        };
        let board = resolve_board(Path::new("."), Some(&manifest), &opts).unwrap();
        assert_eq!(board.variant(), BoardVariant::Cle215);
        let config = resolve_config(Some(&manifest), &board, &opts).unwrap();
        assert_eq!(config.variant, BoardVariant::Cle215);
        assert_eq!(config.ethernet.mode, EthernetMode::Etherbone);
        assert_eq!(config.ethernet.local_ip, "10.1.1.1");
        assert!(!config.with_memory);
        assert!(!config.with_led_chaser);
    }

    #[test]
    fn board_file_sets_variant() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.board.toml");
        let definition = BoardDefinition::builtin(BoardVariant::Cle101);
        fs::write(&path, board_to_toml(&definition).unwrap()).unwrap();

        let opts = TargetOptions {
            board_file: Some(path),
            integrated_main_ram_size: Some(0x8000),
            ..TargetOptions::default()
        };
        let board = resolve_board(dir.path(), None, &opts).unwrap();
        assert_eq!(board.variant(), BoardVariant::Cle101);
        assert!(board.has_integrated_main_ram());
        let config = resolve_config(None, &board, &opts).unwrap();
        assert_eq!(config.variant, BoardVariant::Cle101);
    }

    #[test]
    fn invalid_board_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.board.toml");
        fs::write(
            &path,
            "variant = \"cle-215+\"\n\n[[resource]]\nname = \"user_led\"\npins = [\"G3\"]\n",
        )
        .unwrap();
        let opts = TargetOptions {
            board_file: Some(path),
            ..TargetOptions::default()
        };
        let err = resolve_board(dir.path(), None, &opts).unwrap_err();
        let text = format!("{err:#}");
        assert!(text.starts_with("loading board file"));
        assert!(text.contains("missing reference clock group 'clk200'"));
    }
}
