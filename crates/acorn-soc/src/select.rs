//! Peripheral selection.
//!
//! Maps a [`FeatureConfig`] onto an ordered list of intents: memory, then
//! network, then status. Everything that depends only on configuration and
//! board capabilities is checked in [`PeripheralSelector::preflight`], which
//! the assembly pipeline runs before any clock work.

use std::net::Ipv4Addr;

use acorn_platform::Board;
use tracing::{debug, warn};

use crate::config::{EthernetAddressing, EthernetMode, FeatureConfig};
use crate::error::SocError;
use crate::intent::{MemoryParams, NetworkBridge, PeripheralIntent, StatusParams};
use crate::transceiver::ACORN_QPLL;

/// SDRAM fitted to every Acorn module.
const SDRAM_MODULE: &str = "MT41K512M16";
const LED_CHASER_PERIOD_MS: u64 = 1000;

/// Decides which peripherals a board build gets.
#[derive(Debug, Clone, Copy)]
pub struct PeripheralSelector<'a> {
    board: &'a Board,
}

impl<'a> PeripheralSelector<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self { board }
    }

    /// Whether external memory will be instantiated.
    pub fn memory_selected(&self, config: &FeatureConfig) -> bool {
        config.with_memory && !self.board.has_integrated_main_ram()
    }

    /// Configuration checks that need no clock or peripheral work.
    pub fn preflight(&self, config: &FeatureConfig) -> Result<(), SocError> {
        if config.variant != self.board.variant() {
            return Err(SocError::VariantMismatch {
                config: config.variant,
                board: self.board.variant(),
            });
        }
        let unsupported = |feature: &str| SocError::UnsupportedFeatureForVariant {
            feature: feature.to_string(),
            variant: self.board.variant(),
        };

        if self.memory_selected(config) && !self.board.resources().has_group("ddram") {
            return Err(unsupported("DDR3 memory"));
        }
        if config.ethernet.mode.is_enabled() {
            if !self.board.has_transceiver() {
                return Err(unsupported(config.ethernet.mode.as_str()));
            }
            network_bridge(config)?;
            ACORN_QPLL.check(config.sys_clk_freq)?;
        }
        if config.with_led_chaser && !self.board.resources().has_group("user_led") {
            return Err(unsupported("LED chaser"));
        }
        Ok(())
    }

    /// Produce the ordered intent list.
    pub fn select(&self, config: &FeatureConfig) -> Result<Vec<PeripheralIntent>, SocError> {
        self.preflight(config)?;

        let mut intents = Vec::new();
        if self.memory_selected(config) {
            intents.push(PeripheralIntent::memory(MemoryParams {
                module: SDRAM_MODULE.to_string(),
                memtype: "DDR3".to_string(),
                nphases: 4,
                rate: "1:4".to_string(),
                l2_cache_size: config.l2_cache_size,
            }));
        } else if config.with_memory {
            debug!(
                size = self.board.integrated_main_ram_size(),
                "integrated main RAM present, skipping SDRAM"
            );
        }

        if let Some(bridge) = network_bridge(config)? {
            intents.push(PeripheralIntent::network(bridge));
        }

        if config.with_led_chaser {
            intents.push(PeripheralIntent::status(StatusParams {
                period_ms: LED_CHASER_PERIOD_MS,
            }));
        }

        debug!(
            intents = ?intents.iter().map(|i| i.kind()).collect::<Vec<_>>(),
            "peripherals selected"
        );
        Ok(intents)
    }
}

fn parse_ip(parameter: &str, value: &str) -> Result<Ipv4Addr, SocError> {
    value
        .trim()
        .parse()
        .map_err(|_| SocError::MalformedAddressingParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
        })
}

/// Validate addressing and build the bridge, or `None` when networking is off.
fn network_bridge(config: &FeatureConfig) -> Result<Option<NetworkBridge>, SocError> {
    let eth = &config.ethernet;
    let addresses = || -> Result<(Ipv4Addr, Option<Ipv4Addr>), SocError> {
        let local_ip = parse_ip("local IP address", &eth.local_ip)?;
        let remote_ip = eth
            .remote_ip
            .as_deref()
            .map(|ip| parse_ip("remote IP address", ip))
            .transpose()?;
        Ok((local_ip, remote_ip))
    };

    let bridge = match eth.mode {
        EthernetMode::None => return Ok(None),
        EthernetMode::Etherbone => {
            let (ip, _) = addresses()?;
            if eth.addressing == EthernetAddressing::DynamicIp {
                warn!("dynamic IP addressing is ignored for Etherbone");
            }
            NetworkBridge::Etherbone { ip }
        }
        EthernetMode::Ethernet => {
            let (local_ip, remote_ip) = addresses()?;
            NetworkBridge::Ethernet {
                local_ip,
                remote_ip,
                dynamic_ip: eth.addressing == EthernetAddressing::DynamicIp,
            }
        }
    };
    Ok(Some(bridge))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EthernetConfig;
    use crate::intent::{IntentKind, IntentParams};
    use acorn_platform::BoardVariant;

    fn kinds(intents: &[PeripheralIntent]) -> Vec<IntentKind> {
        intents.iter().map(|i| i.kind()).collect()
    }

    fn with_mode(mode: EthernetMode) -> FeatureConfig {
        FeatureConfig {
            ethernet: EthernetConfig {
                mode,
                ..EthernetConfig::default()
            },
            ..FeatureConfig::default()
        }
    }

    #[test]
    fn default_selects_memory_and_status() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let intents = PeripheralSelector::new(&board)
            .select(&FeatureConfig::default())
            .unwrap();
        assert_eq!(kinds(&intents), vec![IntentKind::Memory, IntentKind::Status]);
    }

    #[test]
    fn integrated_ram_suppresses_memory() {
        let board = Board::acorn(BoardVariant::Cle215Plus).with_integrated_main_ram(0x10000);
        let selector = PeripheralSelector::new(&board);
        assert!(!selector.memory_selected(&FeatureConfig::default()));
        let intents = selector.select(&FeatureConfig::default()).unwrap();
        assert_eq!(kinds(&intents), vec![IntentKind::Status]);
    }

    #[test]
    fn explicit_suppression() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let config = FeatureConfig {
            with_memory: false,
            with_led_chaser: false,
            ..FeatureConfig::default()
        };
        assert!(PeripheralSelector::new(&board).select(&config).unwrap().is_empty());
    }

    #[test]
    fn full_selection_is_ordered() {
        let board = Board::acorn(BoardVariant::Cle215);
        let config = FeatureConfig {
            variant: BoardVariant::Cle215,
            ..with_mode(EthernetMode::Ethernet)
        };
        let intents = PeripheralSelector::new(&board).select(&config).unwrap();
        assert_eq!(
            kinds(&intents),
            vec![IntentKind::Memory, IntentKind::Network, IntentKind::Status]
        );
    }

    #[test]
    fn no_network_when_mode_none() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        for with_memory in [true, false] {
            for with_led_chaser in [true, false] {
                let config = FeatureConfig {
                    with_memory,
                    with_led_chaser,
                    ..FeatureConfig::default()
                };
                let intents = PeripheralSelector::new(&board).select(&config).unwrap();
                assert!(intents.iter().all(|i| i.kind() != IntentKind::Network));
            }
        }
    }

    #[test]
    fn mode_none_builds_no_bridge() {
        let mut config = with_mode(EthernetMode::None);
        config.ethernet.local_ip = "192.168.1".into();
        config.ethernet.remote_ip = Some("tftp-server".into());
        assert_eq!(network_bridge(&config).unwrap(), None);

        config.ethernet.mode = EthernetMode::Ethernet;
        assert!(network_bridge(&config).is_err());
    }

    #[test]
    fn network_rejects_sys_clock_off_line_rate() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let config = FeatureConfig {
            sys_clk_freq: acorn_clock::Frequency::from_mhz(100),
            ..with_mode(EthernetMode::Etherbone)
        };
        let err = PeripheralSelector::new(&board).preflight(&config).unwrap_err();
        assert!(matches!(err, SocError::InfeasibleClockPlan(_)));
    }

    #[test]
    fn bridges_are_mutually_exclusive() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        for mode in [EthernetMode::Ethernet, EthernetMode::Etherbone] {
            let intents = PeripheralSelector::new(&board).select(&with_mode(mode)).unwrap();
            let bridges: Vec<_> = intents
                .iter()
                .filter_map(|i| match i.params() {
                    IntentParams::Network(b) => Some(b),
                    _ => None,
                })
                .collect();
            assert_eq!(bridges.len(), 1);
            match (mode, bridges[0]) {
                (EthernetMode::Ethernet, NetworkBridge::Ethernet { .. })
                | (EthernetMode::Etherbone, NetworkBridge::Etherbone { .. }) => {}
                other => panic!("unexpected bridge {other:?}"),
            }
        }
    }

    #[test]
    fn ethernet_carries_addressing() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let mut config = with_mode(EthernetMode::Ethernet);
        config.ethernet.addressing = EthernetAddressing::DynamicIp;
        config.ethernet.remote_ip = Some("192.168.1.100".into());
        let intents = PeripheralSelector::new(&board).select(&config).unwrap();
        let IntentParams::Network(bridge) = intents[1].params() else {
            panic!("expected network intent");
        };
        assert_eq!(
            bridge,
            &NetworkBridge::Ethernet {
                local_ip: Ipv4Addr::new(192, 168, 1, 50),
                remote_ip: Some(Ipv4Addr::new(192, 168, 1, 100)),
                dynamic_ip: true,
            }
        );
    }

    #[test]
    fn malformed_addresses_fail_fast() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let mut config = with_mode(EthernetMode::Etherbone);
        config.ethernet.local_ip = "192.168.1.500".into();
        let err = PeripheralSelector::new(&board).preflight(&config).unwrap_err();
        assert!(matches!(
            err,
            SocError::MalformedAddressingParameter { ref value, .. } if value == "192.168.1.500"
        ));

        let mut config = with_mode(EthernetMode::Ethernet);
        config.ethernet.remote_ip = Some("tftp-server".into());
        assert!(matches!(
            PeripheralSelector::new(&board).select(&config),
            Err(SocError::MalformedAddressingParameter { .. })
        ));
    }

    #[test]
    fn addresses_ignored_without_network() {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let mut config = FeatureConfig::default();
        config.ethernet.local_ip = "not an address".into();
        assert!(PeripheralSelector::new(&board).select(&config).is_ok());
    }

    #[test]
    fn network_on_variant_without_transceiver() {
        let board = Board::acorn(BoardVariant::Cle101);
        let config = FeatureConfig {
            variant: BoardVariant::Cle101,
            ..with_mode(EthernetMode::Etherbone)
        };
        let err = PeripheralSelector::new(&board).select(&config).unwrap_err();
        assert!(matches!(
            err,
            SocError::UnsupportedFeatureForVariant { ref feature, variant: BoardVariant::Cle101 }
                if feature == "etherbone"
        ));
    }

    #[test]
    fn variant_mismatch() {
        let board = Board::acorn(BoardVariant::Cle101);
        let err = PeripheralSelector::new(&board)
            .preflight(&FeatureConfig::default())
            .unwrap_err();
        assert!(matches!(err, SocError::VariantMismatch { .. }));
    }
}
