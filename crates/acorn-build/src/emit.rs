//! Artifact rendering: SoC description, constraints and toolchain script.

use std::fmt::Write as _;

use acorn_platform::{Constraint, PinGroup};
use acorn_soc::AssembledSoc;

use crate::error::Result;

/// Pretty-printed JSON description of the assembled SoC.
pub fn render_json(soc: &AssembledSoc) -> Result<String> {
    Ok(serde_json::to_string_pretty(soc)?)
}

/// Top-level port name for a pin group.
///
/// The index is appended only when the SoC claimed more than one group of
/// that name (`user_led0`..`user_led3`, but `serial`, `ddram`).
fn port_base(group: &PinGroup, claimed: &[PinGroup]) -> String {
    let siblings = claimed.iter().filter(|g| g.name == group.name).count();
    if siblings > 1 {
        format!("{}{}", group.name, group.index)
    } else {
        group.name.clone()
    }
}

fn pin_lines(out: &mut String, port: &str, pins: &[String], io_standard: Option<&str>) {
    for (bit, pin) in pins.iter().enumerate() {
        let target = if pins.len() > 1 {
            format!("{port}[{bit}]")
        } else {
            port.to_string()
        };
        let _ = writeln!(out, "set_property LOC {pin} [get_ports {{{target}}}]");
        if let Some(standard) = io_standard {
            let _ = writeln!(out, "set_property IOSTANDARD {standard} [get_ports {{{target}}}]");
        }
    }
}

/// Vivado XDC: pin placement for every claimed group, then timing constraints.
pub fn render_xdc(soc: &AssembledSoc) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {} ({})", soc.ident(), soc.device());
    let _ = writeln!(out);

    for group in soc.pins() {
        let base = port_base(group, soc.pins());
        let _ = writeln!(out, "## {base}");
        let group_standard = group.io_standard.as_deref();
        if !group.pins.is_empty() {
            pin_lines(&mut out, &base, &group.pins, group_standard);
        }
        for sub in &group.subsignals {
            let standard = sub.io_standard.as_deref().or(group_standard);
            pin_lines(&mut out, &format!("{base}_{}", sub.name), &sub.pins, standard);
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## timing");
    for constraint in soc.constraints().iter() {
        match constraint {
            Constraint::Period { net, period_ns } => {
                let _ = writeln!(
                    out,
                    "create_clock -name {net} -period {period_ns:.3} [get_ports {net}]"
                );
            }
            Constraint::FalsePath { from, to, .. } => {
                let _ = writeln!(
                    out,
                    "set_clock_groups -group [get_clocks -include_generated_clocks -of [get_nets {from}]] \
                     -group [get_clocks -include_generated_clocks -of [get_nets {to}]] -asynchronous"
                );
            }
            Constraint::Command { text } => {
                let _ = writeln!(out, "{text}");
            }
        }
    }
    out
}

/// Batch-mode Vivado script producing `<name>.bit` and `<name>.bin` in `build_dir`.
pub fn render_tcl(soc: &AssembledSoc, name: &str, build_dir: &str) -> String {
    let part = soc.device();
    let mut out = String::new();
    let _ = writeln!(out, "cd {{{build_dir}}}");
    let _ = writeln!(out, "create_project -force -name {name} -part {part}");
    let _ = writeln!(out, "read_xdc {name}.xdc");
    let _ = writeln!(out, "synth_design -directive default -top {name} -part {part}");
    let _ = writeln!(out, "opt_design -directive default");
    let _ = writeln!(out, "place_design -directive default");
    let _ = writeln!(out, "route_design -directive default");
    let _ = writeln!(out, "report_timing_summary -file {name}_timing.rpt");
    let _ = writeln!(out, "write_bitstream -force {name}.bit");
    let _ = writeln!(
        out,
        "write_cfgmem -force -format bin -interface spix4 -size 16 -loadbit \"up 0x0 {name}.bit\" -file {name}.bin"
    );
    let _ = writeln!(out, "quit");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use acorn_clock::S7Pll;
    use acorn_platform::{Board, BoardVariant};
    use acorn_soc::{assemble_board, EthernetMode, FeatureConfig};

    fn soc(mode: EthernetMode) -> AssembledSoc {
        let board = Board::acorn(BoardVariant::Cle215Plus);
        let mut config = FeatureConfig::default();
        config.ethernet.mode = mode;
        let pll = S7Pll::new(-3).unwrap();
        assemble_board(&config, &board, &pll).unwrap().soc
    }

    #[test]
    fn xdc_places_pins() {
        let xdc = render_xdc(&soc(EthernetMode::None));
        assert!(xdc.contains("set_property LOC J19 [get_ports {clk200_p}]"));
        assert!(xdc.contains("set_property IOSTANDARD DIFF_SSTL15 [get_ports {clk200_p}]"));
        assert!(xdc.contains("set_property LOC G1 [get_ports {serial_tx}]"));
        assert!(xdc.contains("set_property IOSTANDARD LVCMOS18 [get_ports {serial_rx}]"));
        assert!(xdc.contains("set_property LOC H4 [get_ports {user_led3}]"));
        assert!(xdc.contains("set_property LOC M15 [get_ports {ddram_a[0]}]"));
        assert!(xdc.contains("set_property IOSTANDARD SSTL15 [get_ports {ddram_a[15]}]"));
        assert!(!xdc.contains("sfp"));
    }

    #[test]
    fn xdc_timing_section() {
        let xdc = render_xdc(&soc(EthernetMode::Etherbone));
        assert!(xdc.contains("create_clock -name clk200_p -period 5.000 [get_ports clk200_p]"));
        assert!(xdc.contains("[get_nets sys_clk]"));
        assert!(xdc.contains("[get_nets clk200_se]"));
        assert!(xdc.contains("set_property SEVERITY {Warning} [get_drc_checks REQP-49]"));
        assert!(xdc.contains("set_property LOC D5 [get_ports {sfp_txp}]"));
    }

    #[test]
    fn tcl_targets_device() {
        let tcl = render_tcl(&soc(EthernetMode::None), "acorn", "/tmp/out");
        assert!(tcl.starts_with("cd {/tmp/out}"));
        assert!(tcl.contains("-part xc7a200t-fbg484-3"));
        assert!(tcl.contains("write_bitstream -force acorn.bit"));
        assert!(tcl.contains("-file acorn.bin"));
    }

    #[test]
    fn json_describes_soc() {
        let json = render_json(&soc(EthernetMode::Ethernet)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["device"], "xc7a200t-fbg484-3");
        assert_eq!(value["peripherals"].as_array().unwrap().len(), 3);
        assert_eq!(value["peripherals"][1]["type"], "network");
    }
}
