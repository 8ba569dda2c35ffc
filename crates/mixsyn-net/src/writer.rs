//! Netlist writers
//!
//! Structural Verilog and BLIF output for mixed networks. Gate values are
//! named `n<id>`; primary inputs and latches keep their port names.

use crate::error::NetResult;
use crate::network::{Network, Node, Signal};
use std::path::Path;

/// Options shared by all writers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    /// Omit primary outputs driven directly by a primary input or constant
    pub skip_feedthrough: bool,
}

fn written_outputs<'a>(
    network: &'a Network,
    options: &WriteOptions,
) -> Vec<&'a (String, Signal)> {
    let skipped = if options.skip_feedthrough {
        network.feedthrough_outputs()
    } else {
        Vec::new()
    };
    network
        .outputs()
        .iter()
        .enumerate()
        .filter(|(i, _)| !skipped.contains(i))
        .map(|(_, o)| o)
        .collect()
}

fn verilog_ident(name: &str) -> String {
    let simple = name
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c.is_ascii_alphabetic() || (i > 0 && (c.is_ascii_digit() || c == '$')));
    if simple && !name.is_empty() {
        name.to_string()
    } else {
        format!("\\{} ", name)
    }
}

fn verilog_signal(network: &Network, s: Signal) -> String {
    match s.const_value() {
        Some(true) => "1'b1".to_string(),
        Some(false) => "1'b0".to_string(),
        None => {
            let name = verilog_ident(&network.node_name(s.node));
            if s.inverted {
                format!("~{}", name)
            } else {
                name
            }
        }
    }
}

/// Generate structural Verilog
pub fn to_verilog(network: &Network, options: &WriteOptions) -> String {
    let mut output = String::new();
    let outputs = written_outputs(network, options);
    let latches = network.latches();

    let mut ports: Vec<String> = Vec::new();
    if !latches.is_empty() {
        ports.push("clk".to_string());
    }
    ports.extend(network.inputs().iter().map(|(_, name)| verilog_ident(name)));
    ports.extend(outputs.iter().map(|(name, _)| verilog_ident(name)));

    output.push_str(&format!(
        "module {}({});\n",
        verilog_ident(&network.name),
        ports.join(", ")
    ));

    if !latches.is_empty() {
        output.push_str("  input clk;\n");
    }
    for (_, name) in network.inputs() {
        output.push_str(&format!("  input {};\n", verilog_ident(name)));
    }
    for (name, _) in &outputs {
        output.push_str(&format!("  output {};\n", verilog_ident(name)));
    }
    for (_, name, _, init) in &latches {
        match init {
            Some(v) => output.push_str(&format!(
                "  reg {} = 1'b{};\n",
                verilog_ident(name),
                u8::from(*v)
            )),
            None => output.push_str(&format!("  reg {};\n", verilog_ident(name))),
        }
    }
    for (id, _) in network.iter_gates() {
        output.push_str(&format!("  wire {};\n", id));
    }
    output.push('\n');

    for (id, node) in network.iter_gates() {
        let expr = match node {
            Node::And { left, right } => format!(
                "{} & {}",
                verilog_signal(network, *left),
                verilog_signal(network, *right)
            ),
            Node::Maj { a, b, c } => {
                let (a, b, c) = (
                    verilog_signal(network, *a),
                    verilog_signal(network, *b),
                    verilog_signal(network, *c),
                );
                format!("({a} & {b}) | ({a} & {c}) | ({b} & {c})")
            }
            _ => continue,
        };
        output.push_str(&format!("  assign {} = {};\n", id, expr));
    }

    for (name, s) in &outputs {
        if !s.inverted && network.node_name(s.node) == *name {
            continue;
        }
        output.push_str(&format!(
            "  assign {} = {};\n",
            verilog_ident(name),
            verilog_signal(network, *s)
        ));
    }

    if !latches.is_empty() {
        output.push_str("\n  always @(posedge clk) begin\n");
        for (_, name, data, _) in &latches {
            output.push_str(&format!(
                "    {} <= {};\n",
                verilog_ident(name),
                verilog_signal(network, *data)
            ));
        }
        output.push_str("  end\n");
    }

    output.push_str("endmodule\n");
    output
}

fn blif_cover(fanins: &[Signal], cubes: &[&[Option<bool>]]) -> String {
    let mut cover = String::new();
    for cube in cubes {
        for (s, lit) in fanins.iter().zip(cube.iter()) {
            cover.push(match lit {
                None => '-',
                Some(v) => {
                    if *v != s.inverted {
                        '1'
                    } else {
                        '0'
                    }
                }
            });
        }
        cover.push_str(" 1\n");
    }
    cover
}

fn blif_buffer(network: &Network, from: Signal, to: &str) -> String {
    match from.const_value() {
        Some(true) => format!(".names {}\n1\n", to),
        Some(false) => format!(".names {}\n", to),
        None => format!(
            ".names {} {}\n{} 1\n",
            network.node_name(from.node),
            to,
            if from.inverted { '0' } else { '1' }
        ),
    }
}

/// Generate BLIF
pub fn to_blif(network: &Network, options: &WriteOptions) -> String {
    let mut output = String::new();
    let outputs = written_outputs(network, options);

    output.push_str(&format!(".model {}\n", network.name));
    let inputs: Vec<&str> = network.inputs().into_iter().map(|(_, n)| n).collect();
    output.push_str(&format!(".inputs {}\n", inputs.join(" ")));
    let names: Vec<&str> = outputs.iter().map(|(n, _)| n.as_str()).collect();
    output.push_str(&format!(".outputs {}\n", names.join(" ")));

    for (_, name, _, init) in network.latches() {
        let init = match init {
            Some(false) => 0,
            Some(true) => 1,
            None => 3,
        };
        output.push_str(&format!(".latch {}_next {} {}\n", name, name, init));
    }

    for (id, node) in network.iter_gates() {
        let fanins = node.fanins();
        let mut header = String::from(".names");
        for s in &fanins {
            if s.is_const() {
                header.push_str(" $false");
            } else {
                header.push(' ');
                header.push_str(&network.node_name(s.node));
            }
        }
        header.push_str(&format!(" {}\n", id));
        output.push_str(&header);

        let t = Some(true);
        match node {
            Node::And { .. } => output.push_str(&blif_cover(&fanins, &[&[t, t]])),
            Node::Maj { .. } => output.push_str(&blif_cover(
                &fanins,
                &[&[t, t, None], &[t, None, t], &[None, t, t]],
            )),
            _ => {}
        }
    }

    if network.iter_gates().any(|(_, n)| n.fanins().iter().any(Signal::is_const)) {
        output.push_str(".names $false\n");
    }

    for (name, s) in &outputs {
        if !s.inverted && network.node_name(s.node) == *name {
            continue;
        }
        output.push_str(&blif_buffer(network, *s, name));
    }
    for (_, name, data, _) in network.latches() {
        output.push_str(&blif_buffer(network, data, &format!("{}_next", name)));
    }

    output.push_str(".end\n");
    output
}

/// Write structural Verilog to a file
pub fn write_verilog(network: &Network, path: &Path, options: &WriteOptions) -> NetResult<()> {
    std::fs::write(path, to_verilog(network, options))?;
    tracing::info!("Wrote Verilog netlist to {}", path.display());
    Ok(())
}

/// Write BLIF to a file
pub fn write_blif(network: &Network, path: &Path, options: &WriteOptions) -> NetResult<()> {
    std::fs::write(path, to_blif(network, options))?;
    tracing::info!("Wrote BLIF netlist to {}", path.display());
    Ok(())
}
