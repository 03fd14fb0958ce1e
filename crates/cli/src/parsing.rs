//! A tiny line-oriented textual netlist format, good enough to drive `check`
//! without writing a real gate-level netlist parser (out of scope for this
//! crate; see [`sat_nexus_core::netlist::Netlist`]'s doc comment).
//!
//! One statement per line, blank lines and `#`-comments ignored:
//!
//! ```text
//! INPUT a.b.c
//! OUTPUT y : N3
//! CELL 3 AND2 top.g0 : PI0 PI1
//! ```
//!
//! A driver token is `PI<index>`, `N<id>`, `FV<id>.<port>`, or `SEQ<id>.<port>`.
//! Hierarchical paths are dot-separated; `--prefix` strips a leading
//! component shared by both sides before it ever reaches a [`Driver`].

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use sat_nexus_core::netlist::{Driver, InMemoryNetlist};

pub fn read_lines<P>(filename: P) -> io::Result<io::Lines<io::BufReader<File>>>
where
    P: AsRef<Path>,
{
    let file = File::open(filename)?;
    Ok(io::BufReader::new(file).lines())
}

fn split_path(s: &str, prefix: Option<&str>) -> Vec<String> {
    let mut parts: Vec<String> = s.split('.').map(String::from).collect();
    if let Some(p) = prefix {
        if parts.first().map(|s| s.as_str()) == Some(p) {
            parts.remove(0);
        }
    }
    parts
}

fn parse_driver(tok: &str) -> Driver {
    if let Some(rest) = tok.strip_prefix("PI") {
        return Driver::PrimaryInput(rest.parse().unwrap_or_else(|e| panic!("bad PI index '{rest}': {e}")));
    }
    if let Some(rest) = tok.strip_prefix("SEQ") {
        let (id, port) = rest.split_once('.').unwrap_or_else(|| panic!("bad SEQ driver '{tok}', expected SEQ<id>.<port>"));
        return Driver::SequentialOutput(
            id.parse().unwrap_or_else(|e| panic!("bad SEQ id '{id}': {e}")),
            port.parse().unwrap_or_else(|e| panic!("bad SEQ port '{port}': {e}")),
        );
    }
    if let Some(rest) = tok.strip_prefix("FV") {
        let (id, port) = rest.split_once('.').unwrap_or_else(|| panic!("bad FV driver '{tok}', expected FV<id>.<port>"));
        return Driver::FreeVar(
            id.parse().unwrap_or_else(|e| panic!("bad FV id '{id}': {e}")),
            port.parse().unwrap_or_else(|e| panic!("bad FV port '{port}': {e}")),
        );
    }
    if let Some(rest) = tok.strip_prefix('N') {
        return Driver::Node(rest.parse().unwrap_or_else(|e| panic!("bad node id '{rest}': {e}")));
    }
    panic!("unrecognized driver token '{tok}'");
}

/// Parses the textual netlist format from `path`, stripping `prefix` (if
/// given) from every hierarchical path as it's read.
pub fn parse_netlist_file(path: impl AsRef<Path>, prefix: Option<&str>) -> io::Result<InMemoryNetlist> {
    let mut net = InMemoryNetlist::new();
    for line in read_lines(path)? {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut words = line.split_whitespace();
        let keyword = words.next().expect("non-empty line has at least one word");
        let rest: Vec<&str> = words.collect();

        match keyword {
            "INPUT" => {
                let path = split_path(rest[0], prefix);
                net.add_primary_input(path);
            }
            "OUTPUT" => {
                let sep = rest.iter().position(|&w| w == ":").unwrap_or_else(|| panic!("OUTPUT line missing ':': {line}"));
                let path = split_path(&rest[..sep].join("."), prefix);
                let driver = parse_driver(rest[sep + 1]);
                net.add_primary_output(path, driver);
            }
            "CELL" => {
                let sep = rest.iter().position(|&w| w == ":").unwrap_or_else(|| panic!("CELL line missing ':': {line}"));
                let id: u32 = rest[0].parse().unwrap_or_else(|e| panic!("bad cell id '{}': {e}", rest[0]));
                let kind = rest[1];
                let path = split_path(&rest[2..sep].join("."), prefix);
                let drivers: Vec<Driver> = rest[sep + 1..].iter().map(|t| parse_driver(t)).collect();
                net.add_cell(id, kind, path, drivers);
            }
            other => panic!("unrecognized netlist statement '{other}' in line: {line}"),
        }
    }
    Ok(net)
}
