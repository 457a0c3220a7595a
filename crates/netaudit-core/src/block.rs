//! Block splitter for IOS-style configuration captures.
//!
//! Raw captures are a mix of configuration text and the output of other
//! commands typed at a device prompt. The splitter walks the text once and
//! emits an ordered list of flat [`Block`]s:
//!
//! - `interface`, `line`, `router`, `key chain`, `ip access-list` and
//!   `archive` headers open a block that ends at the next header, a `!`
//!   at the header's indentation or shallower, `end`/`exit`, or end of input.
//! - Top-level lines between blocks are collected into `Global` blocks.
//! - A prompt line such as `SW01#show ip interface brief` opens a
//!   `CommandOutput` block holding that command's output verbatim, while
//!   `show running-config` switches back to configuration mode.
//!
//! Header matching is case-insensitive and blocks never nest.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;
use tracing::debug;

use crate::utils::{command_matches, compile, indent_of};

static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^([A-Za-z0-9][\w.\-]*)(\(([\w\-]+)\))?#\s*(.*)$"));
static INTERFACE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^interface\s+(\S.*?)\s*$"));
static LINE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^line\s+(\S+)(?:\s+(\S.*?))?\s*$"));
static ROUTER: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^router\s+(\S+)(?:\s+(\S+))?"));
static KEY_CHAIN: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^key\s+chain\s+(\S+)"));
static NAMED_ACL: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^ip\s+access-list\s+(standard|extended)\s+(\S+)"));
static ARCHIVE: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^archive\s*$"));

/// Kind of a block, derived from its header line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum BlockKind {
    /// Top-level lines outside any header block.
    Global,
    /// `interface <name>`.
    Interface {
        /// Interface name as written in the header.
        name: String,
    },
    /// `line <kind> <range>`.
    Line {
        /// Line type token (`vty`, `con`, `aux`, ...).
        kind: String,
        /// Line range (`0 4`, `0`), possibly empty.
        range: String,
    },
    /// `router <protocol> [process]`.
    Router {
        /// Protocol token (`bgp`, `ospf`, ...).
        protocol: String,
        /// Process id or AS number, when present.
        process: Option<String>,
    },
    /// `key chain <name>`.
    KeyChain {
        /// Key chain name.
        name: String,
    },
    /// `ip access-list standard|extended <name>`.
    AccessList {
        /// ACL name.
        name: String,
        /// Whether the list is extended.
        extended: bool,
    },
    /// `archive`.
    Archive,
    /// Output of a command typed at a device prompt.
    CommandOutput {
        /// The command as typed, without the prompt.
        command: String,
    },
}

/// How a block ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Closed by `!`, `end` or `exit`.
    Explicit,
    /// Closed by the next header or prompt line.
    NextHeader,
    /// Cut off by the end of the input.
    EndOfInput,
}

/// A contiguous run of lines that starts with a recognized header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Block {
    /// Kind of the block.
    pub kind: BlockKind,
    /// Header line, trimmed. Empty for global blocks.
    pub header_line: String,
    /// Body lines, trimmed. Blank lines inside a block are kept as empty strings.
    pub body_lines: Vec<String>,
    /// 1-based line number where the block starts.
    pub start_line: usize,
    /// How the block ended.
    pub termination: Termination,
}

impl Block {
    /// Iterates over non-blank body lines.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.body_lines
            .iter()
            .map(String::as_str)
            .filter(|l| !l.is_empty() && !l.starts_with('!'))
    }
}

/// Splits raw text into blocks.
#[must_use]
pub fn split_blocks(text: &str) -> Vec<Block> {
    let mut splitter = Splitter::default();
    for (index, raw) in text.lines().enumerate() {
        splitter.feed(index + 1, raw.trim_end());
    }
    splitter.finish()
}

/// Detects a configuration header line.
#[must_use]
pub fn header_kind(line: &str) -> Option<BlockKind> {
    if let Some(caps) = INTERFACE.captures(line) {
        return Some(BlockKind::Interface {
            name: caps[1].to_string(),
        });
    }
    if let Some(caps) = LINE.captures(line) {
        return Some(BlockKind::Line {
            kind: caps[1].to_ascii_lowercase(),
            range: caps.get(2).map_or_else(String::new, |m| m.as_str().to_string()),
        });
    }
    if let Some(caps) = ROUTER.captures(line) {
        return Some(BlockKind::Router {
            protocol: caps[1].to_ascii_lowercase(),
            process: caps.get(2).map(|m| m.as_str().to_string()),
        });
    }
    if let Some(caps) = KEY_CHAIN.captures(line) {
        return Some(BlockKind::KeyChain {
            name: caps[1].to_string(),
        });
    }
    if let Some(caps) = NAMED_ACL.captures(line) {
        return Some(BlockKind::AccessList {
            name: caps[2].to_string(),
            extended: caps[1].eq_ignore_ascii_case("extended"),
        });
    }
    if ARCHIVE.is_match(line) {
        return Some(BlockKind::Archive);
    }
    None
}

/// Returns true when `command` dumps the device configuration.
#[must_use]
pub fn is_config_dump(command: &str) -> bool {
    command_matches(command, &["show", "running-config"])
        || command_matches(command, &["show", "startup-config"])
        || command_matches(command, &["write", "terminal"])
        || (command_matches(command, &["more"]) && command.contains("-config"))
}

fn is_terminator(trimmed: &str) -> bool {
    trimmed.starts_with('!')
        || trimmed.eq_ignore_ascii_case("end")
        || trimmed.eq_ignore_ascii_case("exit")
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Section {
    #[default]
    Config,
    Output,
}

struct OpenBlock {
    block: Block,
    indent: usize,
}

#[derive(Default)]
struct Splitter {
    blocks: Vec<Block>,
    open: Option<OpenBlock>,
    global: Vec<String>,
    global_start: usize,
    section: Section,
}

impl Splitter {
    fn feed(&mut self, line_no: usize, line: &str) {
        if let Some(caps) = PROMPT.captures(line.trim()) {
            let command = caps.get(4).map_or("", |m| m.as_str()).trim().to_string();
            let config_mode = caps
                .get(3)
                .is_some_and(|m| m.as_str().to_ascii_lowercase().starts_with("config"));

            if config_mode {
                if self.section == Section::Output {
                    self.close_open(Termination::NextHeader);
                    self.section = Section::Config;
                }
                if !command.is_empty() {
                    self.feed_config(line_no, &command);
                }
                return;
            }
            if command.is_empty() {
                return;
            }

            self.close_open(Termination::NextHeader);
            self.flush_global();
            if is_config_dump(&command) {
                debug!("line {line_no}: configuration section `{command}`");
                self.section = Section::Config;
            } else {
                debug!("line {line_no}: command output section `{command}`");
                self.section = Section::Output;
                self.open = Some(OpenBlock {
                    block: Block {
                        kind: BlockKind::CommandOutput {
                            command: command.clone(),
                        },
                        header_line: line.trim().to_string(),
                        body_lines: Vec::new(),
                        start_line: line_no,
                        termination: Termination::NextHeader,
                    },
                    indent: 0,
                });
            }
            return;
        }

        match self.section {
            Section::Output => {
                if let Some(open) = &mut self.open {
                    open.block.body_lines.push(line.to_string());
                }
            }
            Section::Config => self.feed_config(line_no, line),
        }
    }

    fn feed_config(&mut self, line_no: usize, line: &str) {
        let trimmed = line.trim();

        if trimmed.is_empty() {
            if let Some(open) = &mut self.open {
                open.block.body_lines.push(String::new());
            }
            return;
        }

        if let Some(kind) = header_kind(trimmed) {
            self.close_open(Termination::NextHeader);
            self.flush_global();
            self.open = Some(OpenBlock {
                block: Block {
                    kind,
                    header_line: trimmed.to_string(),
                    body_lines: Vec::new(),
                    start_line: line_no,
                    termination: Termination::NextHeader,
                },
                indent: indent_of(line),
            });
            return;
        }

        if is_terminator(trimmed) {
            match &mut self.open {
                Some(open) if indent_of(line) <= open.indent => {
                    self.close_open(Termination::Explicit);
                }
                Some(open) => open.block.body_lines.push(trimmed.to_string()),
                None => {}
            }
            return;
        }

        if let Some(open) = &mut self.open {
            open.block.body_lines.push(trimmed.to_string());
        } else {
            if self.global.is_empty() {
                self.global_start = line_no;
            }
            self.global.push(trimmed.to_string());
        }
    }

    fn close_open(&mut self, termination: Termination) {
        if let Some(open) = self.open.take() {
            let mut block = open.block;
            while block.body_lines.last().is_some_and(String::is_empty) {
                block.body_lines.pop();
            }
            block.termination = termination;
            debug!(
                "block {:?} at line {} closed ({:?}, {} body lines)",
                block.kind,
                block.start_line,
                termination,
                block.body_lines.len()
            );
            self.blocks.push(block);
        }
    }

    fn flush_global(&mut self) {
        if self.global.is_empty() {
            return;
        }
        self.blocks.push(Block {
            kind: BlockKind::Global,
            header_line: String::new(),
            body_lines: std::mem::take(&mut self.global),
            start_line: self.global_start,
            termination: Termination::Explicit,
        });
    }

    fn finish(mut self) -> Vec<Block> {
        self.close_open(Termination::EndOfInput);
        self.flush_global();
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(blocks: &[Block]) -> Vec<&BlockKind> {
        blocks.iter().map(|b| &b.kind).collect()
    }

    #[test]
    fn lines_before_first_header_form_global_block() {
        let blocks = split_blocks("hostname SW01\nservice password-encryption\ninterface Gi0/1\n description uplink\n!\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Global);
        assert_eq!(
            blocks[0].body_lines,
            vec!["hostname SW01", "service password-encryption"]
        );
        assert_eq!(
            blocks[1].kind,
            BlockKind::Interface {
                name: "Gi0/1".to_string()
            }
        );
        assert_eq!(blocks[1].body_lines, vec!["description uplink"]);
        assert_eq!(blocks[1].termination, Termination::Explicit);
    }

    #[test]
    fn headers_match_case_insensitively() {
        let blocks = split_blocks("INTERFACE Vlan10\nLine VTY 0 4\nRouter BGP 65001\n");
        assert_eq!(
            kinds(&blocks),
            vec![
                &BlockKind::Interface {
                    name: "Vlan10".to_string()
                },
                &BlockKind::Line {
                    kind: "vty".to_string(),
                    range: "0 4".to_string()
                },
                &BlockKind::Router {
                    protocol: "bgp".to_string(),
                    process: Some("65001".to_string())
                },
            ]
        );
    }

    #[test]
    fn header_without_body_yields_empty_block() {
        let blocks = split_blocks("interface Loopback0");
        assert_eq!(blocks.len(), 1);
        assert!(blocks[0].body_lines.is_empty());
        assert_eq!(blocks[0].termination, Termination::EndOfInput);
    }

    #[test]
    fn next_header_closes_previous_block() {
        let blocks = split_blocks("interface Gi0/1\n shutdown\ninterface Gi0/2\n no shutdown\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].termination, Termination::NextHeader);
        assert_eq!(blocks[1].body_lines, vec!["no shutdown"]);
    }

    #[test]
    fn indented_bang_stays_inside_block() {
        let text = "router bgp 65001\n neighbor 10.0.0.1 remote-as 65002\n !\n address-family ipv4\n  neighbor 10.0.0.1 activate\n exit-address-family\n!\nntp server 10.1.1.1\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0]
            .lines()
            .any(|l| l == "neighbor 10.0.0.1 activate"));
        assert_eq!(blocks[1].kind, BlockKind::Global);
        assert_eq!(blocks[1].body_lines, vec!["ntp server 10.1.1.1"]);
    }

    #[test]
    fn blank_lines_are_kept_inside_block() {
        let blocks = split_blocks("line vty 0 4\n exec-timeout 5 0\n\n transport input ssh\n!\n");
        assert_eq!(
            blocks[0].body_lines,
            vec!["exec-timeout 5 0", "", "transport input ssh"]
        );
        assert_eq!(blocks[0].lines().count(), 2);
    }

    #[test]
    fn top_level_lines_between_blocks_form_more_globals() {
        let text = "interface Gi0/1\n!\nlogging host 10.0.0.5\n!\nline con 0\n!\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1].kind, BlockKind::Global);
        assert_eq!(blocks[1].start_line, 3);
    }

    #[test]
    fn supplementary_headers_are_recognized() {
        let text = "key chain RIP-KEYS\n key 1\n  key-string s3cret\n!\nip access-list extended EDGE\n permit tcp any any eq 179\n!\narchive\n path tftp://10.0.0.9/cfg\n!\n";
        let blocks = split_blocks(text);
        assert_eq!(
            kinds(&blocks),
            vec![
                &BlockKind::KeyChain {
                    name: "RIP-KEYS".to_string()
                },
                &BlockKind::AccessList {
                    name: "EDGE".to_string(),
                    extended: true
                },
                &BlockKind::Archive,
            ]
        );
    }

    #[test]
    fn prompt_lines_switch_between_config_and_output() {
        let text = "SW01#show running-config\nBuilding configuration...\ninterface Gi0/1\n shutdown\n!\nSW01#sh ip int br\nInterface  IP-Address  OK? Method Status Protocol\nGigabitEthernet0/1 unassigned YES unset down down\nSW01#\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].kind, BlockKind::Global);
        assert!(matches!(blocks[1].kind, BlockKind::Interface { .. }));
        assert_eq!(
            blocks[2].kind,
            BlockKind::CommandOutput {
                command: "sh ip int br".to_string()
            }
        );
        assert_eq!(blocks[2].body_lines.len(), 2);
    }

    #[test]
    fn config_mode_prompts_feed_configuration() {
        let text = "R1#show version\nCisco IOS Software\nR1(config)#interface Gi0/0\nR1(config-if)#shutdown\nR1(config-if)#exit\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert!(matches!(blocks[0].kind, BlockKind::CommandOutput { .. }));
        assert_eq!(blocks[1].body_lines, vec!["shutdown"]);
        assert_eq!(blocks[1].termination, Termination::Explicit);
    }

    #[test]
    fn line_block_serializes_with_its_line_type() {
        let blocks = split_blocks("line vty 0 4\n transport input ssh\n!\n");
        let value = serde_json::to_value(&blocks[0]).unwrap();
        assert_eq!(value["kind"]["block"], "line");
        assert_eq!(value["kind"]["kind"], "vty");
        assert_eq!(value["kind"]["range"], "0 4");
        assert_eq!(value["termination"], "explicit");
    }

    #[test]
    fn config_dump_commands() {
        assert!(is_config_dump("show running-config"));
        assert!(is_config_dump("sh run"));
        assert!(is_config_dump("show start"));
        assert!(is_config_dump("more system:running-config"));
        assert!(!is_config_dump("show version"));
    }
}
