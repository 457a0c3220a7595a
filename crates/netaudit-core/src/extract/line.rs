//! `line con|vty|aux` blocks.

use std::collections::BTreeSet;

use super::{parse_number, rest_after, words};
use crate::block::Block;
use crate::facts::{Anomaly, Direction, LineKind, ManagementLine, Resolution};

pub(super) fn extract_line(kind: &str, range: &str, block: &Block) -> (ManagementLine, Vec<Anomaly>) {
    let subject = block.header_line.as_str();
    let mut anomalies = Vec::new();
    let mut line = ManagementLine {
        kind: LineKind::parse(kind),
        range: range.to_string(),
        transport_input: None,
        exec_timeout_minutes: None,
        exec_timeout_seconds: None,
        access_class_acl_id: None,
        access_class_direction: None,
        access_class: Resolution::Pending,
        login: None,
        raw_lines: Vec::new(),
    };

    for text in block.lines() {
        line.raw_lines.push(text.to_string());
        let (original, lower) = words(text);
        let lw: Vec<&str> = lower.iter().map(String::as_str).collect();

        match lw.as_slice() {
            ["transport", "input", protocols @ ..] => {
                let set: BTreeSet<String> = protocols.iter().map(|p| (*p).to_string()).collect();
                line.transport_input = Some(set);
            }
            ["exec-timeout", minutes, rest @ ..] => {
                line.exec_timeout_minutes =
                    parse_number(Some(*minutes), subject, "exec-timeout minutes", &mut anomalies);
                line.exec_timeout_seconds = match rest.first() {
                    Some(seconds) => {
                        parse_number(Some(*seconds), subject, "exec-timeout seconds", &mut anomalies)
                    }
                    None => Some(0),
                };
            }
            ["no", "exec-timeout"] => {
                line.exec_timeout_minutes = Some(0);
                line.exec_timeout_seconds = Some(0);
            }
            ["access-class", _, direction, ..] => {
                let direction = Direction::parse(direction);
                let keep_existing = line.access_class_direction == Some(Direction::In)
                    && direction != Some(Direction::In);
                if !keep_existing {
                    line.access_class_acl_id = Some(original[1].to_string());
                    line.access_class_direction = direction;
                }
            }
            ["login", ..] => line.login = Some(rest_after(text, 1)),
            _ => {}
        }
    }

    (line, anomalies)
}
