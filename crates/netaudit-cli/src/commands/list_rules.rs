//! List rules command implementation.

use netaudit_core::Category;
use netaudit_rules::{all_rules, Preset};

/// Runs the list-rules command.
pub fn run() {
    println!("Available rules:\n");
    println!(
        "{:<8} {:<24} {:<11} {:<8} Title",
        "Code", "Name", "Category", "Severity"
    );
    println!("{}", "-".repeat(96));

    for rule in all_rules() {
        println!(
            "{:<8} {:<24} {:<11} {:<8} {}",
            rule.code(),
            rule.name(),
            rule.category().to_string(),
            rule.default_severity().to_string(),
            rule.title()
        );
    }

    println!("\nPresets:");
    for name in Preset::NAMES {
        if let Some(preset) = Preset::parse(name) {
            println!("  {:<11} - {}", name, describe(preset.categories()));
        }
    }

    println!("\nUse --rules to filter specific rules, e.g.:");
    println!("  netaudit audit --rules disable-telnet,ssh-version-2");
    println!("  netaudit audit --rules NA533,NA532");
}

fn describe(categories: &[Category]) -> String {
    categories
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_preset_categories() {
        assert_eq!(
            describe(Preset::Management.categories()),
            "management, accounts, monitoring, snmp"
        );
    }
}
