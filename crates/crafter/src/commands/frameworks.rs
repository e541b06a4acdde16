//! List supported frameworks.

use crafter_core::catalog;

/// Run the frameworks command.
pub fn run() {
    for entry in catalog::all() {
        println!("{:<16} {:<24} .{}", entry.id, entry.label, entry.extension());
    }
}
