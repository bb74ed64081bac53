pub mod policy;

pub use policy::{PolicyViolation, SafetyPolicy};

/// Branches that may never receive a direct push
///
/// Compared case-insensitively against the checked-out branch at push time.
pub const PROTECTED_BRANCHES: &[&str] = &["main", "master", "develop", "production"];

/// Substrings that block a shell command outright
///
/// A plain substring scan, not a shell parse. It deters the obvious
/// destructive commands and does not contain an adversarial one.
pub const DANGEROUS_SHELL_PATTERNS: &[&str] = &[
    // Destructive deletes
    "rm -rf /",
    "rm -rf ~",
    "rm -rf *",
    "rm -fr /",
    // Privilege escalation
    "sudo",
    "su -",
    "doas ",
    // Raw device and filesystem writes
    "mkfs",
    "dd if=",
    "of=/dev/",
    "> /dev/sd",
    // Fork bomb
    ":(){",
    // Permission blowouts
    "chmod -R 777 /",
    // Host control
    "shutdown",
    "reboot",
    // Pushes must go through the push tool's branch check
    "git push",
];
