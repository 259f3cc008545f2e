//! Run configuration shared between the pipeline roles.
//!
//! The client decides `(depth, modulus, security)` once and persists them as
//! line-oriented `key=value` text next to the public artifacts; the compute
//! role re-reads the same file so both sides derive identical engine tuning
//! without any live connection between them.

use std::fs;
use std::path::Path;

pub const DEFAULT_DEPTH: u32 = 8;
pub const DEFAULT_MODULUS: u64 = 65537;

/// Standardized bit-security targets. Anything outside the three supported
/// values is coerced to 128 bits rather than rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SecurityLevel {
    #[default]
    Bits128,
    Bits192,
    Bits256,
}

impl SecurityLevel {
    pub fn from_bits(bits: u32) -> Self {
        match bits {
            192 => SecurityLevel::Bits192,
            256 => SecurityLevel::Bits256,
            _ => SecurityLevel::Bits128,
        }
    }

    pub fn bits(self) -> u32 {
        match self {
            SecurityLevel::Bits128 => 128,
            SecurityLevel::Bits192 => 192,
            SecurityLevel::Bits256 => 256,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub depth: u32,
    pub modulus: u64,
    pub security: SecurityLevel,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            modulus: DEFAULT_MODULUS,
            security: SecurityLevel::default(),
        }
    }
}

/// Parses tolerant `key=value` lines. Unknown keys and malformed lines are
/// ignored; a field that is missing or fails to parse keeps its default
/// independently of the other fields.
pub fn parse(text: &str) -> RunConfig {
    let mut cfg = RunConfig::default();
    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "depth" => {
                if let Ok(v) = value.parse() {
                    cfg.depth = v;
                }
            }
            "modulus" => {
                if let Ok(v) = value.parse() {
                    cfg.modulus = v;
                }
            }
            "security" => {
                if let Ok(v) = value.parse::<u32>() {
                    cfg.security = SecurityLevel::from_bits(v);
                }
            }
            _ => {}
        }
    }
    cfg
}

pub fn render(cfg: &RunConfig) -> String {
    format!(
        "depth={}\nmodulus={}\nsecurity={}\n",
        cfg.depth,
        cfg.modulus,
        cfg.security.bits()
    )
}

/// A missing or unreadable file is not an error: the caller gets defaults.
pub fn read(path: &Path) -> RunConfig {
    match fs::read_to_string(path) {
        Ok(text) => parse(&text),
        Err(_) => RunConfig::default(),
    }
}

/// Overwrites `path` with the three assignment lines. Callers that require
/// the write to have happened must check the result; the pipeline itself
/// treats a failure here as a reportable side effect, not a fatal error.
pub fn write(path: &Path, cfg: &RunConfig) -> std::io::Result<()> {
    fs::write(path, render(cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_exact() {
        let cfg = RunConfig {
            depth: 17,
            modulus: 786433,
            security: SecurityLevel::Bits192,
        };
        assert_eq!(parse(&render(&cfg)), cfg);
    }

    #[test]
    fn defaults_apply_per_field() {
        let cfg = parse("depth=3\n");
        assert_eq!(cfg.depth, 3);
        assert_eq!(cfg.modulus, DEFAULT_MODULUS);
        assert_eq!(cfg.security, SecurityLevel::Bits128);

        let cfg = parse("depth=oops\nmodulus=1032193\n");
        assert_eq!(cfg.depth, DEFAULT_DEPTH);
        assert_eq!(cfg.modulus, 1032193);
    }

    #[test]
    fn garbage_yields_defaults() {
        assert_eq!(parse("not a config at all\n===\n"), RunConfig::default());
        assert_eq!(parse(""), RunConfig::default());
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let cfg = parse("depth=5\nscheme=bgv\nsecurity=256\n");
        assert_eq!(cfg.depth, 5);
        assert_eq!(cfg.security, SecurityLevel::Bits256);
    }

    #[test]
    fn invalid_security_coerces_to_128() {
        assert_eq!(parse("security=100\n").security, SecurityLevel::Bits128);
        assert_eq!(parse("security=banana\n").security, SecurityLevel::Bits128);
        assert_eq!(parse("security=192\n").security, SecurityLevel::Bits192);
    }

    #[test]
    fn missing_file_reads_as_defaults() {
        let path = std::env::temp_dir().join("blindtree-no-such-config.txt");
        assert_eq!(read(&path), RunConfig::default());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "blindtree-config-{}.txt",
            std::process::id()
        ));
        let cfg = RunConfig {
            depth: 24,
            modulus: 65537,
            security: SecurityLevel::Bits256,
        };
        write(&path, &cfg).unwrap();
        assert_eq!(read(&path), cfg);
        let _ = fs::remove_file(&path);
    }
}
