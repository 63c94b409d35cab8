//! Device list parsing.
//!
//! Devices come from one of three places: a line-oriented config file, a
//! comma-separated list, or the output of `mst status`. All three parsers
//! are pure; reading files and running the discovery tool is the caller's
//! job.

use std::sync::LazyLock;

use regex::Regex;

/// Device names accepted from discovery output. On Unix the tool prints
/// full device node paths, elsewhere bare names.
#[cfg(unix)]
pub const DEVICE_NAME_PATTERN: &str = r"^/dev/mst/mt\d+_pci(conf|_cr)\d+(\.\d+)?$";
#[cfg(not(unix))]
pub const DEVICE_NAME_PATTERN: &str = r"^mt\d+_pci(conf|_cr)\d+(\.\d+)?$";

static DEVICE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEVICE_NAME_PATTERN).expect("valid regex"));

/// Parse a `devices.cfg` style file: one device per line, surrounding
/// whitespace trimmed, blank lines and `#` comments skipped.
pub fn parse_device_config(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Parse a comma-separated device list, dropping empty entries.
pub fn parse_device_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Whether `name` looks like a device the diagnostic tool can address.
pub fn is_device_name(name: &str) -> bool {
    DEVICE_NAME_RE.is_match(name)
}

/// Extract device names from `mst status` output.
///
/// A section starts at a header line ending in `devices:`. Inside a
/// section, dashed separators are skipped and the first token of each row
/// is a candidate; the section ends at a blank line or the next header.
/// Candidates that do not match [`DEVICE_NAME_PATTERN`] are dropped, as are
/// duplicates (first occurrence wins).
pub fn parse_discovery_output(output: &str) -> Vec<String> {
    let mut devices: Vec<String> = Vec::new();
    let mut in_section = false;

    for line in output.lines() {
        let trimmed = line.trim();

        if trimmed.to_ascii_lowercase().ends_with("devices:") {
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }
        if trimmed.is_empty() || trimmed.ends_with(':') {
            in_section = false;
            continue;
        }
        if trimmed.chars().all(|c| c == '-') {
            continue;
        }

        let Some(candidate) = trimmed.split_whitespace().next() else {
            continue;
        };
        if is_device_name(candidate) && !devices.iter().any(|d| d == candidate) {
            devices.push(candidate.to_string());
        }
    }

    devices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_skips_blank_and_comment_lines() {
        let contents = "\
# switch adapters
/dev/mst/mt4119_pciconf0

  /dev/mst/mt4119_pciconf1
#/dev/mst/mt4119_pciconf2
";
        assert_eq!(
            parse_device_config(contents),
            vec!["/dev/mst/mt4119_pciconf0", "/dev/mst/mt4119_pciconf1"]
        );
    }

    #[test]
    fn config_preserves_order() {
        assert_eq!(parse_device_config("b\na\nc"), vec!["b", "a", "c"]);
    }

    #[test]
    fn comma_list() {
        assert_eq!(parse_device_list("a, b,,c ,"), vec!["a", "b", "c"]);
        assert!(parse_device_list(" , ").is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn discovery_extracts_matching_devices() {
        let output = "\
MST modules:
------------
    MST PCI module is not loaded
    MST PCI configuration module loaded

MST devices:
------------
/dev/mst/mt4119_pciconf0         - PCI configuration cycles access.
                                   domain:bus:dev.fn=0000:3b:00.0 addr.reg=88 data.reg=92 cr_bar.gw_offset=-1
                                   Chip revision is: 00
/dev/mst/mt4119_pciconf0.1       - PCI configuration cycles access.
/dev/mst/mt4119_pciconf0         - duplicate entry

Some other section:
/dev/mst/mt4117_pciconf9
";
        assert_eq!(
            parse_discovery_output(output),
            vec!["/dev/mst/mt4119_pciconf0", "/dev/mst/mt4119_pciconf0.1"]
        );
    }

    #[cfg(unix)]
    #[test]
    fn discovery_without_section_finds_nothing() {
        let output = "/dev/mst/mt4119_pciconf0 - PCI configuration cycles access.\n";
        assert!(parse_discovery_output(output).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn device_name_pattern() {
        assert!(is_device_name("/dev/mst/mt4119_pciconf0"));
        assert!(is_device_name("/dev/mst/mt4123_pci_cr0"));
        assert!(is_device_name("/dev/mst/mt4119_pciconf0.1"));
        assert!(!is_device_name("mt4119_pciconf0"));
        assert!(!is_device_name("/dev/mst/mt4119"));
        assert!(!is_device_name("domain:bus:dev.fn=0000:3b:00.0"));
    }
}
