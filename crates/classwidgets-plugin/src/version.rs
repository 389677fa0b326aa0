// SPDX-FileCopyrightText: 2026 Class Widgets Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Host API compatibility checks.
//!
//! Requirements are comma-separated clauses such as `>=1.0, <2` that must all
//! hold. Besides the semver operators, the PEP 440 forms `==`, `!=` and `~=`
//! are understood, since manifests written for the earlier host used them.

use semver::{Version, VersionReq};
use tracing::debug;

/// API version the running host implements.
pub const HOST_API_VERSION: &str = "1.0.0";

/// Returns true if `requirement` admits the host API version `host`.
///
/// `*` and an empty requirement admit everything, even a malformed host
/// version. Any parse error makes the plugin incompatible.
pub fn check_api_version(requirement: &str, host: &str) -> bool {
    let requirement = requirement.trim();
    if requirement.is_empty() || requirement == "*" {
        return true;
    }

    match evaluate(requirement, host) {
        Ok(compatible) => compatible,
        Err(reason) => {
            debug!(requirement, host, reason = %reason, "version check failed");
            false
        }
    }
}

fn evaluate(requirement: &str, host: &str) -> Result<bool, String> {
    let host = parse_version(host)?;
    for clause in requirement.split(',').map(str::trim) {
        if clause.is_empty() {
            return Err(format!("empty clause in `{requirement}`"));
        }
        if !clause_matches(clause, &host)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clause_matches(clause: &str, host: &Version) -> Result<bool, String> {
    if let Some(rest) = clause.strip_prefix("!=") {
        return Ok(parse_version(rest)? != *host);
    }
    if let Some(rest) = clause.strip_prefix("~=") {
        return compatible_release(rest.trim(), host);
    }
    let normalized = match clause.strip_prefix("===").or_else(|| clause.strip_prefix("==")) {
        Some(rest) => format!("={}", rest.trim()),
        None => clause.to_string(),
    };
    let req = VersionReq::parse(&normalized).map_err(|e| format!("`{clause}`: {e}"))?;
    Ok(req.matches(host))
}

/// PEP 440 `~=A.B` means `>=A.B, <A+1`; `~=A.B.C` means `>=A.B.C, <A.B+1`.
fn compatible_release(version: &str, host: &Version) -> Result<bool, String> {
    let parts: Vec<u64> = version
        .split('.')
        .map(|p| p.parse::<u64>().map_err(|e| format!("`~={version}`: {e}")))
        .collect::<Result<_, _>>()?;

    let (lower, upper) = match parts.as_slice() {
        [major, minor] => (
            Version::new(*major, *minor, 0),
            Version::new(major + 1, 0, 0),
        ),
        [major, minor, patch] => (
            Version::new(*major, *minor, *patch),
            Version::new(*major, minor + 1, 0),
        ),
        _ => return Err(format!("`~={version}` needs two or three components")),
    };
    Ok(*host >= lower && *host < upper)
}

/// Parses a version, padding missing minor/patch components with zero.
fn parse_version(text: &str) -> Result<Version, String> {
    let text = text.trim();
    let dots = text.matches('.').count();
    let padded = match dots {
        0 => format!("{text}.0.0"),
        1 => format!("{text}.0"),
        _ => text.to_string(),
    };
    Version::parse(&padded).map_err(|e| format!("`{text}`: {e}"))
}
