//! Client identity derived from the remote address.

use crate::error::GatekeeperError;

const MISSING_PORT: &str = "missing port in address";
const TOO_MANY_COLONS: &str = "too many colons in address";

/// Split `host:port` or `[host]:port` into its host and port parts.
///
/// The port is not validated. IPv6 literals must be bracketed.
pub fn split_host_port(addr: &str) -> Result<(&str, &str), GatekeeperError> {
    let fail = |reason| GatekeeperError::ClientIdentity {
        addr: addr.to_string(),
        reason,
    };

    let colon = addr.rfind(':').ok_or_else(|| fail(MISSING_PORT))?;

    let (host, host_start, host_end) = if addr.starts_with('[') {
        let close = addr.find(']').ok_or_else(|| fail("missing ']' in address"))?;
        if close + 1 == addr.len() {
            return Err(fail(MISSING_PORT));
        }
        if close + 1 != colon {
            return Err(if addr.as_bytes()[close + 1] == b':' {
                fail(TOO_MANY_COLONS)
            } else {
                fail(MISSING_PORT)
            });
        }
        (&addr[1..close], 1, close + 1)
    } else {
        let host = &addr[..colon];
        if host.contains(':') {
            return Err(fail(TOO_MANY_COLONS));
        }
        (host, 0, 0)
    };

    if addr[host_start..].contains('[') {
        return Err(fail("unexpected '[' in address"));
    }
    if addr[host_end..].contains(']') {
        return Err(fail("unexpected ']' in address"));
    }

    Ok((host, &addr[colon + 1..]))
}

/// The identity key for a remote address: its host part.
pub fn client_identity(remote_addr: &str) -> Result<&str, GatekeeperError> {
    split_host_port(remote_addr).map(|(host, _)| host)
}
