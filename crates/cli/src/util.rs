//! Shared utilities for CLI commands

use anyhow::{Context, Result};

/// Where to connect and as whom
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectTarget {
    /// `host:port`, prefixed with `ws://` or `wss://` only when the user chose one
    pub address: String,
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Parse a connect URL
///
/// Accepts `[scheme://][name[:password]@]host[:port][/...]`. Credentials are
/// percent-decoded. `ws` and `wss` schemes are kept; any other scheme (such as
/// `archipelago://`) only marks the start of the address.
pub fn parse_connect_url(input: &str, default_port: u16) -> Result<ConnectTarget> {
    let input = input.trim();

    let (scheme, rest) = match input.split_once("://") {
        Some((scheme, rest)) => (Some(scheme.to_ascii_lowercase()), rest),
        None => (None, input),
    };

    let netloc = rest.split(|c: char| matches!(c, '/' | '?' | '#')).next().unwrap_or_default();

    let (userinfo, host) = match netloc.rsplit_once('@') {
        Some((userinfo, host)) => (Some(userinfo), host),
        None => (None, netloc),
    };

    if host.is_empty() {
        anyhow::bail!("No host in connect address '{}'", input);
    }

    let (name, password) = match userinfo {
        Some(userinfo) => {
            let (name, password) = match userinfo.split_once(':') {
                Some((name, password)) => (name, Some(password)),
                None => (userinfo, None),
            };
            (non_empty(decode(name)?), password.map(decode).transpose()?.and_then(non_empty))
        }
        None => (None, None),
    };

    let host = if has_port(host) {
        host.to_string()
    } else {
        format!("{}:{}", host, default_port)
    };

    let address = match scheme.as_deref() {
        Some(scheme @ ("ws" | "wss")) => format!("{}://{}", scheme, host),
        _ => host,
    };

    Ok(ConnectTarget {
        address,
        name,
        password,
    })
}

fn decode(part: &str) -> Result<String> {
    let decoded = urlencoding::decode(part)
        .with_context(|| format!("Invalid percent-encoding in '{}'", part))?;
    Ok(decoded.into_owned())
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// True if `host` ends in `:<digits>`, allowing bracketed IPv6 literals
fn has_port(host: &str) -> bool {
    let after_bracket = match host.rfind(']') {
        Some(idx) => &host[idx + 1..],
        None => host,
    };
    match after_bracket.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}
