use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Registration details of an address as reported by a WHOIS server.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct WhoisInfo {
    /// The network name.
    ///
    /// Given as a string i.e. `GOGL`.
    pub netname: Option<String>,
    /// The origin autonomous system number.
    ///
    /// This is returned without the AS prefix i.e. `15169`.
    pub origin: Option<String>,
    /// The country code.
    ///
    /// Given as a ISO format i.e. `US`.  The pseudo-country `EU` is never
    /// returned.
    pub country: Option<String>,
}

impl WhoisInfo {
    /// Parse the response of an authoritative WHOIS server.
    ///
    /// Keys are matched case-insensitively and the first value found for each
    /// field wins.  The origin is accepted from either an `origin:` or an
    /// `originAS:` line and must have the form `AS<digits>`.
    #[must_use]
    pub fn parse(response: &str) -> Self {
        let netname = fields(response)
            .find(|(key, _)| key.eq_ignore_ascii_case("netname"))
            .and_then(|(_, value)| non_empty(value));
        let origin = fields(response)
            .filter(|(key, _)| is_origin_key(key))
            .find_map(|(_, value)| parse_asn(value));
        let country = fields(response)
            .find(|(key, _)| key.eq_ignore_ascii_case("country"))
            .and_then(|(_, value)| non_empty(value))
            .filter(|country| country != "EU");
        Self {
            netname,
            origin,
            country,
        }
    }

    /// Are all fields absent?
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.netname.is_none() && self.origin.is_none() && self.country.is_none()
    }
}

/// The present fields joined with `, `.
impl Display for WhoisInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let joined = [&self.netname, &self.origin, &self.country]
            .into_iter()
            .flatten()
            .join(", ");
        write!(f, "{joined}")
    }
}

/// Find the authoritative WHOIS server in a response from the root registry.
///
/// The root registry responds with a line of the form `whois: whois.arin.net`
/// if it delegates the address to a regional registry.
#[must_use]
pub fn parse_referral(response: &str) -> Option<&str> {
    fields(response)
        .find(|(key, _)| key.eq_ignore_ascii_case("whois"))
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// The `key: value` lines of a response, with surrounding whitespace removed.
///
/// Comment lines starting with `%` or `#` are skipped.
fn fields(response: &str) -> impl Iterator<Item = (&str, &str)> {
    response
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('%') && !line.starts_with('#'))
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim(), value.trim()))
}

fn is_origin_key(key: &str) -> bool {
    let key = key.split_whitespace().collect::<String>();
    key.eq_ignore_ascii_case("origin") || key.eq_ignore_ascii_case("originas")
}

/// Parse `AS15169` as `15169`.
fn parse_asn(value: &str) -> Option<String> {
    let prefix = value.get(..2)?;
    let digits = value.get(2..)?;
    if prefix.eq_ignore_ascii_case("AS")
        && !digits.is_empty()
        && digits.chars().all(|c| c.is_ascii_digit())
    {
        Some(digits.to_string())
    } else {
        None
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
