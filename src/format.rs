//! Recognised JSON Schema Draft 7 `format` names, their approximate validators and the
//! subtype lattice used by the merge engine and subset oracle to reason about `format`.
use serde_json::Value;
use std::convert::TryFrom;

/// Outcome of validating a value against a recognised (or unrecognised) format name.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum FormatValidation {
    Valid,
    Invalid,
    /// The format name is not recognised, or the value is not a string: callers should
    /// skip this check rather than treat it as a failure.
    Unknown,
}

/// Every Draft 7 format name this engine has an opinion about.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) enum Format {
    Email,
    IdnEmail,
    Hostname,
    IdnHostname,
    Uri,
    Iri,
    UriReference,
    IriReference,
    Date,
    Time,
    DateTime,
    Ipv4,
    Ipv6,
    Regex,
    JsonPointer,
    RelativeJsonPointer,
    UriTemplate,
}

impl TryFrom<&str> for Format {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "email" => Ok(Self::Email),
            "idn-email" => Ok(Self::IdnEmail),
            "hostname" => Ok(Self::Hostname),
            "idn-hostname" => Ok(Self::IdnHostname),
            "uri" => Ok(Self::Uri),
            "iri" => Ok(Self::Iri),
            "uri-reference" => Ok(Self::UriReference),
            "iri-reference" => Ok(Self::IriReference),
            "date" => Ok(Self::Date),
            "time" => Ok(Self::Time),
            "date-time" => Ok(Self::DateTime),
            "ipv4" => Ok(Self::Ipv4),
            "ipv6" => Ok(Self::Ipv6),
            "regex" => Ok(Self::Regex),
            "json-pointer" => Ok(Self::JsonPointer),
            "relative-json-pointer" => Ok(Self::RelativeJsonPointer),
            "uri-template" => Ok(Self::UriTemplate),
            _ => Err(()),
        }
    }
}

impl Format {
    fn name(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::IdnEmail => "idn-email",
            Self::Hostname => "hostname",
            Self::IdnHostname => "idn-hostname",
            Self::Uri => "uri",
            Self::Iri => "iri",
            Self::UriReference => "uri-reference",
            Self::IriReference => "iri-reference",
            Self::Date => "date",
            Self::Time => "time",
            Self::DateTime => "date-time",
            Self::Ipv4 => "ipv4",
            Self::Ipv6 => "ipv6",
            Self::Regex => "regex",
            Self::JsonPointer => "json-pointer",
            Self::RelativeJsonPointer => "relative-json-pointer",
            Self::UriTemplate => "uri-template",
        }
    }

    /// The format this one is an immediate subtype of, if any, per the recognised hierarchy.
    fn parent(self) -> Option<Self> {
        match self {
            Self::Email => Some(Self::IdnEmail),
            Self::Hostname => Some(Self::IdnHostname),
            Self::Uri => Some(Self::Iri),
            Self::UriReference => Some(Self::IriReference),
            _ => None,
        }
    }

    fn validate(self, value: &str) -> bool {
        match self {
            Self::Email | Self::IdnEmail => {
                value.contains('@') && !value.starts_with('@') && !value.ends_with('@')
            }
            Self::Hostname | Self::IdnHostname => {
                !value.is_empty() && value.len() <= 253 && !value.starts_with('.') && !value.ends_with('.')
            }
            Self::Uri | Self::Iri => value.contains(':'),
            Self::UriReference | Self::IriReference => true,
            Self::Date => {
                let parts: Vec<_> = value.split('-').collect();
                parts.len() == 3 && parts.iter().all(|part| part.chars().all(char::is_numeric))
            }
            Self::Time => value.contains(':'),
            Self::DateTime => value.contains('T') || value.contains('t'),
            Self::Ipv4 => {
                let parts: Vec<_> = value.split('.').collect();
                parts.len() == 4 && parts.iter().all(|part| part.parse::<u8>().is_ok())
            }
            Self::Ipv6 => value.contains(':'),
            Self::Regex => regex::Regex::new(value).is_ok(),
            Self::JsonPointer => value.is_empty() || value.starts_with('/'),
            Self::RelativeJsonPointer => value.chars().next().map_or(false, char::is_numeric),
            Self::UriTemplate => true,
        }
    }
}

/// Validate `value` against the recognised format named `name`.
#[inline]
pub(crate) fn validate_format(name: &str, value: &Value) -> FormatValidation {
    let format = if let Ok(format) = Format::try_from(name) {
        format
    } else {
        return FormatValidation::Unknown;
    };
    match value.as_str() {
        Some(string_value) => {
            if format.validate(string_value) {
                FormatValidation::Valid
            } else {
                FormatValidation::Invalid
            }
        }
        None => FormatValidation::Unknown,
    }
}

/// `true` iff `a` is `b` or there is a chain `a ⊂ … ⊂ b` in the recognised hierarchy.
pub(crate) fn is_format_subtype(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    let (a, b) = match (Format::try_from(a), Format::try_from(b)) {
        (Ok(a), Ok(b)) => (a, b),
        _ => return false,
    };
    let mut current = a;
    while let Some(parent) = current.parent() {
        if parent == b {
            return true;
        }
        current = parent;
    }
    false
}

/// `true` iff both names are recognised, distinct, and neither is a subtype of the other.
pub(crate) fn has_format_conflict(f1: &str, f2: &str) -> bool {
    if f1 == f2 {
        return false;
    }
    if Format::try_from(f1).is_err() || Format::try_from(f2).is_err() {
        // Two distinct unknown/unrecognised formats are still considered a conflict: there's
        // no way to prove they overlap, so any pair of distinct format strings is treated as
        // mutually exclusive.
        return true;
    }
    !is_format_subtype(f1, f2) && !is_format_subtype(f2, f1)
}

/// The more specific of two known-compatible format names (`a` if `a ⊂ b`, else `b`).
pub(crate) fn more_specific_format<'a>(f1: &'a str, f2: &'a str) -> &'a str {
    if is_format_subtype(f1, f2) {
        f1
    } else {
        f2
    }
}

#[cfg(test)]
mod tests {
    use super::{has_format_conflict, is_format_subtype, validate_format, FormatValidation};
    use serde_json::json;
    use test_case::test_case;

    #[test_case("email", "idn-email" => true)]
    #[test_case("idn-email", "email" => false)]
    #[test_case("hostname", "idn-hostname" => true)]
    #[test_case("uri", "iri" => true)]
    #[test_case("uri-reference", "iri-reference" => true)]
    #[test_case("email", "email" => true)]
    #[test_case("email", "hostname" => false)]
    fn test_is_format_subtype(a: &str, b: &str) -> bool {
        is_format_subtype(a, b)
    }

    #[test_case("email", "idn-email" => false)]
    #[test_case("email", "ipv4" => true)]
    #[test_case("email", "email" => false)]
    #[test_case("made-up", "also-made-up" => true)]
    fn test_has_format_conflict(f1: &str, f2: &str) -> bool {
        has_format_conflict(f1, f2)
    }

    #[test_case("email", &json!("user@example.com") => FormatValidation::Valid)]
    #[test_case("email", &json!("not-an-email") => FormatValidation::Invalid)]
    #[test_case("email", &json!(42) => FormatValidation::Unknown)]
    #[test_case("not-a-format", &json!("value") => FormatValidation::Unknown)]
    fn test_validate_format(name: &str, value: &serde_json::Value) -> FormatValidation {
        validate_format(name, value)
    }
}
