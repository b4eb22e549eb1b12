//! Template selection for `check`, `install` and `uninstall`.

use std::fmt;
use std::str::FromStr;

use crate::config::BrokerConfig;
use crate::error::ConfigError;

/// The `-t/--template` argument value meaning "every template".
pub const ALL_TEMPLATES: &str = "*";

/// Which broker templates a command operates on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateFilter {
    /// Every template defined in the broker section.
    #[default]
    All,
    /// A single template by name.
    Named(String),
}

impl TemplateFilter {
    /// Returns `true` if `name` passes the filter.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(wanted) => wanted == name,
        }
    }

    /// Resolve the filter against the broker's templates.
    ///
    /// # Errors
    /// Returns [`ConfigError::UnknownTemplate`] if a named template is not one
    /// of the broker's templates.
    pub fn select<'a>(&self, broker: &'a BrokerConfig) -> Result<Vec<&'a str>, ConfigError> {
        let selected: Vec<&str> = broker
            .templates()
            .into_iter()
            .filter(|name| self.matches(name))
            .collect();
        match self {
            Self::Named(name) if selected.is_empty() => {
                Err(ConfigError::UnknownTemplate { name: name.clone() })
            }
            _ => Ok(selected),
        }
    }
}

impl FromStr for TemplateFilter {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == ALL_TEMPLATES {
            Ok(Self::All)
        } else {
            Ok(Self::Named(trimmed.to_owned()))
        }
    }
}

impl fmt::Display for TemplateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_TEMPLATES),
            Self::Named(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn broker() -> BrokerConfig {
        BrokerConfig {
            kind: "default".to_owned(),
            catalog: "cse-catalog".to_owned(),
            master_template: "photon-v1".to_owned(),
            node_template: "ubuntu-16.04".to_owned(),
            password: "pw".to_owned(),
        }
    }

    fn parse(s: &str) -> TemplateFilter {
        match s.parse() {
            Ok(f) => f,
            Err(e) => match e {},
        }
    }

    #[test]
    fn wildcard_parses_to_all() {
        assert_eq!(parse("*"), TemplateFilter::All);
        assert_eq!(parse(""), TemplateFilter::All);
        assert_eq!(parse("photon-v1"), TemplateFilter::Named("photon-v1".to_owned()));
    }

    #[test]
    fn all_selects_every_template() {
        let b = broker();
        let selected = TemplateFilter::All.select(&b).unwrap_or_default();
        assert_eq!(selected, vec!["photon-v1", "ubuntu-16.04"]);
    }

    #[test]
    fn named_selects_only_that_template() {
        let b = broker();
        let selected = parse("ubuntu-16.04").select(&b).unwrap_or_default();
        assert_eq!(selected, vec!["ubuntu-16.04"]);
    }

    #[test]
    fn unknown_name_is_an_error() {
        let b = broker();
        match parse("centos-7").select(&b) {
            Err(ConfigError::UnknownTemplate { name }) => assert_eq!(name, "centos-7"),
            other => panic!("expected UnknownTemplate, got {other:?}"),
        }
    }

    proptest::proptest! {
        #[test]
        fn proptest_all_matches_any_name(name in "\\PC*") {
            proptest::prop_assert!(TemplateFilter::All.matches(&name));
        }

        #[test]
        fn proptest_named_matches_only_itself(a in "[a-z0-9.-]{1,16}", b in "[a-z0-9.-]{1,16}") {
            let filter = TemplateFilter::Named(a.clone());
            proptest::prop_assert_eq!(filter.matches(&b), a == b);
        }
    }
}
