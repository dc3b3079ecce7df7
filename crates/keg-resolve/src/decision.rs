//! Resolution outcomes

use keg_catalog::{Authority, RenameEntry};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// What started a migration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The user asked for a specific name
    Manual,
    /// Post-sync sweep over everything installed
    Automatic,
}

impl Display for Trigger {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manual => f.write_str("manual"),
            Self::Automatic => f.write_str("automatic"),
        }
    }
}

/// Why a request matched no rename
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NotFoundReason {
    /// Nothing is installed under the name
    NotInstalled,
    /// The consulted authority declares no rename for the name
    NoRename {
        /// Authority that was consulted
        authority: Authority,
    },
    /// The installed package came from a different authority than requested
    SourceMismatch {
        /// Authority named in the request
        requested: Authority,
        /// Authority recorded in the install receipt
        installed_from: Authority,
    },
}

impl Display for NotFoundReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled => f.write_str("not installed"),
            Self::NoRename { authority } => write!(f, "{authority} declares no rename for it"),
            Self::SourceMismatch {
                requested,
                installed_from,
            } => write!(f, "installed from {installed_from}, not {requested}"),
        }
    }
}

/// Result of resolving one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    /// Migrate per this rename
    Resolved(RenameEntry),
    /// No rename applies and none was asked for
    NoOp,
    /// Several authorities answer to the bare name
    Ambiguous {
        /// Requested bare name
        name: String,
        /// Authorities answering to it, core first
        authorities: Vec<Authority>,
    },
    /// No applicable rename
    NotFound {
        /// Requested name
        name: String,
        /// Why nothing matched
        reason: NotFoundReason,
    },
}

impl Decision {
    /// Shorthand for [`Decision::NotFound`]
    #[must_use]
    pub fn not_found(name: impl Into<String>, reason: NotFoundReason) -> Self {
        Self::NotFound {
            name: name.into(),
            reason,
        }
    }

    /// Rename to apply, if resolved
    #[inline]
    #[must_use]
    pub fn rename(&self) -> Option<&RenameEntry> {
        match self {
            Self::Resolved(entry) => Some(entry),
            _ => None,
        }
    }

    /// Check if this decision fails a request made by `trigger`
    ///
    /// Manual requests fail on anything but a resolved rename. Automatic
    /// sweeps never fail on resolution; only migration itself can fail them.
    #[must_use]
    pub fn is_fatal_for(&self, trigger: Trigger) -> bool {
        match (self, trigger) {
            (Self::Resolved(_) | Self::NoOp, _) | (_, Trigger::Automatic) => false,
            (Self::Ambiguous { .. } | Self::NotFound { .. }, Trigger::Manual) => true,
        }
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(entry) => write!(f, "migrate {entry}"),
            Self::NoOp => f.write_str("nothing to do"),
            Self::Ambiguous { name, authorities } => {
                write!(f, "{name} is ambiguous between")?;
                for (i, authority) in authorities.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{authority}")?;
                }
                Ok(())
            }
            Self::NotFound { name, reason } => write!(f, "no rename for {name}: {reason}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keg_catalog::TapId;

    fn tap() -> Authority {
        TapId::new("vladshablinsky", "taptest").unwrap().into()
    }

    #[test]
    fn manual_fails_on_ambiguity_and_not_found() {
        let ambiguous = Decision::Ambiguous {
            name: "libpng".into(),
            authorities: vec![Authority::Core, tap()],
        };
        let missing = Decision::not_found("libpng", NotFoundReason::NotInstalled);

        assert!(ambiguous.is_fatal_for(Trigger::Manual));
        assert!(missing.is_fatal_for(Trigger::Manual));
        assert!(!ambiguous.is_fatal_for(Trigger::Automatic));
        assert!(!missing.is_fatal_for(Trigger::Automatic));
        assert!(!Decision::NoOp.is_fatal_for(Trigger::Manual));
    }

    #[test]
    fn ambiguous_display_lists_authorities() {
        let decision = Decision::Ambiguous {
            name: "libpng".into(),
            authorities: vec![Authority::Core, tap()],
        };
        assert_eq!(
            decision.to_string(),
            "libpng is ambiguous between core, vladshablinsky/taptest"
        );
    }

    #[test]
    fn decision_serializes_tagged() {
        let decision = Decision::not_found(
            "libpng",
            NotFoundReason::SourceMismatch {
                requested: tap(),
                installed_from: Authority::Core,
            },
        );
        let value = serde_json::to_value(&decision).unwrap();

        assert_eq!(value["decision"], "not_found");
        assert_eq!(value["reason"]["kind"], "source_mismatch");
        assert_eq!(value["reason"]["installed_from"], "core");
    }
}
