//! Name resolution
//!
//! [`NameResolver`] turns a requested name, the matching install receipt and
//! the trigger into a [`Decision`]. Rules, first match wins:
//!
//! 1. A qualified request consults only the named authority.
//! 2. Without an install receipt nothing can be migrated.
//! 3. An automatic request consults only the receipt's source authority.
//! 4. A manual bare request is refused as ambiguous when more than one
//!    authority answers to the name, and otherwise behaves like rule 3.

use crate::decision::{Decision, NotFoundReason, Trigger};
use keg_catalog::{Authority, CatalogIndex, QualifiedName, RenameMaps};
use keg_store::InstallReceipt;
use std::collections::BTreeSet;

/// Resolves rename requests against one run's catalog snapshot
#[derive(Debug, Clone, Copy)]
pub struct NameResolver<'a> {
    maps: &'a RenameMaps,
    index: &'a CatalogIndex,
}

impl<'a> NameResolver<'a> {
    /// Create resolver over validated rename maps and the membership index
    #[inline]
    #[must_use]
    pub fn new(maps: &'a RenameMaps, index: &'a CatalogIndex) -> Self {
        Self { maps, index }
    }

    /// Decide what to do for `request`
    ///
    /// `receipt` is the install receipt found under the requested name, if
    /// any.
    #[must_use]
    pub fn resolve(
        &self,
        request: &QualifiedName,
        receipt: Option<&InstallReceipt>,
        trigger: Trigger,
    ) -> Decision {
        let name = request.name();
        let decision = match (request.qualifier(), receipt) {
            (Some(qualifier), receipt) => self.resolve_qualified(qualifier, name, receipt),
            (None, None) => Decision::not_found(name, NotFoundReason::NotInstalled),
            (None, Some(receipt)) => match trigger {
                Trigger::Automatic => self.resolve_from_source(name, receipt).unwrap_or(Decision::NoOp),
                Trigger::Manual => self.resolve_manual(name, receipt),
            },
        };
        tracing::debug!(request = %request, %trigger, %decision, "resolved");
        decision
    }

    /// Authorities that answer to the bare `name`
    ///
    /// An authority answers when it still defines a formula literally named
    /// `name`. Core also answers when it renamed `name`, since bare names
    /// follow core renames.
    #[must_use]
    pub fn answering_authorities(&self, name: &str) -> Vec<Authority> {
        let mut answering: BTreeSet<Authority> = self.index.authorities_defining(name).into_iter().collect();
        if self.maps.get(&Authority::Core, name).is_some() {
            answering.insert(Authority::Core);
        }
        answering.into_iter().collect()
    }

    fn resolve_qualified(
        &self,
        qualifier: &Authority,
        name: &str,
        receipt: Option<&InstallReceipt>,
    ) -> Decision {
        let Some(entry) = self.maps.entry(qualifier, name) else {
            return Decision::not_found(
                name,
                NotFoundReason::NoRename {
                    authority: qualifier.clone(),
                },
            );
        };
        let Some(receipt) = receipt else {
            return Decision::not_found(name, NotFoundReason::NotInstalled);
        };
        if receipt.source_authority() != qualifier {
            return Decision::not_found(
                name,
                NotFoundReason::SourceMismatch {
                    requested: qualifier.clone(),
                    installed_from: receipt.source_authority().clone(),
                },
            );
        }
        Decision::Resolved(entry)
    }

    fn resolve_manual(&self, name: &str, receipt: &InstallReceipt) -> Decision {
        let answering = self.answering_authorities(name);
        if answering.len() > 1 {
            return Decision::Ambiguous {
                name: name.to_string(),
                authorities: answering,
            };
        }
        self.resolve_from_source(name, receipt).unwrap_or_else(|| {
            Decision::not_found(
                name,
                NotFoundReason::NoRename {
                    authority: receipt.source_authority().clone(),
                },
            )
        })
    }

    fn resolve_from_source(&self, name: &str, receipt: &InstallReceipt) -> Option<Decision> {
        self.maps
            .entry(receipt.source_authority(), name)
            .map(Decision::Resolved)
    }
}
