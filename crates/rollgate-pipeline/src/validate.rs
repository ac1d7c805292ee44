//! Structural validation of resolved services
//!
//! Validation never short-circuits: every problem in the tree is collected
//! and returned together, wrapped with the group/destination it belongs to.

use rollgate_types::{
    DestinationKey, ResolvedDestination, ResolvedGroup, ResolvedService, ValidationError,
    ValidationErrors,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Label used for groups without a name
pub const UNNAMED_GROUP: &str = "<empty>";

/// Validate a resolved service tree
#[instrument(skip_all, fields(service = %service.name))]
pub fn validate(service: &ResolvedService) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();

    if service.name.is_empty() {
        errors.push(ValidationError::ServiceNameRequired);
    }

    if service.groups.is_empty() {
        errors.push(ValidationError::NoDestinationGroups);
    }

    let mut group_names = Duplicates::default();
    let mut stage_keys = StageKeys::default();
    let mut destination_keys = Duplicates::default();

    for group in &service.groups {
        let group_errors = validate_group(group, &mut destination_keys);
        if !group_errors.is_empty() {
            let label = if group.name.is_empty() {
                UNNAMED_GROUP.to_string()
            } else {
                group.name.clone()
            };
            errors.push(ValidationError::Group {
                group: label,
                errors: group_errors,
            });
            continue;
        }

        if group_names.observe(group.name.clone()) {
            errors.push(ValidationError::DuplicateGroupName(group.name.clone()));
            continue;
        }

        if let Some(error) = stage_keys.observe(group) {
            errors.push(error);
        }
    }

    debug!(errors = errors.len(), "Validated service");
    errors.into_result()
}

fn validate_group(
    group: &ResolvedGroup,
    destination_keys: &mut Duplicates<DestinationKey>,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if group.name.is_empty() {
        errors.push(ValidationError::GroupNameRequired);
    } else if group.stage_key().is_empty() {
        errors.push(ValidationError::GroupKeyEmpty);
    }

    let mut destination_errors = ValidationErrors::new();

    if group.destinations.is_empty() {
        destination_errors.push(ValidationError::NoDestinations);
    }

    for (index, destination) in group.destinations.iter().enumerate() {
        let own = validate_destination(destination);
        if !own.is_empty() {
            let identity = destination.cluster_identity();
            let label = if identity.is_empty() {
                format!("#{}", index)
            } else {
                identity
            };
            destination_errors.push(ValidationError::Destination {
                destination: label,
                errors: own,
            });
        }

        // Only a namespace plus exactly one cluster identity forms a key
        if !has_key(destination) {
            continue;
        }
        let key = destination.key();
        if destination_keys.observe(key.clone()) {
            destination_errors.push(ValidationError::DuplicateDestination(key.to_string()));
        }
    }

    if !destination_errors.is_empty() {
        errors.push(ValidationError::Destinations(destination_errors));
    }

    errors
}

fn identity_fields(destination: &ResolvedDestination) -> (bool, bool) {
    (
        destination.cluster_name.as_deref().is_some_and(|n| !n.is_empty()),
        destination.server.as_deref().is_some_and(|s| !s.is_empty()),
    )
}

fn has_key(destination: &ResolvedDestination) -> bool {
    let (has_name, has_server) = identity_fields(destination);
    !destination.namespace.value.is_empty() && has_name != has_server
}

/// Checks on a single destination, in a fixed order
pub fn validate_destination(destination: &ResolvedDestination) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if destination.namespace.value.is_empty() {
        errors.push(ValidationError::NamespaceRequired);
    }

    match identity_fields(destination) {
        (false, false) => errors.push(ValidationError::ClusterIdentityRequired),
        (true, true) => errors.push(ValidationError::ClusterIdentityConflict),
        _ => {}
    }

    if destination.settings.hostname.value.is_empty() {
        errors.push(ValidationError::HostnameRequired);
    }

    errors
}

/// Tracks seen values; each duplicated value is reported once
struct Duplicates<T> {
    seen: HashSet<T>,
    reported: HashSet<T>,
}

impl<T> Default for Duplicates<T> {
    fn default() -> Self {
        Self {
            seen: HashSet::new(),
            reported: HashSet::new(),
        }
    }
}

impl<T: std::hash::Hash + Eq + Clone> Duplicates<T> {
    /// Returns `true` the first time `value` is seen for a second time
    fn observe(&mut self, value: T) -> bool {
        if self.seen.insert(value.clone()) {
            return false;
        }
        self.reported.insert(value)
    }
}

/// Top-level job keys claimed so far, by the group name that claimed them
#[derive(Default)]
struct StageKeys {
    owners: HashMap<String, String>,
    reported: HashSet<String>,
}

impl StageKeys {
    /// A collision error the first time two distinct group names share a key
    fn observe(&mut self, group: &ResolvedGroup) -> Option<ValidationError> {
        let key = group.stage_key();
        match self.owners.get(&key).cloned() {
            None => {
                self.owners.insert(key, group.name.clone());
                None
            }
            // Same raw name again: already reported as a duplicate group name
            Some(first) if first == group.name => None,
            Some(first) => self.reported.insert(key.clone()).then(|| {
                ValidationError::DuplicateGroupKey {
                    key,
                    first,
                    second: group.name.clone(),
                }
            }),
        }
    }
}
