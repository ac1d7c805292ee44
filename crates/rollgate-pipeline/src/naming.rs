//! Stable resource and job names
//!
//! Resource names become GitOps application names and workflow names, so
//! they are capped at [`MAX_NAME_LEN`]. Names that would exceed the cap are
//! an error, never truncated.

use crate::error::{NameError, NameErrors};
use rollgate_types::{
    DestinationKey, ResolvedDestination, ResolvedService, UniquenessStrategy,
    MAX_NAME_LEN,
};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Canonical identifier for an arbitrary display string
pub fn sanitize_identifier(raw: &str) -> String {
    rollgate_types::sanitize(raw)
}

/// Derive the external resource name for a destination.
///
/// Joins service, group (unless excluded), cluster identity and namespace
/// (when requested), then sanitizes the result.
pub fn derive_resource_name(
    service: &str,
    group: &str,
    destination: &ResolvedDestination,
    strategy: &UniquenessStrategy,
) -> Result<String, NameError> {
    let identity = destination.cluster_identity();
    let mut segments = vec![service];
    if strategy.include_group {
        segments.push(group);
    }
    segments.push(&identity);
    if strategy.include_destination_namespace {
        segments.push(&destination.namespace.value);
    }

    let name = sanitize_identifier(&segments.join("-"));
    check_length(name)
}

/// Derive the job key used for a destination inside its group workflow
pub fn derive_job_name(
    destination: &ResolvedDestination,
    strategy: &UniquenessStrategy,
) -> Result<String, NameError> {
    let identity = destination.cluster_identity();
    let raw = if strategy.include_destination_namespace {
        format!("{}-{}", identity, destination.namespace.value)
    } else {
        identity
    };
    check_length(sanitize_identifier(&raw))
}

fn check_length(name: String) -> Result<String, NameError> {
    let len = name.chars().count();
    if name.is_empty() {
        Err(NameError::Empty)
    } else if len > MAX_NAME_LEN {
        Err(NameError::TooLong {
            name,
            len,
            max: MAX_NAME_LEN,
        })
    } else {
        Ok(name)
    }
}

/// Names derived for one destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationNames {
    /// GitOps application name; also the destination workflow name
    pub resource: String,
    /// Job key inside the group workflow
    pub job: String,
}

/// Derived names for every destination in a service
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameTable {
    names: BTreeMap<DestinationKey, DestinationNames>,
}

impl NameTable {
    pub fn get(&self, key: &DestinationKey) -> Option<&DestinationNames> {
        self.names.get(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DestinationKey, &DestinationNames)> {
        self.names.iter()
    }
}

/// Derive names for every destination, aggregating failures.
///
/// Besides per-destination length errors, two destinations whose resource
/// names collide are rejected.
#[instrument(skip_all, fields(service = %service.name))]
pub fn derive_names(service: &ResolvedService) -> Result<NameTable, NameErrors> {
    let mut errors = NameErrors::new();
    let mut table = NameTable::default();
    let mut owners: BTreeMap<String, DestinationKey> = BTreeMap::new();

    for (group, destination) in service.destinations() {
        let key = destination.key();
        let derived = derive_resource_name(
            &service.name,
            &group.name,
            destination,
            &service.uniqueness,
        )
        .and_then(|resource| {
            derive_job_name(destination, &service.uniqueness)
                .map(|job| DestinationNames { resource, job })
        });

        let names = match derived {
            Ok(names) => names,
            Err(error) => {
                errors.push(NameError::Destination {
                    destination: key,
                    error: Box::new(error),
                });
                continue;
            }
        };

        if let Some(first) = owners.get(&names.resource) {
            errors.push(NameError::Collision {
                name: names.resource.clone(),
                first: first.clone(),
                second: key,
            });
            continue;
        }

        debug!(destination = %key, resource = %names.resource, job = %names.job, "Derived names");
        owners.insert(names.resource.clone(), key.clone());
        table.names.insert(key, names);
    }

    errors.into_result().map(|_| table)
}
