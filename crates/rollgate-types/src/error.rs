//! Aggregated error types
//!
//! Structural problems are collected rather than returned one at a time, so
//! an author sees every issue in a single pass. Nested variants carry the
//! group/destination context they were found in.

use std::fmt;
use thiserror::Error;

/// An ordered list of errors displayed one per line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorList<E>(Vec<E>);

impl<E> ErrorList<E> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, error: E) {
        self.0.push(error);
    }

    /// Append another list, keeping order
    pub fn append(&mut self, other: ErrorList<E>) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise the list itself as the error
    pub fn into_result(self) -> Result<(), Self> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl<E> Default for ErrorList<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> From<E> for ErrorList<E> {
    fn from(error: E) -> Self {
        Self(vec![error])
    }
}

impl<E> FromIterator<E> for ErrorList<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<E> IntoIterator for ErrorList<E> {
    type Item = E;
    type IntoIter = std::vec::IntoIter<E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, E> IntoIterator for &'a ErrorList<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<E: fmt::Display> fmt::Display for ErrorList<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ErrorList<E> {}

/// Aggregated structural errors for a service tree
pub type ValidationErrors = ErrorList<ValidationError>;

/// A structural problem in a service spec
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The input document was empty or `null`
    #[error("service is nil")]
    NilService,

    #[error("service name is required")]
    ServiceNameRequired,

    #[error("at least 1 destination group is required")]
    NoDestinationGroups,

    /// Errors found inside one group
    #[error("validating destination group: {group}: {errors}")]
    Group {
        group: String,
        errors: ValidationErrors,
    },

    #[error("name is required")]
    GroupNameRequired,

    #[error("duplicate destination group name: {0}")]
    DuplicateGroupName(String),

    /// The name sanitizes to an empty job key
    #[error("name must contain at least one letter or digit")]
    GroupKeyEmpty,

    /// Two distinct group names sanitize to the same top-level job key
    #[error("destination groups {first} and {second} both map to job key {key}")]
    DuplicateGroupKey {
        key: String,
        first: String,
        second: String,
    },

    /// Errors found across a group's destination list
    #[error("validating destinations: {0}")]
    Destinations(ValidationErrors),

    #[error("destinations is empty")]
    NoDestinations,

    /// Errors found inside one destination
    #[error("validating destination: {destination}: {errors}")]
    Destination {
        destination: String,
        errors: ValidationErrors,
    },

    #[error("destination namespace is required")]
    NamespaceRequired,

    #[error("one of clusterName or clusterUrl required")]
    ClusterIdentityRequired,

    #[error("only one of clusterName or clusterUrl may be specified (mutually exclusive)")]
    ClusterIdentityConflict,

    #[error("argoCD.hostname is required")]
    HostnameRequired,

    #[error("duplicate destination name: {0}")]
    DuplicateDestination(String),
}

impl ValidationError {
    /// Nested errors, if this variant wraps any
    pub fn children(&self) -> Option<&ValidationErrors> {
        match self {
            ValidationError::Group { errors, .. }
            | ValidationError::Destination { errors, .. }
            | ValidationError::Destinations(errors) => Some(errors),
            _ => None,
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            ValidationError::Group { group, .. } => {
                Some(format!("validating destination group: {}", group))
            }
            ValidationError::Destination { destination, .. } => {
                Some(format!("validating destination: {}", destination))
            }
            ValidationError::Destinations(_) => Some("validating destinations".to_string()),
            _ => None,
        }
    }
}

impl ErrorList<ValidationError> {
    /// Every leaf error with its full context chain, one entry per problem
    pub fn leaves(&self) -> Vec<String> {
        let mut out = Vec::new();
        for error in self {
            collect_leaves(error, "", &mut out);
        }
        out
    }

    /// Depth-first search through nested errors
    pub fn contains(&self, predicate: &dyn Fn(&ValidationError) -> bool) -> bool {
        self.iter().any(|e| {
            predicate(e) || e.children().map(|c| c.contains(predicate)).unwrap_or(false)
        })
    }

    /// Count of matching errors at any depth
    pub fn count(&self, predicate: &dyn Fn(&ValidationError) -> bool) -> usize {
        self.iter()
            .map(|e| {
                usize::from(predicate(e)) + e.children().map(|c| c.count(predicate)).unwrap_or(0)
            })
            .sum()
    }
}

fn collect_leaves(error: &ValidationError, prefix: &str, out: &mut Vec<String>) {
    match (error.context(), error.children()) {
        (Some(context), Some(children)) => {
            let prefix = format!("{}{}: ", prefix, context);
            for child in children {
                collect_leaves(child, &prefix, out);
            }
        }
        _ => out.push(format!("{}{}", prefix, error)),
    }
}
