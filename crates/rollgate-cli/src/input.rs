//! Service spec input
//!
//! Specs are read from a file or from stdin. A path ending in `.json` is
//! decoded as JSON; everything else as YAML. An empty or `null` document
//! decodes to `None`.

use crate::error::{CliError, CliResult};
use rollgate_types::Service;
use std::io::{IsTerminal, Read};
use std::path::Path;
use tracing::debug;

/// Marker for reading from stdin
pub const STDIN: &str = "-";

/// Decode a document, choosing the format from `path`
pub fn decode(contents: &str, path: Option<&str>) -> CliResult<Option<Service>> {
    if contents.trim().is_empty() {
        return Ok(None);
    }

    let is_json = path
        .map(|p| {
            Path::new(p)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
        })
        .unwrap_or(false);

    if is_json {
        Ok(serde_json::from_str(contents)?)
    } else {
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Read and decode a spec from `path`, or from stdin when `path` is `None`
/// or `-`
pub fn read_service(path: Option<&str>) -> CliResult<Option<Service>> {
    match path.filter(|p| *p != STDIN) {
        Some(path) => {
            debug!(path, "Reading service spec");
            let contents = std::fs::read_to_string(path)?;
            decode(&contents, Some(path))
        }
        None => {
            let stdin = std::io::stdin();
            if stdin.is_terminal() {
                return Err(CliError::InvalidInput("stdin is from a terminal".into()));
            }
            debug!("Reading service spec from stdin");
            let mut contents = String::new();
            stdin.lock().read_to_string(&mut contents)?;
            decode(&contents, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_yaml() {
        let service = decode("name: checkout\n", Some("service.yaml"))
            .unwrap()
            .unwrap();
        assert_eq!(service.name, "checkout");
    }

    #[test]
    fn test_decode_json_by_extension() {
        let service = decode(r#"{"name": "checkout"}"#, Some("svc.JSON"))
            .unwrap()
            .unwrap();
        assert_eq!(service.name, "checkout");

        assert!(matches!(
            decode("name: checkout", Some("svc.json")),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn test_empty_and_null_documents() {
        assert!(decode("", None).unwrap().is_none());
        assert!(decode("  \n", Some("svc.yaml")).unwrap().is_none());
        assert!(decode("null", Some("svc.json")).unwrap().is_none());
        assert!(decode("~\n", None).unwrap().is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_service(Some("/nonexistent/service.yaml")),
            Err(CliError::Io(_))
        ));
    }
}
