//! Property tests: identifier sanitization is canonical.

use proptest::prelude::*;
use rollgate_types::{cluster_identity, sanitize, DestinationKey};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Arbitrary display strings, biased toward URL-ish input.
fn arb_display_string() -> impl Strategy<Value = String> {
    prop_oneof![
        any::<String>(),
        "(https?://)?[A-Za-z0-9._:/-]{0,40}",
        "[ -~]{0,30}",
    ]
}

proptest! {
    #[test]
    fn sanitize_is_idempotent(raw in arb_display_string()) {
        let once = sanitize(&raw);
        prop_assert_eq!(sanitize(&once), once);
    }

    #[test]
    fn sanitize_output_alphabet(raw in arb_display_string()) {
        let out = sanitize(&raw);
        prop_assert!(out.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase() || c == '-'));
        prop_assert!(!out.starts_with('-'));
        prop_assert!(!out.ends_with('-'));
        prop_assert!(!out.contains("--"));
    }

    #[test]
    fn server_identity_ignores_case(server in "https://[A-Za-z]{1,10}\\.[A-Za-z]{2,5}(:[0-9]{2,5})?") {
        prop_assert_eq!(
            cluster_identity(None, Some(&server.to_uppercase())),
            cluster_identity(None, Some(&server.to_lowercase()))
        );
    }

    #[test]
    fn destination_key_embeds_namespace(identity in "[A-Za-z0-9.-]{1,20}", ns in "[a-z0-9-]{1,20}") {
        let key = DestinationKey::new(&identity, &ns);
        prop_assert_eq!(key.as_str(), format!("{}/namespace/{}", sanitize(&identity), ns));
    }
}

#[test]
fn test_example_cluster_url() {
    assert_eq!(
        cluster_identity(None, Some("https://kube.Local:6443")),
        "kube-local-6443"
    );
}

#[test]
fn test_spec_documents_decode_from_yaml() {
    let yaml = r#"
name: checkout
argoCD:
  hostname: argocd.example.com
destinationGroups:
  - name: staging
    destinations:
      - name: c1
        namespace: ns1
  - name: prod
    destinationNamespace: ns2
    destinations:
      - server: https://kube.Local:6443
github:
  secrets: inherit
  on:
    push:
      branches: [main]
"#;
    let service: rollgate_types::Service = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(service.name, "checkout");
    assert_eq!(service.destination_groups.len(), 2);
    assert_eq!(
        service.argocd.hostname.as_deref(),
        Some("argocd.example.com")
    );
    let prod = &service.destination_groups[1];
    assert_eq!(prod.destination_namespace.as_deref(), Some("ns2"));
    assert_eq!(prod.destinations[0].cluster_identity(), "kube-local-6443");
    assert!(service.github.on.is_some());
}
