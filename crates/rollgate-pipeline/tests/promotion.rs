//! End-to-end tests: author spec to rendered artifacts.

use rollgate_pipeline::{compile, plan, resolve, CompileError, CompileOptions, Document};
use rollgate_types::{Origin, SecretsPolicy, Service, ValidationError};

fn from_yaml(yaml: &str) -> Service {
    serde_yaml::from_str(yaml).unwrap()
}

const CHECKOUT: &str = r#"
name: checkout
destinationNamespace: shop
argoCD:
  hostname: argocd.example.com
  syncTimeoutSeconds: 600
source:
  path: deploy/checkout
destinationGroups:
  - name: staging
    destinations:
      - name: stg-east
      - name: stg-west
        argoCD:
          retryLimit: 5
  - name: prod
    github:
      secrets:
        DEPLOY_TOKEN: ${{ secrets.PROD_TOKEN }}
    destinations:
      - server: https://kube.Local:6443
"#;

fn options() -> CompileOptions {
    CompileOptions::new("https://github.com/acme/checkout.git")
}

#[test]
fn test_prod_needs_exactly_staging() {
    let artifacts = compile(&from_yaml(CHECKOUT), &options()).unwrap();
    let top = match artifacts.get(".github/workflows/rollgate-checkout.yml") {
        Some(Document::Workflow(wf)) => wf,
        other => panic!("unexpected top-level artifact {:?}", other),
    };
    assert_eq!(top.jobs["prod"].needs, vec!["staging".to_string()]);
    assert!(top.jobs["staging"].needs.is_empty());
}

#[test]
fn test_artifact_counts_and_order() {
    let artifacts = compile(&from_yaml(CHECKOUT), &options()).unwrap();
    // 3 manifests + 3 destination workflows + 2 group workflows + 1 top-level
    assert_eq!(artifacts.len(), 9);
    assert_eq!(artifacts.manifests().count(), 3);

    let paths: Vec<&str> = artifacts.iter().map(|a| a.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            ".rollgate/applications/checkout-staging-stg-east.yaml",
            ".rollgate/applications/checkout-staging-stg-west.yaml",
            ".rollgate/applications/checkout-prod-kube-local-6443.yaml",
            ".github/workflows/rollgate-checkout-staging-stg-east.yml",
            ".github/workflows/rollgate-checkout-staging-stg-west.yml",
            ".github/workflows/rollgate-checkout-prod-kube-local-6443.yml",
            ".github/workflows/rollgate-checkout-staging.yml",
            ".github/workflows/rollgate-checkout-prod.yml",
            ".github/workflows/rollgate-checkout.yml",
        ]
    );
}

#[test]
fn test_cascade_values_and_origins() {
    let resolved = resolve(&from_yaml(CHECKOUT));
    let east = &resolved.groups[0].destinations[0];
    let west = &resolved.groups[0].destinations[1];

    assert_eq!(east.namespace.value, "shop");
    assert_eq!(east.namespace.origin, Origin::Service);
    assert_eq!(east.settings.sync_timeout_seconds.value, 600);
    assert_eq!(east.settings.sync_timeout_seconds.origin, Origin::Service);
    assert_eq!(east.settings.retry_limit.value, 3);
    assert_eq!(east.settings.retry_limit.origin, Origin::Default);
    assert_eq!(west.settings.retry_limit.value, 5);
    assert_eq!(west.settings.retry_limit.origin, Origin::Destination);

    let prod = &resolved.groups[1].destinations[0];
    assert_eq!(prod.cluster_identity(), "kube-local-6443");
    assert_eq!(prod.settings.secrets.origin, Origin::Group);
    assert!(matches!(prod.settings.secrets.value, SecretsPolicy::Explicit(_)));
}

#[test]
fn test_static_defaults() {
    let resolved = resolve(&from_yaml(
        r#"
name: svc
destinationGroups:
  - name: g
    destinations:
      - name: c1
        namespace: ns
"#,
    ));
    let settings = &resolved.groups[0].destinations[0].settings;
    assert_eq!(settings.sync_timeout_seconds.value, 300);
    assert_eq!(settings.retry_limit.value, 3);
    assert_eq!(settings.secrets.value, SecretsPolicy::Inherit);
    assert!(settings.kube_context.value.is_none());
}

#[test]
fn test_zero_groups_produces_no_artifacts() {
    let err = compile(&from_yaml("name: svc\n"), &options()).unwrap_err();
    match err {
        CompileError::Invalid(errors) => {
            assert_eq!(errors.to_string(), "at least 1 destination group is required")
        }
        other => panic!("unexpected error {}", other),
    }
}

#[test]
fn test_duplicate_destination_in_either_order() {
    let first = r#"
name: svc
argoCD: {hostname: h}
destinationGroups:
  - name: a
    destinations:
      - {name: Cluster1, namespace: ns}
      - {name: cluster1, namespace: ns}
      - {name: c2, namespace: ns}
"#;
    let second = r#"
name: svc
argoCD: {hostname: h}
destinationGroups:
  - name: a
    destinations:
      - {name: c2, namespace: ns}
      - {name: cluster1, namespace: ns}
      - {name: Cluster1, namespace: ns}
"#;
    for yaml in [first, second] {
        let err = plan(&from_yaml(yaml)).unwrap_err();
        let CompileError::Invalid(errors) = err else {
            panic!("expected validation errors");
        };
        assert_eq!(
            errors.count(&|e| matches!(e, ValidationError::DuplicateDestination(_))),
            1
        );
        assert!(errors.to_string().ends_with("duplicate destination name: cluster1/namespace/ns"));
    }
}

#[test]
fn test_mutually_exclusive_identity_keeps_validating() {
    let yaml = r#"
name: svc
destinationGroups:
  - name: a
    destinations:
      - {name: c1, server: "https://c1.local", namespace: ns}
      - {name: c2}
  - name: ""
    destinations:
      - {name: c3, namespace: ns}
"#;
    let err = plan(&from_yaml(yaml)).unwrap_err();
    let CompileError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    let leaves = errors.leaves();
    assert!(leaves.contains(&"validating destination group: a: validating destinations: validating destination: c1: only one of clusterName or clusterUrl may be specified (mutually exclusive)".to_string()));
    assert!(leaves.contains(&"validating destination group: a: validating destinations: validating destination: c2: destination namespace is required".to_string()));
    assert!(leaves.contains(&"validating destination group: <empty>: name is required".to_string()));
    assert_eq!(errors.count(&|e| matches!(e, ValidationError::HostnameRequired)), 3);
}

#[test]
fn test_sanitized_collisions_aggregate_with_structural_errors() {
    let yaml = r#"
name: checkout
argoCD: {hostname: h}
destinationGroups:
  - name: a b
    destinations:
      - {name: prod.east, namespace: ns}
      - {name: prod-east, namespace: ns}
  - name: a-b
    destinations:
      - {name: c1}
"#;
    let err = compile(&from_yaml(yaml), &options()).unwrap_err();
    let CompileError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.leaves(),
        vec![
            "validating destination group: a b: validating destinations: duplicate destination name: prod-east/namespace/ns".to_string(),
            "validating destination group: a-b: validating destinations: validating destination: c1: destination namespace is required".to_string(),
        ]
    );

    let fixed = yaml.replace("prod-east", "prod-west").replace("{name: c1}", "{name: c1, namespace: ns}");
    let err = compile(&from_yaml(&fixed), &options()).unwrap_err();
    let CompileError::Invalid(errors) = err else {
        panic!("expected validation errors");
    };
    assert_eq!(
        errors.to_string(),
        "destination groups a b and a-b both map to job key a-b"
    );
}

#[test]
fn test_name_too_long_is_rejected() {
    let yaml = format!(
        r#"
name: checkout
argoCD: {{hostname: h}}
destinationGroups:
  - name: staging
    destinations:
      - {{name: {}, namespace: ns}}
"#,
        "a".repeat(50)
    );
    let err = compile(&from_yaml(&yaml), &options()).unwrap_err();
    assert!(matches!(err, CompileError::Naming(_)));
    assert!(err.to_string().contains("name length exceeds 63 characters"));
}

#[test]
fn test_render_emits_header_and_yaml() {
    let artifacts = compile(&from_yaml(CHECKOUT), &options()).unwrap();
    let rendered = artifacts.render().unwrap();
    assert_eq!(rendered.len(), artifacts.len());

    let manifest = &rendered[0];
    assert!(manifest.contents.starts_with("# Code generated by rollgate. DO NOT EDIT.\n"));
    let value: serde_yaml::Value = serde_yaml::from_str(&manifest.contents).unwrap();
    assert_eq!(value["kind"].as_str(), Some("Application"));
    assert_eq!(value["spec"]["source"]["repoURL"].as_str(), Some("https://github.com/acme/checkout.git"));
    assert_eq!(value["spec"]["source"]["path"].as_str(), Some("deploy/checkout"));
    assert_eq!(value["spec"]["destination"]["namespace"].as_str(), Some("shop"));

    let top = rendered.last().unwrap();
    let value: serde_yaml::Value = serde_yaml::from_str(&top.contents).unwrap();
    assert_eq!(value["jobs"]["prod"]["needs"][0].as_str(), Some("staging"));
    assert_eq!(value["jobs"]["staging"]["secrets"].as_str(), Some("inherit"));
    assert_eq!(
        value["jobs"]["prod"]["secrets"]["DEPLOY_TOKEN"].as_str(),
        Some("${{ secrets.PROD_TOKEN }}")
    );
}

#[test]
fn test_compile_is_deterministic() {
    let a = compile(&from_yaml(CHECKOUT), &options()).unwrap().render().unwrap();
    let b = compile(&from_yaml(CHECKOUT), &options()).unwrap().render().unwrap();
    assert_eq!(a, b);
}
