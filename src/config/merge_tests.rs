//! Tests for merging YAML documents with flat parameters.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use super::ConfigError;
use super::cli::Cli;
use super::env::EnvSources;
use super::error::{EndpointError, field};
use super::merge::{merge, split_list};
use super::registry::Registry;
use super::resolver::{ResolvedParameters, Resolver};
use super::yaml::YamlConfig;

fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

/// Resolves flags and environment variables, with no properties file.
fn flat(args: &[&str], env: &[(&str, &str)]) -> ResolvedParameters {
    flat_with_file(args, env, None)
}

fn flat_with_file(
    args: &[&str],
    env: &[(&str, &str)],
    file: Option<&HashMap<String, String>>,
) -> ResolvedParameters {
    let (default_env, application_env): (Vec<_>, Vec<_>) =
        env.iter().copied().partition(|(name, _)| !name.starts_with("DENSIFY_"));
    let registry = Registry::standard(EnvSources::from_maps(
        map(&default_env),
        map(&application_env),
    ))
    .unwrap();

    let mut full_args = vec!["collector-config"];
    full_args.extend(args);
    let cli = Cli::parse_from_iter(&registry, full_args).unwrap();

    Resolver::new(&registry, &cli).resolve(file).unwrap()
}

fn yaml(content: &str) -> Option<YamlConfig> {
    Some(YamlConfig::parse(content).unwrap())
}

fn set(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

const PROMETHEUS_YAML: &str = "prometheus:\n  url:\n    scheme: http\n    host: prometheus.monitoring\n";

mod flat_only {
    use super::*;

    #[test]
    fn defaults_produce_valid_config() {
        let config = merge(None, &flat(&["--prometheus_address", "prom"], &[])).unwrap();

        assert_eq!(config.forwarder.densify.url.url(), Some("https://localhost"));
        assert_eq!(config.forwarder.densify.endpoint, "/api/v2/");
        assert_eq!(config.prometheus.url.url(), Some("http://prom:9090"));
        assert_eq!(config.forwarder.proxy.url.url(), None);
        assert_eq!(config.forwarder.proxy.auth, "Basic");
        assert!(!config.debug);
    }

    #[test]
    fn missing_prometheus_address_is_incomplete() {
        let result = merge(None, &flat(&[], &[]));

        match result {
            Err(ConfigError::Endpoint { field: f, source }) => {
                assert_eq!(f, field::PROMETHEUS_URL);
                assert_eq!(source, EndpointError::Incomplete);
            }
            other => panic!("expected Endpoint error, got {other:?}"),
        }
    }

    #[test]
    fn cluster_name_falls_back_to_prometheus_address() {
        let config = merge(None, &flat(&["-a", "prom.monitoring"], &[])).unwrap();

        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.clusters[0].name, "prom.monitoring");
    }

    #[test]
    fn cluster_name_from_environment() {
        let config = merge(
            None,
            &flat(&["-a", "prom"], &[("CLUSTER_NAME", "production")]),
        )
        .unwrap();

        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.clusters[0].name, "production");
    }

    #[test]
    fn include_list_is_normalized() {
        let config = merge(
            None,
            &flat(&["-a", "prom", "--include_list", "container,node,  Cluster"], &[]),
        )
        .unwrap();

        assert_eq!(config.collection.include, set(&["cluster", "container", "node"]));
    }

    #[test]
    fn default_include_list() {
        let config = merge(None, &flat(&["-a", "prom"], &[])).unwrap();

        assert_eq!(
            config.collection.include,
            set(&["cluster", "container", "node", "nodegroup", "quota"])
        );
    }

    #[test]
    fn proxy_from_application_environment() {
        let config = merge(
            None,
            &flat(
                &["-a", "prom"],
                &[
                    ("DENSIFY_PROXYPROTOCOL", "http"),
                    ("DENSIFY_PROXYHOST", "proxy.internal"),
                    ("DENSIFY_PROXYPORT", "3128"),
                ],
            ),
        )
        .unwrap();

        assert_eq!(config.forwarder.proxy.url.url(), Some("http://proxy.internal:3128"));
    }

    #[test]
    fn proxy_host_without_scheme_is_incomplete() {
        let result = merge(None, &flat(&["-a", "prom", "--proxyhost", "proxy.internal"], &[]));

        assert!(matches!(
            result,
            Err(ConfigError::Endpoint {
                field: field::PROXY_URL,
                source: EndpointError::Incomplete
            })
        ));
    }

    #[test]
    fn retry_policies_default_and_validate() {
        let config = merge(None, &flat(&["-a", "prom"], &[])).unwrap();

        for retry in [&config.forwarder.densify.retry, &config.prometheus.retry] {
            assert!(retry.is_valid());
            assert_eq!(retry.wait_min(), Duration::from_secs(1));
            assert_eq!(retry.wait_max(), Duration::from_secs(30));
            assert_eq!(retry.max_attempts(), 4);
        }
    }
}

mod structured {
    use super::*;

    #[test]
    fn yaml_beats_defaults() {
        let doc = yaml(&format!(
            "{PROMETHEUS_YAML}forwarder:\n  densify:\n    url:\n      host: acme.example.com\n"
        ));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert_eq!(config.forwarder.densify.url.url(), Some("https://acme.example.com"));
        assert_eq!(config.prometheus.url.url(), Some("http://prometheus.monitoring:9090"));
    }

    #[test]
    fn flag_beats_yaml() {
        let doc = yaml(&format!(
            "{PROMETHEUS_YAML}forwarder:\n  densify:\n    url:\n      host: acme.example.com\n"
        ));

        let config = merge(doc, &flat(&["--host", "override.example.com"], &[])).unwrap();

        assert_eq!(
            config.forwarder.densify.url.url(),
            Some("https://override.example.com")
        );
    }

    #[test]
    fn environment_beats_yaml() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}collection:\n  history: 2\n"));

        let config = merge(doc, &flat(&[], &[("HISTORY", "5")])).unwrap();

        assert_eq!(config.collection.history, 5);
    }

    #[test]
    fn yaml_zero_is_kept() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}collection:\n  history: 0\n  sample_rate: 0\n"));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert_eq!(config.collection.history, 0);
        assert_eq!(config.collection.sample_rate, 0);
        assert_eq!(config.collection.sample_rate_label, "0");
    }

    #[test]
    fn absent_slots_take_defaults() {
        let config = merge(yaml(PROMETHEUS_YAML), &flat(&[], &[])).unwrap();

        assert_eq!(config.forwarder.densify.url.url(), Some("https://localhost"));
        assert_eq!(config.collection.history, 1);
        assert_eq!(config.collection.sample_rate, 5);
    }

    #[test]
    fn yaml_include_kept_without_explicit_list() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}collection:\n  include: [node, quota]\n"));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert_eq!(config.collection.include, set(&["node", "quota"]));
    }

    #[test]
    fn explicit_include_list_replaces_yaml() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}collection:\n  include: [node, quota]\n"));

        let config = merge(doc, &flat(&["--include_list", "container"], &[])).unwrap();

        assert_eq!(config.collection.include, set(&["container"]));
    }

    #[test]
    fn yaml_without_include_collects_nothing() {
        let config = merge(yaml(PROMETHEUS_YAML), &flat(&[], &[])).unwrap();

        assert!(config.collection.include.is_empty());
    }

    #[test]
    fn explicit_include_list_fills_omitted_yaml_include() {
        let config = merge(
            yaml(PROMETHEUS_YAML),
            &flat(&[], &[("INCLUDE_LIST", "node,Quota")]),
        )
        .unwrap();

        assert_eq!(config.collection.include, set(&["node", "quota"]));
    }

    #[test]
    fn yaml_clusters_kept_without_explicit_name() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}clusters:\n  - name: production\n"));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert_eq!(config.clusters.len(), 1);
        assert_eq!(config.clusters[0].name, "production");
    }

    #[test]
    fn explicit_cluster_name_is_appended() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}clusters:\n  - name: production\n"));

        let config = merge(doc, &flat(&["--cluster_name", "staging"], &[])).unwrap();

        let names: Vec<&str> = config.clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["production", "staging"]);
    }

    #[test]
    fn no_clusters_without_yaml_list_or_name() {
        let config = merge(yaml(PROMETHEUS_YAML), &flat(&[], &[])).unwrap();

        assert!(config.clusters.is_empty());
    }

    #[test]
    fn yaml_debug_kept() {
        let doc = yaml(&format!("{PROMETHEUS_YAML}debug: true\n"));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert!(config.debug);
    }

    #[test]
    fn yaml_bearer_token_beats_empty_default() {
        let doc = yaml("prometheus:\n  url:\n    scheme: https\n    host: prom\n  bearer_token: abc\n");

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert_eq!(config.prometheus.bearer_token, "abc");
        assert_eq!(config.prometheus.url.url(), Some("https://prom:9090"));
    }

    #[test]
    fn yaml_retry_policy_is_validated() {
        let doc = yaml(&format!(
            "{PROMETHEUS_YAML}  retry:\n    wait_min: 5s\n    wait_max: 1s\n    max_attempts: 2\n"
        ));

        let config = merge(doc, &flat(&[], &[])).unwrap();

        assert!(config.prometheus.retry.is_valid());
        assert_eq!(config.prometheus.retry.wait_max(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_yaml_retry_policy_names_its_location() {
        let doc = yaml(&format!(
            "{PROMETHEUS_YAML}forwarder:\n  densify:\n    retry:\n      wait_min: 1s\n      max_attempts: 0\n"
        ));

        let result = merge(doc, &flat(&[], &[]));

        assert!(matches!(
            result,
            Err(ConfigError::Retry {
                field: field::DENSIFY_RETRY,
                ..
            })
        ));
    }

    #[test]
    fn properties_file_conflicts_with_yaml() {
        let file = map(&[("host", "acme.example.com")]);

        let result = merge(yaml(PROMETHEUS_YAML), &flat_with_file(&[], &[], Some(&file)));

        assert!(matches!(result, Err(ConfigError::ConflictingConfigStyles)));
    }
}

mod lists {
    use super::*;

    #[test]
    fn split_list_trims_lowercases_and_drops_empty() {
        assert_eq!(split_list(" Node,,container , "), vec!["node", "container"]);
        assert!(split_list("").is_empty());
    }
}
