//! Merges a structured document with resolved flat parameters.
//!
//! A flat value lands in the document when it was supplied explicitly, or
//! when the document left that slot out. Values present in the YAML file
//! therefore beat defaults but lose to flags, environment variables, and
//! properties entries.

use tracing::debug;

use super::ConfigError;
use super::registry::key;
use super::resolver::{ResolvedParameters, Setting};
use super::validated::ValidatedConfig;
use super::yaml::{ClusterFilter, EndpointSection, IncludeSpec, YamlConfig};

/// Flat keys feeding one endpoint section.
struct EndpointKeys {
    scheme: &'static str,
    host: &'static str,
    port: &'static str,
    user: &'static str,
    password: &'static str,
    encrypted_password: Option<&'static str>,
}

const DENSIFY_KEYS: EndpointKeys = EndpointKeys {
    scheme: key::DENSIFY_SCHEME,
    host: key::DENSIFY_HOST,
    port: key::DENSIFY_PORT,
    user: key::DENSIFY_USER,
    password: key::DENSIFY_PASSWORD,
    encrypted_password: Some(key::DENSIFY_ENC_PASSWORD),
};

const PROXY_KEYS: EndpointKeys = EndpointKeys {
    scheme: key::PROXY_SCHEME,
    host: key::PROXY_HOST,
    port: key::PROXY_PORT,
    user: key::PROXY_USER,
    password: key::PROXY_PASSWORD,
    encrypted_password: Some(key::PROXY_ENC_PASSWORD),
};

const PROMETHEUS_KEYS: EndpointKeys = EndpointKeys {
    scheme: key::PROMETHEUS_SCHEME,
    host: key::PROMETHEUS_HOST,
    port: key::PROMETHEUS_PORT,
    user: key::PROMETHEUS_USER,
    password: key::PROMETHEUS_PASSWORD,
    encrypted_password: None,
};

/// Builds the validated snapshot from an optional YAML document and the
/// resolved flat parameters.
///
/// # Errors
///
/// Returns [`ConfigError::ConflictingConfigStyles`] if a YAML document is
/// present and a properties file also contributed, or any finalization error.
pub fn merge(
    hierarchy: Option<YamlConfig>,
    flat: &ResolvedParameters,
) -> Result<ValidatedConfig, ConfigError> {
    let structured = hierarchy.is_some();
    if structured && flat.from_file() {
        return Err(ConfigError::ConflictingConfigStyles);
    }

    let mut doc = hierarchy.unwrap_or_default();
    overlay_forwarder(&mut doc, flat);
    overlay_prometheus(&mut doc, flat);
    overlay_collection(&mut doc, flat, structured);
    overlay_clusters(&mut doc, flat, structured);
    overlay(&mut doc.debug, flat.boolean(key::DEBUG));

    debug!(structured, "Merged configuration sources");
    ValidatedConfig::from_document(doc)
}

/// Replaces `slot` if the setting is explicit or the slot is empty.
fn overlay<T>(slot: &mut Option<T>, setting: Option<Setting<T>>) {
    if let Some(setting) = setting {
        if setting.explicit || slot.is_none() {
            *slot = Some(setting.value);
        }
    }
}

fn overlay_endpoint(section: &mut EndpointSection, flat: &ResolvedParameters, keys: &EndpointKeys) {
    overlay(&mut section.scheme, flat.string(keys.scheme));
    overlay(&mut section.host, flat.string(keys.host));
    overlay(&mut section.port, flat.uint(keys.port));
    overlay(&mut section.username, flat.string(keys.user));
    overlay(&mut section.password, flat.string(keys.password));
    if let Some(key) = keys.encrypted_password {
        overlay(&mut section.encrypted_password, flat.string(key));
    }
}

fn overlay_forwarder(doc: &mut YamlConfig, flat: &ResolvedParameters) {
    let forwarder = &mut doc.forwarder;
    overlay_endpoint(&mut forwarder.densify.url, flat, &DENSIFY_KEYS);
    overlay(&mut forwarder.densify.endpoint, flat.string(key::DENSIFY_ENDPOINT));

    overlay_endpoint(&mut forwarder.proxy.url, flat, &PROXY_KEYS);
    overlay(&mut forwarder.proxy.auth, flat.string(key::PROXY_AUTH));
    overlay(&mut forwarder.proxy.server, flat.string(key::PROXY_SERVER));
    overlay(&mut forwarder.proxy.domain, flat.string(key::PROXY_DOMAIN));

    overlay(&mut forwarder.prefix, flat.string(key::FILE_PREFIX));
}

fn overlay_prometheus(doc: &mut YamlConfig, flat: &ResolvedParameters) {
    let prometheus = &mut doc.prometheus;
    overlay_endpoint(&mut prometheus.url, flat, &PROMETHEUS_KEYS);
    overlay(&mut prometheus.bearer_token, flat.string(key::PROMETHEUS_TOKEN));
    overlay(&mut prometheus.ca_cert, flat.string(key::CA_CERT));
}

/// Alongside a YAML file the include list only replaces the YAML one when
/// given explicitly; an omitted YAML include stays empty.
fn overlay_collection(doc: &mut YamlConfig, flat: &ResolvedParameters, structured: bool) {
    let collection = &mut doc.collection;
    if let Some(setting) = flat.string(key::INCLUDE) {
        if setting.explicit || !structured {
            collection.include = Some(IncludeSpec::List(split_list(&setting.value)));
        }
    }

    overlay(&mut collection.interval, flat.string(key::INTERVAL));
    overlay(&mut collection.interval_size, flat.uint(key::INTERVAL_SIZE));
    overlay(&mut collection.history, flat.uint(key::HISTORY));
    overlay(&mut collection.offset, flat.uint(key::OFFSET));
    overlay(&mut collection.sample_rate, flat.uint(key::SAMPLE_RATE));
    overlay(&mut collection.node_group_list, flat.string(key::NODE_GROUP_LIST));
}

/// Flat sources describe a single cluster. Alongside a YAML file they only
/// add one when the cluster name was given explicitly.
fn overlay_clusters(doc: &mut YamlConfig, flat: &ResolvedParameters, structured: bool) {
    let name = flat.string(key::CLUSTER_NAME);

    if structured {
        if let Some(Setting {
            value,
            explicit: true,
        }) = name
        {
            doc.clusters.get_or_insert_with(Vec::new).push(cluster(value));
        }
        return;
    }

    let name = name
        .map(|setting| setting.value)
        .filter(|name| !name.is_empty())
        .or_else(|| flat.string(key::PROMETHEUS_HOST).map(|setting| setting.value))
        .unwrap_or_default();
    doc.clusters = Some(vec![cluster(name)]);
}

fn cluster(name: String) -> ClusterFilter {
    ClusterFilter {
        name,
        ..ClusterFilter::default()
    }
}

/// Splits a comma-separated list into trimmed, lower-case, non-empty items.
pub(super) fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|item| item.trim().to_lowercase())
        .filter(|item| !item.is_empty())
        .collect()
}
