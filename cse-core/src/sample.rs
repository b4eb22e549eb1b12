//! Sample configuration printed by `cse sample`.

/// Top-level sections present in the sample document, in order.
pub const SAMPLE_SECTIONS: [&str; 5] = ["amqp", "vcd", "vcs", "service", "broker"];

const SAMPLE_CONFIG: &str = "\
amqp:
    host: amqp.vmware.com
    port: 5672
    user: 'guest'
    password: 'guest'
    exchange: vcdext
    routing_key: cse

vcd:
    host: vcd.vmware.com
    port: 443
    username: 'administrator'
    password: 'my_secret_password'
    api_version: '6.0'
    verify: false
    log: true

vcs:
    host: vcenter.vmware.com
    port: 443
    username: 'administrator@vsphere.local'
    password: 'my_secret_password'
    verify: false

service:
    listeners: 2
    logging_level: 5
    logging_format: '%(levelname) -8s %(asctime)s %(name) -40s %(funcName) -35s %(lineno) -5d: %(message)s'
    key_filename: 'id_rsa_cse'
    key_filename_pub: 'id_rsa_cse.pub'

broker:
    type: default
    catalog: cse-catalog
    master_template: k8s-template.ova
    node_template: k8s-template.ova
    password: 'template-root-user-password'
";

/// Returns the sample configuration document.
#[must_use]
pub fn sample_config() -> &'static str {
    SAMPLE_CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;

    fn sample_value() -> serde_yaml::Value {
        match serde_yaml::from_str(sample_config()) {
            Ok(v) => v,
            Err(e) => panic!("sample must be valid YAML: {e}"),
        }
    }

    #[test]
    fn sample_has_exactly_the_documented_sections() {
        let value = sample_value();
        let Some(mapping) = value.as_mapping() else {
            panic!("sample root must be a mapping");
        };
        let keys: Vec<&str> = mapping.keys().filter_map(serde_yaml::Value::as_str).collect();
        assert_eq!(keys, SAMPLE_SECTIONS);
    }

    #[test]
    fn sample_carries_documented_defaults() {
        let value = sample_value();
        assert_eq!(value["amqp"]["port"].as_u64(), Some(5672));
        assert_eq!(value["vcd"]["port"].as_u64(), Some(443));
        assert_eq!(value["vcd"]["api_version"].as_str(), Some("6.0"));
        assert_eq!(value["vcd"]["verify"].as_bool(), Some(false));
        assert_eq!(value["service"]["listeners"].as_u64(), Some(2));
        assert_eq!(value["broker"]["catalog"].as_str(), Some("cse-catalog"));
    }

    #[test]
    fn sample_loads_as_a_valid_config() {
        let config = match Config::from_yaml_str(sample_config()) {
            Ok(c) => c,
            Err(e) => panic!("sample must load: {e}"),
        };
        assert_eq!(config.amqp.host, "amqp.vmware.com");
        assert_eq!(config.vcs.username, "administrator@vsphere.local");
        assert!(!config.vcs.verify);
        assert!(config.broker.is_some(), "sample defines a broker section");
    }
}
