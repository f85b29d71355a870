//! Environment variables that hand ZooKeeper digest ACLs to Solr
//!
//! Credentials are never copied into the pod spec: each username and
//! password is a required `secretKeyRef`, and the JVM options reference them
//! through `$(VAR)` substitution.

use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, SecretKeySelector};

use ensemble_common::crd::ZookeeperAcl;

/// Name of the variable carrying the JVM ACL options
pub const CREDS_AND_ACLS_ENV: &str = "SOLR_ZK_CREDS_AND_ACLS";

const ACL_PROVIDERS: &str = "-DzkACLProvider=org.apache.solr.common.cloud.VMParamsAllAndReadonlyDigestZkACLProvider \
-DzkCredentialsProvider=org.apache.solr.common.cloud.VMParamsSingleSetCredentialsDigestZkCredentialsProvider";

/// Build the ACL environment for the given descriptors.
///
/// Returns whether any ACL was configured, and the variables in order: the
/// full-access pair, the read-only pair, then [`CREDS_AND_ACLS_ENV`].
pub fn acl_env_vars(
    all: Option<&ZookeeperAcl>,
    read_only: Option<&ZookeeperAcl>,
) -> (bool, Vec<EnvVar>) {
    if all.is_none() && read_only.is_none() {
        return (false, Vec::new());
    }

    let mut env = Vec::with_capacity(5);
    let mut digests: Vec<&str> = Vec::with_capacity(4);

    if let Some(acl) = all {
        env.push(secret_env("ZK_ALL_ACL_USERNAME", &acl.secret_ref, &acl.username_key));
        env.push(secret_env("ZK_ALL_ACL_PASSWORD", &acl.secret_ref, &acl.password_key));
        digests.push("-DzkDigestUsername=$(ZK_ALL_ACL_USERNAME)");
        digests.push("-DzkDigestPassword=$(ZK_ALL_ACL_PASSWORD)");
    }
    if let Some(acl) = read_only {
        env.push(secret_env("ZK_READ_ACL_USERNAME", &acl.secret_ref, &acl.username_key));
        env.push(secret_env("ZK_READ_ACL_PASSWORD", &acl.secret_ref, &acl.password_key));
        digests.push("-DzkDigestReadonlyUsername=$(ZK_READ_ACL_USERNAME)");
        digests.push("-DzkDigestReadonlyPassword=$(ZK_READ_ACL_PASSWORD)");
    }

    env.push(EnvVar {
        name: CREDS_AND_ACLS_ENV.to_string(),
        value: Some(format!("{} {}", ACL_PROVIDERS, digests.join(" "))),
        value_from: None,
    });
    (true, env)
}

fn secret_env(name: &str, secret: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.to_string(),
                key: key.to_string(),
                optional: Some(false),
            }),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn acl(secret: &str) -> ZookeeperAcl {
        ZookeeperAcl {
            secret_ref: secret.to_string(),
            username_key: "u".to_string(),
            password_key: "p".to_string(),
        }
    }

    fn names(env: &[EnvVar]) -> Vec<&str> {
        env.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn no_acls_means_no_env() {
        let (has_acls, env) = acl_env_vars(None, None);
        assert!(!has_acls);
        assert!(env.is_empty());
    }

    #[test]
    fn full_access_acl_emits_three_bindings() {
        let all = acl("s1");
        let (has_acls, env) = acl_env_vars(Some(&all), None);
        assert!(has_acls);
        assert_eq!(
            names(&env),
            vec!["ZK_ALL_ACL_USERNAME", "ZK_ALL_ACL_PASSWORD", CREDS_AND_ACLS_ENV]
        );

        let selector = env[0]
            .value_from
            .as_ref()
            .and_then(|v| v.secret_key_ref.as_ref())
            .unwrap();
        assert_eq!(selector.name, "s1");
        assert_eq!(selector.key, "u");
        assert_eq!(selector.optional, Some(false));
        let password = env[1]
            .value_from
            .as_ref()
            .and_then(|v| v.secret_key_ref.as_ref())
            .unwrap();
        assert_eq!(password.key, "p");

        let opts = env[2].value.as_deref().unwrap();
        assert!(opts.contains("-DzkDigestUsername=$(ZK_ALL_ACL_USERNAME)"));
        assert!(opts.contains("-DzkDigestPassword=$(ZK_ALL_ACL_PASSWORD)"));
        assert!(!opts.contains("-DzkDigestReadonly"));
    }

    #[test]
    fn both_acls_emit_five_bindings_in_order() {
        let (all, read) = (acl("s1"), acl("s2"));
        let (has_acls, env) = acl_env_vars(Some(&all), Some(&read));
        assert!(has_acls);
        assert_eq!(
            names(&env),
            vec![
                "ZK_ALL_ACL_USERNAME",
                "ZK_ALL_ACL_PASSWORD",
                "ZK_READ_ACL_USERNAME",
                "ZK_READ_ACL_PASSWORD",
                CREDS_AND_ACLS_ENV
            ]
        );
        let opts = env[4].value.as_deref().unwrap();
        assert!(opts.starts_with(
            "-DzkACLProvider=org.apache.solr.common.cloud.VMParamsAllAndReadonlyDigestZkACLProvider \
             -DzkCredentialsProvider="
        ));
        assert!(opts.ends_with(
            "-DzkDigestReadonlyUsername=$(ZK_READ_ACL_USERNAME) \
             -DzkDigestReadonlyPassword=$(ZK_READ_ACL_PASSWORD)"
        ));
    }

    #[test]
    fn read_only_acl_alone() {
        let read = acl("s2");
        let (has_acls, env) = acl_env_vars(None, Some(&read));
        assert!(has_acls);
        assert_eq!(env.len(), 3);
        let opts = env[2].value.as_deref().unwrap();
        assert!(!opts.contains("-DzkDigestUsername="));
        assert!(opts.contains("-DzkDigestReadonlyPassword=$(ZK_READ_ACL_PASSWORD)"));
    }
}
