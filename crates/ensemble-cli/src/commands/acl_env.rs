//! Print the Solr container environment for a SolrCloud's ZooKeeper ACLs

use std::path::PathBuf;

use clap::Args;
use kube::ResourceExt;
use tracing::info;

use ensemble_common::crd::SolrCloud;
use ensemble_zookeeper::acl::acl_env_vars;

use super::read_manifest;
use crate::Result;

#[derive(Args, Debug)]
pub struct AclEnvArgs {
    /// SolrCloud manifest
    pub solrcloud: PathBuf,
}

/// The ACL variables as a YAML list, `None` when the cloud sets no ACLs
pub fn acl_env(solr: &SolrCloud) -> Result<Option<String>> {
    let (all, read_only) = solr.zookeeper_acls();
    let (configured, env) = acl_env_vars(all, read_only);
    if !configured {
        return Ok(None);
    }
    Ok(Some(serde_yaml::to_string(&env)?))
}

pub fn run(args: AclEnvArgs) -> Result<()> {
    let solr: SolrCloud = read_manifest(&args.solrcloud)?;
    match acl_env(&solr)? {
        Some(env) => print!("{env}"),
        None => info!(solrcloud = %solr.name_any(), "no ZooKeeper ACLs configured"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::SOLR_YAML;
    use k8s_openapi::api::core::v1::EnvVar;

    const ACL_YAML: &str = r#"
apiVersion: solr.apache.org/v1beta1
kind: SolrCloud
metadata:
  name: example
  namespace: search
spec:
  zookeeperRef:
    connectionInfo:
      internalConnectionString: zk-0.zk:2181
      acl:
        secret: zk-acl
        usernameKey: user
        passwordKey: pass
"#;

    /// Story: a cloud with full-access credentials gets the secret-backed
    /// variables and the JVM options that reference them
    #[test]
    fn story_full_access_acl_renders_secret_refs() {
        let solr: SolrCloud = serde_yaml::from_str(ACL_YAML).unwrap();
        let out = acl_env(&solr).unwrap().expect("acl configured");
        let env: Vec<EnvVar> = serde_yaml::from_str(&out).unwrap();

        let names: Vec<&str> = env.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["ZK_ALL_ACL_USERNAME", "ZK_ALL_ACL_PASSWORD", "SOLR_ZK_CREDS_AND_ACLS"]
        );
        let user = env[0]
            .value_from
            .as_ref()
            .and_then(|s| s.secret_key_ref.as_ref())
            .unwrap();
        assert_eq!((user.name.as_str(), user.key.as_str()), ("zk-acl", "user"));
        assert!(!out.contains("-DzkDigestReadonly"));
    }

    #[test]
    fn cloud_without_acls_prints_nothing() {
        let solr: SolrCloud = serde_yaml::from_str(SOLR_YAML).unwrap();
        assert!(acl_env(&solr).unwrap().is_none());
    }
}
