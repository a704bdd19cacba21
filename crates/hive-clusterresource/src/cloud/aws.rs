//! AWS strategy

use std::collections::BTreeMap;

use hive_common::crd::{aws, LocalObjectReference, MachinePoolPlatform, Platform, PlatformType};
use hive_common::Result;

use super::{require_credential, require_setting, CloudBuilder, CredentialMaterial};

/// Secret key holding the access key id
pub const ACCESS_KEY_ID_KEY: &str = "aws_access_key_id";
/// Secret key holding the secret access key
pub const SECRET_ACCESS_KEY_KEY: &str = "aws_secret_access_key";

const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_INSTANCE_TYPE: &str = "m5.xlarge";
const ROOT_VOLUME_SIZE_GIB: i32 = 120;
const ROOT_VOLUME_TYPE: &str = "gp3";

/// Builds AWS clusters from a static access key pair
#[derive(Clone, Debug, PartialEq)]
pub struct AwsCloudBuilder {
    /// AWS access key id
    pub access_key_id: String,
    /// AWS secret access key
    pub secret_access_key: String,
    /// Region to install into
    pub region: String,
    /// Tags applied to every created cloud resource
    pub user_tags: BTreeMap<String, String>,
    /// Availability zones for worker machines (empty lets the installer choose)
    pub zones: Vec<String>,
}

impl AwsCloudBuilder {
    /// Create a strategy for the default region
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            region: DEFAULT_REGION.to_string(),
            user_tags: BTreeMap::new(),
            zones: Vec::new(),
        }
    }

    /// Install into a specific region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Tag created cloud resources
    pub fn with_user_tags(mut self, tags: BTreeMap<String, String>) -> Self {
        self.user_tags = tags;
        self
    }
}

impl CloudBuilder for AwsCloudBuilder {
    fn platform_type(&self) -> PlatformType {
        PlatformType::Aws
    }

    fn validate(&self, cluster: &str) -> Result<()> {
        require_credential(cluster, "aws.accessKeyId", self.access_key_id.as_bytes())?;
        require_credential(
            cluster,
            "aws.secretAccessKey",
            self.secret_access_key.as_bytes(),
        )?;
        require_setting(cluster, "aws.region", &self.region)
    }

    fn credential_material(&self) -> Vec<CredentialMaterial> {
        vec![CredentialMaterial::for_platform(PlatformType::Aws)
            .with_entry(ACCESS_KEY_ID_KEY, self.access_key_id.as_bytes())
            .with_entry(SECRET_ACCESS_KEY_KEY, self.secret_access_key.as_bytes())]
    }

    fn populate_platform(&self, platform: &mut Platform, credentials_secret: &str) {
        platform.aws = Some(aws::Platform {
            credentials_secret_ref: LocalObjectReference::new(credentials_secret),
            region: self.region.clone(),
            user_tags: self.user_tags.clone(),
        });
    }

    fn machine_pool_platform(&self, instance_type: &str) -> MachinePoolPlatform {
        MachinePoolPlatform {
            aws: Some(aws::MachinePoolPlatform {
                instance_type: instance_type.to_string(),
                root_volume: aws::Ec2RootVolume {
                    iops: 0,
                    size: ROOT_VOLUME_SIZE_GIB,
                    type_: ROOT_VOLUME_TYPE.to_string(),
                },
                zones: self.zones.clone(),
            }),
            ..Default::default()
        }
    }

    fn default_instance_type(&self) -> String {
        DEFAULT_INSTANCE_TYPE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy() -> AwsCloudBuilder {
        AwsCloudBuilder::new("fakeaccesskeyid", "fakesecretAccessKey")
    }

    #[test]
    fn validates_required_aws_fields() {
        assert!(strategy().validate("c1").is_ok());

        let err = AwsCloudBuilder::new("", "secret").validate("c1").unwrap_err();
        assert_eq!(err.field(), Some("aws.accessKeyId"));

        let err = AwsCloudBuilder::new("id", "").validate("c1").unwrap_err();
        assert_eq!(err.field(), Some("aws.secretAccessKey"));

        let err = strategy().with_region("").validate("c1").unwrap_err();
        assert_eq!(err.field(), Some("aws.region"));
    }

    #[test]
    fn credentials_hold_both_keys() {
        let material = strategy().credential_material();
        assert_eq!(material.len(), 1);
        assert_eq!(material[0].suffix, "aws-creds");
        assert_eq!(material[0].data[ACCESS_KEY_ID_KEY], b"fakeaccesskeyid");
        assert_eq!(material[0].data[SECRET_ACCESS_KEY_KEY], b"fakesecretAccessKey");
    }

    #[test]
    fn populates_only_the_aws_block() {
        let mut platform = Platform::default();
        let tags = BTreeMap::from([("team".to_string(), "infra".to_string())]);
        strategy()
            .with_region("us-west-2")
            .with_user_tags(tags.clone())
            .populate_platform(&mut platform, "c1-aws-creds");

        assert_eq!(platform.configured(), vec![PlatformType::Aws]);
        let aws = platform.aws.unwrap();
        assert_eq!(aws.region, "us-west-2");
        assert_eq!(aws.credentials_secret_ref.name, "c1-aws-creds");
        assert_eq!(aws.user_tags, tags);
    }

    #[test]
    fn configures_root_volumes() {
        let platform = strategy().machine_pool_platform("m5.2xlarge");
        let aws = platform.aws.unwrap();
        assert_eq!(aws.instance_type, "m5.2xlarge");
        assert_eq!(aws.root_volume.size, 120);
        assert_eq!(aws.root_volume.type_, "gp3");
        assert!(platform.azure.is_none());
    }
}
