//! # AWS Partitions
//!
//! Maps a region to the partition it belongs to. Partitions without CloudFront
//! serve the IRSA documents straight from S3, which changes the issuer URL.

/// How the issuer documents are reachable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Addressing {
    /// Served by CloudFront under the cluster domain
    Cdn,
    /// Served by the regional S3 endpoint under the bucket name
    ObjectStorage,
}

/// An AWS partition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub id: &'static str,
    /// DNS suffix of regional service endpoints
    pub dns_suffix: &'static str,
    /// Whether CloudFront can front the issuer in this partition
    pub cdn_available: bool,
}

impl Partition {
    /// Addressing scheme the issuer documents must use in this partition
    pub fn addressing(&self) -> Addressing {
        if self.cdn_available {
            Addressing::Cdn
        } else {
            Addressing::ObjectStorage
        }
    }

    /// Regional S3 endpoint host, e.g. `s3.cn-north-1.amazonaws.com.cn`
    pub fn s3_host(&self, region: &str) -> String {
        format!("s3.{region}.{}", self.dns_suffix)
    }
}

const AWS: Partition = Partition {
    id: "aws",
    dns_suffix: "amazonaws.com",
    cdn_available: true,
};

const AWS_CN: Partition = Partition {
    id: "aws-cn",
    dns_suffix: "amazonaws.com.cn",
    cdn_available: false,
};

const AWS_US_GOV: Partition = Partition {
    id: "aws-us-gov",
    dns_suffix: "amazonaws.com",
    cdn_available: true,
};

const AWS_ISO: Partition = Partition {
    id: "aws-iso",
    dns_suffix: "c2s.ic.gov",
    cdn_available: false,
};

const AWS_ISO_B: Partition = Partition {
    id: "aws-iso-b",
    dns_suffix: "sc2s.sgov.gov",
    cdn_available: false,
};

/// Region prefixes of every partition other than the standard one
const REGION_PREFIXES: &[(&str, Partition)] = &[
    ("cn-", AWS_CN),
    ("us-gov-", AWS_US_GOV),
    ("us-isob-", AWS_ISO_B),
    ("us-iso-", AWS_ISO),
];

/// Partition a region belongs to; unknown prefixes fall into the standard partition
pub fn partition_for_region(region: &str) -> Partition {
    REGION_PREFIXES
        .iter()
        .find(|(prefix, _)| region.starts_with(prefix))
        .map_or(AWS, |(_, partition)| *partition)
}
