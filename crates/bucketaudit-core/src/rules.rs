//! Per-control classification rules.
//!
//! Each rule turns one probe result into a [`Verdict`]. Rules are pure: the
//! only cross-control input is the bucket's [`Exposure`], decided by the
//! public access block and passed explicitly to the policy and CORS rules.

use bucketaudit_model::{ControlId, ControlStatus, Exposure};

use crate::policy::Statement;
use crate::probe::{
    BucketPolicy, CorsRule, DefaultEncryption, LoggingTarget, PresignOutcome, Probed,
    PublicAccessBlock, VersioningState,
};

/// Classification of one control before weighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// The control classified.
    pub control: ControlId,
    /// PASS, WARN or FAIL.
    pub status: ControlStatus,
    /// What was observed.
    pub details: String,
    /// Whether a non-passing status takes the control's weight off the score.
    pub deducts: bool,
}

impl Verdict {
    fn new(control: ControlId, status: ControlStatus, details: impl Into<String>) -> Self {
        Self {
            control,
            status,
            details: details.into(),
            deducts: !status.is_pass(),
        }
    }

    fn pass(control: ControlId, details: impl Into<String>) -> Self {
        Self::new(control, ControlStatus::Pass, details)
    }

    fn warn(control: ControlId, details: impl Into<String>) -> Self {
        Self::new(control, ControlStatus::Warn, details)
    }

    fn fail(control: ControlId, details: impl Into<String>) -> Self {
        Self::new(control, ControlStatus::Fail, details)
    }

    /// Keep the status but never deduct.
    fn informational(mut self) -> Self {
        self.deducts = false;
        self
    }

    /// Points this verdict takes off given the control's weight.
    #[must_use]
    pub fn deduction(&self, weight: u32) -> u32 {
        if self.deducts { weight } else { 0 }
    }

    /// Suggested fix for the control.
    #[must_use]
    pub fn remediation(&self) -> &'static str {
        remediation(self.control)
    }
}

/// Suggested fix for a control that did not pass.
#[must_use]
pub fn remediation(control: ControlId) -> &'static str {
    match control {
        ControlId::PublicAccessBlock => {
            "Enable all four Block Public Access settings on the bucket (BlockPublicAcls, IgnorePublicAcls, BlockPublicPolicy, RestrictPublicBuckets)."
        }
        ControlId::BucketPolicy => {
            "Replace 'Principal: *' allow statements with the specific accounts or roles that need access."
        }
        ControlId::Cors => "Restrict AllowedOrigins to the exact domains that call the bucket.",
        ControlId::Encryption => {
            "Set default encryption to SSE-KMS (aws:kms) with a customer managed key."
        }
        ControlId::Versioning => {
            "Enable versioning so overwritten or deleted objects can be recovered."
        }
        ControlId::SecureTransport => {
            "Add a Deny statement for all principals conditioned on aws:SecureTransport = false."
        }
        ControlId::AccessLogging => {
            "Enable server access logging to a dedicated log bucket."
        }
        ControlId::PresignedUrl => {
            "Limit s3:GetObject to roles that need it and prefer short presigned URL lifetimes."
        }
    }
}

/// Exposure implied by the public access block: anything short of all four
/// guards on, including an unreadable configuration, counts as public.
#[must_use]
pub fn exposure(pab: &Probed<PublicAccessBlock>) -> Exposure {
    match pab {
        Probed::Found(config) if config.all_enabled() => Exposure::Private,
        _ => Exposure::Public,
    }
}

/// Public access block.
#[must_use]
pub fn public_access_block(pab: &Probed<PublicAccessBlock>) -> Verdict {
    let control = ControlId::PublicAccessBlock;
    match pab {
        Probed::Found(config) if config.all_enabled() => {
            Verdict::pass(control, "All four public access guards are enabled.")
        }
        Probed::Found(config) => Verdict::fail(
            control,
            format!(
                "Guardrails disabled: {}.",
                config.disabled_guards().join(", ")
            ),
        ),
        Probed::Absent => Verdict::fail(control, "No public access block configuration found."),
        Probed::Denied => Verdict::fail(
            control,
            "Public access block could not be read (access denied); treating bucket as exposed.",
        ),
    }
}

/// Permission scope: wildcard allow statements in the bucket policy.
#[must_use]
pub fn bucket_policy(policy: &Probed<BucketPolicy>, exposure: Exposure) -> Verdict {
    let control = ControlId::BucketPolicy;
    let policy = match policy {
        Probed::Found(policy) => policy,
        Probed::Absent => return Verdict::pass(control, "No bucket policy attached."),
        Probed::Denied => {
            return Verdict::warn(
                control,
                "Bucket policy could not be read (access denied); permission scope unverified.",
            )
            .informational();
        }
    };

    let document = match policy.document() {
        Ok(document) => document,
        Err(e) => {
            return Verdict::warn(control, format!("Bucket policy could not be parsed: {e}."))
                .informational();
        }
    };

    let wildcards: Vec<&str> = document.wildcard_allows().map(Statement::label).collect();
    if wildcards.is_empty() {
        return Verdict::pass(control, "No statement allows Principal '*'.");
    }

    let statements = wildcards.join(", ");
    if exposure.is_public() {
        Verdict::fail(
            control,
            format!("Global wildcard: statements [{statements}] allow Principal '*'."),
        )
    } else {
        Verdict::warn(
            control,
            format!(
                "Mitigated: statements [{statements}] allow Principal '*', but public access is blocked."
            ),
        )
        .informational()
    }
}

/// CORS: wildcard origins.
#[must_use]
pub fn cors(rules: &Probed<Vec<CorsRule>>, exposure: Exposure) -> Verdict {
    let control = ControlId::Cors;
    let rules = match rules {
        Probed::Found(rules) if !rules.is_empty() => rules,
        Probed::Found(_) | Probed::Absent => {
            return Verdict::pass(control, "No CORS rules configured.");
        }
        Probed::Denied => {
            return Verdict::warn(
                control,
                "CORS configuration could not be read (access denied).",
            )
            .informational();
        }
    };

    if !rules.iter().any(CorsRule::allows_any_origin) {
        return Verdict::pass(
            control,
            format!("{} CORS rule(s), all with explicit origins.", rules.len()),
        );
    }

    if exposure.is_public() {
        Verdict::fail(control, "Insecure wildcard: CORS allows any origin ('*').")
    } else {
        Verdict::warn(
            control,
            "Mitigated: CORS allows any origin ('*'), but public access is blocked.",
        )
        .informational()
    }
}

/// Default encryption.
#[must_use]
pub fn encryption(encryption: &Probed<DefaultEncryption>) -> Verdict {
    let control = ControlId::Encryption;
    match encryption {
        Probed::Found(sse) if sse.is_kms() => {
            let key = sse.kms_master_key_id.as_deref().unwrap_or("AWS managed key");
            Verdict::pass(
                control,
                format!("Encrypted with {} ({key}).", sse.sse_algorithm),
            )
        }
        Probed::Found(sse) => Verdict::warn(
            control,
            format!(
                "Encrypted with {}; SSE-KMS is recommended for key control and audit.",
                sse.sse_algorithm
            ),
        ),
        Probed::Absent => Verdict::fail(control, "No default encryption configured."),
        Probed::Denied => Verdict::fail(
            control,
            "Encryption configuration could not be read (access denied).",
        ),
    }
}

/// Versioning.
#[must_use]
pub fn versioning(versioning: &Probed<VersioningState>) -> Verdict {
    let control = ControlId::Versioning;
    match versioning {
        Probed::Found(VersioningState::Enabled) => Verdict::pass(control, "Versioning enabled."),
        Probed::Found(VersioningState::Suspended) => {
            Verdict::fail(control, "Versioning suspended.")
        }
        Probed::Absent => Verdict::fail(control, "Versioning never enabled."),
        Probed::Denied => Verdict::fail(
            control,
            "Versioning configuration could not be read (access denied).",
        ),
    }
}

/// Secure transport: a deny statement for `aws:SecureTransport = false`.
///
/// `missing_status` is used whenever enforcement cannot be shown.
#[must_use]
pub fn secure_transport(policy: &Probed<BucketPolicy>, missing_status: ControlStatus) -> Verdict {
    let control = ControlId::SecureTransport;
    let details = match policy {
        Probed::Found(policy) => match policy.document() {
            Ok(document) if document.enforces_secure_transport() => {
                return Verdict::pass(
                    control,
                    "Policy denies requests where aws:SecureTransport is false.",
                );
            }
            Ok(_) => "Not enforced: no statement denies insecure transport.",
            Err(_) => "Not verified: bucket policy could not be parsed.",
        },
        Probed::Absent => "Not enforced: no bucket policy attached.",
        Probed::Denied => "Not verified: bucket policy could not be read (access denied).",
    };
    Verdict::new(control, missing_status, details)
}

/// Access logging.
#[must_use]
pub fn access_logging(logging: &Probed<LoggingTarget>) -> Verdict {
    let control = ControlId::AccessLogging;
    match logging {
        Probed::Found(target) => Verdict::pass(
            control,
            format!("Logging to s3://{}/{}", target.target_bucket, target.target_prefix),
        ),
        Probed::Absent => Verdict::warn(control, "Server access logging disabled."),
        Probed::Denied => Verdict::warn(
            control,
            "Logging configuration could not be read (access denied).",
        ),
    }
}

/// Presigned URL capability. Never deducts.
#[must_use]
pub fn presigned_url(outcome: &PresignOutcome) -> Verdict {
    let control = ControlId::PresignedUrl;
    match outcome {
        PresignOutcome::Generated => Verdict::warn(
            control,
            "Simulation Success: a 7-day presigned URL can be generated. Anyone holding such a link can read the object until it expires.",
        )
        .informational(),
        PresignOutcome::Blocked { reason } => Verdict::pass(
            control,
            format!("Presigned URL generation blocked: {reason}"),
        ),
    }
}
