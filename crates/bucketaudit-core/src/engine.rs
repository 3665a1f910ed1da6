//! Weighted scoring.
//!
//! [`evaluate`] runs the rules in their fixed order and [`assess`] folds the
//! resulting verdicts into an [`AuditReport`]. The accumulator is an explicit
//! [`Tally`] value threaded through the fold; each control is recorded once,
//! so it can deduct its weight at most once.

use bucketaudit_model::{
    AuditReport, ControlResult, ControlStatus, DetailLevel, Exposure, Grade,
};

use crate::probe::ProbeSet;
use crate::rules::{self, Verdict};
use crate::weights::Weights;

/// Score of a bucket with no findings.
pub const MAX_SCORE: u32 = 100;

/// Note attached to detailed reports that lost points.
pub const REMEDIATION_NOTE: &str = "Please review failed controls in AWS Console.";

/// The knobs that change how verdicts become a score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringPolicy {
    /// Deduction per control.
    pub weights: Weights,
    /// Status given to a bucket whose policy does not deny insecure transport.
    pub secure_transport_status: ControlStatus,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            secure_transport_status: ControlStatus::Warn,
        }
    }
}

/// Classify every control for one bucket, in evaluation order.
///
/// The public access block runs first; its exposure feeds the policy and
/// CORS rules.
#[must_use]
pub fn evaluate(probes: &ProbeSet, policy: &ScoringPolicy) -> (Exposure, Vec<Verdict>) {
    let exposure = rules::exposure(&probes.public_access_block);
    let verdicts = vec![
        rules::public_access_block(&probes.public_access_block),
        rules::bucket_policy(&probes.policy, exposure),
        rules::cors(&probes.cors, exposure),
        rules::encryption(&probes.encryption),
        rules::versioning(&probes.versioning),
        rules::secure_transport(&probes.policy, policy.secure_transport_status),
        rules::access_logging(&probes.logging),
        rules::presigned_url(&probes.presign),
    ];
    (exposure, verdicts)
}

/// Running total while folding verdicts.
#[derive(Debug, Default)]
struct Tally {
    deducted: u32,
    findings: Vec<ControlResult>,
}

impl Tally {
    fn record(mut self, verdict: Verdict, weights: &Weights, detail: DetailLevel) -> Self {
        let deduction = verdict.deduction(weights.get(verdict.control));
        let remediation = (detail == DetailLevel::Detailed && !verdict.status.is_pass())
            .then(|| verdict.remediation().to_owned());

        self.deducted = self.deducted.saturating_add(deduction);
        self.findings.push(ControlResult {
            control: verdict.control,
            title: verdict.control.title(),
            description: verdict.control.description(),
            status: verdict.status,
            details: verdict.details,
            deduction,
            remediation,
        });
        self
    }

    fn score(&self) -> u32 {
        MAX_SCORE.saturating_sub(self.deducted)
    }
}

/// Score one bucket and build its report.
#[must_use]
pub fn assess(
    bucket: &str,
    probes: &ProbeSet,
    policy: &ScoringPolicy,
    detail: DetailLevel,
) -> AuditReport {
    let (exposure, verdicts) = evaluate(probes, policy);
    let tally = verdicts
        .into_iter()
        .fold(Tally::default(), |tally, verdict| {
            tally.record(verdict, &policy.weights, detail)
        });

    let score = tally.score();
    let grade = Grade::from_score(score);
    let remediation_note = (detail == DetailLevel::Detailed && score < MAX_SCORE)
        .then(|| REMEDIATION_NOTE.to_owned());

    AuditReport {
        bucket_name: bucket.to_owned(),
        security_score: score,
        risk_grade: grade,
        risk_level: grade.risk_level(),
        access_type: exposure,
        tests: tally.findings,
        remediation_note,
    }
}
