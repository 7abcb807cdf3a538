// consensus/src/aggregate.rs

use trust_core::{ConsensusResult, ValidatorVerdict, VerdictStatus};

/// Guard against division by a zero confidence mass
const EPSILON: f64 = 1e-9;

/// Bonus for unanimous honest agreement; small enough that it cannot
/// swing a verdict on its own
const UNANIMITY_BONUS: f64 = 0.1;

/// Confidence-weighted aggregation of validator verdicts.
///
/// Timed-out verdicts count toward the validator total only when
/// `count_timeouts` is set; error verdicts always count (the validator
/// participated and failed). Only `Ok` verdicts contribute weight.
pub fn aggregate(
    verdicts: &[ValidatorVerdict],
    min_validators: u32,
    count_timeouts: bool,
) -> ConsensusResult {
    let successful: Vec<&ValidatorVerdict> =
        verdicts.iter().filter(|v| v.status.is_ok()).collect();

    let n_validators = verdicts
        .iter()
        .filter(|v| count_timeouts || v.status != VerdictStatus::Timeout)
        .count() as u32;
    let n_successful = successful.len() as u32;

    let quorum_met =
        n_successful >= min_validators && n_successful >= n_validators.div_ceil(2);
    if !quorum_met {
        return ConsensusResult::no_quorum(n_validators, n_successful);
    }

    let weight: f64 = successful.iter().map(|v| v.confidence).sum();
    let passed_weight: f64 = successful
        .iter()
        .filter(|v| v.passed)
        .map(|v| v.confidence)
        .sum();
    let weighted_pass_ratio = passed_weight / weight.max(EPSILON);

    let unanimous = successful.iter().all(|v| v.passed);
    let unanimity_bonus = if unanimous && n_successful >= min_validators {
        UNANIMITY_BONUS
    } else {
        0.0
    };

    ConsensusResult {
        score: (weighted_pass_ratio + unanimity_bonus).clamp(0.0, 1.0),
        weighted_pass_ratio,
        unanimity_bonus,
        n_validators,
        n_successful,
        quorum_met: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn verdict(id: &str, passed: bool, confidence: f64, status: VerdictStatus) -> ValidatorVerdict {
        ValidatorVerdict {
            validator_id: id.into(),
            passed,
            confidence,
            issues: vec![],
            elapsed_us: 1_000,
            status,
        }
    }

    fn ok(id: &str, passed: bool, confidence: f64) -> ValidatorVerdict {
        verdict(id, passed, confidence, VerdictStatus::Ok)
    }

    #[test]
    fn test_unanimous_pass_gets_bonus() {
        let verdicts = vec![ok("a", true, 0.95), ok("b", true, 0.95), ok("c", true, 0.95)];
        let result = aggregate(&verdicts, 3, false);

        assert!(result.quorum_met);
        assert_eq!(result.unanimity_bonus, UNANIMITY_BONUS);
        assert!((result.weighted_pass_ratio - 1.0).abs() < 1e-9);
        assert_eq!(result.score, 1.0);
    }

    #[test]
    fn test_split_vote() {
        let verdicts = vec![ok("a", true, 0.9), ok("b", false, 0.9), ok("c", false, 0.9)];
        let result = aggregate(&verdicts, 3, false);

        assert!(result.quorum_met);
        assert_eq!(result.unanimity_bonus, 0.0);
        assert!((result.score - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_weighting_penalizes_rubber_stamps() {
        // A low-confidence pass moves the needle less than a confident fail
        let verdicts = vec![ok("a", true, 0.1), ok("b", false, 0.9), ok("c", false, 0.9)];
        let result = aggregate(&verdicts, 3, false);
        assert!(result.score < 0.1);
    }

    #[test]
    fn test_timeouts_break_quorum_when_not_counted() {
        let verdicts = vec![
            ok("a", true, 0.9),
            verdict("b", false, 0.0, VerdictStatus::Timeout),
            verdict("c", false, 0.0, VerdictStatus::Timeout),
        ];
        let result = aggregate(&verdicts, 3, false);

        assert!(!result.quorum_met);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.n_validators, 1);
        assert_eq!(result.n_successful, 1);
    }

    #[test]
    fn test_counted_timeouts_still_lack_quorum() {
        let verdicts = vec![
            ok("a", true, 0.9),
            verdict("b", false, 0.0, VerdictStatus::Timeout),
            verdict("c", false, 0.0, VerdictStatus::Timeout),
        ];
        let result = aggregate(&verdicts, 3, true);

        // n_successful = 1 < min_validators
        assert!(!result.quorum_met);
        assert_eq!(result.n_validators, 3);
    }

    #[test]
    fn test_majority_rule() {
        // 2 of 5 successful: meets min of 2 but not ceil(5/2)
        let verdicts = vec![
            ok("a", true, 0.9),
            ok("b", true, 0.9),
            verdict("c", false, 0.0, VerdictStatus::Error("x".into())),
            verdict("d", false, 0.0, VerdictStatus::Error("x".into())),
            verdict("e", false, 0.0, VerdictStatus::Error("x".into())),
        ];
        let result = aggregate(&verdicts, 2, false);
        assert!(!result.quorum_met);
    }

    #[test]
    fn test_empty_verdicts() {
        let result = aggregate(&[], 3, false);
        assert!(!result.quorum_met);
        assert_eq!(result.n_validators, 0);
    }

    proptest! {
        #[test]
        fn prop_score_bounded(
            verdicts in proptest::collection::vec(
                (any::<bool>(), 0.0f64..=1.0), 0..12
            )
        ) {
            let verdicts: Vec<ValidatorVerdict> = verdicts
                .into_iter()
                .enumerate()
                .map(|(i, (passed, confidence))| ok(&format!("v{}", i), passed, confidence))
                .collect();
            let result = aggregate(&verdicts, 3, false);
            prop_assert!((0.0..=1.0).contains(&result.score));
            prop_assert!(result.quorum_met || result.score == 0.0);
        }
    }
}
