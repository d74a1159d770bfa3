extern crate std;

use soroban_sdk::Vec;

use crate::{Donation, Report, VERIFICATION_THRESHOLD};

/// INV-1: `verified` holds exactly when the approver count reached the threshold.
pub fn assert_verified_matches_threshold(report: &Report) {
    assert_eq!(
        report.verified,
        report.approvers.len() >= VERIFICATION_THRESHOLD,
        "INV-1 violated: report {} verified={} with {} approvers",
        report.id,
        report.verified,
        report.approvers.len()
    );
}

/// INV-2: the submitter never appears among its own report's approvers.
pub fn assert_submitter_not_approver(report: &Report) {
    assert!(
        !report.approvers.contains(&report.submitter),
        "INV-2 violated: report {} approved by its submitter",
        report.id
    );
}

/// INV-3: each identity appears at most once in `approvers`.
pub fn assert_unique_approvers(report: &Report) {
    let approvers: std::vec::Vec<_> = report.approvers.iter().collect();
    for (i, a) in approvers.iter().enumerate() {
        for b in approvers.iter().skip(i + 1) {
            assert_ne!(a, b, "INV-3 violated: duplicate approver on report {}", report.id);
        }
    }
}

/// INV-4: verification never reverts.
pub fn assert_verification_monotonic(before: &Report, after: &Report) {
    assert!(
        !before.verified || after.verified,
        "INV-4 violated: report {} lost its verified flag",
        before.id
    );
    assert!(
        after.approvers.len() >= before.approvers.len(),
        "INV-4 violated: report {} lost approvers",
        before.id
    );
}

/// INV-5: immutable report fields never change.
pub fn assert_report_immutable_fields(original: &Report, current: &Report) {
    assert_eq!(original.id, current.id, "INV-5 violated: report id changed");
    assert_eq!(
        original.submitter, current.submitter,
        "INV-5 violated: submitter changed"
    );
    assert_eq!(original.title, current.title, "INV-5 violated: title changed");
    assert_eq!(
        original.description, current.description,
        "INV-5 violated: description changed"
    );
    assert_eq!(
        original.created_at, current.created_at,
        "INV-5 violated: created_at changed"
    );
}

/// INV-6: ids are dense and sequential starting from 0.
pub fn assert_sequential_report_ids(reports: &Vec<Report>) {
    for (i, report) in reports.iter().enumerate() {
        assert_eq!(
            report.id, i as u64,
            "INV-6 violated: expected report id {}, got {}",
            i, report.id
        );
    }
}

pub fn assert_sequential_donation_ids(donations: &Vec<Donation>) {
    for (i, donation) in donations.iter().enumerate() {
        assert_eq!(
            donation.id, i as u64,
            "INV-6 violated: expected donation id {}, got {}",
            i, donation.id
        );
    }
}

/// INV-7: `total_donated` equals the sum of recorded amounts, all positive.
pub fn assert_total_matches_donations(total: i128, donations: &Vec<Donation>) {
    let mut sum = 0i128;
    for donation in donations.iter() {
        assert!(
            donation.amount > 0,
            "INV-7 violated: donation {} has non-positive amount",
            donation.id
        );
        sum += donation.amount;
    }
    assert_eq!(total, sum, "INV-7 violated: total {} != sum {}", total, sum);
}

/// INV-8: `total_donated` never decreases.
pub fn assert_total_monotonic(before: i128, after: i128) {
    assert!(
        after >= before,
        "INV-8 violated: total_donated decreased from {} to {}",
        before,
        after
    );
}

/// Run all stateless report invariants.
pub fn assert_all_report_invariants(report: &Report) {
    assert_verified_matches_threshold(report);
    assert_submitter_not_approver(report);
    assert_unique_approvers(report);
}
