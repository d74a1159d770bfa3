extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, String, TryIntoVal,
};

use crate::events::{
    AdminTransferred, DonationReceived, FundsWithdrawn, ReportApproved, ReportSubmitted,
    ReportVerified, TrustUpdated,
};
use crate::{CrisisLedger, CrisisLedgerClient};

fn setup_with_init() -> (Env, CrisisLedgerClient<'static>, Address, token::Client<'static>) {
    let env = Env::default();
    env.mock_all_auths();
    let contract_id = env.register(CrisisLedger, ());
    let client = CrisisLedgerClient::new(&env, &contract_id);
    let admin = Address::generate(&env);
    let token_admin = Address::generate(&env);
    let sac = env.register_stellar_asset_contract_v2(token_admin);
    let token = token::Client::new(&env, &sac.address());
    client.init(&admin, &token.address);
    (env, client, admin, token)
}

fn submit(env: &Env, client: &CrisisLedgerClient, submitter: &Address) -> u64 {
    client.submit_report(
        submitter,
        &String::from_str(env, "Test Crisis"),
        &String::from_str(env, "Test description"),
        &String::from_str(env, "Test location"),
        &String::from_str(env, "QmTestHash"),
        &String::from_str(env, "QmTestCID"),
    )
}

#[test]
fn test_report_submitted_event() {
    let (env, client, _admin, _token) = setup_with_init();
    let reporter = Address::generate(&env);
    let id = submit(&env, &client, &reporter);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("submitted").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: ReportSubmitted = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        ReportSubmitted {
            report_id: id,
            submitter: reporter,
            title: String::from_str(&env, "Test Crisis"),
            content_ref: String::from_str(&env, "QmTestCID"),
        }
    );
}

#[test]
fn test_donation_received_event() {
    let (env, client, _admin, token) = setup_with_init();
    let donor = Address::generate(&env);
    token::StellarAssetClient::new(&env, &token.address).mint(&donor, &5_000);

    let message = String::from_str(&env, "Test donation");
    let id = client.donate(&donor, &5_000, &message);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, client.address);
    let expected_topics = vec![
        &env,
        symbol_short!("donated").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: DonationReceived = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        DonationReceived {
            donation_id: id,
            donor,
            amount: 5_000,
            message,
        }
    );
}

#[test]
fn test_approval_and_verified_events() {
    let (env, client, admin, _token) = setup_with_init();
    let submitter = Address::generate(&env);
    let id = submit(&env, &client, &submitter);

    let approvers: std::vec::Vec<Address> = (0..3).map(|_| Address::generate(&env)).collect();
    for a in approvers.iter() {
        client.set_trusted(&admin, a, &true);
    }

    client.verify_report(&id, &approvers[0]);
    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        &env,
        symbol_short!("approved").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);
    let approved: ReportApproved = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        approved,
        ReportApproved {
            report_id: id,
            approver: approvers[0].clone(),
            approvals: 1,
        }
    );

    client.verify_report(&id, &approvers[1]);
    client.verify_report(&id, &approvers[2]);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![
        &env,
        symbol_short!("verified").into_val(&env),
        id.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);
    let verified: ReportVerified = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        verified,
        ReportVerified {
            report_id: id,
            approvals: 3,
        }
    );

    // The threshold-crossing approval is published right before `verified`.
    let approval_event = all_events.get(all_events.len() - 2).unwrap();
    let approved: ReportApproved = approval_event.2.try_into_val(&env).unwrap();
    assert_eq!(approved.approver, approvers[2]);
    assert_eq!(approved.approvals, 3);
}

#[test]
fn test_trust_updated_event() {
    let (env, client, admin, _token) = setup_with_init();
    let reporter = Address::generate(&env);
    client.set_trusted(&admin, &reporter, &true);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");

    let expected_topics = vec![
        &env,
        symbol_short!("trusted").into_val(&env),
        reporter.into_val(&env),
    ];
    assert_eq!(last_event.1, expected_topics);
    let event_data: TrustUpdated = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        TrustUpdated {
            identity: reporter,
            trusted: true,
        }
    );
}

#[test]
fn test_funds_withdrawn_event() {
    let (env, client, admin, token) = setup_with_init();
    let donor = Address::generate(&env);
    token::StellarAssetClient::new(&env, &token.address).mint(&donor, &900);
    client.donate(&donor, &900, &String::from_str(&env, "relief"));

    client.withdraw(&admin);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![&env, symbol_short!("withdrawn").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);
    let event_data: FundsWithdrawn = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        FundsWithdrawn {
            admin,
            amount: 900,
        }
    );
}

#[test]
fn test_admin_transferred_event() {
    let (env, client, admin, _token) = setup_with_init();
    let new_admin = Address::generate(&env);
    client.transfer_admin(&admin, &new_admin);

    let all_events = env.events().all();
    let last_event = all_events.last().expect("No events found");
    let expected_topics = vec![&env, symbol_short!("admin_set").into_val(&env)];
    assert_eq!(last_event.1, expected_topics);
    let event_data: AdminTransferred = last_event.2.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        AdminTransferred {
            previous: Some(admin),
            new_admin,
        }
    );
}
