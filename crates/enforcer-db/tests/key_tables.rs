//! Create/read round trips for every key table through the memory backend.

use enforcer_db::prelude::*;

fn db() -> Database {
    Database::open(DbConfig::default()).unwrap()
}

fn create_policy(db: &Database, name: &str) -> Policy {
    let mut policy = Policy::new();
    policy.set_name(name).unwrap();
    policy.set_description("integration").unwrap();
    db.repository::<Policy>().create(&mut policy).unwrap();
    policy
}

fn create_hsm_key(db: &Database, policy: &Policy, locator: &str) -> HsmKey {
    let mut key = HsmKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_locator(locator).unwrap();
    key.set_repository("SoftHSM").unwrap();
    db.repository::<HsmKey>().create(&mut key).unwrap();
    key
}

#[test]
fn hsm_key_found_by_locator_keeps_enum_labels() {
    let db = db();
    let policy = create_policy(&db, "default");
    let repo = db.repository::<HsmKey>();

    let mut key = HsmKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_locator("locator 1").unwrap();
    key.set_repository("SoftHSM").unwrap();
    key.set_role(KeyRole::Ksk).unwrap();
    key.set_backup(HsmKeyBackup::BackupRequired).unwrap();
    repo.create(&mut key).unwrap();

    let found = HsmKey::get_by_locator(&repo, "locator 1").unwrap();
    assert_eq!(found.role_text(), Some("KSK"));
    assert_eq!(found.backup_text(), Some("Backup Required"));
    assert_eq!(found.bits(), 2048);
    assert_eq!(found.policy_id(), policy.id());
    assert_eq!(found.compare(&key), std::cmp::Ordering::Equal);
    assert_eq!(found.lifecycle(), RecordState::Persisted);
}

#[test]
fn policy_round_trip() {
    let db = db();
    let repo = db.repository::<Policy>();

    let mut policy = Policy::new();
    policy.set_name("nsec3").unwrap();
    policy.set_description("NSEC3 with opt-out").unwrap();
    policy.set_denial_type(DenialType::Nsec3).unwrap();
    policy.set_denial_salt("a1b2").unwrap();
    policy.set_denial_iterations(5);
    policy.set_zone_soa_serial_text("unixtime").unwrap();
    policy.set_keys_ttl(3600);
    policy.set_passthrough(1);
    repo.create(&mut policy).unwrap();

    let found = repo.get_by_id(policy.id().unwrap()).unwrap();
    assert_eq!(found, policy);
    assert_eq!(found.denial_type_text(), Some("NSEC3"));
    assert_eq!(found.zone_soa_serial(), ZoneSoaSerial::UnixTime);
    assert_eq!(found.denial_salt(), Some("a1b2"));
}

#[test]
fn policy_without_salt_round_trips() {
    let db = db();
    let policy = create_policy(&db, "plain");
    let found = db.repository::<Policy>().get_by_id(policy.id().unwrap()).unwrap();
    assert_eq!(found.denial_salt(), None);
    assert_eq!(found.denial_type(), DenialType::Nsec);
}

#[test]
fn policy_key_round_trip() {
    let db = db();
    let policy = create_policy(&db, "default");
    let repo = db.repository::<PolicyKey>();

    let mut key = PolicyKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_role_text("KSK").unwrap();
    key.set_algorithm(8);
    key.set_bits(2048);
    key.set_lifetime(31_536_000);
    key.set_repository("SoftHSM").unwrap();
    key.set_manual_rollover(1);
    repo.create(&mut key).unwrap();

    let found = repo.get_by_id(key.id().unwrap()).unwrap();
    assert_eq!(found, key);
    assert_eq!(found.role(), KeyRole::Ksk);
    assert_eq!(found.lifetime(), 31_536_000);
}

#[test]
fn policy_key_without_role_is_refused() {
    let db = db();
    let policy = create_policy(&db, "default");
    let repo = db.repository::<PolicyKey>();

    let mut key = PolicyKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_repository("SoftHSM").unwrap();
    assert!(repo.create(&mut key).unwrap_err().is_precondition());
    assert_eq!(key.lifecycle(), RecordState::Unpersisted);
    assert_eq!(repo.count(None).unwrap(), 0);
}

#[test]
fn key_data_round_trip() {
    let db = db();
    let policy = create_policy(&db, "default");
    let hsm_key = create_hsm_key(&db, &policy, "k1");
    let repo = db.repository::<KeyData>();

    let mut data = KeyData::new();
    data.set_zone_id(&Value::from(Key::Int(42))).unwrap();
    data.set_hsm_key_id(&hsm_key.id_value()).unwrap();
    data.set_role(KeyRole::Zsk).unwrap();
    data.set_algorithm(13);
    data.set_keytag(12345);
    data.set_ds_at_parent_text("submitted").unwrap();
    repo.create(&mut data).unwrap();

    let found = repo.get_by_id(data.id().unwrap()).unwrap();
    assert_eq!(found, data);
    assert_eq!(found.zone_id(), Some(&Key::Int(42)));
    assert_eq!(found.introducing(), 1);
    assert_eq!(found.ds_at_parent(), DsAtParent::Submitted);
}

#[test]
fn key_state_round_trip() {
    let db = db();
    let policy = create_policy(&db, "default");
    let hsm_key = create_hsm_key(&db, &policy, "k1");

    let mut data = KeyData::new();
    data.set_zone_id(&Value::from(Key::Int(1))).unwrap();
    data.set_hsm_key_id(&hsm_key.id_value()).unwrap();
    data.set_role(KeyRole::Csk).unwrap();
    db.repository::<KeyData>().create(&mut data).unwrap();

    let repo = db.repository::<KeyState>();
    for (kind, value) in [
        (KeyStateType::Ds, KeyStateValue::Hidden),
        (KeyStateType::Dnskey, KeyStateValue::Rumoured),
        (KeyStateType::RrsigDnskey, KeyStateValue::Omnipresent),
    ] {
        let mut state = KeyState::new();
        state.set_key_data_id(&data.id_value()).unwrap();
        state.set_state_type(kind).unwrap();
        state.set_state(value).unwrap();
        state.set_ttl(3600);
        repo.create(&mut state).unwrap();

        let found = repo.get_by_id(state.id().unwrap()).unwrap();
        assert_eq!(found, state);
        assert_eq!(found.state_type(), kind);
    }

    let mut clauses = ClauseList::new();
    KeyState::state_type_clause(&mut clauses, KeyStateType::Dnskey).unwrap();
    let found = repo.get_first(&clauses).unwrap();
    assert_eq!(found.state_text(), Some("rumoured"));
}

#[test]
fn locator_must_be_unique() {
    let db = db();
    let policy = create_policy(&db, "default");
    create_hsm_key(&db, &policy, "dup");

    let mut second = HsmKey::new();
    second.set_policy_id(&policy.id_value()).unwrap();
    second.set_locator("dup").unwrap();
    second.set_repository("SoftHSM").unwrap();
    let err = db.repository::<HsmKey>().create(&mut second).unwrap_err();
    assert!(matches!(err, Error::Backend(_)));
    assert_eq!(second.id(), None);
}

#[test]
fn missing_required_column_is_refused() {
    let db = db();
    let mut key = HsmKey::new();
    key.set_locator("orphan").unwrap();
    key.set_repository("SoftHSM").unwrap();
    let err = db.repository::<HsmKey>().create(&mut key).unwrap_err();
    assert!(err.is_precondition());
}

#[test]
fn lookups_distinguish_missing_from_failure() {
    let db = db();
    let repo = db.repository::<HsmKey>();
    assert!(HsmKey::get_by_locator(&repo, "nothing").unwrap_err().is_not_found());
    assert!(repo.find_by_id(&Key::Int(99)).unwrap().is_none());
    assert!(repo.get_by_field("bits", 2048u32).unwrap_err().is_precondition());
}

#[test]
fn absent_records_sort_first() {
    let db = db();
    let policy = create_policy(&db, "default");
    let key = create_hsm_key(&db, &policy, "k1");
    assert_eq!(compare_records(None, Some(&key)), std::cmp::Ordering::Less);
    assert_eq!(compare_records(Some(&key), None), std::cmp::Ordering::Greater);
    assert_eq!(compare_records(Some(&key), Some(&key)), std::cmp::Ordering::Equal);
}
