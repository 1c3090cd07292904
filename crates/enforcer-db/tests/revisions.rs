//! Revision-guarded updates and deletes, and the record lifecycle.

use enforcer_db::prelude::*;

fn open(style: KeyStyle) -> Database {
    Database::open(DbConfig::new().memory(MemoryConfig::new().key_style(style))).unwrap()
}

fn new_policy(name: &str) -> Policy {
    let mut policy = Policy::new();
    policy.set_name(name).unwrap();
    policy.set_description("revisions").unwrap();
    policy
}

fn revisions_increase(style: KeyStyle) {
    let db = open(style);
    let repo = db.repository::<Policy>();
    let mut policy = new_policy("p");
    repo.create(&mut policy).unwrap();

    let mut last = policy.revision().cloned().unwrap();
    for ttl in 1..=20 {
        policy.set_keys_ttl(ttl);
        repo.update(&mut policy).unwrap();
        let current = policy.revision().cloned().unwrap();
        assert!(current > last, "{current} should follow {last}");
        last = current;
    }

    let stored = repo.get_by_id(policy.id().unwrap()).unwrap();
    assert_eq!(stored.revision(), Some(&last));
    assert_eq!(stored.keys_ttl(), 20);
}

#[test]
fn revisions_increase_with_integer_keys() {
    revisions_increase(KeyStyle::Integer);
}

#[test]
fn revisions_increase_with_text_keys() {
    revisions_increase(KeyStyle::Text);
}

#[test]
fn text_keys_are_strings() {
    let db = open(KeyStyle::Text);
    let mut policy = new_policy("p");
    db.repository::<Policy>().create(&mut policy).unwrap();
    assert!(matches!(policy.id(), Some(Key::Text(_))));
    assert!(matches!(policy.revision(), Some(Key::Text(_))));
}

#[test]
fn stale_update_conflicts() {
    let db = open(KeyStyle::Integer);
    let repo = db.repository::<Policy>();
    let mut mine = new_policy("shared");
    repo.create(&mut mine).unwrap();
    let mut theirs = repo.get_by_id(mine.id().unwrap()).unwrap();

    theirs.set_keys_ttl(60);
    repo.update(&mut theirs).unwrap();

    mine.set_keys_ttl(120);
    let err = repo.update(&mut mine).unwrap_err();
    assert!(err.is_conflict());

    let stored = repo.get_by_id(mine.id().unwrap()).unwrap();
    assert_eq!(stored.keys_ttl(), 60);

    repo.refresh(&mut mine).unwrap();
    assert_eq!(mine.keys_ttl(), 60);
    mine.set_keys_ttl(120);
    repo.update(&mut mine).unwrap();
    assert_eq!(repo.get_by_id(mine.id().unwrap()).unwrap().keys_ttl(), 120);
}

#[test]
fn stale_delete_conflicts() {
    let db = open(KeyStyle::Integer);
    let repo = db.repository::<Policy>();
    let mut mine = new_policy("gone");
    repo.create(&mut mine).unwrap();
    let mut theirs = repo.get_by_id(mine.id().unwrap()).unwrap();
    theirs.set_description("changed").unwrap();
    repo.update(&mut theirs).unwrap();

    assert!(repo.delete(&mut mine).unwrap_err().is_conflict());
    assert_eq!(mine.lifecycle(), RecordState::Persisted);
    assert_eq!(repo.count(None).unwrap(), 1);

    repo.delete(&mut theirs).unwrap();
    assert_eq!(theirs.lifecycle(), RecordState::Gone);
    assert_eq!(repo.count(None).unwrap(), 0);
}

#[test]
fn lifecycle_is_enforced() {
    let db = open(KeyStyle::Integer);
    let repo = db.repository::<Policy>();
    let mut policy = new_policy("cycle");

    assert!(repo.update(&mut policy).unwrap_err().is_precondition());
    assert!(repo.delete(&mut policy).unwrap_err().is_precondition());

    repo.create(&mut policy).unwrap();
    assert!(repo.create(&mut policy).unwrap_err().is_precondition());

    repo.delete(&mut policy).unwrap();
    assert!(repo.update(&mut policy).unwrap_err().is_precondition());
    assert!(repo.delete(&mut policy).unwrap_err().is_precondition());
}

#[test]
fn reset_restores_defaults() {
    let db = open(KeyStyle::Integer);
    let mut policy = new_policy("owner");
    db.repository::<Policy>().create(&mut policy).unwrap();

    let mut key = HsmKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_locator("resettable").unwrap();
    key.set_repository("SoftHSM").unwrap();
    key.set_role(KeyRole::Ksk).unwrap();
    key.set_bits(4096);
    db.repository::<HsmKey>().create(&mut key).unwrap();

    key.reset();
    for _ in 0..2 {
        assert_eq!(key.lifecycle(), RecordState::Unpersisted);
        assert_eq!(key.bits(), 2048);
        assert_eq!(key.algorithm(), 1);
        assert_eq!(key.role_text(), Some("ZSK"));
        assert_eq!(key.backup_text(), Some("No Backup"));
        assert_eq!(key.policy_id(), None);
        assert_eq!(key.locator(), None);
        key.reset();
    }
}

#[test]
fn rejected_setters_leave_record_unchanged() {
    let mut key = HsmKey::new();
    key.set_policy_id(&Value::from(Key::Int(1))).unwrap();
    key.set_backup(HsmKeyBackup::BackupDone).unwrap();
    let before = key.clone();

    assert!(key.set_policy_id(&Value::Null).unwrap_err().is_precondition());
    assert!(key.set_role(KeyRole::Invalid).unwrap_err().is_precondition());
    assert!(key.set_backup_text("Backup Lost").unwrap_err().is_precondition());
    assert!(key.set_key_type_text("DSA").unwrap_err().is_precondition());
    assert_eq!(key, before);

    let mut policy = Policy::new();
    assert!(policy.set_name("has space").unwrap_err().is_precondition());
    assert_eq!(policy.name(), None);
}

#[test]
fn copy_from_detaches_shared_parent() {
    let db = open(KeyStyle::Integer);
    let mut policy = new_policy("parent");
    db.repository::<Policy>().create(&mut policy).unwrap();
    let mut key = HsmKey::new();
    key.set_policy_id(&policy.id_value()).unwrap();
    key.set_locator("child").unwrap();
    key.set_repository("SoftHSM").unwrap();
    db.repository::<HsmKey>().create(&mut key).unwrap();

    let mut list = db.list::<HsmKey>();
    list.get().unwrap();
    list.fetch_associated(HsmKey::POLICY).unwrap();
    let listed = list.get_index(0).unwrap().unwrap();
    assert!(listed.policy_id_fk().reference().is_borrowed());

    let mut copy = HsmKey::new();
    copy.copy_from(listed);
    assert!(copy.policy_id_fk().reference().is_owned());
    assert_eq!(copy.policy().and_then(Policy::name), Some("parent"));
    assert_eq!(copy, *listed);
}
