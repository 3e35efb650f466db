use super::*;
use std::sync::Arc;

fn store_in(tmp: &tempfile::TempDir) -> AdminStore {
    AdminStore::open(tmp.path().join("admins.yaml"))
}

#[test]
fn missing_file_is_an_empty_store() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    assert!(store.is_empty());
    assert!(!store.is_authorized("42"));
    assert!(!store.can_grant("42"));
    assert!(!tmp.path().join("admins.yaml").exists());
}

#[test]
fn empty_and_malformed_files_load_as_empty() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("admins.yaml");
    std::fs::write(&p, "").unwrap();
    assert!(AdminStore::open(&p).is_empty());
    std::fs::write(&p, "{{{ not yaml").unwrap();
    assert!(AdminStore::open(&p).is_empty());
    std::fs::write(&p, "- just\n- a list\n").unwrap();
    assert!(AdminStore::open(&p).is_empty());
}

#[test]
fn loads_integer_keys_and_skips_bad_roles() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("admins.yaml");
    std::fs::write(
        &p,
        "123456:\n  display-name: Owner\n  role: root\n\"777\":\n  display-name: Helper\n  role: delegate\n888:\n  display-name: Bogus\n  role: superuser\n",
    )
    .unwrap();
    let store = AdminStore::open(&p);
    assert_eq!(store.len(), 2);
    assert!(store.can_grant("123456"));
    assert!(store.is_authorized("777"));
    assert!(!store.can_grant("777"));
    assert!(!store.is_authorized("888"));
}

#[test]
fn grant_creates_delegate_and_persists() {
    let tmp = tempfile::tempdir().unwrap();
    let store = store_in(&tmp);
    assert!(store.grant("1", "Alice").unwrap());
    assert!(store.is_authorized("1"));
    assert!(!store.can_grant("1"));
    let text = std::fs::read_to_string(store.path()).unwrap();
    assert!(text.contains("display-name: Alice"));
    assert!(text.contains("role: delegate"));
}

#[test]
fn grant_is_idempotent_and_never_upgrades() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("admins.yaml");
    std::fs::write(&p, "\"9\":\n  display-name: Root\n  role: root\n").unwrap();
    let store = AdminStore::open(&p);
    assert!(!store.grant("9", "Someone Else").unwrap());
    assert_eq!(store.get("9").unwrap(), AdminRecord { display_name: "Root".into(), role: Role::Root });

    assert!(store.grant("10", "First").unwrap());
    assert!(!store.grant("10", "Second").unwrap());
    let rec = store.get("10").unwrap();
    assert_eq!(rec.display_name, "First");
    assert_eq!(rec.role, Role::Delegate);
    assert_eq!(store.len(), 2);
}

#[test]
fn persisted_store_reloads_identically() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("nested").join("admins.yaml");
    std::fs::create_dir_all(p.parent().unwrap()).unwrap();
    std::fs::write(&p, "\"1\":\n  display-name: Root\n  role: root\n").unwrap();
    let store = AdminStore::open(&p);
    store.grant("2", "Bob").unwrap();
    store.grant("3", "Carol: the \"quoted\"").unwrap();
    let reloaded = AdminStore::open(&p);
    assert_eq!(store.records(), reloaded.records());
    assert_eq!(reloaded.len(), 3);
}

#[test]
fn grant_creates_missing_parent_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let p = tmp.path().join("a").join("b").join("admins.yaml");
    let store = AdminStore::open(&p);
    assert!(store.grant("5", "Eve").unwrap());
    assert!(p.exists());
}

#[test]
fn failed_write_leaves_store_and_directory_unchanged() {
    let tmp = tempfile::tempdir().unwrap();
    // A directory where the file should be makes the rename fail.
    let p = tmp.path().join("admins.yaml");
    std::fs::create_dir_all(p.join("occupied")).unwrap();
    let store = AdminStore::open(&p);
    let err = store.grant("1", "Alice").unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    assert!(!store.is_authorized("1"));
    assert!(!tmp.path().join("admins.yaml.tmp").exists());
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
}

#[test]
fn lookups_do_not_wait_for_a_pending_grant() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::write(tmp.path().join("admins.yaml"), "\"1\":\n  display-name: Owner\n  role: root\n").unwrap();
    let store = Arc::new(store_in(&tmp));
    let writer = store.hold_writes();

    let granting = {
        let s = store.clone();
        std::thread::spawn(move || s.grant("2", "Helper").unwrap())
    };
    let (tx, rx) = std::sync::mpsc::channel();
    {
        let s = store.clone();
        std::thread::spawn(move || {
            let _ = tx.send((s.is_authorized("1"), s.can_grant("1"), s.is_authorized("2")));
        });
    }
    let seen = rx.recv_timeout(std::time::Duration::from_secs(2)).expect("lookup blocked behind grant");
    assert_eq!(seen, (true, true, false));

    drop(writer);
    assert!(granting.join().unwrap());
    assert!(store.is_authorized("2"));
}

#[test]
fn concurrent_grants_keep_every_record() {
    let tmp = tempfile::tempdir().unwrap();
    let store = Arc::new(store_in(&tmp));
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let s = store.clone();
            std::thread::spawn(move || {
                s.grant(&format!("id{}", i % 8), &format!("user{i}")).unwrap()
            })
        })
        .collect();
    let created = handles.into_iter().map(|h| h.join().unwrap()).filter(|c| *c).count();
    assert_eq!(created, 8);
    let reloaded = AdminStore::open(store.path());
    assert_eq!(reloaded.len(), 8);
    for i in 0..8 {
        assert_eq!(reloaded.role_of(&format!("id{i}")), Some(Role::Delegate));
    }
}
