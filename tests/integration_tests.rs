//! End-to-end integration tests

use chirpy::config::TokenConfig;
use chirpy::session::{SessionError, SessionManager, SortOrder, WebhookOutcome};
use chirpy::storage::models::Document;
use chirpy::storage::{Store, StoreError};
use std::sync::atomic::{AtomicBool, Ordering};
use chirpy::tokens::{TokenError, TokenService};
use tempfile::TempDir;

const SECRET: &str = "integration-secret";
const POLKA_KEY: &str = "integration-polka";

fn setup_store() -> (Store, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let store = Store::open(temp_dir.path().join("database.json")).unwrap();
    (store, temp_dir)
}

fn setup_session() -> (SessionManager, TempDir) {
    let (store, temp_dir) = setup_store();
    let tokens = TokenService::new(SECRET, store.clone(), &TokenConfig::default());
    (SessionManager::new(store, tokens, POLKA_KEY), temp_dir)
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[tokio::test]
async fn test_account_lifecycle() {
    let (session, _temp) = setup_session();

    let user = session.register("walt@breakingbad.com", "123456").unwrap();
    assert_eq!(user.id, 1);
    assert!(!user.is_chirpy_red);

    let login = session.login("walt@breakingbad.com", "123456").unwrap();
    let caller = session.authenticate(Some(&bearer(&login.access_token))).unwrap();
    assert_eq!(caller.user_id(), user.id);

    // Credentials change; the old password stops working
    let updated = session
        .update_user(&caller, "heisenberg@breakingbad.com", "blue-sky")
        .unwrap();
    assert_eq!(updated.email, "heisenberg@breakingbad.com");
    assert!(matches!(
        session.login("walt@breakingbad.com", "123456"),
        Err(SessionError::InvalidCredentials)
    ));
    session.login("heisenberg@breakingbad.com", "blue-sky").unwrap();

    // Billing upgrade
    let webhook = session
        .authenticate_webhook(Some(&format!("ApiKey {POLKA_KEY}")))
        .unwrap();
    match session.handle_webhook(&webhook, "user.upgraded", user.id).unwrap() {
        WebhookOutcome::Upgraded(u) => assert!(u.is_chirpy_red),
        WebhookOutcome::Ignored => panic!("upgrade event was ignored"),
    }
}

#[tokio::test]
async fn test_refresh_token_lifecycle() {
    let (session, _temp) = setup_session();
    session.register("saul@bettercall.com", "pw").unwrap();
    let login = session.login("saul@bettercall.com", "pw").unwrap();
    let header = bearer(&login.refresh_token);

    // Refresh yields a working access token
    let access = session.refresh(Some(&header)).unwrap();
    session.authenticate(Some(&bearer(&access))).unwrap();

    // The access token is not accepted as a refresh token and vice versa
    assert!(matches!(
        session.refresh(Some(&bearer(&access))),
        Err(SessionError::Token(TokenError::WrongType))
    ));
    assert!(matches!(
        session.authenticate(Some(&header)),
        Err(SessionError::Token(TokenError::WrongType))
    ));

    // Revoke twice; both succeed and refresh then fails
    session.revoke(Some(&header)).unwrap();
    session.revoke(Some(&header)).unwrap();
    assert!(matches!(
        session.refresh(Some(&header)),
        Err(SessionError::Token(TokenError::Revoked))
    ));

    // Access tokens already issued stay valid until they expire
    session.authenticate(Some(&bearer(&access))).unwrap();
}

#[tokio::test]
async fn test_state_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("database.json");
    let refresh_token = {
        let store = Store::open(&path).unwrap();
        let tokens = TokenService::new(SECRET, store.clone(), &TokenConfig::default());
        let session = SessionManager::new(store, tokens, POLKA_KEY);
        session.register("jesse@breakingbad.com", "yo").unwrap();
        session.login("jesse@breakingbad.com", "yo").unwrap().refresh_token
    };

    let store = Store::open(&path).unwrap();
    let tokens = TokenService::new(SECRET, store.clone(), &TokenConfig::default());
    let session = SessionManager::new(store, tokens, POLKA_KEY);

    session.login("jesse@breakingbad.com", "yo").unwrap();
    session.refresh(Some(&bearer(&refresh_token))).unwrap();

    // Ids keep counting from the persisted counter
    let next = session.register("skyler@breakingbad.com", "pw").unwrap();
    assert_eq!(next.id, 2);
}

#[tokio::test]
async fn test_chirp_ownership() {
    let (session, _temp) = setup_session();
    session.register("a@example.com", "pw").unwrap();
    session.register("b@example.com", "pw").unwrap();
    let a = session
        .authenticate(Some(&bearer(&session.login("a@example.com", "pw").unwrap().access_token)))
        .unwrap();
    let b = session
        .authenticate(Some(&bearer(&session.login("b@example.com", "pw").unwrap().access_token)))
        .unwrap();

    let first = session.create_post(&a, "I had something interesting for breakfast").unwrap();
    session.create_post(&b, "This is a kerfuffle opinion").unwrap();
    session.create_post(&a, "Gale!").unwrap();

    let by_a = session.list_posts(Some(a.user_id()), SortOrder::Desc).unwrap();
    let ids: Vec<u64> = by_a.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![3, 1]);

    let all = session.list_posts(None, SortOrder::Asc).unwrap();
    assert_eq!(all[1].body, "This is a **** opinion");

    assert!(matches!(
        session.delete_post(&b, first.id),
        Err(SessionError::Forbidden)
    ));
    session.delete_post(&a, first.id).unwrap();
    assert!(matches!(
        session.get_post(first.id),
        Err(SessionError::Store(StoreError::NotFound))
    ));
}

#[tokio::test]
async fn test_concurrent_post_creation() {
    let (store, _temp) = setup_store();
    let author_id = store.create_user("busy@example.com", "digest").unwrap().id;

    let mut handles = Vec::new();
    for i in 0..50 {
        let store = store.clone();
        handles.push(tokio::task::spawn_blocking(move || {
            store.create_post(&format!("chirp {i}"), author_id)
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().unwrap().id);
    }
    ids.sort_unstable();

    assert_eq!(ids, (1..=50).collect::<Vec<u64>>());
    assert_eq!(store.get_posts().unwrap().len(), 50);
}

#[test]
fn test_readers_never_see_partial_document() {
    let (store, _temp) = setup_store();
    let author_id = store.create_user("busy@example.com", "digest").unwrap().id;
    let path = store.path();
    let writing = AtomicBool::new(true);

    std::thread::scope(|s| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                s.spawn(|| {
                    let mut last_seen = 0;
                    let mut reads = 0;
                    while writing.load(Ordering::Acquire) || reads == 0 {
                        let doc = store.document().unwrap();
                        assert!(doc.posts.len() >= last_seen, "post count went backwards");
                        last_seen = doc.posts.len();

                        assert!(store.get_posts().unwrap().len() >= last_seen);

                        // The file on disk is always a whole document, even outside the lock
                        let raw = std::fs::read(&path).unwrap();
                        let on_disk: Document = serde_json::from_slice(&raw).unwrap();
                        assert!(on_disk.users.contains_key(&author_id));
                        reads += 1;
                    }
                    last_seen
                })
            })
            .collect();

        let writers: Vec<_> = (0..50)
            .map(|i| {
                let store = &store;
                s.spawn(move || store.create_post(&format!("chirp {i}"), author_id).unwrap())
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }
        writing.store(false, Ordering::Release);

        for reader in readers {
            assert!(reader.join().unwrap() <= 50);
        }
    });

    assert_eq!(store.document().unwrap().posts.len(), 50);
}

#[tokio::test]
async fn test_cleanup_leaves_live_tokens() {
    let (store, _temp) = setup_store();
    let short = TokenConfig {
        refresh_ttl_seconds: 1,
        ..TokenConfig::default()
    };
    let expiring = TokenService::new(SECRET, store.clone(), &short);
    let lasting = TokenService::new(SECRET, store.clone(), &TokenConfig::default());

    let stale = expiring.issue_refresh(1).unwrap();
    let live = lasting.issue_refresh(1).unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    assert!(matches!(
        lasting.validate_refresh(&stale),
        Err(TokenError::Expired)
    ));
    assert_eq!(lasting.cleanup_expired().unwrap(), 1);
    assert!(matches!(
        lasting.validate_refresh(&stale),
        Err(TokenError::Unknown)
    ));
    assert_eq!(lasting.validate_refresh(&live).unwrap(), 1);
}
