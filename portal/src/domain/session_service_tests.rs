//! Tests for the session service.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::Notify;

use super::*;
use crate::domain::ports::{InMemorySessionStore, MockApiGateway, RequestOptions};
use crate::domain::{
    ApiErrorKind, Credential, Role, Route, SessionSnapshot, UserId, UserParts,
};

fn grant(role: &str) -> Value {
    json!({
        "token": "abc",
        "type": "Bearer",
        "id": 21,
        "username": "teacher1",
        "email": "teacher1@example.edu",
        "fullName": "Nguyen Van A",
        "role": role,
    })
}

fn gateway_returning(result: Result<Value, ApiError>) -> MockApiGateway {
    let mut gateway = MockApiGateway::new();
    gateway.expect_locale().return_const(Locale::Vi);
    gateway
        .expect_request()
        .times(1)
        .return_once(move |_, _| result);
    gateway
}

fn idle_gateway() -> MockApiGateway {
    let mut gateway = MockApiGateway::new();
    gateway.expect_locale().return_const(Locale::Vi);
    gateway
}

fn stored(role: Role) -> SessionSnapshot {
    SessionSnapshot::new(
        Credential::new("stored-token").expect("token"),
        User::new(UserParts {
            id: UserId::new(4),
            username: "student1".to_owned(),
            email: "student1@example.edu".to_owned(),
            full_name: "Tran Thi B".to_owned(),
            student_id: Some("SV001".to_owned()),
            role,
        }),
    )
}

type Service<G> = SessionService<InMemorySessionStore, G>;

fn service<G: ApiGateway>(
    store: &Arc<InMemorySessionStore>,
    gateway: G,
) -> Service<G> {
    SessionService::new(AuthService::new(Arc::clone(store), Arc::new(gateway)))
}

#[test]
fn starts_resolving_then_hydrates_from_store() {
    let store = Arc::new(InMemorySessionStore::with_snapshot(stored(Role::Student)));
    let service = service(&store, idle_gateway());
    assert!(service.state().loading());

    let state = service.init();

    assert!(!state.loading());
    assert!(state.is_authenticated());
    assert_eq!(service.default_redirect_path(), Route::StudentLanding);
}

#[test]
fn hydrating_an_empty_store_settles_signed_out() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = service(&store, idle_gateway());

    let state = service.init();

    assert_eq!(state, SessionState::signed_out());
    assert_eq!(service.default_redirect_path(), Route::SignIn);
}

#[tokio::test]
async fn successful_sign_in_flips_authentication_exactly_once() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = service(&store, gateway_returning(Ok(grant("TEACHER"))));
    service.init();
    let mut receiver = service.subscribe();
    assert!(!receiver.has_changed().expect("sender alive"));

    let user = service
        .sign_in("teacher1", "validpass")
        .await
        .expect("sign-in succeeds");

    assert!(receiver.has_changed().expect("sender alive"));
    let state = receiver.borrow_and_update().clone();
    assert!(state.is_authenticated());
    assert_eq!(state.user(), Some(&user));
    assert!(!state.loading());
    assert_eq!(
        store.get().expect("read").map(|snapshot| snapshot.user),
        Some(user)
    );
    assert_eq!(service.default_redirect_path(), Route::TeacherLanding);
}

#[tokio::test]
async fn failed_sign_in_reports_inline_error_and_clears_store() {
    let store = Arc::new(InMemorySessionStore::with_snapshot(stored(Role::Student)));
    let error = ApiError::new(
        ApiErrorKind::SessionExpired,
        "Tên đăng nhập hoặc mật khẩu không đúng",
        Locale::Vi,
    );
    let service = service(&store, gateway_returning(Err(error.clone())));
    service.init();

    let err = service
        .sign_in("student1", "wrong")
        .await
        .expect_err("sign-in fails");

    assert_eq!(err, SessionError::Api(error));
    let state = service.state();
    assert!(!state.is_authenticated());
    assert!(!state.loading());
    assert_eq!(state.error(), Some("Tên đăng nhập hoặc mật khẩu không đúng"));
    assert_eq!(store.get().expect("read"), None);
}

#[tokio::test]
async fn blank_fields_never_reach_the_gateway() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = service(&store, idle_gateway());
    service.init();

    let err = service
        .sign_in("   ", "validpass")
        .await
        .expect_err("validation fails");

    assert!(matches!(err, SessionError::InvalidCredentials(_)));
    assert_eq!(service.state().error(), Some(Locale::Vi.fields_required()));
}

#[tokio::test]
async fn new_attempt_clears_previous_error() {
    let store = Arc::new(InMemorySessionStore::new());
    let service = service(&store, gateway_returning(Ok(grant("ADMIN"))));
    service.init();
    let blank = service.sign_in("", "").await.expect_err("blank fields");
    assert!(matches!(blank, SessionError::InvalidCredentials(_)));
    assert!(service.state().error().is_some());

    service
        .sign_in("admin", "validpass")
        .await
        .expect("sign-in succeeds");

    assert_eq!(service.state().error(), None);
}

#[test]
fn sign_out_always_ends_signed_out_with_empty_store() {
    for initial in [None, Some(stored(Role::Admin))] {
        let store = Arc::new(match initial {
            Some(snapshot) => InMemorySessionStore::with_snapshot(snapshot),
            None => InMemorySessionStore::new(),
        });
        let service = service(&store, idle_gateway());
        service.init();

        service.sign_out();

        assert_eq!(service.state(), SessionState::signed_out());
        assert_eq!(store.get().expect("read"), None);
    }
}

#[test]
fn only_session_expiry_triggers_sign_out() {
    let store = Arc::new(InMemorySessionStore::with_snapshot(stored(Role::Teacher)));
    let service = service(&store, idle_gateway());
    service.init();

    assert!(!service.react_to(&ApiError::fallback(ApiErrorKind::Forbidden, Locale::Vi)));
    assert!(service.is_authenticated());

    assert!(service.react_to(&ApiError::fallback(ApiErrorKind::SessionExpired, Locale::Vi)));
    assert!(!service.is_authenticated());
    assert_eq!(store.get().expect("read"), None);
}

/// Gateway that parks every request until released.
struct GatedGateway {
    entered: Notify,
    release: Notify,
}

#[async_trait]
impl ApiGateway for GatedGateway {
    async fn request(&self, _endpoint: &str, _options: RequestOptions) -> Result<Value, ApiError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(grant("STUDENT"))
    }

    fn locale(&self) -> Locale {
        Locale::En
    }
}

#[tokio::test]
async fn concurrent_sign_in_is_rejected_without_touching_state() {
    let store = Arc::new(InMemorySessionStore::new());
    let gateway = Arc::new(GatedGateway {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let service = Arc::new(SessionService::new(AuthService::new(
        Arc::clone(&store),
        Arc::clone(&gateway),
    )));
    service.init();

    let first = tokio::spawn({
        let service = Arc::clone(&service);
        async move { service.sign_in("student1", "validpass").await }
    });
    gateway.entered.notified().await;
    let in_flight = service.state();
    assert!(in_flight.loading());

    let second = service.sign_in("student1", "validpass").await;

    assert_eq!(second, Err(SessionError::SignInInProgress));
    assert_eq!(service.state(), in_flight);

    gateway.release.notify_one();
    let user = first
        .await
        .expect("task joins")
        .expect("first sign-in succeeds");
    assert_eq!(user.role(), Role::Student);
    assert!(service.is_authenticated());
}

#[tokio::test]
async fn cancelled_sign_in_releases_the_flag_and_settles_loading() {
    let store = Arc::new(InMemorySessionStore::new());
    let gateway = Arc::new(GatedGateway {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let service = SessionService::new(AuthService::new(Arc::clone(&store), Arc::clone(&gateway)));
    service.init();

    let attempt = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        service.sign_in("student1", "validpass"),
    )
    .await;
    assert!(attempt.is_err(), "attempt should be cut off while parked");
    let settled = service.state();
    assert!(!settled.loading());
    assert!(!settled.is_authenticated());
    assert_eq!(settled, SessionState::signed_out());
    assert_eq!(store.get().expect("read"), None);

    gateway.release.notify_one();
    service
        .sign_in("student1", "validpass")
        .await
        .expect("flag released after cancellation");
}

#[tokio::test]
async fn cancelled_sign_in_keeps_the_existing_session() {
    let store = Arc::new(InMemorySessionStore::with_snapshot(stored(Role::Teacher)));
    let gateway = Arc::new(GatedGateway {
        entered: Notify::new(),
        release: Notify::new(),
    });
    let service = SessionService::new(AuthService::new(Arc::clone(&store), Arc::clone(&gateway)));
    let before = service.init();

    let attempt = tokio::time::timeout(
        std::time::Duration::from_millis(20),
        service.sign_in("student1", "validpass"),
    )
    .await;

    assert!(attempt.is_err(), "attempt should be cut off while parked");
    assert_eq!(service.state(), before);
    assert_eq!(
        service.state().user().map(User::role),
        Some(Role::Teacher)
    );
    assert_eq!(store.get().expect("read"), Some(stored(Role::Teacher)));
}
