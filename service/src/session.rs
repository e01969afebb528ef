//! Client-side session [`Store`].
//!
//! The [`Store`] is the single owner of the current session token and the
//! [`Identity`] derived from it. It is the only writer of the credential slot
//! in [`Storage`] and of the `Authorization` entry in the outbound [`Headers`].
//!
//! Every [`Snapshot`] it hands out satisfies the session invariant: an
//! [`Identity`] is present if and only if a credential is present and has not
//! expired at the instant of evaluation.

use std::sync::{PoisonError, RwLock, RwLockWriteGuard};

use common::{
    operations::{By, Delete, Insert, Select},
    Clock, SystemClock,
};
use derive_more::{Display, Error};
use tokio::sync::Mutex;
use tracerr::Traced;

use crate::{
    domain::{
        user::{
            session::{ExpirationDateTime, MalformedCredential},
            Token,
        },
        Identity,
    },
    infra::{
        pipeline::Headers,
        storage::{Entry, Key, Slots},
    },
};

#[cfg(doc)]
use crate::infra::Storage;

/// Client-side session store.
#[derive(Debug)]
pub struct Store<St, Clk = SystemClock> {
    /// [`Storage`] persisting the token across restarts.
    storage: St,

    /// Outbound [`Headers`] the token is attached to.
    headers: Headers,

    /// [`Clock`] expiration is evaluated against.
    clock: Clk,

    /// Current [`State`].
    state: RwLock<State>,

    /// Held by a transition until its [`Storage`] write completes, so the
    /// persisted token always follows the latest [`State`].
    transitions: Mutex<()>,
}

/// Internal state of a [`Store`].
#[derive(Clone, Debug, Default)]
enum State {
    /// Persisted token hasn't been resolved yet.
    #[default]
    Initializing,

    /// No session.
    Anonymous,

    /// Session with a token attached to the outbound [`Headers`].
    Authenticated(Authenticated),
}

/// Data of an authenticated [`State`].
#[derive(Clone, Debug)]
struct Authenticated {
    /// Attached token.
    token: Token,

    /// [`Identity`] of the session.
    identity: Identity,

    /// [`ExpirationDateTime`] of the `token`, if its claims are readable.
    ///
    /// Tokens provided on login are trusted as is, so an unreadable one never
    /// expires locally and is left for the server to reject.
    expires_at: Option<ExpirationDateTime>,
}

impl Authenticated {
    /// Indicates whether this session is expired at the provided `now`.
    fn is_expired(&self, now: ExpirationDateTime) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

/// Phase of a [`Store`] lifecycle.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Phase {
    /// Persisted token hasn't been resolved yet.
    Initializing,

    /// No valid session.
    Anonymous,

    /// Valid session is present.
    Authenticated,
}

/// Read-only view of a [`Store`] at some instant.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Snapshot {
    /// Current session token, if any.
    pub credential: Option<Token>,

    /// [`Identity`] of the session, present only while the `credential` is
    /// not expired.
    pub identity: Option<Identity>,

    /// Indicator whether the persisted token has been resolved.
    pub ready: bool,
}

impl Snapshot {
    /// Returns the [`Phase`] this [`Snapshot`] represents.
    #[must_use]
    pub fn phase(&self) -> Phase {
        match (self.ready, &self.identity) {
            (false, _) => Phase::Initializing,
            (true, None) => Phase::Anonymous,
            (true, Some(_)) => Phase::Authenticated,
        }
    }
}

/// Reason of a silent session invalidation.
#[derive(Debug, Display, Error)]
pub enum Invalidation {
    /// Token cannot be decoded.
    #[display("malformed credential: {_0}")]
    MalformedCredential(MalformedCredential),

    /// Token has expired.
    #[display("credential expired at {_0}")]
    ExpiredCredential(#[error(not(source))] ExpirationDateTime),
}

impl<St, Clk> Store<St, Clk> {
    /// Creates a new [`Store`] in the [`Phase::Initializing`].
    ///
    /// Call [`Store::initialize()`] to resolve the persisted token.
    #[must_use]
    pub fn new(storage: St, headers: Headers, clock: Clk) -> Self {
        Self {
            storage,
            headers,
            clock,
            state: RwLock::new(State::Initializing),
            transitions: Mutex::new(()),
        }
    }

    /// Returns the outbound [`Headers`] of this [`Store`].
    #[must_use]
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Locks the [`State`] for writing.
    fn write(&self) -> RwLockWriteGuard<'_, State> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switches the [`State`] to [`State::Anonymous`] and detaches the token
    /// under the same lock.
    fn become_anonymous(&self, state: &mut State) {
        self.headers.detach();
        *state = State::Anonymous;
    }
}

impl<St, Clk: Clock> Store<St, Clk> {
    /// Returns a [`Snapshot`] of this [`Store`] evaluated at the current
    /// instant of its [`Clock`].
    ///
    /// Doesn't repair an expired session, see [`Store::revalidate()`].
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        let now = self.clock.now().coerce();
        match &*self.state.read().unwrap_or_else(PoisonError::into_inner) {
            State::Initializing => Snapshot {
                credential: None,
                identity: None,
                ready: false,
            },
            State::Anonymous => Snapshot {
                credential: None,
                identity: None,
                ready: true,
            },
            State::Authenticated(auth) => Snapshot {
                credential: Some(auth.token.clone()),
                identity: (!auth.is_expired(now))
                    .then(|| auth.identity.clone()),
                ready: true,
            },
        }
    }

    /// Returns the current [`Identity`], if the session is valid.
    #[must_use]
    pub fn identity(&self) -> Option<Identity> {
        self.snapshot().identity
    }

    /// Returns the current [`Phase`].
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.snapshot().phase()
    }

    /// Indicates whether the persisted token has been resolved.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.snapshot().ready
    }
}

impl<St, Clk> Store<St, Clk>
where
    St: Slots,
    Clk: Clock,
{
    /// Resolves the persisted token, moving this [`Store`] out of the
    /// [`Phase::Initializing`].
    ///
    /// A malformed or expired persisted token is erased silently. Does nothing
    /// if already resolved, including by an earlier [`Store::login()`] or
    /// [`Store::logout()`].
    pub async fn initialize(&self) {
        let _transition = self.transitions.lock().await;
        if !matches!(
            *self.state.read().unwrap_or_else(PoisonError::into_inner),
            State::Initializing,
        ) {
            return;
        }

        let persisted = self
            .storage
            .execute(Select(By::new(Key::TOKEN)))
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("failed to read persisted credential: {e}");
                None
            });

        let resolved = persisted
            .map(|raw| Self::restore(raw.into(), self.clock.now().coerce()));

        let invalidation = {
            let mut state = self.write();
            match resolved {
                None => {
                    tracing::debug!("no persisted session");
                    self.become_anonymous(&mut state);
                    None
                }
                Some(Ok((auth, bearer))) => {
                    tracing::debug!(
                        user.id = %auth.identity.id,
                        "session restored",
                    );
                    self.headers.attach(bearer);
                    *state = State::Authenticated(auth);
                    None
                }
                Some(Err(invalidation)) => {
                    self.become_anonymous(&mut state);
                    Some(invalidation)
                }
            }
        };

        if let Some(reason) = invalidation {
            tracing::info!("persisted session discarded: {reason}");
            self.erase().await;
        }
    }

    /// Authenticates this [`Store`] with the provided `token` and `identity`
    /// received from a successful authentication exchange.
    ///
    /// The `token` is not validated. The provided `identity` takes precedence
    /// over the one the `token` claims describe.
    ///
    /// # Errors
    ///
    /// With [`LoginError`] if the `token` cannot be sent in an HTTP header.
    /// The [`Store`] is left untouched in such case.
    pub async fn login(
        &self,
        token: Token,
        identity: Identity,
    ) -> Result<(), Traced<LoginError>> {
        let bearer = token
            .bearer()
            .map_err(|_| tracerr::new!(LoginError::UnrepresentableCredential))?;

        let claims = token.decode().ok();
        if let Some(claimed) = claims.as_ref().map(|c| c.identity()) {
            if claimed != identity {
                tracing::warn!(
                    claimed.id = %claimed.id,
                    provided.id = %identity.id,
                    "credential claims describe another identity, \
                     using the provided one",
                );
            }
        }

        let raw = token.as_ref().to_owned();
        let _transition = self.transitions.lock().await;
        {
            let mut state = self.write();
            self.headers.attach(bearer);
            tracing::debug!(user.id = %identity.id, "session started");
            *state = State::Authenticated(Authenticated {
                token,
                identity,
                expires_at: claims.map(|c| c.expires_at),
            });
        }

        if let Err(e) = self
            .storage
            .execute(Insert(Entry {
                key: Key::TOKEN,
                value: raw,
            }))
            .await
        {
            tracing::warn!("failed to persist credential: {e}");
        }

        Ok(())
    }

    /// Terminates the current session, if any.
    ///
    /// Idempotent: the persisted token is erased on every call.
    pub async fn logout(&self) {
        let _transition = self.transitions.lock().await;
        {
            let mut state = self.write();
            if matches!(*state, State::Authenticated(_)) {
                tracing::debug!("session terminated");
            }
            self.become_anonymous(&mut state);
        }
        self.erase().await;
    }

    /// Re-evaluates the session invariant at the current instant, silently
    /// terminating an expired session.
    ///
    /// Returns the resulting [`Snapshot`].
    pub async fn revalidate(&self) -> Snapshot {
        let _transition = self.transitions.lock().await;
        let now = self.clock.now().coerce();
        let expired = {
            let mut state = self.write();
            let expired = match &*state {
                State::Authenticated(auth) if auth.is_expired(now) => {
                    auth.expires_at
                }
                State::Initializing
                | State::Anonymous
                | State::Authenticated(_) => None,
            };
            if expired.is_some() {
                self.become_anonymous(&mut state);
            }
            expired
        };

        if let Some(exp) = expired {
            tracing::info!(
                "session discarded: {}",
                Invalidation::ExpiredCredential(exp),
            );
            self.erase().await;
        }

        self.snapshot()
    }

    /// Restores an [`Authenticated`] state from a persisted `token`, along
    /// with the header value to attach.
    fn restore(
        token: Token,
        now: ExpirationDateTime,
    ) -> Result<(Authenticated, http::HeaderValue), Invalidation> {
        let claims =
            token.decode().map_err(Invalidation::MalformedCredential)?;
        if claims.is_expired(now) {
            return Err(Invalidation::ExpiredCredential(claims.expires_at));
        }
        let bearer = token.bearer().map_err(|_| {
            Invalidation::MalformedCredential(MalformedCredential::Segments)
        })?;

        Ok((
            Authenticated {
                identity: claims.identity(),
                expires_at: Some(claims.expires_at),
                token,
            },
            bearer,
        ))
    }

    /// Erases the persisted token, logging a failure.
    async fn erase(&self) {
        if let Err(e) = self
            .storage
            .execute(Delete(By::new(Key::TOKEN)))
            .await
        {
            tracing::warn!("failed to erase persisted credential: {e}");
        }
    }
}

/// Error of a [`Store::login()`].
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum LoginError {
    /// Token contains characters not allowed in HTTP headers.
    #[display("credential cannot be sent in an HTTP header")]
    UnrepresentableCredential,
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Delete, Insert, Select},
        Clock as _, Handler,
    };
    use futures::executor::block_on;
    use proptest::prelude::*;
    use tokio::task::yield_now;
    use tracerr::Traced;

    use super::{Phase, Snapshot, Store};
    use crate::{
        domain::user::Token,
        infra::{
            storage::{self, Entry, Key, Memory},
            Headers,
        },
        testing::{identity, token, ManualClock},
    };

    /// [`Memory`] yielding to the scheduler in the middle of its writes, the
    /// way a file system backed storage does.
    #[derive(Clone, Debug, Default)]
    struct Yielding(Memory);

    impl Handler<Select<By<Option<String>, Key>>> for Yielding {
        type Ok = Option<String>;
        type Err = Traced<storage::Error>;

        async fn execute(
            &self,
            op: Select<By<Option<String>, Key>>,
        ) -> Result<Self::Ok, Self::Err> {
            self.0.execute(op).await
        }
    }

    impl Handler<Insert<Entry>> for Yielding {
        type Ok = ();
        type Err = Traced<storage::Error>;

        async fn execute(&self, op: Insert<Entry>) -> Result<(), Self::Err> {
            yield_now().await;
            yield_now().await;
            self.0.execute(op).await
        }
    }

    impl Handler<Delete<By<String, Key>>> for Yielding {
        type Ok = ();
        type Err = Traced<storage::Error>;

        async fn execute(
            &self,
            op: Delete<By<String, Key>>,
        ) -> Result<(), Self::Err> {
            yield_now().await;
            self.0.execute(op).await
        }
    }

    type TestStore = Store<Memory, ManualClock>;

    fn store(now: i64) -> (TestStore, Memory, ManualClock) {
        let storage = Memory::new();
        let clock = ManualClock::at(now);
        let store = Store::new(storage.clone(), Headers::new(), clock.clone());
        (store, storage, clock)
    }

    fn authorization(store: &TestStore) -> Option<String> {
        store
            .headers()
            .authorization()
            .map(|v| v.to_str().unwrap().to_owned())
    }

    #[test]
    fn is_not_ready_before_initialization() {
        let (store, _, _) = store(1_000);

        assert_eq!(
            store.snapshot(),
            Snapshot {
                credential: None,
                identity: None,
                ready: false,
            },
        );
        assert_eq!(store.phase(), Phase::Initializing);
    }

    #[tokio::test]
    async fn initializes_anonymous_without_persisted_token() {
        let (store, _, _) = store(1_000);

        store.initialize().await;

        assert_eq!(store.phase(), Phase::Anonymous);
        assert!(store.is_ready());
        assert_eq!(authorization(&store), None);
    }

    #[tokio::test]
    async fn restores_valid_persisted_token() {
        let (store, storage, _) = store(1_000);
        let raw = token("7", "alice", 2_000);
        storage.set(Key::TOKEN, raw.as_ref());

        store.initialize().await;

        assert_eq!(store.phase(), Phase::Authenticated);
        assert_eq!(store.identity(), Some(identity("7", "alice")));
        assert_eq!(
            authorization(&store),
            Some(format!("Bearer {}", raw.as_ref())),
        );
        assert_eq!(storage.get(Key::TOKEN).as_deref(), Some(raw.as_ref()));
    }

    #[tokio::test]
    async fn discards_expired_persisted_token() {
        let (store, storage, _) = store(1_000);
        storage.set(Key::TOKEN, token("7", "alice", 1_000).as_ref());

        store.initialize().await;

        assert_eq!(store.phase(), Phase::Anonymous);
        assert_eq!(store.snapshot().credential, None);
        assert_eq!(storage.get(Key::TOKEN), None);
        assert_eq!(authorization(&store), None);
    }

    #[tokio::test]
    async fn discards_malformed_persisted_token() {
        for raw in ["garbage", "validtoken.with.futureexp"] {
            let (store, storage, _) = store(1_000);
            storage.set(Key::TOKEN, raw);

            store.initialize().await;

            assert_eq!(store.phase(), Phase::Anonymous, "`{raw}`");
            assert_eq!(storage.get(Key::TOKEN), None, "`{raw}`");
        }
    }

    #[tokio::test]
    async fn initializes_once() {
        let (store, storage, _) = store(1_000);
        store.initialize().await;

        storage.set(Key::TOKEN, token("7", "alice", 2_000).as_ref());
        store.initialize().await;

        assert_eq!(store.phase(), Phase::Anonymous);
    }

    #[tokio::test]
    async fn login_then_logout() {
        let (store, storage, _) = store(1_000);
        store.initialize().await;
        assert_eq!(store.phase(), Phase::Anonymous);

        store
            .login(
                Token::from("validtoken.with.futureexp"),
                identity("u1", "alice"),
            )
            .await
            .unwrap();

        assert_eq!(store.phase(), Phase::Authenticated);
        assert_eq!(store.identity(), Some(identity("u1", "alice")));
        assert_eq!(
            storage.get(Key::TOKEN).as_deref(),
            Some("validtoken.with.futureexp"),
        );
        assert_eq!(
            authorization(&store).as_deref(),
            Some("Bearer validtoken.with.futureexp"),
        );

        store.logout().await;

        assert_eq!(store.phase(), Phase::Anonymous);
        assert_eq!(store.snapshot().credential, None);
        assert_eq!(storage.get(Key::TOKEN), None);
        assert_eq!(authorization(&store), None);
    }

    #[tokio::test]
    async fn logout_twice_equals_once() {
        let (store, storage, _) = store(1_000);
        store.initialize().await;
        store
            .login(token("1", "bob", 2_000), identity("1", "bob"))
            .await
            .unwrap();

        store.logout().await;
        let once = (store.snapshot(), storage.get(Key::TOKEN));
        store.logout().await;

        assert_eq!((store.snapshot(), storage.get(Key::TOKEN)), once);
        assert_eq!(store.phase(), Phase::Anonymous);
    }

    #[tokio::test]
    async fn logout_racing_login_leaves_nothing_persisted() {
        let storage = Yielding::default();
        let clock = ManualClock::at(1_000);
        let store = Store::new(storage.clone(), Headers::new(), clock.clone());
        store.initialize().await;

        let (login, ()) = tokio::join!(
            store.login(token("1", "bob", 2_000), identity("1", "bob")),
            store.logout(),
        );
        login.unwrap();

        assert_eq!(store.phase(), Phase::Anonymous);
        assert_eq!(storage.0.get(Key::TOKEN), None);

        let restarted = Store::new(storage, Headers::new(), clock);
        restarted.initialize().await;
        assert_eq!(restarted.phase(), Phase::Anonymous);
    }

    #[tokio::test]
    async fn login_racing_logout_stays_persisted() {
        let storage = Yielding::default();
        let clock = ManualClock::at(1_000);
        let store = Store::new(storage.clone(), Headers::new(), clock);
        store.initialize().await;
        let raw = token("1", "bob", 2_000);

        let ((), login) = tokio::join!(
            store.logout(),
            store.login(raw.clone(), identity("1", "bob")),
        );
        login.unwrap();

        assert_eq!(store.phase(), Phase::Authenticated);
        assert_eq!(storage.0.get(Key::TOKEN).as_deref(), Some(raw.as_ref()));
    }

    #[tokio::test]
    async fn provided_identity_wins_over_claims() {
        let (store, _, _) = store(1_000);
        store.initialize().await;

        store
            .login(token("1", "bob", 2_000), identity("2", "alice"))
            .await
            .unwrap();

        assert_eq!(store.identity(), Some(identity("2", "alice")));
    }

    #[tokio::test]
    async fn rejects_token_unfit_for_header() {
        let (store, storage, _) = store(1_000);
        store.initialize().await;

        let res = store
            .login(Token::from("a.b\n.c"), identity("1", "bob"))
            .await;

        assert!(res.is_err());
        assert_eq!(store.phase(), Phase::Anonymous);
        assert_eq!(storage.get(Key::TOKEN), None);
        assert_eq!(authorization(&store), None);
    }

    #[tokio::test]
    async fn login_supersedes_initialization() {
        let (store, storage, _) = store(1_000);
        storage.set(Key::TOKEN, token("7", "alice", 2_000).as_ref());

        store
            .login(token("8", "bob", 3_000), identity("8", "bob"))
            .await
            .unwrap();
        store.initialize().await;

        assert_eq!(store.identity(), Some(identity("8", "bob")));
        assert_eq!(
            storage.get(Key::TOKEN).as_deref(),
            Some(token("8", "bob", 3_000).as_ref()),
        );
    }

    #[tokio::test]
    async fn revalidate_discards_expired_session() {
        let (store, storage, clock) = store(1_000);
        store.initialize().await;
        store
            .login(token("1", "bob", 1_100), identity("1", "bob"))
            .await
            .unwrap();
        assert_eq!(store.phase(), Phase::Authenticated);

        clock.advance(Duration::from_secs(100));

        let expired = store.snapshot();
        assert!(expired.credential.is_some());
        assert_eq!(expired.identity, None);
        assert_eq!(expired.phase(), Phase::Anonymous);

        let repaired = store.revalidate().await;
        assert_eq!(repaired.credential, None);
        assert_eq!(repaired.phase(), Phase::Anonymous);
        assert_eq!(storage.get(Key::TOKEN), None);
        assert_eq!(authorization(&store), None);
    }

    #[tokio::test]
    async fn revalidate_keeps_valid_session() {
        let (store, storage, clock) = store(1_000);
        store.initialize().await;
        store
            .login(token("1", "bob", 1_100), identity("1", "bob"))
            .await
            .unwrap();

        clock.advance(Duration::from_secs(99));

        assert_eq!(store.revalidate().await.phase(), Phase::Authenticated);
        assert!(storage.get(Key::TOKEN).is_some());
    }

    #[derive(Clone, Debug)]
    enum Op {
        Login { lifetime: i64 },
        LoginOpaque,
        Logout,
        Advance(u64),
        Revalidate,
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-50_i64..50).prop_map(|lifetime| Op::Login { lifetime }),
            Just(Op::LoginOpaque),
            Just(Op::Logout),
            (0_u64..60).prop_map(Op::Advance),
            Just(Op::Revalidate),
        ]
    }

    proptest! {
        #[test]
        fn session_invariant_holds(ops in prop::collection::vec(op(), 1..40)) {
            let (store, storage, clock) = store(1_000_000);
            block_on(store.initialize());

            for op in ops {
                let now = clock.now();
                match op {
                    Op::Login { lifetime } => block_on(store.login(
                        token("1", "alice", now.unix_timestamp() + lifetime),
                        identity("1", "alice"),
                    ))
                    .unwrap(),
                    Op::LoginOpaque => block_on(store.login(
                        Token::from("validtoken.with.futureexp"),
                        identity("u1", "alice"),
                    ))
                    .unwrap(),
                    Op::Logout => block_on(store.logout()),
                    Op::Advance(secs) => {
                        clock.advance(Duration::from_secs(secs));
                    }
                    Op::Revalidate => drop(block_on(store.revalidate())),
                }

                let now = clock.now().coerce();
                let snapshot = store.snapshot();
                prop_assert!(snapshot.ready);

                let alive = snapshot.credential.as_ref().is_some_and(|c| {
                    c.decode().map_or(true, |claims| !claims.is_expired(now))
                });
                prop_assert_eq!(snapshot.identity.is_some(), alive);

                prop_assert_eq!(
                    authorization(&store),
                    snapshot
                        .credential
                        .as_ref()
                        .map(|c| format!("Bearer {}", c.as_ref())),
                );
                prop_assert_eq!(
                    storage.get(Key::TOKEN),
                    snapshot.credential.as_ref().map(|c| c.as_ref().to_owned()),
                );
            }
        }
    }
}
