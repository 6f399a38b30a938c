use std::sync::Arc;

use axum::extract::FromRef;

use crate::{
    auth::{credentials::Credentials, jwt::JwtKeys, password::Hasher},
    calendar::Event,
    chat::ChatEntry,
    config::AppConfig,
    db::PgStore,
    goals::Goal,
    moods::Mood,
    notes::Note,
    scoping::Scoped,
    store::memory::{MemoryTable, MemoryUsers},
    tasks::Task,
    timer::Session,
    users::UserStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub credentials: Arc<Credentials>,
    pub users: Arc<dyn UserStore>,
    pub tasks: Scoped<Task>,
    pub notes: Scoped<Note>,
    pub goals: Scoped<Goal>,
    pub moods: Scoped<Mood>,
    pub events: Scoped<Event>,
    pub sessions: Scoped<Session>,
    pub chat: Scoped<ChatEntry>,
}

impl AppState {
    /// Every store backed by one Postgres pool.
    pub fn postgres(config: AppConfig, store: PgStore) -> anyhow::Result<Self> {
        let store = Arc::new(store);
        Self::assemble(
            config,
            store.clone(),
            Scoped::<Task>::new(store.clone()),
            Scoped::<Note>::new(store.clone()),
            Scoped::<Goal>::new(store.clone()),
            Scoped::<Mood>::new(store.clone()),
            Scoped::<Event>::new(store.clone()),
            Scoped::<Session>::new(store.clone()),
            Scoped::<ChatEntry>::new(store),
        )
    }

    /// Process-local stores; contents are lost on exit.
    pub fn in_memory(config: AppConfig) -> anyhow::Result<Self> {
        Self::assemble(
            config,
            Arc::new(MemoryUsers::default()),
            Scoped::<Task>::new(Arc::new(MemoryTable::default())),
            Scoped::<Note>::new(Arc::new(MemoryTable::default())),
            Scoped::<Goal>::new(Arc::new(MemoryTable::default())),
            Scoped::<Mood>::new(Arc::new(MemoryTable::default())),
            Scoped::<Event>::new(Arc::new(MemoryTable::default())),
            Scoped::<Session>::new(Arc::new(MemoryTable::default())),
            Scoped::<ChatEntry>::new(Arc::new(MemoryTable::default())),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        tasks: Scoped<Task>,
        notes: Scoped<Note>,
        goals: Scoped<Goal>,
        moods: Scoped<Mood>,
        events: Scoped<Event>,
        sessions: Scoped<Session>,
        chat: Scoped<ChatEntry>,
    ) -> anyhow::Result<Self> {
        let keys = JwtKeys::from_config(&config.jwt);
        let hasher = Hasher::new(&config.password)?;
        let credentials = Credentials::new(users.clone(), hasher)?;
        Ok(Self {
            config: Arc::new(config),
            keys,
            credentials: Arc::new(credentials),
            users,
            tasks,
            notes,
            goals,
            moods,
            events,
            sessions,
            chat,
        })
    }
}

macro_rules! scoped_from_state {
    ($($resource:ty => $field:ident),+ $(,)?) => {
        $(
            impl FromRef<AppState> for Scoped<$resource> {
                fn from_ref(state: &AppState) -> Self {
                    state.$field.clone()
                }
            }
        )+
    };
}

scoped_from_state! {
    Task => tasks,
    Note => notes,
    Goal => goals,
    Mood => moods,
    Event => events,
    Session => sessions,
    ChatEntry => chat,
}
