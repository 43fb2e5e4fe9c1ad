#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use users_info::contract::model::{NewUser, User};
use users_info::domain::repo::UsersRepository;
use users_info::domain::service::Service;

/// Repository call, recorded in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FindAll,
    FindById(i64),
    FindByCpf(String),
    FindByEmail(String),
    Insert(String),
    Remove(i64),
}

#[derive(Default)]
struct State {
    users: Vec<User>,
    next_id: i64,
    calls: Vec<Call>,
}

/// In-memory repository that records every call it receives.
#[derive(Clone, Default)]
pub struct InMemoryUsersRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryUsersRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row directly, bypassing the service rules.
    pub fn seed(&self, name: &str, cpf: &str, email: &str) -> i64 {
        let mut st = self.state.lock().unwrap();
        st.next_id += 1;
        let id = st.next_id;
        st.users.push(User {
            id,
            name: name.to_string(),
            cpf: cpf.to_string(),
            email: email.to_string(),
            phone: None,
            created_at: Utc::now(),
        });
        id
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().users.len()
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait::async_trait]
impl UsersRepository for InMemoryUsersRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        self.record(Call::FindAll);
        Ok(self.state.lock().unwrap().users.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        self.record(Call::FindById(id));
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_cpf(&self, cpf: &str) -> Result<Option<User>> {
        self.record(Call::FindByCpf(cpf.to_string()));
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().find(|u| u.cpf == cpf).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.record(Call::FindByEmail(email.to_string()));
        let st = self.state.lock().unwrap();
        Ok(st.users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, candidate: NewUser) -> Result<i64> {
        self.record(Call::Insert(candidate.cpf.clone()));
        let mut st = self.state.lock().unwrap();
        st.next_id += 1;
        let id = st.next_id;
        st.users.push(User {
            id,
            name: candidate.name,
            cpf: candidate.cpf,
            email: candidate.email,
            phone: candidate.phone,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn remove(&self, id: i64) -> Result<u64> {
        self.record(Call::Remove(id));
        let mut st = self.state.lock().unwrap();
        let before = st.users.len();
        st.users.retain(|u| u.id != id);
        Ok((before - st.users.len()) as u64)
    }
}

/// Repository whose every call fails, as if the database were unreachable.
pub struct FailingUsersRepository;

#[async_trait::async_trait]
impl UsersRepository for FailingUsersRepository {
    async fn find_all(&self) -> Result<Vec<User>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_id(&self, _id: i64) -> Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_cpf(&self, _cpf: &str) -> Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
        anyhow::bail!("connection refused")
    }

    async fn insert(&self, _candidate: NewUser) -> Result<i64> {
        anyhow::bail!("connection refused")
    }

    async fn remove(&self, _id: i64) -> Result<u64> {
        anyhow::bail!("connection refused")
    }
}

pub fn candidate(cpf: &str, email: &str) -> NewUser {
    NewUser {
        name: "Test User".to_string(),
        cpf: cpf.to_string(),
        email: email.to_string(),
        phone: None,
    }
}

pub fn service_with(repo: InMemoryUsersRepository) -> Service {
    Service::new(Arc::new(repo))
}
