use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use super::messages::{Action, Locale};
use super::notify::{Notification, NotificationKind, Notifier};
use super::{ApiClient, ClientError, Endpoint, ListParams};
use crate::response::ApiResponse;

#[derive(Debug, Default)]
struct Flags {
    list: AtomicBool,
    get: AtomicBool,
    create: AtomicBool,
    update: AtomicBool,
    delete: AtomicBool,
}

/// Snapshot of which operations are in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadingState {
    pub list: bool,
    pub get: bool,
    pub create: bool,
    pub update: bool,
    pub delete: bool,
}

impl LoadingState {
    pub fn is_idle(&self) -> bool {
        *self == LoadingState::default()
    }
}

/// Raises a flag for as long as it lives, so early returns still clear it.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn start(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// CRUD calls for one entity. Failures become a notification plus a
/// `None`/`false` return; mutations also announce success.
pub struct CrudHook<T: Endpoint> {
    client: ApiClient,
    notifier: Arc<dyn Notifier>,
    locale: Locale,
    flags: Arc<Flags>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Endpoint> Clone for CrudHook<T> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            notifier: Arc::clone(&self.notifier),
            locale: self.locale,
            flags: Arc::clone(&self.flags),
            _entity: PhantomData,
        }
    }
}

impl<T: Endpoint> CrudHook<T> {
    pub fn new(client: ApiClient, notifier: Arc<dyn Notifier>, locale: Locale) -> Self {
        Self {
            client,
            notifier,
            locale,
            flags: Arc::new(Flags::default()),
            _entity: PhantomData,
        }
    }

    pub fn loading(&self) -> LoadingState {
        LoadingState {
            list: self.flags.list.load(Ordering::SeqCst),
            get: self.flags.get.load(Ordering::SeqCst),
            create: self.flags.create.load(Ordering::SeqCst),
            update: self.flags.update.load(Ordering::SeqCst),
            delete: self.flags.delete.load(Ordering::SeqCst),
        }
    }

    pub async fn list(&self, params: &ListParams) -> Option<ApiResponse<Vec<T>>> {
        let _busy = InFlight::start(&self.flags.list);
        let result = self.client.list::<T>(params).await;
        self.settle(Action::List, result)
    }

    pub async fn get(&self, id: Uuid) -> Option<T> {
        let _busy = InFlight::start(&self.flags.get);
        let result = self.client.get::<T>(id).await;
        self.settle(Action::Get, result)
    }

    pub async fn create(&self, input: &T::Create) -> Option<T> {
        let _busy = InFlight::start(&self.flags.create);
        let result = self.client.create::<T>(input).await;
        self.settle(Action::Create, result).map(|envelope| envelope.data)
    }

    pub async fn update(&self, id: Uuid, patch: &T::Update) -> Option<T> {
        let _busy = InFlight::start(&self.flags.update);
        let result = self.client.update::<T>(id, patch).await;
        self.settle(Action::Update, result).map(|envelope| envelope.data)
    }

    pub async fn delete(&self, id: Uuid) -> bool {
        let _busy = InFlight::start(&self.flags.delete);
        let result = self.client.delete::<T>(id).await;
        self.settle(Action::Delete, result).is_some()
    }

    fn settle<R>(&self, action: Action, result: Result<R, ClientError>) -> Option<R> {
        match result {
            Ok(value) => {
                if !matches!(action, Action::List | Action::Get) {
                    self.notifier.notify(Notification {
                        kind: NotificationKind::Success,
                        message: self.locale.success(action, T::ENTITY),
                        code: None,
                    });
                }
                Some(value)
            }
            Err(err) => {
                self.notifier.notify(Notification {
                    kind: NotificationKind::Error,
                    message: self.locale.failure(action, T::ENTITY, &err.user_message()),
                    code: err.code().map(str::to_string),
                });
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::notify::RecordingNotifier;
    use crate::client::test_server;
    use crate::models::insured_person::{CreateInsuredPerson, UpdateInsuredPerson};
    use crate::models::{Gender, InsuredPerson, Policy};
    use crate::store::seed;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn hook<T: Endpoint>(base: &str, locale: Locale) -> (CrudHook<T>, RecordingNotifier) {
        let recorder = RecordingNotifier::default();
        let hook = CrudHook::new(ApiClient::new(base), Arc::new(recorder.clone()), locale);
        (hook, recorder)
    }

    fn person(identity: &str) -> CreateInsuredPerson {
        CreateInsuredPerson {
            full_name: "Ngo Bao Chau".into(),
            identity_number: identity.into(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 6, 28).unwrap(),
            gender: Gender::Male,
            email: "chau.ngo@gmail.com".into(),
            phone: "0909123123".into(),
            address: "1 Dai Co Viet, Ha Noi".into(),
            occupation: Some("Mathematician".into()),
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_update_delete_notify_success() {
        let (base, _dir) = test_server::spawn(Duration::ZERO).await;
        let (hook, recorder) = hook::<InsuredPerson>(&base, Locale::En);

        let created = hook.create(&person("079188000777")).await.unwrap();
        let patch = UpdateInsuredPerson {
            occupation: Some("Professor".into()),
            ..Default::default()
        };
        let updated = hook.update(created.id, &patch).await.unwrap();
        assert_eq!(updated.occupation.as_deref(), Some("Professor"));
        assert_eq!(updated.full_name, "Ngo Bao Chau");
        assert!(hook.delete(created.id).await);

        assert_eq!(recorder.count(NotificationKind::Success), 3);
        assert_eq!(recorder.count(NotificationKind::Error), 0);
        assert_eq!(
            recorder.notifications()[0].message,
            "Insured person created successfully"
        );
        assert!(hook.loading().is_idle());
    }

    #[tokio::test]
    async fn test_failures_return_sentinels() {
        let (base, _dir) = test_server::spawn(Duration::ZERO).await;
        let (hook, recorder) = hook::<InsuredPerson>(&base, Locale::Vi);

        assert!(hook.create(&person("079085001234")).await.is_none());
        let seen = recorder.notifications();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, NotificationKind::Error);
        assert_eq!(seen[0].code.as_deref(), Some("CONFLICT"));
        assert!(seen[0].message.starts_with("Không thể tạo"));

        recorder.clear();
        assert!(!hook.delete(Uuid::new_v4()).await);
        assert!(hook.get(Uuid::new_v4()).await.is_none());
        assert_eq!(recorder.count(NotificationKind::Error), 2);
        assert!(hook.loading().is_idle());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let (hook, recorder) = hook::<Policy>("http://127.0.0.1:1", Locale::En);
        assert!(hook.list(&ListParams::new()).await.is_none());
        let seen = recorder.notifications();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].code, None);
        assert!(hook.loading().is_idle());
    }

    #[tokio::test]
    async fn test_loading_flag_is_raised_in_flight() {
        let (base, _dir) = test_server::spawn(Duration::from_millis(300)).await;
        let (hook, recorder) = hook::<Policy>(&base, Locale::En);

        let task = {
            let hook = hook.clone();
            tokio::spawn(async move { hook.get(seed::policy_id(0)).await })
        };
        tokio::time::sleep(Duration::from_millis(100)).await;
        let during = hook.loading();
        assert!(during.get);
        assert!(!during.list);

        let policy = task.await.unwrap().unwrap();
        assert_eq!(policy.policy_number, "POL-2023-0001");
        assert!(hook.loading().is_idle());
        // Reads are silent on success
        assert!(recorder.notifications().is_empty());
    }
}
