//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Datelike, Duration as Days, Local, NaiveDate, Weekday};
use serde_json::{json, Value};
use studio_site::notify::{Notifier, NotifyError};
use studio_site::validation::CleanedSchedule;
use studio_site::{HttpServer, Shutdown, SiteConfig};
use tokio::net::TcpListener;

/// Records every booking it is asked to deliver.
#[derive(Default)]
pub struct RecordingNotifier {
    pub confirmations: Mutex<Vec<CleanedSchedule>>,
    pub admin_notices: Mutex<Vec<CleanedSchedule>>,
    pub fail: bool,
}

impl RecordingNotifier {
    #[allow(dead_code)]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Poll until `count` admin notices arrived or two seconds pass.
    #[allow(dead_code)]
    pub async fn wait_for_admin_notices(&self, count: usize) -> Vec<CleanedSchedule> {
        for _ in 0..200 {
            {
                let notices = self.admin_notices.lock().unwrap();
                if notices.len() >= count {
                    return notices.clone();
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.admin_notices.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<(), NotifyError> {
        if self.fail {
            Err(NotifyError::Address("smtp down".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_confirmation(&self, booking: &CleanedSchedule) -> Result<(), NotifyError> {
        self.confirmations.lock().unwrap().push(booking.clone());
        self.outcome()
    }

    async fn notify_admin(&self, booking: &CleanedSchedule) -> Result<(), NotifyError> {
        self.admin_notices.lock().unwrap().push(booking.clone());
        self.outcome()
    }
}

/// A running site bound to an ephemeral port. Shuts down on drop.
pub struct TestSite {
    pub addr: SocketAddr,
    pub notifier: Arc<RecordingNotifier>,
    shutdown: Shutdown,
}

impl TestSite {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestSite {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub async fn start_site(config: SiteConfig) -> TestSite {
    start_site_with(config, RecordingNotifier::default()).await
}

pub async fn start_site_with(config: SiteConfig, notifier: RecordingNotifier) -> TestSite {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let notifier = Arc::new(notifier);
    let server = HttpServer::with_notifier(config, notifier.clone()).unwrap();
    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();

    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestSite {
        addr,
        notifier,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}

/// First `weekday` strictly after today.
pub fn next(weekday: Weekday) -> String {
    let mut day: NaiveDate = Local::now().date_naive() + Days::days(1);
    while day.weekday() != weekday {
        day = day + Days::days(1);
    }
    day.format("%Y-%m-%d").to_string()
}

pub fn valid_booking() -> Value {
    json!({
        "nome_sobrenome": "João da Silva",
        "email": "joao@exemplo.com",
        "telefone": "88999999999",
        "data": next(Weekday::Mon),
        "horario": "6:30",
    })
}

/// Value of the `'nonce-…'` source in a CSP header.
#[allow(dead_code)]
pub fn csp_nonce(csp: &str) -> String {
    let start = csp.find("'nonce-").unwrap() + "'nonce-".len();
    let end = start + csp[start..].find('\'').unwrap();
    csp[start..end].to_string()
}
