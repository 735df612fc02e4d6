use once_cell::sync::Lazy;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::TcpListener;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::time::sleep;

#[derive(Debug, Deserialize)]
struct Snapshot {
    counters: HashMap<String, String>,
    statuses: HashMap<String, bool>,
    active_backend: Option<String>,
    backend_label: String,
}

impl Snapshot {
    fn count(&self, id: &str) -> u64 {
        self.counters[id].replace('.', "").parse().unwrap()
    }
}

struct TestServer {
    base_url: String,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

static TEST_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));
static SERVER: Lazy<Mutex<Option<Arc<TestServer>>>> = Lazy::new(|| Mutex::new(None));

#[cfg(unix)]
mod cleanup {
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Once;

    static REGISTER: Once = Once::new();
    static PID: AtomicI32 = AtomicI32::new(0);

    pub fn register(pid: u32) {
        REGISTER.call_once(|| {
            PID.store(pid as i32, Ordering::SeqCst);
            unsafe {
                libc::atexit(on_exit);
            }
        });
    }

    extern "C" fn on_exit() {
        let pid = PID.load(Ordering::SeqCst);
        if pid > 0 {
            unsafe {
                libc::kill(pid, libc::SIGTERM);
            }
        }
    }
}

fn pick_free_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

async fn wait_until_ready(base_url: &str) {
    let client = Client::new();
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Ok(resp) = client.get(format!("{base_url}/api/stats")).send().await {
            if resp.status().is_success() {
                return;
            }
        }
        if Instant::now() > deadline {
            panic!("server did not become ready");
        }
        sleep(Duration::from_millis(100)).await;
    }
}

async fn spawn_server() -> TestServer {
    let port = pick_free_port();
    let mut command = Command::new(env!("CARGO_BIN_EXE_visit_counter"));
    for (name, _) in std::env::vars() {
        if name.starts_with("VISU_") || name.starts_with("FIREBASE_") {
            command.env_remove(name);
        }
    }
    let child = command
        .env("PORT", port.to_string())
        .env("VISU_ON_INIT_FAILURE", "fallback")
        .env("VISU_STARTUP_DELAY_MS", "0")
        .env("VISU_DEMO_LATENCY_MS", "0")
        .env("RUST_LOG", "info")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .expect("failed to spawn server");

    #[cfg(unix)]
    cleanup::register(child.id());

    let base_url = format!("http://127.0.0.1:{port}");
    wait_until_ready(&base_url).await;

    TestServer { base_url, child }
}

async fn shared_server() -> Arc<TestServer> {
    let mut guard = SERVER.lock().await;
    if let Some(server) = guard.as_ref() {
        return Arc::clone(server);
    }
    let server = Arc::new(spawn_server().await);
    *guard = Some(Arc::clone(&server));
    server
}

async fn switch_to(client: &Client, server: &TestServer, backend: &str) -> Snapshot {
    client
        .post(format!("{}/api/backend", server.base_url))
        .json(&serde_json::json!({ "backend": backend }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn reload(client: &Client, server: &TestServer) -> Snapshot {
    client
        .post(format!("{}/api/stats/reload", server.base_url))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn http_discord_click_increments_counter() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = switch_to(&client, &server, "memory").await;
    assert_eq!(before.active_backend.as_deref(), Some("memory"));
    assert_eq!(before.backend_label, "Demo Data");

    let response = client
        .post(format!("{}/api/track/discord", server.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let after = reload(&client, &server).await;
    assert_eq!(after.count("discordClicks"), before.count("discordClicks") + 1);
    assert!(after.statuses.values().all(|online| *online));
}

#[tokio::test]
async fn http_language_change_counts_known_codes_only() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let before = switch_to(&client, &server, "memory").await;

    for lang in ["tr", "xx"] {
        let response = client
            .post(format!("{}/api/track/language", server.base_url))
            .json(&serde_json::json!({ "lang": lang }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    let after = reload(&client, &server).await;
    assert_eq!(after.count("trCount"), before.count("trCount") + 1);
    assert_eq!(after.count("ptCount"), before.count("ptCount"));
    assert_eq!(after.count("enCount"), before.count("enCount"));
}

#[tokio::test]
async fn http_unconfigured_remote_reports_offline() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let remote = switch_to(&client, &server, "remote").await;
    assert_eq!(remote.active_backend.as_deref(), Some("remote"));
    assert_eq!(remote.count("totalVisits"), 0);
    assert!(remote.statuses.values().all(|online| !*online));

    let memory = switch_to(&client, &server, "memory").await;
    assert!(memory.count("totalVisits") >= 3500);
    assert!(memory.statuses.values().all(|online| *online));
}

#[tokio::test]
async fn http_unknown_backend_is_rejected() {
    let _guard = TEST_LOCK.lock().await;
    let server = shared_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/api/backend", server.base_url))
        .json(&serde_json::json!({ "backend": "redis" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let page = client.get(&server.base_url).send().await.unwrap();
    assert!(page.status().is_success());
    assert!(page.text().await.unwrap().contains("stats-container"));
}
