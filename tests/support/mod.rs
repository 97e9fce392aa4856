// Shared in-process battle server for the HTTP integration tests.
use std::{
    net::{SocketAddr, TcpStream},
    sync::{OnceLock, mpsc},
    time::{Duration, Instant},
};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

static BASE_URL: OnceLock<String> = OnceLock::new();

// Base URL of a server started once per test binary with default settings.
pub fn ensure_server() -> &'static str {
    BASE_URL.get_or_init(|| {
        let (address_tx, address_rx) = mpsc::channel::<SocketAddr>();

        // Each #[tokio::test] has its own runtime; the server needs one that outlives them all.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("battle server runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind battle server test port");
                let address = listener.local_addr().expect("battle server address");
                address_tx.send(address).expect("publish battle server address");
                // In-memory identity store, whatever DATABASE_URL the environment carries.
                battle_server::run_with_settings(listener, battle_server::Settings::default())
                    .await
                    .expect("battle server stopped");
            });
        });

        let address = address_rx
            .recv_timeout(STARTUP_TIMEOUT)
            .expect("battle server did not bind in time");
        wait_until_accepting(address);
        format!("http://{address}")
    })
}

fn wait_until_accepting(address: SocketAddr) {
    let deadline = Instant::now() + STARTUP_TIMEOUT;
    while Instant::now() < deadline {
        if TcpStream::connect(address).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }
    panic!("battle server at {address} is not accepting connections");
}
