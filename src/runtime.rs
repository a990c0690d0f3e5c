use once_cell::sync::Lazy;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};

// Every public API is blocking, async SDK calls are driven from this runtime.
static TOKIO_RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("tokio-automation-blocking")
        .enable_all()
        .build()
        .unwrap_or_else(|e| panic!("cannot build tokio runtime: {e}"))
});

pub fn block_on<F: Future>(future: F) -> F::Output {
    TOKIO_RUNTIME.block_on(future)
}
