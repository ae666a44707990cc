use cfg_if::cfg_if;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};
use tracing_subscriber::util::SubscriberInitExt;

fn env_filter() -> EnvFilter {
    // RUST_LOG or default to info
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());

            // try_init: a second call (hot reload) must not panic
            let _ = tracing_subscriber::registry()
                .with(env_filter())
                .with(wasm_layer)
                .try_init();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();
        }
    } else {
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;
        use std::ffi::OsStr;
        use std::io;
        use std::path::{Path, PathBuf};
        use once_cell::sync::OnceCell;

        const DEFAULT_LOG_FILE: &str = "logs/aviator.log";

        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// Resolve the log file location from `RUST_LOG_FILE`
        fn log_file_path() -> PathBuf {
            std::env::var_os("RUST_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
        }

        pub fn init() {
            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            let log_path = log_file_path();
            let dir = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = log_path.file_name().unwrap_or(OsStr::new("aviator.log"));
            let (nb_writer, guard) = tracing_appender::non_blocking(
                tracing_appender::rolling::daily(dir, file_name)
            );
            let _ = FILE_GUARD.set(guard);

            let file_layer = fmt::layer()
                .with_writer(nb_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_level(true)
                .compact();

            if tracing_subscriber::registry()
                .with(env_filter())
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_err()
            {
                // Already installed (e.g. by a test harness)
                return;
            }

            std::panic::set_hook(Box::new(|info| {
                let mut msg = String::new();
                if let Some(loc) = info.location() {
                    msg.push_str(&format!("panic at {}:{}:{} ", loc.file(), loc.line(), loc.column()));
                }
                if let Some(s) = info.payload().downcast_ref::<&str>() { msg.push_str(s); }
                else if let Some(s) = info.payload().downcast_ref::<String>() { msg.push_str(s); }
                else { msg.push_str("<non-string panic>"); }
                let bt = std::backtrace::Backtrace::force_capture();
                tracing::error!("{}\nBacktrace:\n{:?}", msg, bt);
            }));

            tracing::debug!(path = %log_path.display(), "file logging enabled");
        }
    }
}
