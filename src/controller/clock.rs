/// Seconds since the animation started; never decreases
pub trait Clock {
    fn elapsed_time(&self) -> f64;
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::InstantClock;

#[cfg(target_arch = "wasm32")]
pub use web::PerformanceClock;

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::Instant;

    use super::Clock;

    pub struct InstantClock {
        start: Instant,
    }

    impl InstantClock {
        pub fn start() -> Self {
            Self { start: Instant::now() }
        }
    }

    impl Clock for InstantClock {
        fn elapsed_time(&self) -> f64 {
            self.start.elapsed().as_secs_f64()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::Performance;

    use super::Clock;

    /// `performance.now()` based clock (milliseconds converted to seconds)
    pub struct PerformanceClock {
        performance: Option<Performance>,
        start_ms: f64,
    }

    impl PerformanceClock {
        pub fn start(window: &web_sys::Window) -> Self {
            let performance = window.performance();
            let start_ms = performance.as_ref().map(|p| p.now()).unwrap_or(0.0);
            Self { performance, start_ms }
        }
    }

    impl Clock for PerformanceClock {
        fn elapsed_time(&self) -> f64 {
            let now = self.performance.as_ref().map(|p| p.now()).unwrap_or(self.start_ms);
            ((now - self.start_ms) / 1000.0).max(0.0)
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn test_instant_clock_is_monotonic() {
        let clock = InstantClock::start();
        let a = clock.elapsed_time();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = clock.elapsed_time();
        assert!(a >= 0.0);
        assert!(b > a);
    }
}
