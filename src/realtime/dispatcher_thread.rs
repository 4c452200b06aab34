// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Background thread that drains an async [`EventDispatcher`].

use super::dispatcher::EventDispatcher;
use crate::config::DispatcherConfig;
use crate::error::ParamSetError;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Handle to the thread serving async observers.
///
/// The thread runs until the dispatcher is killed. Dropping the handle kills
/// the dispatcher and joins the thread; events still queued at that point
/// are discarded without notifying anyone.
pub struct EventDispatcherThread {
    dispatcher: Arc<EventDispatcher>,
    name: String,
    handle: Option<JoinHandle<()>>,
}

impl EventDispatcherThread {
    /// Spawn the dispatcher thread.
    ///
    /// Fails with [`ParamSetError::Config`] if the configured thread name
    /// cannot be passed to the OS.
    pub fn spawn(
        dispatcher: Arc<EventDispatcher>,
        config: &DispatcherConfig,
    ) -> Result<Self, ParamSetError> {
        config.validate()?;
        let worker = Arc::clone(&dispatcher);
        let low_priority = config.low_priority;
        let nice_level = config.nice_level;

        let handle = thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                if low_priority {
                    lower_current_thread_priority(nice_level);
                }
                run_dispatch_loop(&worker);
            })
            .map_err(ParamSetError::ThreadSpawn)?;

        info!("Started dispatcher thread '{}'", config.thread_name);

        Ok(Self {
            dispatcher,
            name: config.thread_name.clone(),
            handle: Some(handle),
        })
    }

    /// Thread name as passed to the OS.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the thread is still alive.
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Kill the dispatcher and join the thread. Safe to call more than once.
    pub fn shutdown(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        debug!("Stopping dispatcher thread '{}'", self.name);
        self.dispatcher.kill();
        if handle.join().is_err() {
            error!("Dispatcher thread '{}' panicked", self.name);
        } else {
            info!("Dispatcher thread '{}' stopped", self.name);
        }
    }
}

impl Drop for EventDispatcherThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Kills the dispatcher when the loop exits, including by unwinding out of
/// a panicking observer, so producers stop relaying into a dead queue.
struct KillOnExit<'a>(&'a EventDispatcher);

impl Drop for KillOnExit<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("Async observer panicked, dispatcher thread exiting");
        }
        self.0.kill();
    }
}

/// Wait for work and drain it until the dispatcher is killed.
///
/// The same wakeup signals both "work arrived" and "shutting down", so the
/// kill flag is checked again before processing.
fn run_dispatch_loop(dispatcher: &EventDispatcher) {
    let _guard = KillOnExit(dispatcher);
    while !dispatcher.is_killed() {
        dispatcher.wait();
        if !dispatcher.is_killed() {
            dispatcher.process();
        }
    }
}

/// Best-effort request to schedule the calling thread below normal priority.
#[cfg(target_os = "linux")]
fn lower_current_thread_priority(nice_level: i32) {
    let nice_level = nice_level.clamp(0, 19);
    // On Linux, PRIO_PROCESS with id 0 targets only the calling thread.
    // SAFETY: setpriority has no memory safety preconditions.
    let result = unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, nice_level) };
    if result != 0 {
        warn!(
            "Failed to lower dispatcher thread priority: {}",
            std::io::Error::last_os_error()
        );
    } else {
        debug!("Dispatcher thread running at nice {}", nice_level);
    }
}

#[cfg(not(target_os = "linux"))]
fn lower_current_thread_priority(_nice_level: i32) {
    debug!("Low priority dispatcher threads are not supported on this platform");
}
