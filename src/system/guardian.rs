// src/system/guardian.rs

use log::{debug, warn};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, OnceLock};

/// The shutdown signals the guardian reacts to and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Interrupt,
    Terminate,
    Quit,
}

impl ShutdownSignal {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Interrupt => "SIGINT",
            Self::Terminate => "SIGTERM",
            Self::Quit => "SIGQUIT",
        }
    }
}

/// One tracked child process.
#[derive(Debug, Clone)]
pub struct ChildEntry {
    pub pid: u32,
    /// The rendered command line, kept for the shutdown trace.
    pub command: String,
}

#[derive(Debug, Default)]
struct GuardianInner {
    children: Mutex<HashMap<u32, ChildEntry>>,
    hook_installed: AtomicBool,
    last_signal: Mutex<Option<ShutdownSignal>>,
}

/// Tracks every spawned child for the lifetime of the invocation and owns
/// the process-wide signal hook.
///
/// A `Guardian` is an explicit value. The launcher takes a reference, so
/// tests run isolated instances; the binary shares one process-lifetime
/// instance through [`Guardian::global`].
///
/// A child is removed only by its own exit (the launcher deregisters once
/// the wait resolves). Signal delivery never removes an entry: when a
/// shutdown signal arrives, every live child receives that same signal and
/// the process exits 0.
#[derive(Debug, Clone, Default)]
pub struct Guardian {
    inner: Arc<GuardianInner>,
}

static GUARDIAN: OnceLock<Guardian> = OnceLock::new();

impl Guardian {
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared process-lifetime instance.
    pub fn global() -> &'static Self {
        GUARDIAN.get_or_init(Self::new)
    }

    /// Starts tracking a freshly spawned child. The first registration of
    /// this instance also installs the signal hook; must be called from
    /// within the runtime.
    ///
    /// Pid 0 is refused: on kill(2) it names the caller's own process group,
    /// not a child.
    pub fn register(&self, pid: u32, command: &str) {
        if pid == 0 {
            debug!("Refusing to track '{}' without a real pid.", command);
            return;
        }

        let mut children = self.inner.children.lock().unwrap();
        children.insert(
            pid,
            ChildEntry {
                pid,
                command: command.to_string(),
            },
        );
        debug!(
            "Guardian now tracks child {} ({} live).",
            pid,
            children.len()
        );
        drop(children);

        self.ensure_signal_hook();
    }

    /// Stops tracking a child that exited. Unknown pids are a no-op.
    pub fn deregister(&self, pid: u32) {
        let mut children = self.inner.children.lock().unwrap();
        if children.remove(&pid).is_none() {
            debug!("Deregister for untracked child {}, ignoring.", pid);
        }
    }

    pub fn child_count(&self) -> usize {
        self.inner.children.lock().unwrap().len()
    }

    /// Whether the process-wide signal hook has been installed.
    pub fn hook_installed(&self) -> bool {
        self.inner.hook_installed.load(Ordering::SeqCst)
    }

    /// The signal most recently seen by the shutdown path, if any.
    pub fn last_signal(&self) -> Option<ShutdownSignal> {
        *self.inner.last_signal.lock().unwrap()
    }

    /// One-way transition: the first caller spawns the watch task, every
    /// later call is a no-op. `swap` makes the check-and-set atomic, so two
    /// racing registrations cannot both install.
    ///
    /// The streams are claimed here, before the task is spawned: a signal
    /// arriving between registration and the task's first poll is already
    /// queued for the watcher instead of hitting the default disposition.
    fn ensure_signal_hook(&self) {
        if self.inner.hook_installed.swap(true, Ordering::SeqCst) {
            return;
        }

        let streams = ShutdownStreams::install();
        let guardian = self.clone();
        tokio::spawn(async move {
            let signal = streams.recv().await;
            debug!("Shutdown signal received: {}.", signal.as_str());
            guardian.dispatch_shutdown(Some(signal));
            std::process::exit(0);
        });
    }

    /// Forwards `signal` to every live child; with `None` (plain program
    /// exit) children are left to finish on their own. Entries stay in the
    /// registry either way.
    ///
    /// Returns how many children were actually signaled.
    pub fn dispatch_shutdown(&self, signal: Option<ShutdownSignal>) -> usize {
        *self.inner.last_signal.lock().unwrap() = signal;

        let children: Vec<ChildEntry> = self
            .inner
            .children
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();

        let Some(signal) = signal else {
            debug!("Plain exit: leaving {} children unsignaled.", children.len());
            return 0;
        };

        let mut signaled = 0;
        for entry in &children {
            if send_signal(entry, signal) {
                signaled += 1;
            }
        }
        signaled
    }
}

/// Delivers `signal` to one child. On Unix this is a real `kill`; elsewhere
/// there is no reliable equivalent, so the child is left to the console's
/// own Ctrl+C propagation.
#[cfg(unix)]
fn send_signal(entry: &ChildEntry, signal: ShutdownSignal) -> bool {
    use nix::sys::signal::{Signal, kill};
    use nix::unistd::Pid;

    let Ok(pid) = i32::try_from(entry.pid) else {
        warn!(
            "Child pid {} ('{}') does not fit a signed pid, cannot signal.",
            entry.pid, entry.command
        );
        return false;
    };

    let sig = match signal {
        ShutdownSignal::Interrupt => Signal::SIGINT,
        ShutdownSignal::Terminate => Signal::SIGTERM,
        ShutdownSignal::Quit => Signal::SIGQUIT,
    };

    match kill(Pid::from_raw(pid), sig) {
        Ok(()) => {
            debug!(
                "Forwarded {} to child {} ('{}').",
                signal.as_str(),
                entry.pid,
                entry.command
            );
            true
        }
        Err(e) => {
            warn!(
                "Failed to forward {} to child {} ('{}'): {}",
                signal.as_str(),
                entry.pid,
                entry.command,
                e
            );
            false
        }
    }
}

#[cfg(not(unix))]
fn send_signal(entry: &ChildEntry, signal: ShutdownSignal) -> bool {
    debug!(
        "No {} forwarding on this platform (child {}: '{}').",
        signal.as_str(),
        entry.pid,
        entry.command
    );
    false
}

/// The signal streams behind the watch task, claimed inside
/// [`Guardian::ensure_signal_hook`]. Claiming registers the OS handler at
/// once; anything delivered before the first poll is buffered in the stream.
#[cfg(unix)]
struct ShutdownStreams {
    interrupt: Option<tokio::signal::unix::Signal>,
    terminate: Option<tokio::signal::unix::Signal>,
    quit: Option<tokio::signal::unix::Signal>,
}

#[cfg(unix)]
impl ShutdownStreams {
    /// Registers the three handlers with the runtime. A handler that cannot
    /// be installed is logged and simply never fires.
    fn install() -> Self {
        use tokio::signal::unix::SignalKind;

        Self {
            interrupt: Self::claim(SignalKind::interrupt(), ShutdownSignal::Interrupt),
            terminate: Self::claim(SignalKind::terminate(), ShutdownSignal::Terminate),
            quit: Self::claim(SignalKind::quit(), ShutdownSignal::Quit),
        }
    }

    fn claim(
        kind: tokio::signal::unix::SignalKind,
        mapped: ShutdownSignal,
    ) -> Option<tokio::signal::unix::Signal> {
        match tokio::signal::unix::signal(kind) {
            Ok(stream) => Some(stream),
            Err(e) => {
                warn!("Failed to install the {} handler: {}", mapped.as_str(), e);
                None
            }
        }
    }

    /// Resolves when one of the handled shutdown signals arrives.
    async fn recv(self) -> ShutdownSignal {
        tokio::select! {
            () = Self::wait_on(self.interrupt) => ShutdownSignal::Interrupt,
            () = Self::wait_on(self.terminate) => ShutdownSignal::Terminate,
            () = Self::wait_on(self.quit) => ShutdownSignal::Quit,
        }
    }

    /// Pends forever on a stream that was never installed or has closed.
    async fn wait_on(stream: Option<tokio::signal::unix::Signal>) {
        if let Some(mut stream) = stream
            && stream.recv().await.is_some()
        {
            return;
        }
        std::future::pending().await
    }
}

/// Ctrl+C / Ctrl+Break are the only shutdown notifications available.
#[cfg(not(unix))]
struct ShutdownStreams;

#[cfg(not(unix))]
impl ShutdownStreams {
    fn install() -> Self {
        Self
    }

    async fn recv(self) -> ShutdownSignal {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        ShutdownSignal::Interrupt
    }
}
