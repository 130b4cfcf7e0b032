use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use provexec::errors::ExecError;
use provexec::exec::{ExecBackend, ExecResult, Invocation};

type Responder = dyn Fn(&Invocation) -> ExecResult + Send + Sync;

/// A fake backend that:
/// - records every invocation it is asked to run
/// - never spawns a process
/// - answers with whatever the responder returns (success with empty
///   output by default).
#[derive(Clone)]
pub struct FakeBackend {
    calls: Arc<Mutex<Vec<Invocation>>>,
    responder: Arc<Responder>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::responding(|_| ExecResult::success(String::new(), String::new()))
    }

    pub fn responding<F>(responder: F) -> Self
    where
        F: Fn(&Invocation) -> ExecResult + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    /// Always fail with the error built by `make_error`, after "printing"
    /// the given output.
    pub fn failing<F>(stdout: &str, stderr: &str, make_error: F) -> Self
    where
        F: Fn(&Invocation) -> ExecError + Send + Sync + 'static,
    {
        let stdout = stdout.to_string();
        let stderr = stderr.to_string();
        Self::responding(move |inv| ExecResult {
            error: Some(make_error(inv)),
            stdout: stdout.clone(),
            stderr: stderr.clone(),
        })
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecBackend for FakeBackend {
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecResult> + Send + 'a>> {
        self.calls.lock().unwrap().push(invocation.clone());
        let res = (self.responder)(invocation);
        Box::pin(async move { res })
    }
}
