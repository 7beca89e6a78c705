//! Console display surface for issued challenges.
//!
//! The plaintext code must only reach a surface the remote actor cannot
//! observe without physical access, such as the terminal the host process
//! runs in.

use crate::crypto::secret::PlaintextSecret;
use crate::{GateError, SubjectId};
use std::io::{self, Write};
use std::sync::Mutex;
use std::time::Duration;

/// Width of the notice border.
const BORDER_WIDTH: usize = 60;

/// Somewhere a freshly issued code can be shown.
pub trait ChallengeDisplay: Send + Sync {
    /// Show `secret` for `subject`, noting that it expires after `ttl`.
    fn show(
        &self,
        subject: &SubjectId,
        secret: &PlaintextSecret,
        ttl: Duration,
    ) -> Result<(), GateError>;
}

/// Writes a bordered access-code notice to a writer (stdout by default).
pub struct ConsoleDisplay<W: Write + Send> {
    out: Mutex<W>,
}

impl ConsoleDisplay<io::Stdout> {
    /// Display on the process's standard output.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleDisplay<W> {
    /// Display on an arbitrary writer.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out.into_inner().unwrap_or_else(|e| e.into_inner())
    }
}

impl<W: Write + Send> ChallengeDisplay for ConsoleDisplay<W> {
    fn show(
        &self,
        subject: &SubjectId,
        secret: &PlaintextSecret,
        ttl: Duration,
    ) -> Result<(), GateError> {
        let notice = render_notice(subject, secret, ttl);
        let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());

        out.write_all(notice.as_bytes())
            .and_then(|_| out.flush())
            .map_err(|e| GateError::DisplayFailure(format!("Failed to write notice: {}", e)))?;

        tracing::info!(subject = %subject, "Access code displayed on console");
        Ok(())
    }
}

/// Render the access-code notice.
pub fn render_notice(subject: &SubjectId, secret: &PlaintextSecret, ttl: Duration) -> String {
    let border = "═".repeat(BORDER_WIDTH);
    format!(
        "\n{border}\n  ACCESS CODE REQUEST\n  Subject    : {subject}\n  Expires in : {ttl}s\n{border}\n\n    {code}\n\n{border}\n\n",
        border = border,
        subject = subject,
        ttl = ttl.as_secs(),
        code = secret.expose(),
    )
}
