//! Experiment-outcome notification over SMTP.
//!
//! The outer invocation (not the pipeline itself) decides when to notify:
//! on success it sends the configured messages, on failure a message scoped
//! to the error. Credentials and message templates live in headerless TSV
//! files next to the experiment scripts:
//!
//! - credentials: `sender \t address \t password` or `receiver \t address`
//! - messages: `role \t subject \t body`, role `all` or a receiver address
//!
//! Individual delivery failures are logged and skipped; a notification must
//! never turn a finished run into a failed one.
//!
//! Feature-gated under `email`.

use std::path::{Path, PathBuf};

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use miette::Diagnostic;
use thiserror::Error;

/// Default SMTPS relay.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Errors from the notification subsystem.
#[derive(Debug, Error, Diagnostic)]
pub enum NotifyError {
    #[error("cannot read {path}: {source}")]
    #[diagnostic(
        code(kgprep::notify::io),
        help("Check the credentials/messages file path passed via --email.")
    )]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}:{line}: malformed notification row")]
    #[diagnostic(
        code(kgprep::notify::malformed),
        help(
            "Credential rows are `sender\\t<address>\\t<password>` or \
             `receiver\\t<address>`; message rows are `<role>\\t<subject>\\t<body>`."
        )
    )]
    MalformedRow { path: PathBuf, line: usize },

    #[error("invalid address \"{address}\": {message}")]
    #[diagnostic(
        code(kgprep::notify::address),
        help("Sender and receiver addresses must be valid RFC 5322 mailboxes.")
    )]
    Address { address: String, message: String },
}

pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// An authenticated sending account.
#[derive(Debug, Clone)]
pub struct Sender {
    pub address: String,
    pub password: String,
}

/// A message template with its receiver scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// `all`, or the single receiver address this notice targets.
    pub role: String,
    pub subject: String,
    pub body: String,
}

impl Notice {
    /// Whether this notice should go to the given receiver.
    pub fn applies_to(&self, receiver: &str) -> bool {
        self.role == "all" || self.role == receiver
    }

    /// Standard notice for a failed run.
    pub fn failure(error: &str) -> Self {
        Self {
            role: "all".to_string(),
            subject: "preprocessing run failed".to_string(),
            body: format!("The preprocessing run aborted with an error:\n\n{error}"),
        }
    }

    /// Standard notice for a finished run.
    pub fn success(summary: &str) -> Self {
        Self {
            role: "all".to_string(),
            subject: "preprocessing run finished".to_string(),
            body: summary.to_string(),
        }
    }
}

/// Read senders and receivers from a credentials TSV file.
pub fn read_credentials(path: &Path) -> NotifyResult<(Vec<Sender>, Vec<String>)> {
    let mut senders = Vec::new();
    let mut receivers = Vec::new();

    for (line, row) in read_rows(path)? {
        match row.as_slice() {
            [role, address, password] if role.as_str() == "sender" => senders.push(Sender {
                address: address.clone(),
                password: password.clone(),
            }),
            [role, address] if role.as_str() == "receiver" => receivers.push(address.clone()),
            _ => {
                return Err(NotifyError::MalformedRow {
                    path: path.to_path_buf(),
                    line,
                });
            }
        }
    }
    Ok((senders, receivers))
}

/// Read message templates from a messages TSV file.
pub fn read_notices(path: &Path) -> NotifyResult<Vec<Notice>> {
    let mut notices = Vec::new();
    for (line, row) in read_rows(path)? {
        let [role, subject, body] = row.as_slice() else {
            return Err(NotifyError::MalformedRow {
                path: path.to_path_buf(),
                line,
            });
        };
        notices.push(Notice {
            role: role.clone(),
            subject: subject.clone(),
            body: body.clone(),
        });
    }
    Ok(notices)
}

fn read_rows(path: &Path) -> NotifyResult<Vec<(usize, Vec<String>)>> {
    let content = std::fs::read_to_string(path).map_err(|source| NotifyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(idx, l)| {
            (
                idx + 1,
                l.trim_end_matches('\r')
                    .split('\t')
                    .map(str::to_string)
                    .collect(),
            )
        })
        .collect())
}

/// Send every applicable notice from every sender to every receiver.
///
/// Returns the number of successfully delivered messages; per-message
/// failures are logged at `warn` and do not abort the loop.
pub fn send_all(
    senders: &[Sender],
    receivers: &[String],
    notices: &[Notice],
    smtp_host: &str,
) -> usize {
    let mut delivered = 0usize;
    for sender in senders {
        for receiver in receivers {
            for notice in notices.iter().filter(|n| n.applies_to(receiver)) {
                match send_one(sender, receiver, notice, smtp_host) {
                    Ok(()) => {
                        tracing::info!(from = %sender.address, to = %receiver, "notification sent");
                        delivered += 1;
                    }
                    Err(err) => {
                        tracing::warn!(
                            from = %sender.address,
                            to = %receiver,
                            error = %err,
                            "failed to send notification"
                        );
                    }
                }
            }
        }
    }
    delivered
}

fn send_one(
    sender: &Sender,
    receiver: &str,
    notice: &Notice,
    smtp_host: &str,
) -> NotifyResult<()> {
    let from: lettre::message::Mailbox =
        sender.address.parse().map_err(|e| NotifyError::Address {
            address: sender.address.clone(),
            message: format!("{e}"),
        })?;
    let to: lettre::message::Mailbox =
        receiver.parse().map_err(|e| NotifyError::Address {
            address: receiver.to_string(),
            message: format!("{e}"),
        })?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(&notice.subject)
        .header(ContentType::TEXT_PLAIN)
        .body(notice.body.clone())
        .map_err(|e| NotifyError::Address {
            address: receiver.to_string(),
            message: format!("failed to build message: {e}"),
        })?;

    let mailer = SmtpTransport::relay(smtp_host)
        .map_err(|e| NotifyError::Address {
            address: smtp_host.to_string(),
            message: format!("cannot configure SMTP relay: {e}"),
        })?
        .credentials(Credentials::new(
            sender.address.clone(),
            sender.password.clone(),
        ))
        .build();

    mailer.send(&message).map_err(|e| NotifyError::Address {
        address: receiver.to_string(),
        message: format!("SMTP delivery failed: {e}"),
    })?;
    Ok(())
}
