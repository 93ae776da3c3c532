//! Device Session
//!
//! The seam between the analyzer and whatever transport reaches the device.
//! No transport ships with this crate: callers provide a [`Connector`].
//! [`capture`] drives the fixed connect, elevate, command, release sequence
//! and releases the session on every path through [`SessionGuard`].

use std::ops::{Deref, DerefMut};

use serde::Serialize;

use crate::report::Request;

/// Default SSH port
pub const DEFAULT_PORT: u16 = 22;

/// Command whose output the built-in template understands
pub const SHOW_INTERFACES: &str = "show interfaces";

/// Failures owned by the session collaborator
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("authentication failed for {username}@{host}")]
    Authentication { host: String, username: String },

    #[error("privilege elevation failed: {0}")]
    Elevation(String),

    #[error("command '{command}' failed: {reason}")]
    Command { command: String, reason: String },
}

/// Connection parameters for one device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionParams {
    pub host: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub secret: String,
    pub port: u16,
}

impl SessionParams {
    pub fn wants_elevation(&self) -> bool {
        !self.secret.is_empty()
    }
}

impl From<Request> for SessionParams {
    fn from(request: Request) -> Self {
        Self {
            host: request.host,
            username: request.username,
            password: request.password,
            secret: request.secret,
            port: match request.port {
                Some(port) if port != 0 => port,
                _ => DEFAULT_PORT,
            },
        }
    }
}

/// An established command-line session
pub trait DeviceSession {
    /// Enter privileged mode
    fn enable(&mut self, secret: &str) -> Result<(), SessionError>;

    /// Run one command and return its raw output
    fn send_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Release the session. Called exactly once by [`SessionGuard`].
    fn disconnect(&mut self);
}

/// Opens sessions
pub trait Connector {
    type Session: DeviceSession;

    fn connect(&self, params: &SessionParams) -> Result<Self::Session, SessionError>;
}

/// Owns a session and disconnects it when dropped
pub struct SessionGuard<S: DeviceSession> {
    session: S,
}

impl<S: DeviceSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: DeviceSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: DeviceSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: DeviceSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.disconnect();
    }
}

/// Connect, elevate when a secret is set, run `command`, and release the
/// session whatever the outcome.
pub fn capture<C: Connector>(
    connector: &C,
    params: &SessionParams,
    command: &str,
) -> Result<String, SessionError> {
    log::info!("Connecting to {}:{}", params.host, params.port);
    let mut session = SessionGuard::new(connector.connect(params)?);

    if params.wants_elevation() {
        log::debug!("Entering privileged mode on {}", params.host);
        session.enable(&params.secret)?;
    }

    let output = session.send_command(command)?;
    log::debug!("'{}' returned {} bytes", command, output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        calls: Vec<String>,
    }

    struct FakeSession {
        log: Rc<RefCell<Log>>,
        fail_enable: bool,
        fail_command: bool,
    }

    impl DeviceSession for FakeSession {
        fn enable(&mut self, secret: &str) -> Result<(), SessionError> {
            self.log.borrow_mut().calls.push(format!("enable:{}", secret));
            if self.fail_enable {
                return Err(SessionError::Elevation("bad secret".to_string()));
            }
            Ok(())
        }

        fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
            self.log.borrow_mut().calls.push(format!("send:{}", command));
            if self.fail_command {
                return Err(SessionError::Command {
                    command: command.to_string(),
                    reason: "timeout".to_string(),
                });
            }
            Ok("output".to_string())
        }

        fn disconnect(&mut self) {
            self.log.borrow_mut().calls.push("disconnect".to_string());
        }
    }

    struct FakeConnector {
        log: Rc<RefCell<Log>>,
        fail_connect: bool,
        fail_enable: bool,
        fail_command: bool,
    }

    impl FakeConnector {
        fn new() -> Self {
            Self {
                log: Rc::new(RefCell::new(Log::default())),
                fail_connect: false,
                fail_enable: false,
                fail_command: false,
            }
        }

        fn calls(&self) -> Vec<String> {
            self.log.borrow().calls.clone()
        }
    }

    impl Connector for FakeConnector {
        type Session = FakeSession;

        fn connect(&self, params: &SessionParams) -> Result<FakeSession, SessionError> {
            if self.fail_connect {
                return Err(SessionError::Connect {
                    host: params.host.clone(),
                    port: params.port,
                    reason: "refused".to_string(),
                });
            }
            self.log.borrow_mut().calls.push("connect".to_string());
            Ok(FakeSession {
                log: self.log.clone(),
                fail_enable: self.fail_enable,
                fail_command: self.fail_command,
            })
        }
    }

    fn params(secret: &str) -> SessionParams {
        SessionParams {
            host: "10.0.0.1".to_string(),
            username: "admin".to_string(),
            password: "pw".to_string(),
            secret: secret.to_string(),
            port: DEFAULT_PORT,
        }
    }

    #[test]
    fn test_capture_without_secret_skips_enable() {
        let connector = FakeConnector::new();
        let out = capture(&connector, &params(""), SHOW_INTERFACES).unwrap();

        assert_eq!(out, "output");
        assert_eq!(
            connector.calls(),
            vec!["connect", "send:show interfaces", "disconnect"]
        );
    }

    #[test]
    fn test_capture_with_secret_enables_first() {
        let connector = FakeConnector::new();
        capture(&connector, &params("s3cret"), SHOW_INTERFACES).unwrap();

        assert_eq!(
            connector.calls(),
            vec!["connect", "enable:s3cret", "send:show interfaces", "disconnect"]
        );
    }

    #[test]
    fn test_release_on_elevation_failure() {
        let mut connector = FakeConnector::new();
        connector.fail_enable = true;

        let err = capture(&connector, &params("s3cret"), SHOW_INTERFACES).unwrap_err();
        assert!(matches!(err, SessionError::Elevation(_)));
        assert_eq!(connector.calls(), vec!["connect", "enable:s3cret", "disconnect"]);
    }

    #[test]
    fn test_release_on_command_failure() {
        let mut connector = FakeConnector::new();
        connector.fail_command = true;

        let err = capture(&connector, &params(""), SHOW_INTERFACES).unwrap_err();
        assert!(matches!(err, SessionError::Command { .. }));
        assert_eq!(
            connector.calls().last().map(String::as_str),
            Some("disconnect")
        );
    }

    #[test]
    fn test_connect_failure_has_nothing_to_release() {
        let mut connector = FakeConnector::new();
        connector.fail_connect = true;

        assert!(capture(&connector, &params(""), SHOW_INTERFACES).is_err());
        assert!(connector.calls().is_empty());
    }

    #[test]
    fn test_params_from_request_defaults_port() {
        let request: Request =
            serde_json::from_str(r#"{"host":"r1","username":"u","port":0}"#).unwrap();
        let params = SessionParams::from(request);
        assert_eq!(params.port, 22);
        assert_eq!(params.password, "");
        assert!(!params.wants_elevation());
    }
}
