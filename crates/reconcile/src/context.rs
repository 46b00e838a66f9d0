//! Connection traits and credentials
//!
//! The remote session is opaque to the driver. These traits let the
//! driver open one, hand it to the engine, and release it without
//! knowing anything about the wire protocol behind it.

use secrecy::{ExposeSecret, SecretString};
use std::ops::{Deref, DerefMut};

use crate::error::ConnectionError;

/// Credentials for the remote system
///
/// The password is kept in a `SecretString`, so `Debug` output redacts it.
#[derive(Debug)]
pub struct Credentials {
    pub account: String,
    pub user: String,
    pub password: SecretString,
    pub role: String,
    pub warehouse: String,
}

impl Credentials {
    /// Reveal the password for the connection handshake
    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }
}

/// An open session with the remote system
pub trait Connection {
    /// Release the session
    ///
    /// Called exactly once by [`ConnectionGuard`].
    fn close(&mut self) -> Result<(), ConnectionError>;
}

/// Opens sessions from credentials
pub trait ConnectionFactory {
    type Connection: Connection;

    fn open(&self, credentials: &Credentials) -> Result<Self::Connection, ConnectionError>;
}

/// Scoped ownership of a connection
///
/// The connection is closed when the guard is closed explicitly or dropped,
/// whichever comes first. Errors while closing from `Drop` are logged.
pub struct ConnectionGuard<C: Connection> {
    inner: Option<C>,
}

impl<C: Connection> ConnectionGuard<C> {
    pub fn new(connection: C) -> Self {
        Self {
            inner: Some(connection),
        }
    }

    /// Close now and report the result
    pub fn close(mut self) -> Result<(), ConnectionError> {
        match self.inner.take() {
            Some(mut conn) => conn.close(),
            None => Ok(()),
        }
    }
}

impl<C: Connection> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        // inner is only taken by close(self) and drop
        self.inner.as_ref().unwrap_or_else(|| unreachable!())
    }
}

impl<C: Connection> DerefMut for ConnectionGuard<C> {
    fn deref_mut(&mut self) -> &mut C {
        self.inner.as_mut().unwrap_or_else(|| unreachable!())
    }
}

impl<C: Connection> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        if let Some(mut conn) = self.inner.take() {
            log::debug!("Closing connection on early exit");
            if let Err(e) = conn.close() {
                log::warn!("Failed to close connection: {}", e);
            }
        }
    }
}
