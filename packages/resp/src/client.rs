//! `RespHashStore`: the hash commands mapped onto Redis `H*` commands over
//! one shared connection.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use percent_encoding::percent_decode_str;

use remote_hash_store::{HashStore, Mapping, StoreConfig, StoreError, StoreResult};

use crate::codec::Frame;
use crate::connection::Connection;

/// Port used when a `redis://` URL names none.
pub const DEFAULT_PORT: u16 = 6379;

/// Where and how to connect.
#[derive(Clone)]
struct Target {
    addr: String,
    timeout: Duration,
    username: Option<String>,
    password: Option<String>,
    database: u32,
}

impl Target {
    fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let url = config.parsed_url()?;
        if url.scheme() != "redis" {
            return Err(StoreError::InvalidConfig {
                message: format!("expected a redis:// URL, got {}", config.url),
            });
        }

        let host = url.host_str().unwrap_or("127.0.0.1");
        let port = url.port().unwrap_or(DEFAULT_PORT);

        let database = match url.path().trim_start_matches('/') {
            "" => 0,
            db => db.parse().map_err(|_| StoreError::InvalidConfig {
                message: format!("invalid database number {:?}", db),
            })?,
        };

        let username = Some(url.username())
            .filter(|u| !u.is_empty())
            .map(|u| decode_userinfo("username", u))
            .transpose()?;
        let password = match &config.password {
            Some(password) => Some(password.clone()),
            None => url
                .password()
                .map(|p| decode_userinfo("password", p))
                .transpose()?,
        };

        Ok(Self {
            addr: format!("{}:{}", host, port),
            timeout: config.timeout(),
            username,
            password,
            database,
        })
    }

    /// Open a connection and run the AUTH and SELECT handshake.
    fn connect(&self) -> StoreResult<Connection> {
        log::debug!("connecting to {} (db {})", self.addr, self.database);
        let mut conn = Connection::open(&self.addr, self.timeout)?;

        if let Some(password) = &self.password {
            let mut auth = vec!["AUTH"];
            if let Some(username) = &self.username {
                auth.push(username);
            }
            auth.push(password);
            expect_ok("AUTH", conn.call(&Frame::command(auth))?)?;
        }
        if self.database != 0 {
            let db = self.database.to_string();
            expect_ok("SELECT", conn.call(&Frame::command(["SELECT", db.as_str()]))?)?;
        }

        Ok(conn)
    }
}

/// URL userinfo arrives percent-encoded; AUTH needs the raw text.
fn decode_userinfo(part: &str, encoded: &str) -> StoreResult<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| StoreError::InvalidConfig {
            message: format!("{} in redis URL is not UTF-8: {}", part, e),
        })
}

/// A hash store reached over the Redis protocol.
///
/// Every [`HashStore`] method is one command, so each is atomic on the
/// server:
///
/// | method                | command   |
/// |-----------------------|-----------|
/// | `get_all`             | `HGETALL` |
/// | `get_field`           | `HGET`    |
/// | `get_fields`          | `HMGET`   |
/// | `set_field`           | `HSET`    |
/// | `set_fields`          | `HSET` with every pair |
/// | `set_field_if_absent` | `HSETNX`  |
///
/// A single connection is shared behind a mutex. After a transport or decode
/// failure it is dropped and the next command reconnects; the failed command
/// itself is never re-sent.
pub struct RespHashStore {
    target: Target,
    conn: Mutex<Option<Connection>>,
}

impl RespHashStore {
    /// Connect to `addr` (`host:port`) with default settings.
    pub fn connect(addr: &str) -> StoreResult<Self> {
        Self::from_config(&StoreConfig::new(format!("redis://{}", addr)))
    }

    /// Connect using a `redis://[user[:password]@]host[:port][/db]` config.
    ///
    /// The connection is opened eagerly so a bad address fails here.
    pub fn from_config(config: &StoreConfig) -> StoreResult<Self> {
        let target = Target::from_config(config)?;
        let conn = target.connect()?;
        Ok(Self {
            target,
            conn: Mutex::new(Some(conn)),
        })
    }

    /// The `host:port` this store talks to.
    pub fn addr(&self) -> &str {
        &self.target.addr
    }

    fn call(&self, request: Frame) -> StoreResult<Frame> {
        let mut guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        let mut conn = match guard.take() {
            Some(conn) => conn,
            None => self.target.connect()?,
        };

        let result = conn.call(&request);
        match &result {
            Err(e @ (StoreError::Transport(_) | StoreError::Decode { .. })) => {
                log::warn!("dropping connection to {}: {}", self.target.addr, e);
            }
            _ => *guard = Some(conn),
        }
        result
    }
}

impl std::fmt::Debug for RespHashStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RespHashStore")
            .field("addr", &self.target.addr)
            .field("database", &self.target.database)
            .finish_non_exhaustive()
    }
}

impl HashStore for RespHashStore {
    fn get_all(&self, key: &str) -> StoreResult<Mapping> {
        log::debug!("HGETALL {}", key);
        let items = match self.call(Frame::command(["HGETALL", key]))? {
            Frame::Array(Some(items)) if items.len() % 2 == 0 => items,
            other => return Err(unexpected("HGETALL", &other)),
        };

        let mut mapping = Mapping::new();
        let mut items = items.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            mapping.insert(
                bulk_string("HGETALL", field)?,
                bulk_string("HGETALL", value)?,
            );
        }
        Ok(mapping)
    }

    fn get_field(&self, key: &str, field: &str) -> StoreResult<Option<String>> {
        log::debug!("HGET {} {}", key, field);
        nullable_string("HGET", self.call(Frame::command(["HGET", key, field]))?)
    }

    fn get_fields(&self, key: &str, fields: &[&str]) -> StoreResult<Vec<Option<String>>> {
        log::debug!("HMGET {} ({} fields)", key, fields.len());
        let args = ["HMGET", key].into_iter().chain(fields.iter().copied());
        match self.call(Frame::command(args))? {
            Frame::Array(Some(items)) if items.len() == fields.len() => items
                .into_iter()
                .map(|item| nullable_string("HMGET", item))
                .collect(),
            other => Err(unexpected("HMGET", &other)),
        }
    }

    fn set_field(&self, key: &str, field: &str, value: &str) -> StoreResult<()> {
        log::debug!("HSET {} {}", key, field);
        match self.call(Frame::command(["HSET", key, field, value]))? {
            Frame::Integer(_) => Ok(()),
            other => Err(unexpected("HSET", &other)),
        }
    }

    fn set_fields(&self, key: &str, pairs: &Mapping) -> StoreResult<()> {
        if pairs.is_empty() {
            return Ok(());
        }
        log::debug!("HSET {} ({} pairs)", key, pairs.len());
        let args = ["HSET", key].into_iter().chain(
            pairs
                .iter()
                .flat_map(|(field, value)| [field.as_str(), value.as_str()]),
        );
        match self.call(Frame::command(args))? {
            Frame::Integer(_) => Ok(()),
            other => Err(unexpected("HSET", &other)),
        }
    }

    fn set_field_if_absent(&self, key: &str, field: &str, value: &str) -> StoreResult<bool> {
        log::debug!("HSETNX {} {}", key, field);
        match self.call(Frame::command(["HSETNX", key, field, value]))? {
            Frame::Integer(1) => Ok(true),
            Frame::Integer(0) => Ok(false),
            other => Err(unexpected("HSETNX", &other)),
        }
    }
}

fn unexpected(command: &str, reply: &Frame) -> StoreError {
    StoreError::UnexpectedReply {
        command: command.to_string(),
        reply: reply.describe(),
    }
}

fn expect_ok(command: &str, reply: Frame) -> StoreResult<()> {
    match reply {
        Frame::Simple(ref s) if s == "OK" => Ok(()),
        other => Err(unexpected(command, &other)),
    }
}

fn utf8(command: &str, bytes: Bytes) -> StoreResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|e| StoreError::Decode {
        message: format!("{} returned a non-UTF-8 value: {}", command, e),
    })
}

fn bulk_string(command: &str, frame: Frame) -> StoreResult<String> {
    match frame {
        Frame::Bulk(Some(bytes)) => utf8(command, bytes),
        other => Err(unexpected(command, &other)),
    }
}

fn nullable_string(command: &str, frame: Frame) -> StoreResult<Option<String>> {
    match frame {
        Frame::Bulk(None) => Ok(None),
        Frame::Bulk(Some(bytes)) => utf8(command, bytes).map(Some),
        other => Err(unexpected(command, &other)),
    }
}
