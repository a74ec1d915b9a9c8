//! The connection pool (§4.6): an idle set guarded by a mutex, capacity
//! enforced by a semaphore (whose own wait queue gives FIFO acquire
//! fairness per §8 property 8), and lazy health-checking/reaping of idle
//! connections before they're handed to a waiter.

use std::collections::VecDeque;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::connection::Connection;
use crate::error::Error;
use crate::options::{MySqlConnectOptions, PoolOptions};

struct Managed {
    connection: Connection,
    created: Instant,
}

struct Idle {
    managed: Managed,
    since: Instant,
}

fn should_reap(idle: &Idle, options: &PoolOptions) -> bool {
    let too_old = options
        .max_lifetime
        .is_some_and(|max| idle.managed.created.elapsed() >= max);
    let too_idle = options
        .idle_timeout
        .is_some_and(|timeout| idle.since.elapsed() >= timeout);
    too_old || too_idle
}

struct Shared {
    connect_options: MySqlConnectOptions,
    pool_options: PoolOptions,
    idle: Mutex<VecDeque<Idle>>,
    semaphore: Arc<Semaphore>,
    size: AtomicU32,
    closed: AtomicBool,
}

/// A cheaply-cloned handle to a connection pool. Every clone shares the same
/// idle set and capacity.
#[derive(Clone)]
pub struct Pool {
    shared: Arc<Shared>,
}

impl Pool {
    pub fn new(connect_options: MySqlConnectOptions, pool_options: PoolOptions) -> Pool {
        let semaphore = Arc::new(Semaphore::new(pool_options.max_size as usize));

        Pool {
            shared: Arc::new(Shared {
                connect_options,
                pool_options,
                idle: Mutex::new(VecDeque::new()),
                semaphore,
                size: AtomicU32::new(0),
                closed: AtomicBool::new(false),
            }),
        }
    }

    pub fn size(&self) -> u32 {
        self.shared.size.load(Ordering::Acquire)
    }

    pub fn num_idle(&self) -> usize {
        // Best-effort: a `try_lock` avoids blocking a caller just to report
        // a diagnostic count; callers needing an exact count should go
        // through `acquire`/`release` instead.
        self.shared.idle.try_lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Hands back an idle healthy connection if one exists, opens a new one
    /// if the pool is under `max_size`, or waits in the semaphore's FIFO
    /// queue otherwise. Times out after `acquire_timeout`.
    pub async fn acquire(&self) -> Result<PooledConnection, Error> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }

        let permit = tokio::time::timeout(
            self.shared.pool_options.acquire_timeout,
            Arc::clone(&self.shared.semaphore).acquire_owned(),
        )
        .await
        .map_err(|_| Error::PoolTimedOut)?
        .expect("the pool's semaphore is never closed while `self.shared` is alive");

        if self.shared.closed.load(Ordering::Acquire) {
            return Err(Error::PoolClosed);
        }

        loop {
            let popped = self.shared.idle.lock().await.pop_front();

            let managed = match popped {
                Some(idle) if should_reap(&idle, &self.shared.pool_options) => {
                    let _ = idle.managed.connection.close().await;
                    self.shared.size.fetch_sub(1, Ordering::AcqRel);
                    continue;
                }
                Some(mut idle) => match idle.managed.connection.ping().await {
                    Ok(()) => idle.managed,
                    Err(e) => {
                        log::info!("discarding idle connection that failed its health check: {}", e);
                        self.shared.size.fetch_sub(1, Ordering::AcqRel);
                        continue;
                    }
                },
                None => {
                    let connection = Connection::connect(&self.shared.connect_options).await?;
                    self.shared.size.fetch_add(1, Ordering::AcqRel);
                    Managed {
                        connection,
                        created: Instant::now(),
                    }
                }
            };

            return Ok(PooledConnection {
                shared: Some(Arc::clone(&self.shared)),
                managed: Some(managed),
                permit: Some(permit),
            });
        }
    }

    /// Closes the pool: no further `acquire` succeeds, and every currently
    /// idle connection is closed. Connections already checked out are
    /// closed as they're released rather than returned to the idle set.
    pub async fn close(&self) {
        self.shared.closed.store(true, Ordering::Release);

        let mut idle = self.shared.idle.lock().await;
        while let Some(entry) = idle.pop_front() {
            let _ = entry.managed.connection.close().await;
            self.shared.size.fetch_sub(1, Ordering::AcqRel);
        }
    }
}

/// An acquired connection. Returns itself to the pool's idle set on drop
/// (or is closed outright, if the pool was closed or the connection is
/// unhealthy), never blocking the dropping thread since that handoff runs
/// on a spawned task.
pub struct PooledConnection {
    shared: Option<Arc<Shared>>,
    managed: Option<Managed>,
    permit: Option<OwnedSemaphorePermit>,
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.managed.as_ref().expect("connection taken before drop").connection
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Connection {
        &mut self.managed.as_mut().expect("connection taken before drop").connection
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let (Some(shared), Some(managed), Some(permit)) =
            (self.shared.take(), self.managed.take(), self.permit.take())
        else {
            return;
        };

        tokio::spawn(async move {
            let closed = shared.closed.load(Ordering::Acquire);

            if closed || managed.connection.is_closed() {
                let _ = managed.connection.close().await;
                shared.size.fetch_sub(1, Ordering::AcqRel);
            } else {
                shared.idle.lock().await.push_back(Idle {
                    managed,
                    since: Instant::now(),
                });
            }

            drop(permit);
        });
    }
}
